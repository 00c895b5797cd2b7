//! In-memory decoder for tests

use anyhow::{anyhow, bail, Result};
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Bundle, BundleDecoder, BundleObject, DecodedAsset};

#[derive(Debug, Clone)]
pub struct FakeObject {
    pub type_name: Option<String>,
    pub path_id: i64,
    pub name: Option<String>,
    pub has_image: bool,
    pub decode_fails: bool,
}

impl FakeObject {
    pub fn texture(path_id: i64, name: &str) -> Self {
        Self::typed("Texture2D", path_id, name)
    }

    pub fn sprite(path_id: i64, name: &str) -> Self {
        Self::typed("Sprite", path_id, name)
    }

    pub fn typed(type_name: &str, path_id: i64, name: &str) -> Self {
        Self {
            type_name: Some(type_name.to_string()),
            path_id,
            name: Some(name.to_string()),
            has_image: true,
            decode_fails: false,
        }
    }

    /// An object whose type lookup fails
    pub fn unresolvable(path_id: i64) -> Self {
        Self {
            type_name: None,
            ..Self::texture(path_id, "broken")
        }
    }
}

impl BundleObject for FakeObject {
    fn type_name(&self) -> Result<String> {
        self.type_name
            .clone()
            .ok_or_else(|| anyhow!("type tree missing for path_id {}", self.path_id))
    }

    fn path_id(&self) -> i64 {
        self.path_id
    }

    fn decode(&self) -> Result<DecodedAsset> {
        if self.decode_fails {
            bail!("malformed object data");
        }
        Ok(DecodedAsset {
            name: self.name.clone(),
            image: self.has_image.then(|| DynamicImage::new_rgba8(2, 2)),
        })
    }
}

struct FakeBundle {
    objects: Vec<FakeObject>,
}

impl Bundle for FakeBundle {
    fn objects<'a>(&'a self) -> Box<dyn Iterator<Item = Box<dyn BundleObject + 'a>> + 'a> {
        Box::new(
            self.objects
                .iter()
                .map(|o| Box::new(o.clone()) as Box<dyn BundleObject + 'a>),
        )
    }
}

/// Decoder keyed by file name, with optional injected load failures.
#[derive(Default)]
pub struct FakeDecoder {
    bundles: HashMap<String, Vec<FakeObject>>,
    failures_left: Mutex<HashMap<String, usize>>,
    loads: Mutex<HashMap<String, usize>>,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, file_name: &str, objects: Vec<FakeObject>) -> Self {
        self.bundles.insert(file_name.to_string(), objects);
        self
    }

    /// Fail the first `count` loads of `file_name`
    pub fn failing_first(self, file_name: &str, count: usize) -> Self {
        self.failures_left
            .lock()
            .unwrap()
            .insert(file_name.to_string(), count);
        self
    }

    pub fn load_count(&self, file_name: &str) -> usize {
        self.loads
            .lock()
            .unwrap()
            .get(file_name)
            .copied()
            .unwrap_or(0)
    }

    fn key(path: &Path) -> String {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl BundleDecoder for FakeDecoder {
    fn load(&self, path: &Path) -> Result<Box<dyn Bundle>> {
        let key = Self::key(path);
        *self.loads.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        if let Some(left) = self.failures_left.lock().unwrap().get_mut(&key) {
            if *left > 0 {
                *left -= 1;
                bail!("simulated decoder failure for {}", key);
            }
        }

        let objects = self
            .bundles
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("unknown bundle {:?}", PathBuf::from(path)))?;

        Ok(Box::new(FakeBundle { objects }))
    }
}
