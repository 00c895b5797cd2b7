//! Decoder backend built on `unity-rs`

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use unity_rs::classes::Texture2D;
use unity_rs::{ClassID, Env, Object, Sprite};

use super::{Bundle, BundleDecoder, BundleObject, DecodedAsset, DecoderProfile};

pub struct UnityRsDecoder {
    profile: DecoderProfile,
}

impl UnityRsDecoder {
    pub fn new(profile: DecoderProfile) -> Self {
        Self { profile }
    }
}

impl BundleDecoder for UnityRsDecoder {
    fn load(&self, path: &Path) -> Result<Box<dyn Bundle>> {
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read bundle {:?}", path))?;

        // unity-rs detects the Arknights layout on its own; the profile only
        // shows up in diagnostics.
        tracing::debug!(profile = ?self.profile, "loading {:?}", path);

        let mut env = Env::new();
        env.load_from_slice(data)
            .map_err(|e| anyhow!("{:?}", e))
            .with_context(|| format!("Failed to parse bundle {:?}", path))?;

        Ok(Box::new(UnityBundle { env }))
    }
}

struct UnityBundle {
    env: Env,
}

impl Bundle for UnityBundle {
    fn objects<'a>(&'a self) -> Box<dyn Iterator<Item = Box<dyn BundleObject + 'a>> + 'a> {
        Box::new(
            self.env
                .objects()
                .map(|obj| Box::new(UnityObject { obj }) as Box<dyn BundleObject + 'a>),
        )
    }
}

struct UnityObject<'a> {
    obj: Object<'a>,
}

impl BundleObject for UnityObject<'_> {
    fn type_name(&self) -> Result<String> {
        Ok(format!("{:?}", self.obj.class()))
    }

    fn path_id(&self) -> i64 {
        self.obj.info.path_id
    }

    fn decode(&self) -> Result<DecodedAsset> {
        let (name, rgba) = match self.obj.class() {
            ClassID::Texture2D => {
                let texture: Texture2D = self.obj.read().map_err(|e| anyhow!("{:?}", e))?;
                let rgba = texture.decode_image().map_err(|e| anyhow!("{:?}", e))?;
                (texture.name.clone(), rgba)
            }
            ClassID::Sprite => {
                let sprite: Sprite = self.obj.read().map_err(|e| anyhow!("{:?}", e))?;
                let rgba = sprite.decode_image().map_err(|e| anyhow!("{:?}", e))?;
                (sprite.name.clone(), rgba)
            }
            _ => return Ok(DecodedAsset::default()),
        };

        // unity-rs may pin a different `image` release, so rebuild the
        // buffer on our side.
        let (width, height) = rgba.dimensions();
        let image = RgbaImage::from_raw(width, height, rgba.into_raw())
            .context("Decoded image buffer does not match its dimensions")?;

        Ok(DecodedAsset {
            name: Some(name).filter(|n| !n.is_empty()),
            image: Some(DynamicImage::ImageRgba8(image)),
        })
    }
}
