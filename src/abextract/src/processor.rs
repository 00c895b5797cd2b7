//! Single bundle processing: validate, decode, export images

use anyhow::{Context, Result};
use image::ImageFormat;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::classify::{extract_image, image_kind};
use crate::decoder::{BundleDecoder, BundleObject};
use crate::output::{asset_name, asset_output_dir, create_output_dir, resolve_png_path};
use crate::retry::RetryPolicy;
use crate::validate::validate;

/// Why a bundle produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Missing, empty or truncated file
    Invalid,
    /// The mirrored output directory could not be created
    OutputDir,
    /// The decoder kept failing after every retry
    Decode,
    /// Decoded fine but held no exportable image
    NothingExtracted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Invalid => "invalid file",
            FailureKind::OutputDir => "output directory error",
            FailureKind::Decode => "decode error",
            FailureKind::NothingExtracted => "no images",
        };
        f.write_str(label)
    }
}

/// Terminal result for one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Exported(usize),
    Failed(FailureKind),
}

impl FileOutcome {
    /// At least one image was written.
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Exported(n) if *n > 0)
    }
}

/// Exports every image in a bundle into its mirrored output directory.
pub struct FileProcessor<'a> {
    decoder: &'a dyn BundleDecoder,
    input_root: &'a Path,
    output_root: &'a Path,
    retry: RetryPolicy,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        decoder: &'a dyn BundleDecoder,
        input_root: &'a Path,
        output_root: &'a Path,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            decoder,
            input_root,
            output_root,
            retry,
        }
    }

    /// Process `file`, re-running the whole file when an attempt errors.
    ///
    /// Validation, directory and "nothing to export" failures are ordinary
    /// outcomes. An `Err` means every attempt failed (or hit a non-retryable
    /// error) and is left to the caller to record.
    pub fn process(&self, file: &Path) -> Result<FileOutcome> {
        let label = file.display().to_string();
        self.retry.run(&label, |_| self.process_once(file))
    }

    /// A single attempt. The decoded bundle is dropped before returning.
    pub fn process_once(&self, file: &Path) -> Result<FileOutcome> {
        if !validate(file) {
            return Ok(FileOutcome::Failed(FailureKind::Invalid));
        }

        info!("Processing {}", file.display());

        let out_dir = asset_output_dir(self.output_root, self.input_root, file);
        if let Err(e) = create_output_dir(&out_dir) {
            error!("{}", e);
            return Ok(FileOutcome::Failed(FailureKind::OutputDir));
        }

        let bundle = self
            .decoder
            .load(file)
            .with_context(|| format!("Failed to load bundle {}", file.display()))?;

        let mut exported = 0;
        for object in bundle.objects() {
            match export_object(object.as_ref(), &out_dir) {
                Ok(Some(path)) => {
                    exported += 1;
                    info!("Exported {}", path.display());
                }
                Ok(None) => {}
                Err(e) => error!(
                    "Failed to export object (path_id: {}): {:#}",
                    object.path_id(),
                    e
                ),
            }
        }

        if exported == 0 {
            debug!("No images exported from {}", file.display());
            return Ok(FileOutcome::Failed(FailureKind::NothingExtracted));
        }
        Ok(FileOutcome::Exported(exported))
    }
}

/// Write `object` as a PNG if it is an image asset with pixel data.
fn export_object(object: &dyn BundleObject, out_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(kind) = image_kind(object) else {
        return Ok(None);
    };

    let decoded = object
        .decode()
        .with_context(|| format!("Failed to decode {:?}", kind))?;
    let name = asset_name(decoded.name.as_deref(), object.path_id());
    let Some(image) = extract_image(decoded) else {
        debug!("{:?} {} has no image data", kind, name);
        return Ok(None);
    };

    let path = resolve_png_path(out_dir, &name);
    image
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(Some(path))
}
