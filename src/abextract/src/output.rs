//! Output layout: mirrored directories and collision-free PNG names

use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Keep alphanumerics, space, hyphen and underscore; drop the rest and trim
/// trailing whitespace.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Name for an exported asset, falling back to its path id when the asset
/// has no usable name.
pub fn asset_name(name: Option<&str>, path_id: i64) -> String {
    name.map(sanitize_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("unnamed_asset_{}", path_id))
}

/// `output_root / <parent of file relative to input_root> / <file stem>`
///
/// [`crate::FileProcessor`] accepts any path, so a file outside
/// `input_root` lands directly under `output_root`.
pub fn asset_output_dir(output_root: &Path, input_root: &Path, file: &Path) -> PathBuf {
    let relative = file
        .strip_prefix(input_root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .or_else(|| file.file_name().map(Path::new))
        .unwrap_or(file);

    let stem = relative.file_stem().unwrap_or(relative.as_os_str());
    match relative.parent() {
        Some(parent) => output_root.join(parent).join(stem),
        None => output_root.join(stem),
    }
}

/// Create `dir` and any missing parents.
pub fn create_output_dir(dir: &Path) -> Result<(), ExtractError> {
    std::fs::create_dir_all(dir).map_err(|source| ExtractError::CreateOutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// First of `{base}.png`, `{base}_1.png`, `{base}_2.png`, ... not present in `dir`.
pub fn resolve_png_path(dir: &Path, base: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{}.png", base));
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}.png", base, counter));
        counter += 1;
    }
    candidate
}
