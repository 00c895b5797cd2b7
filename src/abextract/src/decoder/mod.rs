//! Bundle decoder boundary
//!
//! The Unity serialized format is never parsed here. A decoder backend turns a
//! file path into a [`Bundle`], and each [`BundleObject`] in it can report its
//! declared type, its internal path id, and decode itself into a
//! [`DecodedAsset`]. Everything downstream only talks to these traits, so any
//! conforming backend can be swapped in.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "unity")]
mod unity;

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ExtractError;

/// Game-specific handling the backend should apply when opening bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecoderProfile {
    /// Plain Unity bundles
    Standard,
    /// Arknights bundles (the game's obfuscated layout)
    #[default]
    Arknights,
}

/// Opens bundle files.
///
/// Implementations are shared across worker threads when `jobs > 1`.
pub trait BundleDecoder: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn Bundle>>;
}

/// A loaded bundle. Dropping it releases every decoded buffer it owns.
pub trait Bundle {
    fn objects(&self) -> Box<dyn Iterator<Item = Box<dyn BundleObject + '_>> + '_>;
}

/// One serialized object inside a bundle.
pub trait BundleObject {
    /// Declared type name, e.g. `Texture2D`
    fn type_name(&self) -> Result<String>;

    /// Identifier unique within the bundle
    fn path_id(&self) -> i64;

    fn decode(&self) -> Result<DecodedAsset>;
}

/// Structured data decoded from a [`BundleObject`].
#[derive(Debug, Default)]
pub struct DecodedAsset {
    pub name: Option<String>,
    pub image: Option<DynamicImage>,
}

/// Build the decoder compiled into this binary.
#[cfg(feature = "unity")]
pub fn default_decoder(profile: DecoderProfile) -> Result<Box<dyn BundleDecoder>, ExtractError> {
    Ok(Box::new(unity::UnityRsDecoder::new(profile)))
}

/// Build the decoder compiled into this binary.
#[cfg(not(feature = "unity"))]
pub fn default_decoder(_profile: DecoderProfile) -> Result<Box<dyn BundleDecoder>, ExtractError> {
    Err(ExtractError::DecoderUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            profile: DecoderProfile,
        }

        let parsed: Wrapper = toml::from_str("profile = \"standard\"").unwrap();
        assert_eq!(parsed.profile, DecoderProfile::Standard);
    }

    #[test]
    fn test_default_profile_is_arknights() {
        assert_eq!(DecoderProfile::default(), DecoderProfile::Arknights);
    }

    #[cfg(not(feature = "unity"))]
    #[test]
    fn test_no_backend_reports_unavailable() {
        let result = default_decoder(DecoderProfile::Standard);
        assert!(matches!(result, Err(ExtractError::DecoderUnavailable)));
    }
}
