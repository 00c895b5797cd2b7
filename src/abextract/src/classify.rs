//! Image asset classification

use image::DynamicImage;

use crate::decoder::{BundleObject, DecodedAsset};

/// Object types that carry pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Texture2D,
    Sprite,
}

impl ImageKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Texture2D" => Some(ImageKind::Texture2D),
            "Sprite" => Some(ImageKind::Sprite),
            _ => None,
        }
    }
}

/// Image kind of `object`, or `None` if it is not image-bearing or its type
/// cannot be resolved.
pub fn image_kind(object: &dyn BundleObject) -> Option<ImageKind> {
    object
        .type_name()
        .ok()
        .and_then(|name| ImageKind::from_type_name(&name))
}

pub fn is_image_asset(object: &dyn BundleObject) -> bool {
    image_kind(object).is_some()
}

/// Take the image out of decoded data, if it has one.
pub fn extract_image(decoded: DecodedAsset) -> Option<DynamicImage> {
    decoded.image
}
