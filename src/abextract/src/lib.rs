//! abextract library - Unity asset bundle image extraction
//!
//! Walks a directory tree for `.ab` bundles, hands each to a bundle decoder
//! and writes every Texture2D / Sprite it contains as a PNG, mirroring the
//! input layout under the output directory.

pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod processor;
pub mod retry;
pub mod validate;

pub use batch::{discover_bundles, BatchDriver, BatchOptions, BatchStats};
pub use decoder::{Bundle, BundleDecoder, BundleObject, DecodedAsset, DecoderProfile};
pub use error::ExtractError;
pub use processor::{FailureKind, FileOutcome, FileProcessor};
pub use retry::RetryPolicy;
