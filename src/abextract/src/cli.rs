//! CLI argument definitions for abextract

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::decoder::DecoderProfile;

#[derive(Parser, Debug)]
#[command(name = "abextract")]
#[command(about = "Extract Texture2D and Sprite images from Unity .ab bundles as PNG")]
#[command(version)]
pub struct Args {
    /// Directory to search for .ab files
    #[arg(default_value = "avg")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Files per batch (default: 5)
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Worker threads per batch (default: 1)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Attempts per file before it counts as failed (default: 3)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds (default: 1000)
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Log file, appended to (default: unity_extractor.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Decoder profile (default: arknights)
    #[arg(long, value_enum)]
    pub profile: Option<DecoderProfile>,

    /// Config file (default: <config dir>/abextract/config.toml if present)
    #[arg(long, env = "ABEXTRACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Override `config` with any flags given on the command line
    pub fn apply(&self, config: &mut Config) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry_delay_ms = delay;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
    }
}
