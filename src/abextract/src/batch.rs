//! Batch driver: discover bundles and run them through the processor in chunks

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::decoder::BundleDecoder;
use crate::error::ExtractError;
use crate::processor::{FailureKind, FileOutcome, FileProcessor};
use crate::retry::RetryPolicy;

pub const BUNDLE_EXTENSION: &str = "ab";

/// Running totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// PNGs written across all files
    pub images: usize,
    pub failures: HashMap<FailureKind, usize>,
}

impl BatchStats {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Exported(n) if n > 0 => {
                self.succeeded += 1;
                self.images += n;
            }
            FileOutcome::Exported(_) => self.fail(FailureKind::NothingExtracted),
            FileOutcome::Failed(kind) => self.fail(kind),
        }
    }

    fn fail(&mut self, kind: FailureKind) {
        self.failed += 1;
        *self.failures.entry(kind).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Worker threads per batch; 1 keeps everything on the calling thread
    pub jobs: usize,
    pub retry: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            jobs: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// All `.ab` files under `root`, recursively, in a stable order.
///
/// The extension match is exact: `a.ab` and `a.AB` would share an output
/// directory, which breaks the one-writer-per-directory rule under `jobs > 1`.
pub fn discover_bundles(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == BUNDLE_EXTENSION)
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

pub struct BatchDriver<'a> {
    decoder: &'a dyn BundleDecoder,
    options: BatchOptions,
    interrupt: Arc<AtomicBool>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(decoder: &'a dyn BundleDecoder, options: BatchOptions) -> Self {
        Self {
            decoder,
            options,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop between files once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// Extract every bundle under `root` into `output_root`.
    ///
    /// Only a missing `root`, bad options or an interrupt end the run early;
    /// per-file problems are folded into the returned statistics.
    pub fn run(&self, root: &Path, output_root: &Path) -> Result<BatchStats, ExtractError> {
        if self.options.batch_size == 0 {
            return Err(ExtractError::InvalidSetting {
                name: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !root.exists() {
            return Err(ExtractError::InputNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ExtractError::InputNotDirectory(root.to_path_buf()));
        }

        let files = discover_bundles(root);
        let mut stats = BatchStats {
            total: files.len(),
            ..BatchStats::default()
        };

        if files.is_empty() {
            warn!("No .{} files found in {}", BUNDLE_EXTENSION, root.display());
            return Ok(stats);
        }
        info!("Found {} .{} files", stats.total, BUNDLE_EXTENSION);

        let pool = self.build_pool()?;
        let processor = FileProcessor::new(self.decoder, root, output_root, self.options.retry);
        let total_batches = files.len().div_ceil(self.options.batch_size);

        for (index, batch) in files.chunks(self.options.batch_size).enumerate() {
            let batch_no = index + 1;
            info!("Processing batch {}/{}", batch_no, total_batches);

            match &pool {
                Some(pool) => self.run_parallel(pool, &processor, batch, &mut stats)?,
                None => self.run_sequential(&processor, batch, &mut stats)?,
            }

            info!("Batch {}/{} complete", batch_no, total_batches);
            info!(
                "Succeeded so far: {}, failed: {}",
                stats.succeeded, stats.failed
            );
        }

        log_summary(&stats);
        Ok(stats)
    }

    fn build_pool(&self) -> Result<Option<rayon::ThreadPool>, ExtractError> {
        if self.options.jobs <= 1 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .thread_name(|i| format!("abextract-worker-{}", i))
            .build()
            .map(Some)
            .map_err(|e| ExtractError::InvalidSetting {
                name: "jobs",
                reason: e.to_string(),
            })
    }

    fn check_interrupt(&self) -> Result<(), ExtractError> {
        if self.interrupt.load(Ordering::SeqCst) {
            return Err(ExtractError::Interrupted);
        }
        Ok(())
    }

    fn run_sequential(
        &self,
        processor: &FileProcessor<'_>,
        batch: &[PathBuf],
        stats: &mut BatchStats,
    ) -> Result<(), ExtractError> {
        for file in batch {
            self.check_interrupt()?;
            let outcome = processor.process(file);
            record(stats, file, outcome);
        }
        Ok(())
    }

    /// Each file owns a distinct output directory, so workers never probe
    /// the same names. Results are tallied here, on the calling thread.
    fn run_parallel(
        &self,
        pool: &rayon::ThreadPool,
        processor: &FileProcessor<'_>,
        batch: &[PathBuf],
        stats: &mut BatchStats,
    ) -> Result<(), ExtractError> {
        self.check_interrupt()?;

        let results: Vec<_> = pool.install(|| {
            batch
                .par_iter()
                .map(|file| {
                    if self.interrupt.load(Ordering::SeqCst) {
                        return None;
                    }
                    Some(processor.process(file))
                })
                .collect()
        });

        for (file, outcome) in batch.iter().zip(results) {
            if let Some(outcome) = outcome {
                record(stats, file, outcome);
            }
        }

        self.check_interrupt()
    }
}

fn record(stats: &mut BatchStats, file: &Path, outcome: anyhow::Result<FileOutcome>) {
    let outcome = outcome.unwrap_or_else(|e| {
        error!("Failed to process {}: {:#}", file.display(), e);
        FileOutcome::Failed(FailureKind::Decode)
    });
    if let FileOutcome::Failed(kind) = outcome {
        debug!("{} failed: {}", file.display(), kind);
    }
    stats.record(outcome);

    let processed = stats.processed();
    info!(
        "Progress: {}/{} ({:.2}%)",
        processed,
        stats.total,
        processed as f64 / stats.total as f64 * 100.0
    );
}

fn log_summary(stats: &BatchStats) {
    info!("{}", "=".repeat(50));
    info!("Extraction finished");
    info!("Total files: {}", stats.total);
    info!("Succeeded: {}", stats.succeeded);
    info!("Failed: {}", stats.failed);
    for kind in [
        FailureKind::Invalid,
        FailureKind::OutputDir,
        FailureKind::Decode,
        FailureKind::NothingExtracted,
    ] {
        if let Some(count) = stats.failures.get(&kind) {
            info!("  {}: {}", kind, count);
        }
    }
    info!("Images exported: {}", stats.images);
    info!("{}", "=".repeat(50));
}
