//! Ctrl-C handling
//!
//! The first Ctrl-C sets a flag the batch driver checks between files; the
//! file in flight finishes and its output stays on disk. A second Ctrl-C
//! exits immediately.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub fn install() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start signal runtime")?;

    let handler_flag = flag.clone();
    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if handler_flag.swap(true, Ordering::SeqCst) {
                        warn!("Interrupted again, aborting");
                        std::process::exit(1);
                    }
                    warn!("Interrupt received, stopping after the current file (Ctrl-C again to abort)");
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(flag)
}
