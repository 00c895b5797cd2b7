//! abextract - Unity asset bundle image extractor

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use abextract::cli::Args;
use abextract::config::Config;
use abextract::{decoder, interrupt, logging, BatchDriver, ExtractError};

fn main() -> ExitCode {
    let args = Args::parse();

    let result = run(&args);
    if let Err(e) = &result {
        report(e);
    }
    ExitCode::from(exit_status(&result))
}

/// 0 on success; 1 for interrupts and every fatal error.
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn is_interrupt(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<ExtractError>(),
        Some(ExtractError::Interrupted)
    )
}

fn report(e: &anyhow::Error) {
    if !tracing::dispatcher::has_been_set() {
        eprintln!("Error: {:#}", e);
    } else if is_interrupt(e) {
        info!("Processing interrupted by user");
    } else {
        error!("{:#}", e);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    logging::init(&config.log_file, args.verbose)?;
    config.validate()?;

    let interrupt = interrupt::install()?;
    let decoder = decoder::default_decoder(config.profile)?;

    info!(
        "Extracting {} -> {} (batch size {}, jobs {})",
        args.input.display(),
        args.output.display(),
        config.batch_size,
        config.jobs
    );

    BatchDriver::new(decoder.as_ref(), config.batch_options())
        .with_interrupt(interrupt)
        .run(&args.input, &args.output)?;

    Ok(())
}
