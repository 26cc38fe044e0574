//! CLI command handler: resolve options, set up logging, run the load, return the verdict.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::store::ShardRegistry;
use crate::utils::config::PackagePaths;
use crate::utils::loader_toml::{apply_file_to_opts, load_loader_toml};
use crate::utils::setup_logging;
use crate::{Opts, Verdict, load_files};

/// Defaults, then config file, then command-line flags.
pub fn resolve_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();

    let (config_path, required) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (PathBuf::from(PackagePaths::get().config_filename()), false),
    };
    if let Some(file) = load_loader_toml(&config_path, required)? {
        apply_file_to_opts(&file, &mut opts);
    }

    if let Some(ref p) = cli.log {
        opts.log_path = p.clone();
    }
    if let Some(ref p) = cli.pattern {
        opts.pattern = p.clone();
    }
    if let Some(n) = cli.readers {
        opts.readers = n;
    }
    if let Some(n) = cli.writers {
        opts.writers = n;
    }
    if let Some(n) = cli.batch_size {
        opts.batch_size = n;
    }
    for (category, addr) in cli.shard_overrides() {
        opts.shards.insert(category.to_string(), addr.to_string());
    }
    opts.dry_run |= cli.dry_run;
    opts.verbose |= cli.verbose;

    if opts.readers == 0 || opts.writers == 0 || opts.batch_size == 0 {
        bail!("readers, writers and batch size must be at least 1");
    }
    if opts.shards.is_empty() {
        bail!("no shards configured");
    }
    Ok(opts)
}

/// Run one load. `Err` only for fatal problems (config, discovery); otherwise the verdict.
pub fn handle_run(cli: &Cli) -> Result<Verdict> {
    let mut opts = resolve_opts(cli)?;
    setup_logging(opts.verbose, &opts.log_path);
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );
    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NOTHING WILL BE WRITTEN AND NO FILE WILL BE RENAMED.");
    }

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;
    opts.cancel = Some(Arc::clone(&cancel_requested));

    let registry = Arc::new(ShardRegistry::from_addrs(&opts.shards, opts.dry_run)?);
    let report = load_files(&opts, registry).inspect_err(|e| log::error!("{:#}", e))?;

    if cancel_requested.load(Ordering::Relaxed) {
        warn!("Load interrupted by user; remaining files were left in place");
    }
    Ok(report.verdict)
}
