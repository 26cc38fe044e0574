use anyhow::{Result, anyhow, bail};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;

use super::context::{PipelineHandles, PipelineTuning, ReaderContext, create_pipeline_channels};
use super::counters::{CounterSnapshot, LoadCounters};
use super::discover::{discover, spawn_feed_thread};
use super::reader::spawn_reader_workers;
use super::verdict::{evaluate, log_verdict};
use super::writer::spawn_writer_workers;
use crate::engine::progress::{ProgressBar, files_bar, finish_progress_bar};
use crate::store::ShardRegistry;
use crate::{LoadReport, Opts};

/// Start feeder, readers and writers over `files`. Caller must pass the handles to
/// [`shutdown_pipeline_handles`] before reading `counters`.
pub fn run_pipeline(
    files: Vec<PathBuf>,
    tuning: &PipelineTuning,
    registry: &Arc<ShardRegistry>,
    counters: &Arc<LoadCounters>,
    reader_ctx: &ReaderContext,
) -> PipelineHandles {
    let channels = create_pipeline_channels(tuning);

    let feed_handle = spawn_feed_thread(channels.file_tx, files, Arc::clone(&reader_ctx.cancel));

    let writer_handles =
        spawn_writer_workers(channels.batch_rx, registry, counters, tuning.writers);

    // file_rx is moved in and dropped here: once every reader exits, the feeder's send fails.
    let reader_handles =
        spawn_reader_workers(channels.file_rx, &channels.batch_tx, reader_ctx, tuning.readers);

    PipelineHandles {
        feed_handle,
        reader_handles,
        writer_handles,
        batch_tx: channels.batch_tx,
    }
}

fn join_all(handles: Vec<JoinHandle<()>>, what: &str) -> usize {
    let mut panicked = 0;
    for h in handles {
        if h.join().is_err() {
            panicked += 1;
        }
    }
    if panicked > 0 {
        error!("{} {} thread(s) panicked", panicked, what);
    }
    panicked
}

/// Completion barrier: feeder, then every reader, then close the batch queue, then every writer.
/// Returns the number of files the feeder queued.
pub fn shutdown_pipeline_handles(handles: PipelineHandles) -> Result<usize> {
    let PipelineHandles {
        feed_handle,
        reader_handles,
        writer_handles,
        batch_tx,
    } = handles;

    let queued = feed_handle
        .join()
        .map_err(|_| anyhow!("feeder thread panicked"))?;
    let readers_panicked = join_all(reader_handles, "reader");
    debug!("all readers done, closing batch queue");
    drop(batch_tx);
    let writers_panicked = join_all(writer_handles, "writer");
    debug!("all writers done");

    if readers_panicked + writers_panicked > 0 {
        return Err(anyhow!(
            "{} reader and {} writer threads panicked",
            readers_panicked,
            writers_panicked
        ));
    }
    Ok(queued)
}

fn build_report(files_discovered: usize, snap: CounterSnapshot) -> LoadReport {
    LoadReport {
        files_discovered,
        files_processed: snap.files_processed,
        files_skipped: snap.files_skipped,
        lines: snap.lines,
        errors: snap.errors,
        written: snap.written,
        verdict: evaluate(snap.lines, snap.errors),
    }
}

/// Discover input files and load them through `registry`. Returns after every worker exited.
pub fn load_files(opts: &Opts, registry: Arc<ShardRegistry>) -> Result<LoadReport> {
    if registry.is_empty() {
        bail!("no shards configured");
    }
    let files = discover(&opts.pattern)?;
    let files_discovered = files.len();
    info!(
        "Loading {} files into {} shards with {} readers, {} writers, batch size {}",
        files_discovered,
        registry.len(),
        opts.readers,
        opts.writers,
        opts.batch_size
    );

    let tuning = PipelineTuning::new(opts.readers, opts.writers, opts.batch_size);
    let counters = Arc::new(LoadCounters::new());
    let progress: Option<ProgressBar> = files_bar(opts.verbose, files_discovered);
    let reader_ctx = ReaderContext {
        batch_size: tuning.batch_size,
        keep_files: opts.dry_run,
        counters: Arc::clone(&counters),
        cancel: opts
            .cancel
            .clone()
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        progress: progress.clone(),
    };

    let handles = run_pipeline(files, &tuning, &registry, &counters, &reader_ctx);
    let queued = shutdown_pipeline_handles(handles)?;
    if let Some(pb) = &progress {
        finish_progress_bar(pb);
    }
    if queued < files_discovered {
        info!("Interrupted: {} of {} files queued", queued, files_discovered);
    }

    let report = build_report(files_discovered, counters.snapshot());
    info!(
        "Files: {} processed, {} skipped. Lines: {}, errors: {}, written: {}",
        report.files_processed, report.files_skipped, report.lines, report.errors, report.written
    );
    log_verdict(&report.verdict);
    Ok(report)
}
