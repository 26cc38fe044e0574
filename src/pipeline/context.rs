//! Pipeline channels and shared state passed into the feeder, readers and writers.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use super::counters::LoadCounters;
use crate::Batch;
use crate::engine::progress::ProgressBar;
use crate::utils::config::ChannelCaps;

/// Worker counts and queue sizes for one run.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub readers: usize,
    pub writers: usize,
    pub batch_size: usize,
    pub file_cap: usize,
    pub batch_cap: usize,
}

impl PipelineTuning {
    /// Counts clamped to at least one.
    pub fn new(readers: usize, writers: usize, batch_size: usize) -> Self {
        Self {
            readers: readers.max(1),
            writers: writers.max(1),
            batch_size: batch_size.max(1),
            file_cap: ChannelCaps::FILES,
            batch_cap: ChannelCaps::BATCHES,
        }
    }
}

/// State every reader shares.
#[derive(Clone)]
pub struct ReaderContext {
    pub batch_size: usize,
    /// Skip the processed rename (dry run).
    pub keep_files: bool,
    pub counters: Arc<LoadCounters>,
    pub cancel: Arc<AtomicBool>,
    pub progress: Option<ProgressBar>,
}

impl ReaderContext {
    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Both queues. Feeder gets `file_tx`; readers get `file_rx` and clones of `batch_tx`;
/// writers get `batch_rx`. The coordinator keeps `batch_tx` until every reader is joined.
pub struct PipelineChannels {
    pub file_tx: Sender<PathBuf>,
    pub file_rx: Receiver<PathBuf>,
    pub batch_tx: Sender<Batch>,
    pub batch_rx: Receiver<Batch>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (file_tx, file_rx) = bounded::<PathBuf>(tuning.file_cap);
    let (batch_tx, batch_rx) = bounded::<Batch>(tuning.batch_cap);
    PipelineChannels {
        file_tx,
        file_rx,
        batch_tx,
        batch_rx,
    }
}

/// Running pipeline: join in order feeder → readers → (close batch queue) → writers.
pub struct PipelineHandles {
    pub feed_handle: JoinHandle<usize>,
    pub reader_handles: Vec<JoinHandle<()>>,
    pub writer_handles: Vec<JoinHandle<()>>,
    pub batch_tx: Sender<Batch>,
}
