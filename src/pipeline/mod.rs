//! Pipeline components: discovery feeder, reader and writer pools, counters, completion barrier.

pub mod context;
pub mod counters;
pub mod discover;
pub mod orchestrator;
pub mod reader;
pub mod verdict;
pub mod writer;

pub use context::{
    PipelineChannels, PipelineHandles, PipelineTuning, ReaderContext, create_pipeline_channels,
};
pub use counters::{CounterSnapshot, LoadCounters};
pub use discover::{discover, spawn_feed_thread};
pub use orchestrator::{load_files, run_pipeline, shutdown_pipeline_handles};
pub use reader::{FileStats, scan_rows, spawn_reader_workers};
pub use verdict::{evaluate, log_verdict};
pub use writer::{spawn_writer_workers, write_batch, write_record};
