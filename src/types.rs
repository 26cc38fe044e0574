//! Public and internal types for the loader API and pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::utils::config::Defaults;

/// One parsed input row: installed apps of a single device.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Device category; selects the shard and prefixes the key.
    pub category: String,
    pub device_id: String,
    /// 0.0 when the field did not parse.
    pub lat: f64,
    /// 0.0 when the field did not parse.
    pub lon: f64,
    /// Installed app ids. Entries that did not parse are left out.
    pub apps: Vec<u32>,
}

impl Record {
    /// Store key: `"{category}:{device_id}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.category, self.device_id)
    }
}

/// Records from one file, in file order. Never empty when sent; at most `batch_size` long.
pub type Batch = Vec<Record>;

/// Full options (CLI and config file).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Log sink. Falls back to stderr when it cannot be opened.
    pub log_path: PathBuf,
    /// Glob pattern of input files.
    pub pattern: String,
    /// Category → memcached address.
    pub shards: BTreeMap<String, String>,
    /// Reader (decompress + parse) worker count.
    pub readers: usize,
    /// Writer (serialize + store) worker count.
    pub writers: usize,
    /// Records per batch handed from readers to writers.
    pub batch_size: usize,
    /// Log writes instead of sending them; leave input files in place.
    pub dry_run: bool,
    /// Debug logging and a progress bar.
    pub verbose: bool,
    /// Set from outside (Ctrl+C) to stop claiming new files.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            log_path: PathBuf::from(Defaults::LOG_FILE),
            pattern: Defaults::PATTERN.to_string(),
            shards: Defaults::SHARDS
                .iter()
                .map(|(c, a)| (c.to_string(), a.to_string()))
                .collect(),
            readers: Defaults::READERS,
            writers: Defaults::WRITERS,
            batch_size: Defaults::BATCH_SIZE,
            dry_run: false,
            verbose: false,
            cancel: None,
        }
    }
}

/// Final classification of a run, computed after every worker has exited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    /// Error rate below the threshold.
    Acceptable { error_rate: f64 },
    /// Error rate at or above the threshold.
    HighErrorRate { error_rate: f64 },
    /// Every line failed (or there were no lines at all).
    NothingSucceeded,
}

/// Totals of one load run.
#[derive(Clone, Debug)]
pub struct LoadReport {
    pub files_discovered: usize,
    pub files_processed: u64,
    pub files_skipped: u64,
    pub lines: u64,
    pub errors: u64,
    pub written: u64,
    pub verdict: Verdict,
}
