//! Application configuration constants.
//! Defaults, tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- CLI defaults ----

/// Defaults for every recognised option (CLI and config file).
pub struct Defaults;

impl Defaults {
    pub const LOG_FILE: &'static str = "memc.log";
    pub const PATTERN: &'static str = "./data/*.tsv.gz";
    pub const READERS: usize = 3;
    pub const WRITERS: usize = 3;
    pub const BATCH_SIZE: usize = 100;
    /// Reference deployment: one memcached per device category.
    pub const SHARDS: [(&'static str, &'static str); 4] = [
        ("idfa", "127.0.0.1:33013"),
        ("gaid", "127.0.0.1:33014"),
        ("adid", "127.0.0.1:33015"),
        ("dvid", "127.0.0.1:33016"),
    ];
}

// ---- Input format ----

/// Layout of one input row.
pub struct RowFormat;

impl RowFormat {
    pub const DELIMITER: u8 = b'\t';
    pub const FIELD_COUNT: usize = 5;
    /// Separator inside the app-id field.
    pub const APPS_SEPARATOR: char = ',';
}

/// Leading magic of a gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Prefix put on a file's base name once it has been consumed.
pub const PROCESSED_MARKER: &str = ".";

// ---- Channels ----

/// Capacities of the two pipeline queues.
pub struct ChannelCaps;

impl ChannelCaps {
    /// File queue: moderate fan-in buffering between discovery and readers.
    pub const FILES: usize = 100;
    /// Batch queue: absorbs transient writer slowness; full queue blocks readers.
    pub const BATCHES: usize = 200;
}

// ---- Store ----

/// Per-shard memcached client tuning.
pub struct StoreConsts;

impl StoreConsts {
    /// Connect, read and write timeout for a single request.
    pub const TIMEOUT: Duration = Duration::from_secs(2);
    /// Idle connections kept per shard.
    pub const MAX_IDLE_CONNS: usize = 3;
    /// memcached rejects longer keys.
    pub const MAX_KEY_LEN: usize = 250;
}

// ---- Verdict ----

/// Error rate (errors / successes) below which a load is accepted.
pub const NORMAL_ERROR_RATE: f64 = 0.01;
