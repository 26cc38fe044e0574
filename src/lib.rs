//! memc_load: parallel loader of installed-apps TSV dumps into sharded memcached

pub mod engine;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::load_files;
pub use store::{ShardClient, ShardRegistry};

/// Result alias used by public memc_load API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Load every file matching `opts.pattern` into memcached shards built from `opts.shards`.
///
/// Returns once every reader and writer has exited. `Err` only for fatal problems (bad
/// shard address, no input files); per-row and per-record faults are counted in the report.
/// Use [`load_files`] directly to supply your own [`ShardRegistry`].
pub fn load(opts: &Opts) -> Result<LoadReport> {
    let registry = std::sync::Arc::new(ShardRegistry::from_addrs(&opts.shards, opts.dry_run)?);
    load_files(opts, registry)
}
