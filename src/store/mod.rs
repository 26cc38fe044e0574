//! Store side: shard clients and the category → client registry.

pub mod memcache;

use anyhow::Result;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub use memcache::MemcacheClient;

/// One shard of the key-value store. Shared by every writer thread.
pub trait ShardClient: Send + Sync {
    /// Store `value` under `key`. Single attempt, no retry.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Logs writes instead of sending them (`--dry-run`).
pub struct DryRunClient {
    addr: String,
}

impl DryRunClient {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
        }
    }
}

impl ShardClient for DryRunClient {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        debug!("{} - {} -> {} bytes {:02x?}", self.addr, key, value.len(), value);
        Ok(())
    }
}

/// Immutable category → client map, built once before the pipeline starts.
#[derive(Clone, Default)]
pub struct ShardRegistry {
    clients: HashMap<String, Arc<dyn ShardClient>>,
}

impl ShardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing client for `category`.
    pub fn with_client(mut self, category: &str, client: Arc<dyn ShardClient>) -> Self {
        self.clients.insert(category.to_string(), client);
        self
    }

    /// One memcached client per shard address (or dry-run loggers when `dry_run`).
    pub fn from_addrs(shards: &BTreeMap<String, String>, dry_run: bool) -> Result<Self> {
        let mut registry = Self::new();
        for (category, addr) in shards {
            let client: Arc<dyn ShardClient> = if dry_run {
                Arc::new(DryRunClient::new(addr))
            } else {
                Arc::new(MemcacheClient::new(addr)?)
            };
            debug!("shard {} -> {}", category, addr);
            registry = registry.with_client(category, client);
        }
        Ok(registry)
    }

    /// Checked lookup: `None` for a category with no shard.
    pub fn get(&self, category: &str) -> Option<&dyn ShardClient> {
        self.clients.get(category).map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
