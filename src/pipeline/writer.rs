//! Writer workers: drain the batch queue and store every record on its category's shard.

use anyhow::{Result, anyhow};
use crossbeam_channel::Receiver;
use log::{debug, warn};
use prost::Message;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::counters::LoadCounters;
use crate::engine::codec::UserApps;
use crate::store::ShardRegistry;
use crate::{Batch, Record};

/// Encode and store one record. Unknown category is an error, not a panic.
pub fn write_record(registry: &ShardRegistry, record: &Record) -> Result<()> {
    let client = registry
        .get(&record.category)
        .ok_or_else(|| anyhow!("unknown category {:?}", record.category))?;
    let key = record.key();
    let value = UserApps::from(record).encode_to_vec();
    client.set(&key, &value)
}

/// Write every record of `batch` independently. Returns (written, errors).
/// The first failure of a batch is logged at warn, the rest at debug.
pub fn write_batch(registry: &ShardRegistry, batch: &[Record]) -> (u64, u64) {
    let mut written = 0_u64;
    let mut errors = 0_u64;
    for record in batch {
        match write_record(registry, record) {
            Ok(()) => written += 1,
            Err(e) => {
                if errors == 0 {
                    warn!("write {} failed: {:#}", record.key(), e);
                } else {
                    debug!("write {} failed: {:#}", record.key(), e);
                }
                errors += 1;
            }
        }
    }
    (written, errors)
}

fn writer_worker_loop(
    batch_rx: Receiver<Batch>,
    registry: Arc<ShardRegistry>,
    counters: Arc<LoadCounters>,
) {
    while let Ok(batch) = batch_rx.recv() {
        let (written, errors) = write_batch(&registry, &batch);
        counters.add_written(written);
        counters.add_errors(errors);
        if errors > 0 {
            warn!("{} of {} records in batch failed to store", errors, batch.len());
        }
    }
}

/// Spawn `num_writers` writers. They exit once the batch queue is closed and drained.
pub fn spawn_writer_workers(
    batch_rx: Receiver<Batch>,
    registry: &Arc<ShardRegistry>,
    counters: &Arc<LoadCounters>,
    num_writers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_writers)
        .map(|_| {
            let batch_rx = batch_rx.clone();
            let registry = Arc::clone(registry);
            let counters = Arc::clone(counters);
            thread::spawn(move || writer_worker_loop(batch_rx, registry, counters))
        })
        .collect()
}
