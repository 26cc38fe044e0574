//! File discovery (glob) and the feeder thread that fills the file queue.

use anyhow::{Context, Result, bail};
use crossbeam_channel::Sender;
use glob::MatchOptions;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::engine::tools::{is_processed, pattern_root};

/// Wildcards never match a leading `.`, so processed files are not picked up again.
fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Expand `pattern` into a sorted list of regular files. Files already marked processed are left out,
/// even when the pattern names them literally.
///
/// Fails when the pattern's root directory does not exist, the pattern is invalid,
/// or nothing matches. Any of these aborts the run before workers start.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
    let root = pattern_root(pattern);
    if !root.exists() {
        bail!(
            "input root {} does not exist (pattern {})",
            root.display(),
            pattern
        );
    }

    let paths = glob::glob_with(pattern, match_options())
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    let mut files = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() && !is_processed(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    files.sort();
    debug!("discovered {} files for {}", files.len(), pattern);
    Ok(files)
}

/// Push `files` onto the file queue, then drop the sender so readers see it close.
/// Stops early on cancel. Returns the number of files queued.
pub fn spawn_feed_thread(
    file_tx: Sender<PathBuf>,
    files: Vec<PathBuf>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let mut count = 0_usize;
        for path in files {
            if cancel.load(Ordering::Relaxed) {
                debug!("feeder: cancelled after {} files", count);
                break;
            }
            if file_tx.send(path).is_err() {
                break;
            }
            count += 1;
        }
        drop(file_tx);
        count
    })
}
