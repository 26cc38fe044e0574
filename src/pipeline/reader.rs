//! Reader workers: claim a file, decompress, scan rows, batch records, mark the file processed.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use super::context::ReaderContext;
use crate::Batch;
use crate::engine::parse::parse_row;
use crate::engine::progress::update_progress_bar;
use crate::engine::tools::mark_processed;
use crate::utils::config::{GZIP_MAGIC, RowFormat};

/// Per-file totals from [`scan_rows`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub lines: u64,
    pub errors: u64,
    pub records: u64,
    pub batches: u64,
}

/// Single reader: owns each claimed file until it is renamed or skipped.
fn reader_worker_loop(file_rx: Receiver<PathBuf>, batch_tx: Sender<Batch>, ctx: ReaderContext) {
    while let Ok(path) = file_rx.recv() {
        if ctx.cancelled() {
            debug!("reader: cancelled, leaving {} in place", path.display());
            break;
        }
        match read_file(&path, &batch_tx, &ctx) {
            Ok(stats) => {
                info!(
                    "{}: {} lines, {} errors, {} batches",
                    path.display(),
                    stats.lines,
                    stats.errors,
                    stats.batches
                );
                if !ctx.keep_files
                    && let Err(e) = mark_processed(&path)
                {
                    warn!("{:#}", e);
                }
                ctx.counters.file_processed();
            }
            Err(e) => {
                warn!("Skipping file {}: {:#}", path.display(), e);
                ctx.counters.file_skipped();
            }
        }
        if let Some(pb) = &ctx.progress {
            update_progress_bar(pb, 1);
        }
    }
    drop(batch_tx);
}

/// Spawn `num_readers` readers. Each gets its own clone of `batch_tx`; the caller keeps the original.
pub fn spawn_reader_workers(
    file_rx: Receiver<PathBuf>,
    batch_tx: &Sender<Batch>,
    ctx: &ReaderContext,
    num_readers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_readers)
        .map(|_| {
            let file_rx = file_rx.clone();
            let batch_tx = batch_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || reader_worker_loop(file_rx, batch_tx, ctx))
        })
        .collect()
}

/// Decompressed input of one file.
type GzInput = BufReader<MultiGzDecoder<BufReader<File>>>;

/// Open `path` and decode the gzip header plus the first block. `None` for a zero-byte file.
/// Header or early inflate faults are returned here so the file is skipped, not renamed.
fn open_input(path: &Path) -> Result<Option<GzInput>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = BufReader::new(file);
    let head = buf.fill_buf().context("read gzip header")?;
    if head.is_empty() {
        return Ok(None);
    }
    if !head.starts_with(&GZIP_MAGIC) {
        bail!("not a gzip stream");
    }
    let mut decoder = BufReader::new(MultiGzDecoder::new(buf));
    decoder.fill_buf().context("gzip header")?;
    Ok(Some(decoder))
}

/// Process one file end to end. `Err` means the file could not be opened or decoded and was skipped;
/// row faults inside the file are counted, not returned.
fn read_file(path: &Path, batch_tx: &Sender<Batch>, ctx: &ReaderContext) -> Result<FileStats> {
    let input = open_input(path)?;
    let mut stats = FileStats::default();
    let scanned = match input {
        Some(decoder) => scan_rows(decoder, path, ctx.batch_size, batch_tx, &mut stats),
        None => Ok(()),
    };
    ctx.counters.add_lines(stats.lines);
    ctx.counters.add_errors(stats.errors);
    scanned?;
    Ok(stats)
}

/// Scan TSV rows from `input`, sending full batches of `batch_size` and a final partial one.
///
/// Bad rows count one line and one error each. An I/O fault counts once and ends the scan;
/// records parsed before it are still sent. `input` is dropped before returning.
pub fn scan_rows<R: Read>(
    input: R,
    path: &Path,
    batch_size: usize,
    batch_tx: &Sender<Batch>,
    stats: &mut FileStats,
) -> Result<()> {
    let batch_size = batch_size.max(1);
    let mut rdr = ReaderBuilder::new()
        .delimiter(RowFormat::DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input);
    let mut row = StringRecord::new();
    let mut batch: Batch = Vec::with_capacity(batch_size);

    loop {
        match rdr.read_record(&mut row) {
            Ok(false) => break,
            Ok(true) => {
                stats.lines += 1;
                match parse_row(&row) {
                    Ok(record) => {
                        batch.push(record);
                        if batch.len() == batch_size {
                            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                            send_batch(batch_tx, full, stats)?;
                        }
                    }
                    Err(e) => {
                        stats.errors += 1;
                        warn!("{}:{}: {:#}", path.display(), stats.lines, e);
                    }
                }
            }
            Err(e) => {
                stats.lines += 1;
                stats.errors += 1;
                if e.is_io_error() {
                    warn!("{}:{}: read failed, stopping file: {}", path.display(), stats.lines, e);
                    break;
                }
                warn!("{}:{}: {}", path.display(), stats.lines, e);
            }
        }
    }
    drop(rdr);

    if !batch.is_empty() {
        send_batch(batch_tx, batch, stats)?;
    }
    Ok(())
}

/// Blocks while the batch queue is full. A closed queue turns the batch into counted errors.
fn send_batch(batch_tx: &Sender<Batch>, batch: Batch, stats: &mut FileStats) -> Result<()> {
    let n = batch.len() as u64;
    if let Err(e) = batch_tx.send(batch) {
        stats.errors += e.into_inner().len() as u64;
        bail!("batch queue closed");
    }
    stats.records += n;
    stats.batches += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn scan(input: &str, batch_size: usize) -> (FileStats, Vec<Batch>) {
        let (tx, rx) = unbounded();
        let mut stats = FileStats::default();
        scan_rows(input.as_bytes(), Path::new("mem.tsv"), batch_size, &tx, &mut stats).unwrap();
        drop(tx);
        (stats, rx.iter().collect())
    }

    #[test]
    fn batches_are_full_then_partial() {
        let input: String = (0..7)
            .map(|i| format!("idfa\tid{i}\t1.0\t2.0\t1,2\n"))
            .collect();
        let (stats, batches) = scan(&input, 3);
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(stats.lines, 7);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.records, 7);
        assert_eq!(stats.batches, 3);
        assert_eq!(batches[0][0].device_id, "id0");
        assert_eq!(batches[2][0].device_id, "id6");
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let input = "idfa\ta\t1\t2\t3\nidfa\tb\t1\t2\t3\n";
        let (_, batches) = scan(input, 2);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn bad_rows_are_counted_and_skipped() {
        let input = "idfa\ta\t1\t2\t3\nshort\trow\ngaid\t\t1\t2\t3\ngaid\tb\t1\t2\t3\n";
        let (stats, batches) = scan(input, 10);
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.records, 2);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn invalid_utf8_row_is_a_row_error() {
        let mut input = b"idfa\ta\t1\t2\t3\n".to_vec();
        input.extend_from_slice(b"idfa\t\xff\xfe\t1\t2\t3\n");
        input.extend_from_slice(b"idfa\tc\t1\t2\t3\n");
        let (tx, rx) = unbounded();
        let mut stats = FileStats::default();
        scan_rows(&input[..], Path::new("mem.tsv"), 10, &tx, &mut stats).unwrap();
        drop(tx);
        let batches: Vec<Batch> = rx.iter().collect();
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn empty_input_sends_nothing() {
        let (stats, batches) = scan("", 5);
        assert_eq!(stats, FileStats::default());
        assert!(batches.is_empty());
    }
}
