/*!
 * Chunk worker: turns one byte range of the source into a self-contained
 * XML file.
 *
 * An entry belongs to the chunk whose range holds the first byte of its
 * opening line. A worker for chunk `i > 1` skips forward to its first owned
 * entry (the bytes before it finish the previous chunk's last entry), and
 * every worker keeps reading past `end` until the next entry opens, so entries
 * are never cut or duplicated. Entry opening lines go through the same filter
 * as every other line, so the output never depends on where a chunk starts.
 */

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::cancel::CancelToken;
use super::filter::{LineDecision, LineFilter};
use super::plan::Chunk;
use super::prolog::Prolog;
use crate::error::{Result, SplitError};

const READ_BUFFER: usize = 256 * 1024;
const WRITE_BUFFER: usize = 256 * 1024;

/// Everything a worker needs, built once and shared read-only
#[derive(Debug, Clone)]
pub struct SplitJob {
    pub source: PathBuf,
    pub outdir: PathBuf,
    pub output_prefix: String,
    pub prolog: Prolog,
    pub filter: LineFilter,
}

impl SplitJob {
    /// `<outdir>/<prefix><index>.xml`
    pub fn output_path(&self, index: usize) -> PathBuf {
        output_path(&self.outdir, &self.output_prefix, index)
    }
}

/// Output file name for a chunk index
pub fn output_path(outdir: &Path, prefix: &str, index: usize) -> PathBuf {
    outdir.join(format!("{}{}.xml", prefix, index))
}

/// Counters for one scanned range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Source bytes consumed, including lines read past `end`
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Source lines copied to output
    pub lines_written: u64,
    pub lines_blank: u64,
    pub lines_excluded: u64,
    /// Entry opening lines copied to output
    pub entries: u64,
    /// Entry opening lines dropped by an exclusion
    pub entries_excluded: u64,
    /// A closing line was synthesized
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanStats),
    Cancelled,
}

/// Result of one finished chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub output: PathBuf,
    pub start: u64,
    pub end: u64,
    #[serde(flatten)]
    pub stats: ScanStats,
}

/// Split one chunk of `job.source` into its output file
pub fn split_chunk(job: &SplitJob, chunk: &Chunk, cancel: &CancelToken) -> Result<ChunkReport> {
    let output = job.output_path(chunk.index);
    let fail = |source: io::Error| SplitError::Worker {
        index: chunk.index,
        output: output.clone(),
        source,
    };

    debug!(
        chunk = chunk.index,
        start = chunk.start,
        end = chunk.end,
        "Splitting chunk into {}",
        output.display()
    );

    let file = File::open(&job.source).map_err(fail)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER, file);
    reader.seek(SeekFrom::Start(chunk.start)).map_err(fail)?;

    let mut writer = BufWriter::with_capacity(WRITE_BUFFER, File::create(&output).map_err(fail)?);
    let outcome = scan_range(
        &mut reader,
        &mut writer,
        chunk,
        &job.prolog,
        &job.filter,
        cancel,
    )
    .map_err(fail)?;
    writer.flush().map_err(fail)?;

    match outcome {
        ScanOutcome::Completed(stats) => {
            if stats.entries_excluded > 0 {
                warn!(
                    chunk = chunk.index,
                    "{} entry opening lines matched an exclusion and were dropped",
                    stats.entries_excluded
                );
            }
            debug!(
                chunk = chunk.index,
                entries = stats.entries,
                bytes_written = stats.bytes_written,
                "Chunk complete"
            );
            Ok(ChunkReport {
                index: chunk.index,
                output,
                start: chunk.start,
                end: chunk.end,
                stats,
            })
        }
        ScanOutcome::Cancelled => Err(SplitError::Cancelled { index: chunk.index }),
    }
}

/// Scan `chunk` from `reader`, already positioned at `chunk.start`
///
/// Chunk 1 copies its first line unfiltered. Later chunks write the prolog,
/// then skip to their first owned entry. From there every line is filtered
/// until an entry opens at or after `end`, which is replaced by the root
/// closing line.
pub fn scan_range<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    chunk: &Chunk,
    prolog: &Prolog,
    filter: &LineFilter,
    cancel: &CancelToken,
) -> io::Result<ScanOutcome> {
    let mut stats = ScanStats::default();
    let mut line = Vec::new();
    let mut pos = chunk.start;

    if chunk.index == 1 {
        pos += reader.read_until(b'\n', &mut line)? as u64;
        emit_line(out, &line, &mut stats)?;
    } else {
        emit(out, prolog.as_bytes(), &mut stats)?;
        loop {
            if cancel.is_cancelled() {
                return Ok(ScanOutcome::Cancelled);
            }
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                trace!(chunk = chunk.index, "No entry before end of file");
                close(out, prolog, &mut stats)?;
                stats.bytes_read = pos - chunk.start;
                return Ok(ScanOutcome::Completed(stats));
            }
            let line_start = pos;
            pos += n as u64;

            if filter.is_entry_start(&line) {
                if line_start >= chunk.end {
                    trace!(chunk = chunk.index, "No entry opens inside range");
                    close(out, prolog, &mut stats)?;
                    stats.bytes_read = pos - chunk.start;
                    return Ok(ScanOutcome::Completed(stats));
                }
                filter_line(out, &line, true, filter, &mut stats)?;
                break;
            }
        }
    }

    loop {
        if cancel.is_cancelled() {
            return Ok(ScanOutcome::Cancelled);
        }

        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        let line_start = pos;
        pos += n as u64;

        let entry = filter.is_entry_start(&line);
        if entry && line_start >= chunk.end {
            close(out, prolog, &mut stats)?;
            break;
        }

        filter_line(out, &line, entry, filter, &mut stats)?;
    }

    stats.bytes_read = pos - chunk.start;
    Ok(ScanOutcome::Completed(stats))
}

fn emit<W: Write>(out: &mut W, bytes: &[u8], stats: &mut ScanStats) -> io::Result<()> {
    out.write_all(bytes)?;
    stats.bytes_written += bytes.len() as u64;
    Ok(())
}

fn emit_line<W: Write>(out: &mut W, line: &[u8], stats: &mut ScanStats) -> io::Result<()> {
    emit(out, line, stats)?;
    stats.lines_written += 1;
    Ok(())
}

fn filter_line<W: Write>(
    out: &mut W,
    line: &[u8],
    entry: bool,
    filter: &LineFilter,
    stats: &mut ScanStats,
) -> io::Result<()> {
    match filter.classify(line) {
        LineDecision::Keep => {
            emit_line(out, line, stats)?;
            if entry {
                stats.entries += 1;
            }
        }
        LineDecision::Blank => stats.lines_blank += 1,
        LineDecision::Excluded => {
            stats.lines_excluded += 1;
            if entry {
                stats.entries_excluded += 1;
            }
        }
    }
    Ok(())
}

fn close<W: Write>(out: &mut W, prolog: &Prolog, stats: &mut ScanStats) -> io::Result<()> {
    emit(out, prolog.closing_line().as_bytes(), stats)?;
    stats.closed = true;
    Ok(())
}
