/*!
 * Split orchestration
 *
 * Builds the chunk plan and the prolog once, validates the source layout,
 * then fans one worker task per chunk out over a bounded rayon pool and
 * joins on all of them.
 */

use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use super::cancel::CancelToken;
use super::filter::LineFilter;
use super::plan::ChunkPlan;
use super::prolog::Prolog;
use super::worker::{split_chunk, ChunkReport, SplitJob};
use crate::config::SplitConfig;
use crate::error::{Result, SplitError};
use crate::stats::SplitSummary;

/// Splits one source file according to a [`SplitConfig`]
#[derive(Debug, Clone)]
pub struct Splitter {
    source: PathBuf,
    config: SplitConfig,
}

impl Splitter {
    /// Create a splitter; the configuration is validated up front
    pub fn new(source: impl Into<PathBuf>, config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: source.into(),
            config,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Build the shared job description and the chunk plan
    pub fn prepare(&self) -> Result<(SplitJob, ChunkPlan)> {
        let size = source_size(&self.source)?;

        let mut filter = LineFilter::new(&self.config.entry_marker, &self.config.exclude)?;
        if let Some(ref path) = self.config.exclude_from {
            let added = filter.add_exclusions_from_file(path)?;
            debug!("Loaded {} exclusions from {}", added, path.display());
        }

        let plan = ChunkPlan::for_file(&self.source, self.config.num_chunks)?;
        let prolog = Prolog::from_file(&self.source, &filter)?;

        let file = fs::File::open(&self.source).map_err(|e| SplitError::SourceUnreadable {
            path: self.source.clone(),
            source: e,
        })?;
        prolog.verify_trailer(&mut BufReader::new(file), size)?;

        info!(
            "Planned {} chunks over {} bytes (root <{}>, {} exclusions)",
            plan.len(),
            size,
            prolog.root_name(),
            filter.exclusion_count()
        );

        let job = SplitJob {
            source: self.source.clone(),
            outdir: self.config.outdir.clone(),
            output_prefix: self.config.output_prefix.clone(),
            prolog,
            filter,
        };
        Ok((job, plan))
    }

    /// Run the split and wait for every chunk
    pub fn run(&self) -> Result<SplitSummary> {
        let start = Instant::now();
        let (job, plan) = self.prepare()?;

        if self.config.dry_run {
            info!("Dry run: no chunk files written");
            return Ok(SplitSummary::planned(&self.source, &plan, start.elapsed()));
        }

        let workers = self.config.worker_count().min(plan.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("seqsplit-worker-{}", i))
            .build()
            .map_err(|e| SplitError::Parallel(e.to_string()))?;
        debug!("Dispatching {} chunks to {} workers", plan.len(), workers);

        let bar = progress_bar(plan.len() as u64, self.config.show_progress);
        let cancel = CancelToken::new();

        let results: Vec<Result<ChunkReport>> = pool.install(|| {
            plan.chunks()
                .par_iter()
                .map(|chunk| {
                    if cancel.is_cancelled() {
                        return Err(SplitError::Cancelled { index: chunk.index });
                    }
                    let result = split_chunk(&job, chunk, &cancel);
                    if let Err(ref e) = result {
                        if !e.is_cancellation() {
                            warn!(chunk = chunk.index, "Chunk failed: {}", e);
                            cancel.cancel();
                        }
                    }
                    bar.inc(1);
                    result
                })
                .collect()
        });
        bar.finish_and_clear();

        let reports = collect_reports(results)?;
        let summary = SplitSummary::completed(&self.source, &plan, reports, start.elapsed());
        info!(
            "Wrote {} chunk files ({} entries) in {} ms",
            summary.chunks.len(),
            summary.total_entries(),
            summary.duration_ms
        );
        Ok(summary)
    }
}

/// Split `source` with `config`; shorthand for [`Splitter::run`]
pub fn split_file(source: &Path, config: &SplitConfig) -> Result<SplitSummary> {
    Splitter::new(source, config.clone())?.run()
}

/// Keep reports in chunk order, or surface the root-cause failure
fn collect_reports(results: Vec<Result<ChunkReport>>) -> Result<Vec<ChunkReport>> {
    let mut reports = Vec::with_capacity(results.len());
    let mut cancelled = None;
    let mut failure = None;

    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) if e.is_cancellation() => {
                cancelled.get_or_insert(e);
            }
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                } else {
                    warn!("Additional chunk failure: {}", e);
                }
            }
        }
    }

    match failure.or(cancelled) {
        Some(e) => {
            error!(category = %e.category(), "Split aborted: {}", e);
            Err(e)
        }
        None => Ok(reports),
    }
}

fn source_size(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(SplitError::SourceUnreadable {
            path: path.to_path_buf(),
            source: io::Error::other("not a regular file"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(SplitError::SourceNotFound(path.to_path_buf()))
        }
        Err(e) => Err(SplitError::SourceUnreadable {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} chunks ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
