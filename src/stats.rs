/*!
 * Run summary for a split
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::core::plan::{Chunk, ChunkPlan};
use crate::core::worker::ChunkReport;
use crate::error::{Result, SplitError};

/// Summary of one split run
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub source: PathBuf,
    pub source_bytes: u64,
    pub dry_run: bool,
    pub duration_ms: u64,
    pub planned: Vec<Chunk>,
    pub chunks: Vec<ChunkReport>,
}

impl SplitSummary {
    /// Summary for a dry run: the plan only
    pub fn planned(source: &Path, plan: &ChunkPlan, elapsed: Duration) -> Self {
        Self {
            source: source.to_path_buf(),
            source_bytes: plan.size(),
            dry_run: true,
            duration_ms: elapsed.as_millis() as u64,
            planned: plan.chunks().to_vec(),
            chunks: Vec::new(),
        }
    }

    /// Summary for a finished run
    pub fn completed(
        source: &Path,
        plan: &ChunkPlan,
        chunks: Vec<ChunkReport>,
        elapsed: Duration,
    ) -> Self {
        Self {
            dry_run: false,
            chunks,
            ..Self::planned(source, plan, elapsed)
        }
    }

    pub fn total_entries(&self) -> u64 {
        self.chunks.iter().map(|c| c.stats.entries).sum()
    }

    pub fn total_bytes_written(&self) -> u64 {
        self.chunks.iter().map(|c| c.stats.bytes_written).sum()
    }

    pub fn total_lines_written(&self) -> u64 {
        self.chunks.iter().map(|c| c.stats.lines_written).sum()
    }

    /// Blank plus excluded lines
    pub fn total_lines_dropped(&self) -> u64 {
        self.chunks
            .iter()
            .map(|c| c.stats.lines_blank + c.stats.lines_excluded)
            .sum()
    }

    /// Output size as a percentage of the source
    pub fn output_ratio(&self) -> f64 {
        if self.source_bytes == 0 {
            return 0.0;
        }
        self.total_bytes_written() as f64 / self.source_bytes as f64 * 100.0
    }

    /// Machine-readable form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SplitError::Config(format!("Failed to serialize summary: {}", e)))
    }

    /// Print formatted summary
    pub fn print(&self) {
        println!("Source: {} ({})", self.source.display(), format_bytes(self.source_bytes));

        if self.dry_run {
            println!("Dry run: {} chunks planned\n", self.planned.len());
            for chunk in &self.planned {
                println!(
                    "  #{:<5} {:>14} .. {:<14} {}",
                    chunk.index,
                    chunk.start,
                    chunk.end,
                    format_bytes(chunk.len())
                );
            }
            return;
        }

        println!("Chunks written: {}", self.chunks.len());
        println!("Entries: {}", self.total_entries());
        println!(
            "Output: {} ({:.1}% of source)",
            format_bytes(self.total_bytes_written()),
            self.output_ratio()
        );
        println!(
            "Lines: {} written, {} dropped",
            self.total_lines_written(),
            self.total_lines_dropped()
        );
        println!("Elapsed: {}", format_duration(self.duration_ms));
    }
}

/// Format bytes into human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let base = 1024.0_f64;
    let exp = (bytes_f.ln() / base.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Format duration into human-readable format
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
