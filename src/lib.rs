/*!
 * seqsplit - split sequence-database XML dumps into well-formed chunks
 *
 * Partitions one very large XML file (UniRef-style: a prolog, a long run of
 * `<entry>` records, a closing root tag) into a fixed number of smaller files.
 * Each output is independently well-formed and can optionally drop lines
 * naming configured child elements.
 */

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod stats;

// Re-export commonly used types
pub use config::{LogLevel, SplitConfig};
pub use core::{split_file, Chunk, ChunkPlan, LineFilter, Prolog, Splitter};
pub use error::{Result, SplitError};
pub use stats::SplitSummary;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
