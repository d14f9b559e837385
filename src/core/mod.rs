/*!
 * Core split operations
 */

pub mod cancel;
pub mod filter;
pub mod orchestrator;
pub mod plan;
pub mod prolog;
pub mod worker;

pub use cancel::CancelToken;
pub use filter::{FilterError, LineDecision, LineFilter};
pub use orchestrator::{split_file, Splitter};
pub use plan::{Chunk, ChunkPlan};
pub use prolog::Prolog;
pub use worker::{split_chunk, ChunkReport, ScanStats, SplitJob};
