//! The concurrent grep engine.
//!
//! - [`snippet`]: pure literal search producing context snippets
//! - [`processor`]: extraction plus search for a single document
//! - [`engine`]: fan-out over files with rayon, fan-in into one `GrepResult`,
//!   and the multi-root driver
pub mod engine;
pub mod processor;
pub mod snippet;

pub use engine::{grep, grep_files, grep_root, search};
pub use processor::FileProcessor;
pub use snippet::DEFAULT_CONTEXT_RADIUS;
