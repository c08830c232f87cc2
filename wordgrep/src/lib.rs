pub mod config;
pub mod errors;
pub mod extract;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod scanner;
pub mod search;

pub use config::GrepConfig;
pub use errors::{SearchError, SearchResult};
pub use extract::{DocumentExtractor, DocumentFormat, TextExtractor};
pub use metrics::{GrepMetrics, GrepStats};
pub use results::{FileResult, GrepResult, Match};
pub use scanner::{scan, TreeScanner};
pub use search::{grep, grep_files, search, FileProcessor};
