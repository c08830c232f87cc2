use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::filters::{DEFAULT_EXTENSIONS, LOCK_FILE_PREFIX};
use crate::search::snippet::DEFAULT_CONTEXT_RADIUS;

/// Configuration for a grep run.
///
/// # Configuration Locations
///
/// Files are layered in order of increasing precedence:
/// 1. Global `$CONFIG_DIR/wordgrep/config.yaml`
/// 2. Local `.wordgrep.yaml` in the current directory
/// 3. Custom config file given via `--config` (must exist)
///
/// Command-line values are applied last with [`GrepConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Literal text to search for
/// pattern: "invoice"
///
/// # Directories to scan (empty: current directory)
/// roots:
///   - "/srv/contracts"
///
/// # Document extensions to include
/// extensions: ["doc", "docx"]
///
/// # Paths to skip (glob syntax)
/// ignore_patterns:
///   - "*/Archive/*"
///
/// # Characters of context on each side of a match
/// context_radius: 50
///
/// # Worker threads (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
///
/// # Disable colored output
/// plain: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepConfig {
    /// Literal search text; an empty pattern produces an empty result
    #[serde(default)]
    pub pattern: String,

    /// Root directories to scan; empty means the current directory
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// File extensions treated as documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Name prefix of lock files to skip
    #[serde(default = "default_lock_file_prefix")]
    pub lock_file_prefix: String,

    /// Patterns to ignore (glob syntax, matched against absolute paths)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Characters of context kept on each side of a match
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,

    /// Number of worker threads
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Disable colors in the report
    #[serde(default)]
    pub plain: bool,

    /// Only print the match and file counts
    #[serde(default)]
    pub stats_only: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_lock_file_prefix() -> String {
    LOCK_FILE_PREFIX.to_string()
}

fn default_context_radius() -> usize {
    DEFAULT_CONTEXT_RADIUS
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GrepConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            roots: Vec::new(),
            extensions: default_extensions(),
            lock_file_prefix: default_lock_file_prefix(),
            ignore_patterns: Vec::new(),
            context_radius: default_context_radius(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            plain: false,
            stats_only: false,
        }
    }
}

impl GrepConfig {
    /// Configuration for `pattern` over `roots` with every other field defaulted
    pub fn new(pattern: impl Into<String>, roots: Vec<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            roots,
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("wordgrep/config.yaml")),
            Some(PathBuf::from(".wordgrep.yaml")),
        ];
        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // an explicitly named file has to exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// CLI values win wherever they differ from the defaults.
    pub fn merge_with_cli(mut self, cli_config: GrepConfig) -> Self {
        if !cli_config.pattern.is_empty() {
            self.pattern = cli_config.pattern;
        }
        if !cli_config.roots.is_empty() {
            self.roots = cli_config.roots;
        }
        if cli_config.extensions != default_extensions() {
            self.extensions = cli_config.extensions;
        }
        if cli_config.lock_file_prefix != default_lock_file_prefix() {
            self.lock_file_prefix = cli_config.lock_file_prefix;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.context_radius != default_context_radius() {
            self.context_radius = cli_config.context_radius;
        }
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self.plain |= cli_config.plain;
        self.stats_only |= cli_config.stats_only;
        self
    }

    /// Roots to scan, falling back to the current directory
    pub fn effective_roots(&self) -> std::io::Result<Vec<PathBuf>> {
        if self.roots.is_empty() {
            Ok(vec![std::env::current_dir()?])
        } else {
            Ok(self.roots.clone())
        }
    }
}
