mod report;

use anyhow::Context;
use clap::Parser;
use std::{io, num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wordgrep::{search, GrepConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Literal text to search for (put `--` first if it starts with `-`)
    pattern: Option<String>,

    /// Directories to search (default: current directory)
    roots: Vec<PathBuf>,

    /// Document extensions to include (e.g. doc,docx)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Characters of context on each side of a match
    #[arg(short = 'C', long = "context")]
    context: Option<usize>,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Disable colored output
    #[arg(
        long,
        env = "WORDGREP_PLAIN",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    plain: bool,

    /// Configuration file to load on top of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn to_config(&self) -> GrepConfig {
        let pattern = self.pattern.clone().unwrap_or_default();
        let mut config = GrepConfig::new(pattern, self.roots.clone());
        if let Some(extensions) = &self.extensions {
            config.extensions = extensions
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        config.ignore_patterns = self.ignore.clone();
        if let Some(radius) = self.context {
            config.context_radius = radius;
        }
        if let Some(threads) = self.threads {
            config.thread_count = threads;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        // DEBUG in the environment also turns colors off
        config.plain = self.plain || std::env::var_os("DEBUG").is_some();
        config.stats_only = self.stats;
        config
    }
}

fn main() {
    // Failures are advisories: the exit status is always 0
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = GrepConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.to_config());

    init_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    if config.pattern.is_empty() {
        return Ok(());
    }

    let result = search(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if config.stats_only {
        report::render_stats(&mut out, &result)?;
    } else {
        report::render(&mut out, &result, &config.pattern, !config.plain)?;
    }
    Ok(())
}

/// Extractor diagnostics stay quiet unless debug or trace output was asked for.
fn log_directives(level: &str) -> String {
    if level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace") {
        level.to_string()
    } else {
        format!("{},wordgrep::extract=error", level)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
