use colored::Colorize;
use std::io::{self, Write};
use wordgrep::GrepResult;

/// Writes every matched file: its path, one `...snippet...` line per match and
/// a blank line, followed by the summary line. With `color` off no escape
/// sequences are written.
pub fn render<W: Write>(
    out: &mut W,
    result: &GrepResult,
    pattern: &str,
    color: bool,
) -> io::Result<()> {
    for (path, matches) in result {
        let path = path.display().to_string();
        if color {
            writeln!(out, "{}", path.cyan())?;
        } else {
            writeln!(out, "{}", path)?;
        }

        for m in matches {
            if color {
                writeln!(out, "...{}...", highlight(&m.snippet, pattern))?;
            } else {
                writeln!(out, "{}", m)?;
            }
        }
        writeln!(out)?;
    }
    render_stats(out, result)
}

pub fn render_stats<W: Write>(out: &mut W, result: &GrepResult) -> io::Result<()> {
    writeln!(
        out,
        "Found {} matches in {} files",
        result.total_matches(),
        result.files_with_matches()
    )
}

fn highlight(snippet: &str, pattern: &str) -> String {
    if pattern.is_empty() {
        return snippet.to_string();
    }
    snippet
        .split(pattern)
        .collect::<Vec<_>>()
        .join(&pattern.red().to_string())
}
