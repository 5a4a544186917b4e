//! Rendering of resolved metadata for the release-publishing step

use crate::cli::ReleaseMetadata;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Output format for resolved metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `key=value` lines followed by the changelog
    Text,
    /// A single JSON object
    Json,
    /// GitHub Actions step outputs
    Github,
}

/// Scalar outputs in the order they are written
fn scalar_outputs(meta: &ReleaseMetadata) -> Vec<(&'static str, String)> {
    vec![
        ("plugin_name", meta.plugin_name.clone()),
        ("version", meta.version.clone()),
        ("is_prerelease", meta.is_prerelease.to_string()),
        ("plugin_path", meta.plugin_path.clone()),
        (
            "previous_tag",
            meta.previous_tag.clone().unwrap_or_default(),
        ),
        (
            "plugin_title",
            meta.plugin_title.clone().unwrap_or_default(),
        ),
    ]
}

pub fn render_text(meta: &ReleaseMetadata) -> String {
    let mut out = String::new();
    for (key, value) in scalar_outputs(meta) {
        out.push_str(&format!("{}={}\n", key, value));
    }
    out.push('\n');
    out.push_str(&meta.changelog_body);
    out.push('\n');
    out
}

pub fn render_json(meta: &ReleaseMetadata) -> Result<String> {
    Ok(serde_json::to_string_pretty(meta)?)
}

/// Render in the GitHub Actions output file syntax
///
/// Multi-line values use `key<<DELIMITER` heredocs with a delimiter that
/// does not occur in the value.
pub fn render_github(meta: &ReleaseMetadata) -> String {
    let mut out = String::new();
    for (key, value) in scalar_outputs(meta) {
        push_github_output(&mut out, key, &value);
    }
    push_github_output(&mut out, "changelog_body", &meta.changelog_body);
    out
}

/// Append one output, switching to the heredoc form for values with line breaks
fn push_github_output(out: &mut String, key: &str, value: &str) {
    if value.contains(['\n', '\r']) {
        let delimiter = heredoc_delimiter(value);
        out.push_str(&format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter));
    } else {
        out.push_str(&format!("{}={}\n", key, value));
    }
}

/// Pick a delimiter line that does not appear in `value`
pub fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = "EOF".to_string();
    let mut n = 0;
    while value.lines().any(|line| line.trim_end_matches('\r') == delimiter) {
        n += 1;
        delimiter = format!("EOF_{}", n);
    }
    delimiter
}

pub fn render(meta: &ReleaseMetadata, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(meta)),
        OutputFormat::Json => render_json(meta),
        OutputFormat::Github => Ok(render_github(meta)),
    }
}

/// Write rendered metadata to stdout, or append it to `github_output` for the GitHub format
pub fn emit(meta: &ReleaseMetadata, format: OutputFormat, github_output: Option<&Path>) -> Result<()> {
    let rendered = render(meta, format)?;

    match (format, github_output) {
        (OutputFormat::Github, Some(path)) => {
            log::debug!("Appending outputs to {}", path.display());
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(rendered.as_bytes())?;
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if format == OutputFormat::Json {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
    }

    Ok(())
}
