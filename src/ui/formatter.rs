//! Pure formatting functions for UI output.
//!
//! Functions here only print to stderr; the `format_*` helpers return the
//! text so it can be tested.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::ReleaseMetadata;
use crate::error::ReleaseError;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Message for a failed run, naming the stage that failed
pub fn format_stage_error(err: &ReleaseError) -> String {
    format!("{} failed: {}", err.stage(), err)
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display a short summary of the resolved release.
///
/// # Arguments
/// * `meta` - The resolved release metadata
pub fn display_release_summary(meta: &ReleaseMetadata) {
    eprintln!("\n{}", style("Release metadata:").bold());
    eprintln!("  Plugin:     {}", style(&meta.plugin_name).cyan());
    if let Some(title) = &meta.plugin_title {
        eprintln!("  Title:      {}", title);
    }
    eprintln!(
        "  Version:    {}{}",
        style(&meta.version).green(),
        if meta.is_prerelease {
            " (prerelease)"
        } else {
            ""
        }
    );
    eprintln!("  Artifact:   {}", meta.plugin_path);
    eprintln!(
        "  Since:      {}",
        meta.previous_tag.as_deref().unwrap_or("(full history)")
    );
}
