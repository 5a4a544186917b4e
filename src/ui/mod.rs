//! User interface module - status and error reporting.
//!
//! Everything here writes to stderr so stdout stays reserved for the
//! resolved outputs consumed by the publishing step.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_release_summary, display_status,
    display_success, format_stage_error,
};
