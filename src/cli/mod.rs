pub mod orchestration;

pub use orchestration::{resolve, resolve_parsed, ReleaseMetadata};
