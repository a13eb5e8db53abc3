//! Tracing and logging setup shared by every binary.

pub mod tracing;

pub use crate::tracing::{LogFormat, UnknownLogFormat};

/// Initialize with an explicit default filter and output format.
///
/// `RUST_LOG` still wins over `default_filter` when set.
pub fn init_with(default_filter: &str, format: LogFormat) {
    tracing::init(default_filter, format);
}
