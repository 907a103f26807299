//! Tracing and logging (shared setup).
//!
//! Authorization decisions log through `tracing`; this crate installs the
//! subscriber that turns those events into output.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Like [`init`], with a different filter when `RUST_LOG` is unset
/// (e.g. `"rentwise_auth=debug"` to see every route decision).
pub fn init_with_default(directive: &str) {
    tracing::init(directive);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
