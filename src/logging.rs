//! Optional tracing subscriber bootstrap for embedders and the test suite.
//!
//! The crate itself never installs a global subscriber (a library must not
//! assume it owns the process's logging), but callers that embed
//! `archlint_core` without their own `tracing` setup (ad hoc tools, the
//! integration tests) can call [`init`] once to get `RUST_LOG`-controlled
//! output.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing-subscriber` `fmt` subscriber driven by `RUST_LOG`,
/// defaulting to `info` when unset. Safe to call more than once, only the
/// first call takes effect.
pub fn init() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
    });
}
