//! Logging and tracing infrastructure for memscope.
//!
//! Structured logging through the tracing crate. The engine itself only emits
//! events; hosts call one of the init functions once at startup.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber with human-readable output.
///
/// Only the first init call of either kind takes effect.
pub fn init_tracing() {
    INIT.call_once(|| install(false));
}

/// Initialize the global tracing subscriber with JSON output.
pub fn init_tracing_json() {
    INIT.call_once(|| install(true));
}

fn install(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true);

    // A host may already have installed its own subscriber.
    let installed = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.with_thread_names(true))
            .try_init()
    };
    if installed.is_ok() {
        info!(json, "memscope tracing initialized");
    }
}

/// Span for one rendering request
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Macro for logging and returning errors
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = %e, "Operation failed");
        e
    }};
    ($err:expr, $msg:expr) => {{
        let e = $err;
        tracing::error!(error = %e, message = $msg, "Operation failed");
        e
    }};
}
