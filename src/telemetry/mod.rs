//! Tracing initialization.

use tracing_subscriber::{fmt, EnvFilter, prelude::*};

const DEFAULT_FILTER: &str = "info,kazhutha=debug,tower_http=info,axum=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter,
/// e.g. `RUST_LOG=kazhutha=trace,tower_http=debug`.
///
/// A second call is a no-op, so tests and embedders can call it freely.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .compact();

    if tracing_subscriber::registry().with(filter).with(fmt_layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
