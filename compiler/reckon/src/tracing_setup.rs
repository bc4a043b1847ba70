//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_tree::HierarchicalLayer;

static INIT: Once = Once::new();

/// Install the global subscriber, once. Does nothing unless `RUST_LOG` is
/// set. With `RECKON_LOG_TREE` also set, spans are printed as an indented
/// tree instead of flat lines.
///
/// ```text
/// RUST_LOG=reckon_sheet=debug reckon run sheet.rk
/// RUST_LOG=debug RECKON_LOG_TREE=1 reckon run sheet.rk
/// ```
pub fn init_tracing() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("RECKON_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
