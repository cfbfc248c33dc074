//! # Logging Setup Example
//!
//! Run with: `cargo run --example logging_demo --package cadence-runtime`

use cadence_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use tracing::{debug, info, warn};

fn main() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Pretty)
        .with_filter("cadence_runtime=debug,info");

    init_logging(config).expect("failed to initialize logging");

    info!("player starting");
    debug!(target: "cadence_runtime", detail = "visible at debug level", "buffer state");
    warn!(track = "t1", "transport error; stream truncated");
}
