//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `<crate_name>=<default_level>` plus
/// `tower_http=<default_level>` is used so request traces show up as well.
/// Calling this twice is harmless: the second install is ignored.
pub fn setup_logger(crate_name: &str, default_level: &str) {
    let crate_target = crate_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{crate_target}={default_level},sessionhub_server={default_level},tower_http={default_level}"
        ))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
