//! Tracing setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "SPARK_MOTION_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is off unless `SPARK_MOTION_LOG` names a file, so a terminal host's
/// display is never written over. The filter comes from `RUST_LOG` and
/// defaults to `info`. Calling this twice, or after another subscriber was
/// installed, is a no-op.
pub fn init_tracing() {
    let Some(log_path) = std::env::var_os(LOG_ENV) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::File::create(&log_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "Warning: Failed to create log file {}: {err}",
                log_path.to_string_lossy()
            );
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}
