use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// With a debug log path, everything at DEBUG and above is appended to that
/// file with targets, thread ids and source locations. Otherwise only warnings
/// reach stderr. `RUST_LOG` overrides the level in both cases.
pub fn init_tracing(debug_log: Option<&Path>) -> std::io::Result<()> {
    match debug_log {
        Some(log_path) => {
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
            let _ = tracing_subscriber::fmt()
                .with_writer(log_file)
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .try_init();
        }
        None => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init();
        }
    }
    Ok(())
}
