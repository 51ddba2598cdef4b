//! Logger setup for the `log` facade.

use std::io::Write;

use env_logger::{Builder, Env};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global logger.
///
/// `RUST_LOG` still overrides the configured level. Calling this twice is
/// harmless; the second install is ignored.
pub fn init(config: &LoggingConfig) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));

    match config.format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "level": record.level().to_string(),
                    "target": record.target(),
                    "message": record.args().to_string(),
                });
                writeln!(buf, "{}", line)
            });
        }
        LogFormat::Text => {
            builder.format_timestamp_secs();
        }
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
