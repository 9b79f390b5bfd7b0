use tracing::{warn, Level};

use scrumwatch_core::config::{AppConfig, LogFormat};

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: &AppConfig) {
    let configured = resolve_level(&config.logging.level);
    let log_level = configured.unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if configured.is_none() {
        warn!(
            event_name = "system.logging.level_fallback",
            configured_level = %config.logging.level,
            "unknown log level, using info"
        );
    }
}

fn resolve_level(level: &str) -> Option<Level> {
    level.parse::<Level>().ok()
}
