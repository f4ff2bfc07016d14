use std::sync::Once;

/// Crates whose debug output drowns the renderer's own; capped at `warn`
/// unless a filter is given explicitly.
const QUIET: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "gamut_engine=debug,wgpu_core=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: log::LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: log::LevelFilter::Info,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
            for module in QUIET {
                builder.filter_module(module, config.default_level.min(log::LevelFilter::Warn));
            }
        }

        builder.write_style(config.write_style);

        // try_init: a test harness may already own the global logger.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_ignored() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            default_level: log::LevelFilter::Trace,
            ..LoggingConfig::default()
        });
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LoggingConfig::default().default_level, log::LevelFilter::Info);
    }
}
