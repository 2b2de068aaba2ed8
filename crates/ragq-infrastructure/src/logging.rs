//! Structured logging setup: `tracing` + `tracing-subscriber`, with an
//! optional daily-rotated file appender.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use ragq_domain::error::{Error, Result};

use crate::config::LoggingConfig;

/// Initialize the global `tracing` subscriber from `config`. Call once at
/// process startup.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    validate_level(&config.level)?;

    let filter = EnvFilter::try_from_env("RAGQ_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));
    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem().unwrap_or_else(|| std::ffi::OsStr::new("ragq")),
        )
    });

    if config.json_format {
        init_with_layers(filter, file_appender, true)
    } else {
        init_with_layers(filter, file_appender, false)
    }
}

fn init_with_layers(
    filter: EnvFilter,
    file_appender: Option<tracing_appender::rolling::RollingFileAppender>,
    json: bool,
) -> Result<()> {
    let registry = Registry::default().with(filter);

    macro_rules! stdout_layer {
        () => {{
            let layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);
            if json { layer.json().boxed() } else { layer.boxed() }
        }};
    }

    if let Some(appender) = file_appender {
        let file_layer = fmt::layer().with_writer(appender).with_ansi(false).with_target(true);
        let file_layer = if json { file_layer.json().boxed() } else { file_layer.boxed() };
        registry.with(stdout_layer!()).with(file_layer).try_init()
    } else {
        registry.with(stdout_layer!()).try_init()
    }
    .map_err(|e| Error::configuration(format!("failed to install tracing subscriber: {e}")))
}

fn validate_level(level: &str) -> Result<()> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "warning" | "error" => Ok(()),
        other => Err(Error::configuration(format!(
            "invalid log level: {other}. use trace, debug, info, warn, or error"
        ))),
    }
}
