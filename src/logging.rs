use crate::models::LoggingConfig;
use anyhow::{Context, Result};
use std::fs;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Target of the human-readable diagnostic event log.
///
/// Events on this target land in `events.log` next to the main log, one line
/// per state transition or error, e.g. `[Settings - Card Farming] Logged out`.
pub const EVENT_LOG_TARGET: &str = "event_log";

/// File name of the append-only event log inside the log directory.
pub const EVENT_LOG_FILE: &str = "events.log";

/// Tag prefixed to every card farming settings event.
pub const CARD_FARMING_TAG: &str = "[Settings - Card Farming]";

/// Record a diagnostic event.
pub fn log_event(message: &str) {
    tracing::info!(target: EVENT_LOG_TARGET, "{}", message);
}

/// Record a diagnostic error event. The `[Error]` tag is added here.
pub fn log_error_event(message: &str) {
    tracing::error!(target: EVENT_LOG_TARGET, "[Error] {}", message);
}

/// Keeps the non-blocking log writers alive. Hold it for the life of the program.
pub struct LoggingGuards {
    _main: WorkerGuard,
    _events: WorkerGuard,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn level_filter(debug_mode: bool) -> EnvFilter {
    if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Setup logging with a rotating file appender and the event log.
///
/// - Main log: `<log_dir>/<log_prefix>.<date>`, daily rotation, plain or JSON
/// - Event log: `<log_dir>/events.log`, never rotated, only [`EVENT_LOG_TARGET`]
/// - Console: optional, with ANSI colors
///
/// # Returns
/// Guards that must be held for the duration of the program to keep logging active
pub fn setup_logging(config: &LoggingConfig) -> Result<LoggingGuards> {
    let log_dir = &config.log_dir;
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let (main_writer, main_guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, &config.log_prefix));
    let (event_writer, event_guard) =
        tracing_appender::non_blocking(rolling::never(log_dir, EVENT_LOG_FILE));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_writer)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if config.json {
        layers.push(
            file_layer
                .json()
                .with_filter(level_filter(config.debug_mode))
                .boxed(),
        );
    } else {
        layers.push(file_layer.with_filter(level_filter(config.debug_mode)).boxed());
    }

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(event_writer)
            .with_ansi(false)
            .with_target(false)
            .with_filter(Targets::new().with_target(EVENT_LOG_TARGET, LevelFilter::INFO))
            .boxed(),
    );

    if config.console_output {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_filter(level_filter(config.debug_mode))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}, json={}",
        log_dir,
        config.log_prefix,
        config.debug_mode,
        config.console_output,
        config.json
    );

    Ok(LoggingGuards {
        _main: main_guard,
        _events: event_guard,
    })
}
