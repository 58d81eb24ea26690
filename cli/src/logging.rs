//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/bossrush/bossrush.log` (or platform equivalent)
//! with 5 MB size-based rotation. The console only shows warnings unless
//! `DEBUG_LOGGING=1` is set, so log lines do not bury the REPL output.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,bossrush_core=debug,bossrush_cli=debug";
const FILE_DIRECTIVE: &str = "info";
const QUIET_DIRECTIVE: &str = "warn";

/// Initialize logging with dual-output (file + stdout).
///
/// Returns a `WorkerGuard` that MUST be held for the application lifetime
/// to ensure all buffered logs are flushed on shutdown.
///
/// If the log directory or file cannot be created, returns `None` and falls
/// back to stdout-only logging.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("bossrush"),
        None => {
            init_stdout_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not initialized yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stdout only",
            log_dir, e
        );
        init_stdout_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("bossrush.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(5 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stdout_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(if debug_logging {
            DEBUG_DIRECTIVE
        } else {
            FILE_DIRECTIVE
        }));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "bossrush logging initialized");

    Some(guard)
}

fn init_stdout_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(stdout_layer(debug_logging))
        .init();

    tracing::info!(debug_logging, "bossrush logging initialized (stdout only)");
}

fn stdout_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let directive = if debug_logging {
        DEBUG_DIRECTIVE
    } else {
        QUIET_DIRECTIVE
    };

    fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(directive))
}
