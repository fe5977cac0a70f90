//! Console and file log sinks.
//!
//! Three layers share one registry:
//!
//! - console (stderr), filtered by `RUST_LOG` or the default directives;
//! - the run log, every event from INFO up;
//! - the errors log, ERROR only.
//!
//! Both files are opened in append mode and never rotated.

use crate::errors::CliError;
use camino::Utf8Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_DIRECTIVES: &str = "artpack=info,artpack_merge=info";
const VERBOSE_DIRECTIVES: &str = "artpack=debug,artpack_merge=debug";

/// Flushes the file sinks when dropped; keep it alive until exit.
#[must_use]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_logging(
    verbose: bool,
    run_log: Option<&Utf8Path>,
    error_log: Option<&Utf8Path>,
) -> Result<LogGuards, CliError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            VERBOSE_DIRECTIVES.into()
        } else {
            DEFAULT_DIRECTIVES.into()
        }
    });
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let mut guards = Vec::new();

    let run_layer = match run_log {
        Some(path) => {
            let (writer, guard) = append_writer(path)?;
            guards.push(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(LevelFilter::INFO),
            )
        }
        None => None,
    };

    let error_layer = match error_log {
        Some(path) => {
            let (writer, guard) = append_writer(path)?;
            guards.push(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(console_layer)
        .with(run_layer)
        .with(error_layer);
    if let Err(e) = registry.try_init() {
        eprintln!("Logging already initialized: {}", e);
    }

    Ok(LogGuards { _guards: guards })
}

fn append_writer(path: &Utf8Path) -> Result<(NonBlocking, WorkerGuard), CliError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().unwrap_or(path.as_str());

    std::fs::create_dir_all(dir.as_std_path())
        .map_err(|e| CliError::log_file_failed(path.to_path_buf(), e))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir.as_std_path())
        .map_err(|e| CliError::log_file_failed(path.to_path_buf(), std::io::Error::other(e)))?;

    Ok(tracing_appender::non_blocking(appender))
}
