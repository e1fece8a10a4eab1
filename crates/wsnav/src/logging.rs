//! Tracing setup for the CLI.
//!
//! Diagnostics go to stderr so command output stays clean on stdout; an
//! optional non-blocking file appender mirrors them to disk. `RUST_LOG`
//! overrides the verbosity flags.

use std::ffi::OsStr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::args::GlobalArgs;

/// Initialize the tracing subscriber.
///
/// Returns the file appender's `WorkerGuard` when a log file is configured;
/// the guard must be kept alive for buffered log lines to be flushed.
pub fn init_tracing(args: &GlobalArgs) -> Option<WorkerGuard> {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match args.log_file.as_deref() {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| OsStr::new("wsnav.log"));
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

            Registry::default()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            Registry::default().with(env_filter).with(stderr_layer).init();
            None
        }
    }
}
