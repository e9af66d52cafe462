//! The common module holds the small helpers shared by the rest of the crate: order-preserving
//! de-duplication and logging setup.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::hash::Hash;
use std::sync::{Mutex, OnceLock};

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

use crate::error::{ImportReplaceError, Result};

pub fn uniq<T: Clone + Eq + Hash>(xs: Vec<T>) -> Vec<T> {
    let mut rv = Vec::new();
    let mut seen = HashSet::new();
    for x in xs {
        if seen.insert(x.clone()) {
            rv.push(x);
        }
    }
    rv
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File,
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOutput::Stderr => write!(f, "stderr"),
            LogOutput::File => write!(f, "file"),
        }
    }
}

static LOGGING_INITIALIZED: Mutex<BTreeSet<Option<String>>> = Mutex::new(BTreeSet::new());
// The non-blocking file writer stops flushing once its guard is dropped.
static FILE_LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global tracing subscriber. Calling this again with the same logger name is a
/// no-op. Hosts that already install their own subscriber should not call this at all.
pub fn initialize_logging(logger_name: Option<&str>, output: LogOutput) -> Result<()> {
    {
        let mut initialized = LOGGING_INITIALIZED
            .lock()
            .map_err(|e| ImportReplaceError::Logging(format!("logging registry poisoned: {e}")))?;
        if !initialized.insert(logger_name.map(|s| s.to_string())) {
            return Ok(());
        }
    }

    let log_despite_testing = std::env::var("LOG_TEST").is_ok();
    let is_testing = cfg!(test) || std::env::var("CARGO_TEST").is_ok();
    if is_testing && !log_despite_testing {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match output {
        LogOutput::Stderr => {
            let subscriber = tracing_fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(!log_despite_testing)
                .with_thread_ids(log_despite_testing)
                .with_line_number(log_despite_testing)
                .with_file(log_despite_testing)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| ImportReplaceError::Logging(e.to_string()))?;
        }
        LogOutput::File => {
            let proj_dirs = ProjectDirs::from("", "", "importreplace")
                .ok_or_else(|| ImportReplaceError::Logging("failed to get project directories".to_string()))?;
            let log_dir = if cfg!(target_os = "macos") {
                proj_dirs.cache_dir()
            } else {
                proj_dirs.state_dir().unwrap_or(proj_dirs.cache_dir())
            };
            fs::create_dir_all(log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .max_log_files(10)
                .filename_prefix("importreplace")
                .filename_suffix("log")
                .build(log_dir)
                .map_err(|e| ImportReplaceError::Logging(e.to_string()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let subscriber = tracing_fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| ImportReplaceError::Logging(e.to_string()))?;
            let _ = FILE_LOG_GUARD.set(guard);
        }
    }

    Ok(())
}
