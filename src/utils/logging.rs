//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set. Otherwise `-v` repetitions pick the level:
//! none = warn, one = info, two = debug, more = trace.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    /// Append to a file; used while the terminal UI owns the screen
    File(PathBuf),
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8, sink: LogSink) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match sink {
        LogSink::Stderr => builder.with_writer(io::stderr).try_init(),
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "info");
        assert_eq!(default_directive(2), "debug");
        assert_eq!(default_directive(9), "trace");
    }
}
