//! Structured logging with a runtime-adjustable level.
//!
//! Logs go to an hourly rolling file when a directory is given and to stderr
//! otherwise, as JSON lines or human-readable text.

use anyhow::Result;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

/// Prefix of the rolling log files.
pub const FILE_NAME: &str = "quill.log";

type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;

/// Handle to the installed subscriber.
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Replace the active filter, e.g. `debug` or `quill_parser=trace,info`.
    pub fn set_level(&self, directives: &str) -> Result<()> {
        let filter = EnvFilter::try_new(directives)?;
        self.filter.reload(filter)?;
        Ok(())
    }
}

/// Install the global subscriber.
///
/// `dir` selects the rolling file output, `directives` the initial filter and
/// `json` the line format. Fails if a global subscriber is already set.
pub fn init(dir: Option<&Path>, directives: &str, json: bool) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(EnvFilter::try_new(directives)?);

    let output: Box<dyn Layer<Filtered> + Send + Sync> = match dir {
        Some(dir) => {
            let file_appender = RollingFileAppender::new(Rotation::HOURLY, dir, FILE_NAME);
            let layer = fmt::layer().with_writer(file_appender).with_ansi(false);
            if json {
                layer.json().with_current_span(false).with_span_list(false).boxed()
            } else {
                layer.boxed()
            }
        }
        None => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            if json {
                layer.json().with_current_span(false).with_span_list(false).boxed()
            } else {
                layer.boxed()
            }
        }
    };

    tracing_subscriber::registry().with(filter).with(output).try_init()?;
    Ok(LogHandle { filter: handle })
}
