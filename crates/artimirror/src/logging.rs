use std::path::Path;

use anyhow::Context;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::LogFormat;

/// Log files kept on disk: the active one plus five rotated backups.
pub const LOG_FILES_KEPT: usize = 6;

/// Install the global subscriber: stdout always, plus a rotating file when `log_file` is set.
///
/// The returned guard flushes the file writer on drop and must live until exit.
pub fn init(format: LogFormat, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(path)?);
            (Some(layer(format, writer, false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer(format, std::io::stdout, true))
        .with(file_layer)
        .try_init()
        .context("installing the log subscriber")?;
    Ok(guard)
}

fn layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Daily-rotated appender writing `{file name}.{date}` next to `path`.
pub fn rolling_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("log file path {} does not name a file", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}
