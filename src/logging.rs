// src/logging.rs
// =============================================================================
// Sets up where log output goes for one run.
//
// Two sinks:
// - The log file gets INFO and above, one verbose line per event:
//     WARNING | 2026-10-16 18:55:00,123 | csv_guardian::validate::report | 2: ...
// - The console (stdout) gets ERROR only, message text and nothing else
//
// RunLogger installs this as the default subscriber for the current thread
// and removes it again when dropped, so logging lives exactly as long as
// the run that created it.
// =============================================================================

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// `LEVEL | timestamp | target | message`, the log file format.
pub struct VerboseFormat;

/// Local time as `2026-10-16 18:55:00,123`.
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S,%3f"))
    }
}

// Level names as the log has always spelled them
fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for VerboseFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(writer, "{:<7} | ", level_name(meta.level()))?;
        LocalTime.format_time(&mut writer)?;
        write!(writer, " | {:<8} | ", meta.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Logging context for a single run. Dropping it uninstalls the subscriber.
pub struct RunLogger {
    _guard: DefaultGuard,
}

impl RunLogger {
    // Creates (or truncates) the log file and installs both sinks
    pub fn install(log_file: &Path) -> Result<Self> {
        let file = File::create(log_file)
            .with_context(|| format!("Could not create log file {}", log_file.display()))?;
        Ok(Self::with_writers(Mutex::new(file), io::stdout))
    }

    fn with_writers<F, C>(file: F, console: C) -> Self
    where
        F: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
        C: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .event_format(VerboseFormat)
            .with_filter(LevelFilter::INFO);

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(console)
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(LevelFilter::ERROR);

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
