//! Tracing subscriber: the console renderer and the run-log layer.
//!
//! Installer events carry their meaning in the target and in structured
//! fields rather than in pre-formatted text:
//!
//! - [`STAGE_TARGET`]: one event per install step header
//! - [`DRY_RUN_TARGET`]: an action a dry run skipped
//! - [`STEP_TARGET`]: a summary row with `status` and optional `detail`
use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::file::{LogFile, timestamp};
use super::logger::Logger;
use super::types::StepStatus;

/// Target of step headers.
pub(super) const STAGE_TARGET: &str = "mycli::stage";

/// Target of skipped dry-run actions.
pub(super) const DRY_RUN_TARGET: &str = "mycli::dry_run";

/// Target of summary rows.
pub(super) const STEP_TARGET: &str = "mycli::step";

/// The fields of one event, split into the message and everything else.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    status: Option<StepStatus>,
    extra: Vec<(&'static str, String)>,
}

impl EventFields {
    fn of(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn detail(&self) -> Option<&str> {
        self.extra
            .iter()
            .find(|(name, _)| *name == "detail")
            .map(|(_, value)| value.as_str())
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "status" => self.status = StepStatus::from_label(value),
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.record_str(field, &format!("{value:?}"));
        }
    }
}

/// Writes every event, `debug` included, to the run log as plain
/// `key=value` text.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Arc<LogFile>,
}

impl FileLayer {
    pub(super) const fn new(file: Arc<LogFile>) -> Self {
        Self { file }
    }

    fn render(event: &Event<'_>) -> String {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        let mut line = format!("{} {:<5} ", timestamp(), metadata.level().as_str());

        match metadata.target() {
            STAGE_TARGET => line.push_str("==> "),
            DRY_RUN_TARGET => line.push_str("[dry run] "),
            _ => {}
        }
        line.push_str(&fields.message);
        if let Some(status) = fields.status {
            write!(line, " status={}", status.label()).ok();
        }
        for (name, value) in &fields.extra {
            write!(line, " {name}={value:?}").ok();
        }
        line
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        self.file.append(Self::render(event));
    }
}

/// Console rendering: coloured step headers and summary rows, indented
/// progress lines, and `ERROR`/`WARN` prefixes.
struct ConsoleFormat;

impl ConsoleFormat {
    const fn status_style(status: StepStatus) -> (&'static str, &'static str) {
        match status {
            StepStatus::Ok => ("✓", "\x1b[32m"),
            StepStatus::Skipped => ("○", "\x1b[33m"),
            StepStatus::DryRun => ("~", "\x1b[33m"),
            StepStatus::Failed => ("✗", "\x1b[31m"),
        }
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        let msg = &fields.message;

        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            (Level::WARN, _) => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            (_, STAGE_TARGET) => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            (_, DRY_RUN_TARGET) => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            (_, STEP_TARGET) => {
                let (icon, color) = Self::status_style(fields.status.unwrap_or(StepStatus::Ok));
                let detail = fields
                    .detail()
                    .map_or_else(String::new, |d| format!(" ({d})"));
                writeln!(writer, "  {color}{icon} {msg}{detail}\x1b[0m")
            }
            (Level::INFO, _) => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global [`tracing`] subscriber for `log`.
///
/// Console output goes to stdout (info and below) and stderr (warnings and
/// errors). When `log` has a run log, every event including `debug` is also
/// routed to it; the file itself appears only after
/// [`Logger::open_log_file`].
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, log: &Logger) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log
        .log_file()
        .map(|file| FileLayer::new(file).with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
