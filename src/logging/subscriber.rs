//! Console and log file rendering of [`tracing`] events.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::utils::{clock, log_file_path, strip_ansi, timestamp};

/// Target of events that open a new formula section.
pub(super) const STAGE_TARGET: &str = "dotmount::stage";

/// Marker printed in front of section headers.
const STAGE_MARK: &str = "▶";

/// Collects the `message` field of an event.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl Message {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut message = Self::default();
        event.record(&mut message);
        message
    }
}

fn is_stage(event: &tracing::Event<'_>) -> bool {
    event.metadata().target() == STAGE_TARGET
}

/// Appends every event, debug included, to the log file of one run.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file of `command` and write the run header.
    ///
    /// Returns `None` if the file cannot be written; logging then goes to
    /// the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("DOTMOUNT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let mut file = fs::File::create(&path).ok()?;
        writeln!(file, "# dotmount {version}: {command} started {}", timestamp()).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let msg = strip_ansi(&Message::of(event).0);
        let line = if is_stage(event) {
            format!("{} {STAGE_MARK} {msg}", clock())
        } else {
            let tag = match *event.metadata().level() {
                Level::ERROR => "error",
                Level::WARN => "warn",
                Level::INFO => "info",
                _ => "debug",
            };
            format!("{}   [{tag}] {msg}", clock())
        };

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Renders events for a terminal: section headers in bold, problems with a
/// colored prefix, debug output dimmed.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let Message(msg) = Message::of(event);
        match *event.metadata().level() {
            Level::ERROR => writeln!(writer, "\x1b[1;31merror:\x1b[0m {msg}"),
            Level::WARN => writeln!(writer, "\x1b[1;33mwarning:\x1b[0m {msg}"),
            Level::INFO if is_stage(event) => {
                writeln!(writer, "\x1b[1;36m{STAGE_MARK}\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global [`tracing`] subscriber. Call once at startup.
///
/// Warnings and errors go to stderr, everything else to stdout.  Debug
/// messages reach the console only with `verbose`, but always reach the log
/// file of `command` (see [`Logger`](super::Logger)).
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(writer)
        .with_filter(if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        });

    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
