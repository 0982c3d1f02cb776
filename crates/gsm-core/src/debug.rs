use core::fmt;
use std::sync::Once;
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;


#[macro_export]
macro_rules! unimplemented_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!(
            "unimplemented: {}",
            format_args!($($arg)*),
        );
    }};
}

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

/// Width of a rendered GsmTime, used to keep lines without a `ts` field aligned
const TS_WIDTH: usize = 22;

/// Column at which the message text starts
const MSG_COLUMN: usize = 72;

/// Formats events as "LEVEL ts [crate/module] file:line: message", with the
/// message aligned in a fixed column
struct AlignedFormatter;

/// Pulls the `ts` field out of an event so it can be printed up front
#[derive(Default)]
struct TsVisitor {
    ts: Option<String>,
}

impl tracing::field::Visit for TsVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "ts" {
            self.ts = Some(format!("{:?}", value));
        }
    }
}

/// "crates/gsm-entities/src/lapdm/components/datalink.rs" becomes
/// "[entities/lapdm] datalink.rs"
fn short_location(file_path: &str) -> String {
    let Some(src_idx) = file_path.find("/src/") else {
        return file_path.to_string();
    };
    let before_src = &file_path[..src_idx];
    let after_src = &file_path[src_idx + 5..];

    let crate_name = match before_src.rfind("gsm-") {
        Some(idx) => &before_src[idx + 4..],
        None => before_src.rsplit('/').next().unwrap_or("unknown"),
    };

    match after_src.rsplit_once('/') {
        Some((module_path, filename)) => {
            let first_module = module_path.split('/').next().unwrap_or("");
            format!("[{}/{}] {}", crate_name, first_module, filename)
        }
        None => format!("[{}] {}", crate_name, after_src),
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let mut visitor = TsVisitor::default();
        event.record(&mut visitor);
        let has_ts = visitor.ts.is_some();
        let ts_str = visitor.ts.unwrap_or_default();

        let color = match *metadata.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[35m",
        };

        let location = format!(
            "{}{:<5}\x1b[0m {:<ts_width$} {}:{}:",
            color,
            metadata.level(),
            ts_str,
            short_location(metadata.file().unwrap_or("unknown")),
            metadata.line().unwrap_or(0),
            ts_width = TS_WIDTH,
        );

        let mut message_buf = String::new();
        ctx.field_format().format_fields(format::Writer::new(&mut message_buf), event)?;

        // The ts field was already printed in front
        if has_ts {
            strip_ts_field(&mut message_buf);
        }

        // Frame direction arrows stick out to the left
        let mut padding = MSG_COLUMN;
        if message_buf.starts_with("->") || message_buf.starts_with("<-") {
            padding -= 3;
        }

        writeln!(writer, "{:<width$} {}", location, message_buf, width = padding)
    }
}

/// Removes the `ts=` field from formatted event fields. A formatted GsmTime
/// contains spaces and ends with the closing parenthesis
fn strip_ts_field(buf: &mut String) {
    let Some(ts_idx) = buf.find("ts=") else {
        return;
    };
    match buf[ts_idx..].find(')') {
        Some(close_idx) => {
            let mut end = ts_idx + close_idx + 1;
            if buf[end..].starts_with(' ') {
                end += 1;
            }
            buf.replace_range(ts_idx..end, "");
        }
        None => buf.truncate(ts_idx),
    }
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {

    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_filter() -> EnvFilter {
    EnvFilter::new("info")
}

/// Parses a directive that is known to be well-formed
fn directive(s: &'static str) -> Directive {
    s.parse().expect("static log directive")
}

pub fn get_default_stdout_filter() -> EnvFilter {

    EnvFilter::new("info")
        // Hide continuous logs from the router
        .add_directive(directive("gsm_entities::messagerouter=warn"))

        // LAPDm frame codec is chatty, keep the state machine at debug
        .add_directive(directive("gsm_pdus=info"))
        .add_directive(directive("gsm_entities::lapdm::components::t200=info"))
        .add_directive(directive("gsm_entities::lapdm=debug"))

        // Loopback binary: air interface quiet, scripted layer 3 verbose
        .add_directive(directive("lapdm_loopback::air=info"))
        .add_directive(directive("lapdm_loopback=debug"))
}


fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Installs the global subscriber: stdout, plus a non-blocking file writer when
/// `outfile` is given and can be opened. Returns the writer's guard, which must
/// outlive all logging to the file. Only the first call installs anything
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    let file = outfile.and_then(|(path, filter)| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some((file, filter)),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path, e);
                None
            }
        }
    });

    let (file_layer, guard) = match file {
        Some((file, filter)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    INIT_LOG.call_once(|| {
        let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter).with_filter(stdout_filter);
        tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
    });
    guard
}
