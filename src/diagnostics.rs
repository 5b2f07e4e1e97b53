use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Trace,
    Info,
    Warn,
}

/// Observability sink for core trace events.
///
/// The core only ever pushes events through this seam; it never reads it
/// back, so a sink cannot influence emulation.
pub trait LogSink: Send + Sync + 'static {
    fn log(&self, level: Level, target: &'static str, args: fmt::Arguments);
}

static LOG_SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

pub fn try_set_log_sink(sink: Box<dyn LogSink>) -> Result<(), Box<dyn LogSink>> {
    LOG_SINK.set(sink)
}

pub fn has_log_sink() -> bool {
    LOG_SINK.get().is_some()
}

pub(crate) fn emit(level: Level, target: &'static str, args: fmt::Arguments) {
    if let Some(sink) = LOG_SINK.get() {
        sink.log(level, target, args);
        return;
    }
    // Without an installed sink, fall back to the standard logging facade.
    let log_level = match level {
        Level::Trace => log::Level::Trace,
        Level::Info => log::Level::Info,
        Level::Warn => log::Level::Warn,
    };
    log::log!(target: target, log_level, "{args}");
}

macro_rules! core_trace {
    ($target:expr, $($arg:tt)*) => {
        $crate::diagnostics::emit(
            $crate::diagnostics::Level::Trace,
            $target,
            format_args!($($arg)*),
        )
    };
}

macro_rules! core_info {
    ($target:expr, $($arg:tt)*) => {
        $crate::diagnostics::emit(
            $crate::diagnostics::Level::Info,
            $target,
            format_args!($($arg)*),
        )
    };
}

pub(crate) use {core_info, core_trace};
