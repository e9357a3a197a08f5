//! `log` backend writing to the browser console.
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

/// One console line: `[LEVEL target] message`.
#[must_use]
pub fn format_line(level: Level, target: &str, message: &str) -> String {
    format!("[{level} {target}] {message}")
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), &record.args().to_string());
        let line = wasm_bindgen::JsValue::from(line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger at `level`.
///
/// # Errors
/// Returns an error if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Parse a level name, falling back to `info`.
#[must_use]
pub fn level_from_name(name: Option<&str>) -> LevelFilter {
    name.and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}
