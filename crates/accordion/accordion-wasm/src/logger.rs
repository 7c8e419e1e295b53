//! `log` backend writing to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route `log` records to the console at `level`. Another logger installed
/// first by the embedding page keeps precedence; only the level changes.
pub fn install(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("a logger is already installed");
    }
    log::set_max_level(level);
}
