//! Console logging.
//!
//! Installs a `tracing-subscriber` fmt subscriber whose output goes to the
//! browser console. Each formatted event is buffered and emitted once, at the
//! console method matching its level.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::FALLBACK_LOG_DIRECTIVE;

/// Buffers one formatted event and writes it to the console on drop.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        emit(self.level, text);
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, text: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(text);
    match level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        _ => console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(level: Level, text: &str) {
    eprintln!("[{}] {}", level, text);
}

/// [`MakeWriter`] handing out a [`ConsoleWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Parse `directive`, falling back to [`FALLBACK_LOG_DIRECTIVE`].
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_DIRECTIVE))
}

/// Install the console subscriber.
///
/// Returns `false` when a global subscriber was already set, e.g. when the
/// module is instantiated twice in one page.
pub fn init(directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive))
        .with_writer(ConsoleMakeWriter)
        .with_target(true)
        .with_level(false)
        .without_time()
        .with_ansi(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::LOG_DIRECTIVE;

    #[test]
    fn test_filter_accepts_default_directive() {
        let filter = filter(LOG_DIRECTIVE);
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("rowglyph_core=info"));
        assert!(rendered.contains("rowglyph=info"));
    }

    #[test]
    fn test_filter_falls_back_on_garbage() {
        let filter = filter("rowglyph=loudest");
        assert_eq!(filter.to_string().to_lowercase(), FALLBACK_LOG_DIRECTIVE);
    }

    #[test]
    fn test_writer_buffers_partial_writes() {
        let mut writer = ConsoleWriter::new(Level::WARN);
        writer.write_all(b"row ").unwrap();
        writer.write_all(b"skipped\n").unwrap();
        assert_eq!(writer.buf, b"row skipped\n");
    }
}
