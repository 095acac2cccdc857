//! `tracing` output routed to the browser console

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::util::log;

/// Buffers one formatted event and hands it to `console.log` on drop
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer);
            log(&format!("[galaxy] {}", line.trim_end()));
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buffer: Vec::new() }
    }
}

/// Install the console subscriber
///
/// Only the first call in a page takes effect; the level is process-wide.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}
