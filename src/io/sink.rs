//! The outbound side of a transport and its two framings: line and raw bytes.

use crate::io::lines::closed;

use std::io::{self, Write};

/// The outbound half of a transport, written one payload at a time.
///
/// A [`Writer`](crate::io::writer::Writer) calls `write` from its own thread only,
/// and calls `close` exactly once when it shuts down.
pub trait Sink: Send + 'static {
    /// Writes one whole payload, blocking until it is handed to the transport.
    fn write(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Releases the underlying transport.
    fn close(&mut self) -> io::Result<()>;
}

/// Writes each payload as one line: the bytes, a `\n`, then a flush.
pub struct LineSink<W: Write> {
    writer: Option<W>,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }
}

impl<W: Write + Send + 'static> Sink for LineSink<W> {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed)?;
        writer.write_all(payload)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

/// Writes each payload verbatim, then flushes.
pub struct ByteSink<W: Write> {
    writer: Option<W>,
}

impl<W: Write> ByteSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }
}

impl<W: Write + Send + 'static> Sink for ByteSink<W> {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed)?;
        writer.write_all(payload)?;
        writer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
