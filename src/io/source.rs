//! The inbound side of a transport.

use std::io;

/// The inbound half of a transport, read one unit at a time.
///
/// Implementations block inside [`Source::next`] until a unit is available, the
/// stream ends, or an error occurs. A [`Reader`](crate::io::reader::Reader)
/// calls `next` from its own thread only, and calls `close` exactly once when it
/// shuts down.
pub trait Source: Send + 'static {
    type Item: Send + 'static;

    /// Reads one unit.
    ///
    /// # Returns
    /// - `Ok(Some(item))` when a unit was read
    /// - `Ok(None)` when the stream has ended
    /// - `Err(e)` when this attempt failed; later attempts may still succeed
    fn next(&mut self) -> io::Result<Option<Self::Item>>;

    /// Releases the underlying transport.
    fn close(&mut self) -> io::Result<()>;
}
