//! Fixed-size chunk framing over a byte stream.

use crate::io::lines::closed;
use crate::io::source::Source;

use std::io::{self, Read};

/// Fixed-size chunks read from any byte stream.
///
/// Reads up to `len` bytes at a time into one buffer that is reused across reads.
/// Every unit handed out is a fresh copy of exactly the bytes read, so a payload
/// kept by a subscriber is never overwritten by a later read. A read of zero bytes
/// is end of stream.
pub struct Chunks<R: Read> {
    reader: Option<R>,
    buffer: Box<[u8]>,
}

impl<R: Read> Chunks<R> {
    /// # Arguments
    /// * `reader` - The byte stream to read from
    /// * `len` - Maximum bytes per chunk; clamped to at least 1
    pub fn new(reader: R, len: usize) -> Self {
        Self {
            reader: Some(reader),
            buffer: vec![0u8; len.max(1)].into_boxed_slice(),
        }
    }

    pub fn chunk_len(&self) -> usize {
        self.buffer.len()
    }
}

impl<R: Read + Send + 'static> Source for Chunks<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> io::Result<Option<Vec<u8>>> {
        let reader = self.reader.as_mut().ok_or_else(closed)?;

        match reader.read(&mut self.buffer)? {
            0 => Ok(None),
            n => Ok(Some(self.buffer[..n].to_vec())),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader.take();
        Ok(())
    }
}
