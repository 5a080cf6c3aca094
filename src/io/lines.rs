//! Newline framing over a byte stream.
//!
//! Also hosts the error every closed source or sink reports when used again.

use crate::io::source::Source;

use std::io::{self, BufRead, BufReader, Read};

/// Newline-delimited text read from any byte stream.
///
/// Each unit is one line with its `\n` or `\r\n` terminator removed. A line that is
/// not valid UTF-8 is reported as an [`io::ErrorKind::InvalidData`] failure and
/// skipped.
pub struct Lines<R: Read> {
    reader: Option<BufReader<R>>,
}

impl<R: Read> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
        }
    }

    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader: Some(BufReader::with_capacity(capacity, reader)),
        }
    }
}

impl<R: Read + Send + 'static> Source for Lines<R> {
    type Item = String;

    fn next(&mut self) -> io::Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or_else(closed)?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader.take();
        Ok(())
    }
}

pub(crate) fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "transport already closed")
}
