//! A connected TCP stream driven by one reader and one writer.
//!
//! [`Socket`] pairs a [`Reader`] over the inbound direction with a [`Writer`] over the
//! outbound direction of a single [`TcpStream`], starts both, and forwards sends and
//! listener registration to them. The two directions stay independent: there is no
//! ordering between received events and write completions.
//!
//! Two framings are provided:
//! - [`AsyncSocket`]: text lines in, lines out
//! - [`DataSocket`]: fixed-size chunks in, raw bytes out

use crate::error::Result;
use crate::io::chunks::Chunks;
use crate::io::lines::Lines;
use crate::io::reader::Reader;
use crate::io::request::{WriteRequest, WriteSender};
use crate::io::sink::{ByteSink, LineSink, Sink};
use crate::io::source::Source;
use crate::io::writer::Writer;
use crate::listener::Listener;

use log::*;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Line-framed socket.
pub type AsyncSocket = Socket<Lines<TcpStream>, LineSink<TcpStream>>;

/// Chunk-framed socket.
pub type DataSocket = Socket<Chunks<TcpStream>, ByteSink<TcpStream>>;

pub struct Socket<S: Source, K: Sink> {
    stream: TcpStream,
    peer: SocketAddr,
    reader: Reader<S>,
    writer: Writer<K>,
    running: AtomicBool,
}

impl AsyncSocket {
    /// Connects to `address` and starts reading and writing lines.
    ///
    /// Blocks until the connection is established.
    pub fn connect<A: ToSocketAddrs>(address: A) -> Result<Self> {
        Self::from_stream(TcpStream::connect(address)?)
    }

    /// Wraps an already connected stream and starts reading and writing lines.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let source = Lines::new(stream.try_clone()?);
        let sink = LineSink::new(stream.try_clone()?);
        Socket::assemble(stream, source, sink)
    }
}

impl DataSocket {
    /// Connects to `address` and starts reading chunks of at most `chunk_len` bytes.
    ///
    /// Blocks until the connection is established.
    pub fn connect<A: ToSocketAddrs>(address: A, chunk_len: usize) -> Result<Self> {
        Self::from_stream(TcpStream::connect(address)?, chunk_len)
    }

    /// Wraps an already connected stream and starts reading chunks of at most `chunk_len` bytes.
    pub fn from_stream(stream: TcpStream, chunk_len: usize) -> Result<Self> {
        let source = Chunks::new(stream.try_clone()?, chunk_len);
        let sink = ByteSink::new(stream.try_clone()?);
        Socket::assemble(stream, source, sink)
    }
}

impl<S: Source, K: Sink> Socket<S, K> {
    fn assemble(stream: TcpStream, source: S, sink: K) -> Result<Self> {
        let peer = stream.peer_addr()?;
        let socket = Self {
            stream,
            peer,
            reader: Reader::new(source),
            writer: Writer::new(sink),
            running: AtomicBool::new(false),
        };

        socket.start()?;
        Ok(socket)
    }

    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        self.reader.start()?;
        self.writer.start()?;
        debug!("Socket to {} started", self.peer);
        Ok(())
    }

    /// Stops both directions and shuts the stream down.
    ///
    /// Pending writes are reported as undeliverable. Safe to call more than once.
    pub fn close(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        self.reader.close();
        self.writer.close();

        // Unblocks a read in progress so the reader can observe the close.
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(e) => warn!("Failed to shut down socket to {}: {e}", self.peer),
        }
        debug!("Socket to {} closed", self.peer);
    }

    pub fn add_listener(&self, listener: Arc<dyn Listener<S::Item>>) {
        self.reader.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn Listener<S::Item>>) -> bool {
        self.reader.remove_listener(listener)
    }

    /// Queues `data` without a completion target. Never blocks.
    pub fn send(&self, data: impl Into<Vec<u8>>) {
        self.writer.send(data);
    }

    /// Queues `data`; `sender` is told how the write went. Never blocks.
    pub fn send_with(&self, data: impl Into<Vec<u8>>, sender: Arc<dyn WriteSender>) {
        self.writer.send_with(data, sender);
    }

    /// Queues a prepared request. Never blocks.
    pub fn send_request(&self, request: WriteRequest) {
        self.writer.send_request(request);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn port(&self) -> u16 {
        self.peer.port()
    }

    pub fn reader(&self) -> &Reader<S> {
        &self.reader
    }

    pub fn writer(&self) -> &Writer<K> {
        &self.writer
    }

    /// Waits for both engine threads to exit. Call after [`Self::close`].
    pub fn join(&self) -> Result<()> {
        self.reader.join()?;
        self.writer.join()
    }
}

impl<S: Source, K: Sink> Drop for Socket<S, K> {
    fn drop(&mut self) {
        self.close();
    }
}
