//! Asynchronous writer engine.
//!
//! A [`Writer`] accepts payloads from any thread without blocking and writes them,
//! in submission order, from its own thread. Each request reports its outcome only
//! to its own [`WriteSender`]. At shutdown every request still queued is reported as
//! undeliverable; no request is ever silently dropped.

use crate::engine::driver::{Turn, Worker};
use crate::engine::{Engine, EngineConfig};
use crate::error::Result;
use crate::event::SourceId;
use crate::io::queue::RequestQueue;
use crate::io::request::{WriteRequest, WriteSender};
use crate::io::sink::{ByteSink, LineSink, Sink};

use log::*;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DEFAULT_WRITE_PAUSE: Duration = Duration::from_millis(5);

struct WriteWorker<K: Sink> {
    id: SourceId,
    sink: K,
    queue: Arc<RequestQueue>,
}

impl<K: Sink> Worker for WriteWorker<K> {
    fn turn(&mut self) -> Turn {
        let Some(request) = self.queue.pop() else {
            return Turn::Idle;
        };

        match self.sink.write(request.data()) {
            Ok(()) => request.notify_success(),
            Err(e) => request.notify_failure(&e),
        }
        Turn::Worked
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.sink.close() {
            warn!("Failed to close sink of {}: {e}", self.id);
        }

        let remaining = self.queue.seal();
        if !remaining.is_empty() {
            debug!("{} shut down with {} request(s) unsent", self.id, remaining.len());
        }
        for request in remaining {
            request.notify_unavailable();
        }
    }
}

/// Writes queued payloads to a [`Sink`] from a dedicated thread.
pub struct Writer<K: Sink> {
    engine: Engine<WriteWorker<K>>,
    queue: Arc<RequestQueue>,
}

impl<K: Sink> Writer<K> {
    /// Creates a writer bound to `sink`. Nothing is written until [`Self::start`].
    pub fn new(sink: K) -> Self {
        Self::with_config(sink, EngineConfig::new(DEFAULT_WRITE_PAUSE, DEFAULT_WRITE_PAUSE))
    }

    pub(crate) fn with_config(sink: K, config: EngineConfig) -> Self {
        let queue = Arc::new(RequestQueue::new());
        let shared = queue.clone();
        let engine = Engine::new("writer", config, move |id| WriteWorker {
            id,
            sink,
            queue: shared,
        });

        Self { engine, queue }
    }

    /// Starts draining the queue. Does nothing if already running.
    pub fn start(&self) -> Result<()> {
        self.engine.start()
    }

    /// Queues `data` without a completion target. Never blocks.
    pub fn send(&self, data: impl Into<Vec<u8>>) {
        self.send_request(WriteRequest::new(data));
    }

    /// Queues `data`; `sender` is told how the write went. Never blocks.
    pub fn send_with(&self, data: impl Into<Vec<u8>>, sender: Arc<dyn WriteSender>) {
        self.send_request(WriteRequest::new(data).with_sender(sender));
    }

    /// Queues a prepared request. Never blocks.
    ///
    /// If the writer has already shut down, the request's sender is told right away,
    /// on the calling thread, that the writer is closed.
    pub fn send_request(&self, request: WriteRequest) {
        if let Err(request) = self.queue.push(request) {
            warn!("{} is closed, refusing {}", self.engine.name(), request.id());
            request.notify_unavailable();
        }
    }

    /// Number of requests waiting to be written.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Asks the writer to stop once the write in progress, if any, returns.
    pub fn close(&self) {
        self.engine.close();
    }

    /// Wakes the writer from its pause; the writer then shuts down.
    pub fn interrupt(&self) {
        self.engine.interrupt();
    }

    /// Blocks until the writer thread has exited.
    pub fn join(&self) -> Result<()> {
        self.engine.join()
    }

    pub fn id(&self) -> SourceId {
        self.engine.id()
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// `true` once the sink is closed and every leftover request has been notified.
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn pause(&self) -> Duration {
        self.engine.pause()
    }

    /// Sets the sleep after each write.
    pub fn set_pause(&self, pause: Duration) {
        self.engine.set_pause(pause);
    }

    pub fn idle_pause(&self) -> Duration {
        self.engine.idle_pause()
    }

    /// Sets the sleep taken when the queue is found empty.
    pub fn set_idle_pause(&self, idle_pause: Duration) {
        self.engine.set_idle_pause(idle_pause);
    }
}

impl<W: Write + Send + 'static> Writer<LineSink<W>> {
    pub fn lines(writer: W) -> Self {
        Self::new(LineSink::new(writer))
    }
}

impl<W: Write + Send + 'static> Writer<ByteSink<W>> {
    pub fn bytes(writer: W) -> Self {
        Self::new(ByteSink::new(writer))
    }
}
