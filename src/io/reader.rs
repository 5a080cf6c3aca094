//! Asynchronous reader engine.
//!
//! A [`Reader`] owns one [`Source`] and a set of subscribers. Its thread loops:
//! read one unit, deliver the outcome to every subscriber, pause, repeat. A failed
//! read is reported and the loop carries on. End of stream or a close request ends
//! the loop, after which the source is closed and one closing event is delivered.
//!
//! # Example
//!
//! ```ignore
//! use relay::{Event, LineReader, Listener};
//! use std::sync::Arc;
//!
//! struct Print;
//!
//! impl Listener<String> for Print {
//!     fn on_success(&self, event: &Event<String>) {
//!         println!("{}", event.payload().unwrap());
//!     }
//! }
//!
//! let reader = LineReader::lines(std::io::stdin());
//! reader.add_listener(Arc::new(Print));
//! reader.start()?;
//! ```

use crate::engine::driver::{Turn, Worker};
use crate::engine::{Engine, EngineConfig};
use crate::error::Result;
use crate::event::{Event, SourceId};
use crate::io::chunks::Chunks;
use crate::io::lines::Lines;
use crate::io::source::Source;
use crate::listener::{Listener, ListenerSet};

use log::*;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

/// Reader producing one text line per event.
pub type LineReader<R> = Reader<Lines<R>>;

/// Reader producing one chunk of at most N bytes per event.
pub type ChunkReader<R> = Reader<Chunks<R>>;

pub(crate) const DEFAULT_READ_PAUSE: Duration = Duration::ZERO;

struct ReadWorker<S: Source> {
    id: SourceId,
    source: S,
    listeners: Arc<ListenerSet<S::Item>>,
}

impl<S: Source> Worker for ReadWorker<S> {
    fn turn(&mut self) -> Turn {
        let event = match self.source.next() {
            Ok(Some(item)) => Event::success(self.id, item),
            Ok(None) => return Turn::Finished,
            Err(e) => {
                debug!("Read failed on {}: {e}", self.id);
                Event::failure(self.id, e)
            }
        };

        self.listeners.dispatch(&event);
        Turn::Worked
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.source.close() {
            warn!("Failed to close source of {}: {e}", self.id);
        }
        self.listeners.dispatch(&Event::closed(self.id));
    }
}

/// Delivers everything read from a [`Source`] to its listeners, from a dedicated thread.
pub struct Reader<S: Source> {
    engine: Engine<ReadWorker<S>>,
    listeners: Arc<ListenerSet<S::Item>>,
}

impl<S: Source> Reader<S> {
    /// Creates a reader bound to `source`. Nothing is read until [`Self::start`].
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::new(DEFAULT_READ_PAUSE, DEFAULT_READ_PAUSE))
    }

    pub(crate) fn with_config(source: S, config: EngineConfig) -> Self {
        let listeners = Arc::new(ListenerSet::new());
        let shared = listeners.clone();
        let engine = Engine::new("reader", config, move |id| ReadWorker {
            id,
            source,
            listeners: shared,
        });

        Self { engine, listeners }
    }

    /// Starts reading and publishing events. Does nothing if already running.
    ///
    /// # Returns
    /// An error if the reader has already shut down or its thread could not be spawned
    pub fn start(&self) -> Result<()> {
        self.engine.start()
    }

    /// Asks the reader to stop once the read in progress, if any, returns.
    pub fn close(&self) {
        self.engine.close();
    }

    /// Wakes the reader from its pause; the reader then shuts down.
    pub fn interrupt(&self) {
        self.engine.interrupt();
    }

    /// Blocks until the reader thread has exited.
    pub fn join(&self) -> Result<()> {
        self.engine.join()
    }

    pub fn add_listener(&self, listener: Arc<dyn Listener<S::Item>>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn Listener<S::Item>>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
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

    /// `true` once the source is closed and the closing event has been delivered.
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn pause(&self) -> Duration {
        self.engine.pause()
    }

    /// Sets the sleep between two reads. Zero means read again immediately.
    pub fn set_pause(&self, pause: Duration) {
        self.engine.set_pause(pause);
    }
}

impl<R: Read + Send + 'static> Reader<Lines<R>> {
    pub fn lines(reader: R) -> Self {
        Self::new(Lines::new(reader))
    }
}

impl<R: Read + Send + 'static> Reader<Chunks<R>> {
    pub fn chunks(reader: R, len: usize) -> Self {
        Self::new(Chunks::new(reader, len))
    }
}
