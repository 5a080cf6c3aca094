//! Asynchronous accept loop.
//!
//! An [`AcceptLoop`] is a reader whose unit of work is "accept one connection". Each
//! accepted peer is announced to the subscribers as an [`Incoming`]; the loop does no
//! I/O on it. Accepting can be paused and resumed without closing the endpoint.
//!
//! # Usage
//!
//! ```ignore
//! use relay::{AcceptLoop, AsyncSocket, Event, Incoming, Listener};
//! use std::net::TcpListener;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl Listener<Incoming<TcpListener>> for Greeter {
//!     fn on_success(&self, event: &Event<Incoming<TcpListener>>) {
//!         if let Some(stream) = event.payload().and_then(|incoming| incoming.take()) {
//!             let socket = AsyncSocket::from_stream(stream).unwrap();
//!             socket.send("hello");
//!         }
//!     }
//! }
//!
//! let server = AcceptLoop::bind("127.0.0.1:8080")?;
//! server.add_listener(Arc::new(Greeter));
//! server.start()?;
//! ```

use crate::engine::driver::{Turn, Worker};
use crate::engine::{Engine, EngineConfig};
use crate::error::Result;
use crate::event::{Event, SourceId};
use crate::listener::{Listener, ListenerSet};
use crate::net::listener::Listen;

use log::*;
use std::fmt;
use std::net::{TcpListener, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const DEFAULT_ACCEPT_PAUSE: Duration = Duration::ZERO;
pub(crate) const DEFAULT_ACCEPT_IDLE_PAUSE: Duration = Duration::from_millis(500);

/// A freshly accepted connection.
///
/// The same event reaches every subscriber, but a connection has a single owner:
/// the first subscriber to call [`Incoming::take`] gets it.
pub struct Incoming<L: Listen> {
    conn: Mutex<Option<L::Conn>>,
    peer: L::Addr,
}

impl<L: Listen> Incoming<L> {
    fn new(conn: L::Conn, peer: L::Addr) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
            peer,
        }
    }

    /// Claims the connection. Returns `None` if another subscriber already did.
    pub fn take(&self) -> Option<L::Conn> {
        self.conn.lock().unwrap().take()
    }

    pub fn is_taken(&self) -> bool {
        self.conn.lock().unwrap().is_none()
    }

    pub fn peer_addr(&self) -> &L::Addr {
        &self.peer
    }
}

impl<L: Listen> fmt::Debug for Incoming<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incoming")
            .field("peer", &self.peer)
            .field("taken", &self.is_taken())
            .finish()
    }
}

struct AcceptWorker<L: Listen> {
    id: SourceId,
    listener: Option<L>,
    listeners: Arc<ListenerSet<Incoming<L>>>,
    accepting: Arc<AtomicBool>,
}

impl<L: Listen> Worker for AcceptWorker<L> {
    fn turn(&mut self) -> Turn {
        if !self.accepting.load(Ordering::SeqCst) {
            return Turn::Idle;
        }
        let Some(listener) = self.listener.as_mut() else {
            return Turn::Finished;
        };

        let event = match listener.accept() {
            Ok((conn, peer)) => {
                debug!("{} accepted {peer:?}", self.id);
                Event::success(self.id, Incoming::new(conn, peer))
            }
            Err(e) => {
                debug!("Accept failed on {}: {e}", self.id);
                Event::failure(self.id, e)
            }
        };

        self.listeners.dispatch(&event);
        Turn::Worked
    }

    fn shutdown(&mut self) {
        self.accepting.store(false, Ordering::SeqCst);
        if let Some(mut listener) = self.listener.take() {
            if let Err(e) = listener.close() {
                warn!("Failed to close listening endpoint of {}: {e}", self.id);
            }
        }
        self.listeners.dispatch(&Event::closed(self.id));
    }
}

/// Accepts connections on a listening endpoint from a dedicated thread.
pub struct AcceptLoop<L: Listen> {
    engine: Engine<AcceptWorker<L>>,
    listeners: Arc<ListenerSet<Incoming<L>>>,
    accepting: Arc<AtomicBool>,
    local_port: Option<u16>,
}

impl AcceptLoop<TcpListener> {
    /// Binds a TCP listener and wraps it. The loop is not started.
    ///
    /// # Arguments
    /// * `address` - Address to bind to, e.g. `"127.0.0.1:0"` for an ephemeral port
    pub fn bind<A: ToSocketAddrs>(address: A) -> Result<Self> {
        let listener = TcpListener::bind(address)?;
        Ok(Self::new(listener))
    }
}

impl<L: Listen> AcceptLoop<L> {
    /// Wraps an already bound endpoint. Nothing is accepted until [`Self::start`].
    pub fn new(listener: L) -> Self {
        Self::with_config(
            listener,
            EngineConfig::new(DEFAULT_ACCEPT_PAUSE, DEFAULT_ACCEPT_IDLE_PAUSE),
        )
    }

    pub(crate) fn with_config(listener: L, config: EngineConfig) -> Self {
        let local_port = listener.local_port();
        let listeners = Arc::new(ListenerSet::new());
        let accepting = Arc::new(AtomicBool::new(true));

        let shared_listeners = listeners.clone();
        let shared_accepting = accepting.clone();
        let engine = Engine::new("accept", config, move |id| AcceptWorker {
            id,
            listener: Some(listener),
            listeners: shared_listeners,
            accepting: shared_accepting,
        });

        Self {
            engine,
            listeners,
            accepting,
            local_port,
        }
    }

    /// Starts accepting and publishing events. Does nothing if already running.
    pub fn start(&self) -> Result<()> {
        self.engine.start()
    }

    /// Asks the loop to stop once the accept in progress, if any, returns.
    pub fn close(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        self.engine.close();
    }

    /// Wakes the loop from its pause; the loop then shuts down.
    pub fn interrupt(&self) {
        self.engine.interrupt();
    }

    /// Blocks until the loop thread has exited.
    pub fn join(&self) -> Result<()> {
        self.engine.join()
    }

    pub fn add_listener(&self, listener: Arc<dyn Listener<Incoming<L>>>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn Listener<Incoming<L>>>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Pauses or resumes accepting without closing the endpoint.
    ///
    /// Takes effect at the next loop boundary; an accept already waiting for a peer
    /// still completes. While paused the loop sleeps for the idle pause.
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// The port the endpoint was bound to when the loop was created.
    pub fn local_port(&self) -> Option<u16> {
        self.local_port
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

    /// `true` once the endpoint is closed and the closing event has been delivered.
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn pause(&self) -> Duration {
        self.engine.pause()
    }

    pub fn set_pause(&self, pause: Duration) {
        self.engine.set_pause(pause);
    }

    pub fn idle_pause(&self) -> Duration {
        self.engine.idle_pause()
    }

    /// Sets the sleep taken on each iteration while accepting is paused.
    pub fn set_idle_pause(&self, idle_pause: Duration) {
        self.engine.set_idle_pause(idle_pause);
    }
}
