//! Asynchronous event-driven I/O over blocking transports.
//!
//! This crate runs each direction of a blocking transport on its own dedicated
//! thread and turns every outcome into an event or a callback, so callers can send
//! without blocking and react to inbound data without managing threads themselves.
//!
//! # Architecture
//!
//! - **Event**: Immutable outcome record (success / failure / closed) tagged with its source
//! - **Listener**: Subscriber notified of a reader's or accept loop's events
//! - **Reader**: Engine reading lines or fixed-size chunks from a [`Source`]
//! - **Writer**: Engine draining a FIFO of [`WriteRequest`]s into a [`Sink`]
//! - **AcceptLoop**: Engine accepting connections on a listening endpoint
//! - **Socket**: A reader and a writer bound to the two directions of one TCP stream
//! - **EngineBuilder**: Fluent builder for engine settings
//!
//! # Lifecycle
//!
//! Every engine is created idle, runs from `start()` until `close()` (or end of
//! stream, or an interrupted pause), then closes its transport exactly once and
//! emits its terminal notifications. Cancellation is cooperative: `close()` never
//! interrupts a blocking call that is already in progress.

mod builder;
mod engine;
mod error;
mod event;
pub mod io;
mod listener;
pub mod net;

pub use builder::EngineBuilder;
pub use error::{Error, Result};
pub use event::{Event, EventKind, Outcome, SourceId};
pub use io::chunks::Chunks;
pub use io::lines::Lines;
pub use io::reader::{ChunkReader, LineReader, Reader};
pub use io::request::{RequestId, WriteRequest, WriteSender};
pub use io::sink::{ByteSink, LineSink, Sink};
pub use io::source::Source;
pub use io::writer::Writer;
pub use listener::{Listener, ListenerSet};
pub use net::accept::{AcceptLoop, Incoming};
pub use net::listener::Listen;
pub use net::socket::{AsyncSocket, DataSocket, Socket};
