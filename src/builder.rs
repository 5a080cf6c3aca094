//! Fluent builder for engine construction.
//!
//! Engines have no configuration files, environment variables or command-line
//! surface; everything is set in code, either through this builder or through the
//! runtime setters on each engine.

use crate::engine::EngineConfig;
use crate::io::reader::{DEFAULT_READ_PAUSE, Reader};
use crate::io::sink::Sink;
use crate::io::source::Source;
use crate::io::writer::{DEFAULT_WRITE_PAUSE, Writer};
use crate::net::accept::{AcceptLoop, DEFAULT_ACCEPT_IDLE_PAUSE, DEFAULT_ACCEPT_PAUSE};
use crate::net::listener::Listen;

use std::time::Duration;

/// Builder for readers, writers and accept loops.
///
/// Settings left unset fall back to the defaults of the engine being built:
///
/// | Engine      | pause | idle pause |
/// | :---------- | :---- | :--------- |
/// | Reader      | 0     | 0          |
/// | Writer      | 5 ms  | 5 ms       |
/// | Accept loop | 0     | 500 ms     |
///
/// # Example
/// ```ignore
/// use relay::{EngineBuilder, Lines};
/// use std::time::Duration;
///
/// let reader = EngineBuilder::new()
///     .name("stdin-reader")
///     .pause(Duration::from_millis(10))
///     .reader(Lines::new(std::io::stdin()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    name: Option<String>,
    pause: Option<Duration>,
    idle_pause: Option<Duration>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the engine's thread. Defaults to `relay-<kind>-<id>`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sleep after each completed iteration.
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = Some(pause);
        self
    }

    /// Sleep after an iteration that found nothing to do (empty write queue, or an
    /// accept loop that is not accepting).
    pub fn idle_pause(mut self, idle_pause: Duration) -> Self {
        self.idle_pause = Some(idle_pause);
        self
    }

    pub fn reader<S: Source>(self, source: S) -> Reader<S> {
        Reader::with_config(source, self.config(DEFAULT_READ_PAUSE, DEFAULT_READ_PAUSE))
    }

    pub fn writer<K: Sink>(self, sink: K) -> Writer<K> {
        Writer::with_config(sink, self.config(DEFAULT_WRITE_PAUSE, DEFAULT_WRITE_PAUSE))
    }

    pub fn accept_loop<L: Listen>(self, listener: L) -> AcceptLoop<L> {
        AcceptLoop::with_config(
            listener,
            self.config(DEFAULT_ACCEPT_PAUSE, DEFAULT_ACCEPT_IDLE_PAUSE),
        )
    }

    fn config(self, pause: Duration, idle_pause: Duration) -> EngineConfig {
        let mut config = EngineConfig::new(
            self.pause.unwrap_or(pause),
            self.idle_pause.unwrap_or(idle_pause),
        );
        config.name = self.name;
        config
    }
}
