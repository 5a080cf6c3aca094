//! Immutable outcome records produced by engines.
//!
//! Every blocking operation an engine performs ends in exactly one [`Event`]:
//! a success carrying the payload, a failure carrying the I/O error, or the single
//! closing event emitted at shutdown.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of the engine instance that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Success,
    Failure,
    Closed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Success => write!(f, "success"),
            EventKind::Failure => write!(f, "failure"),
            EventKind::Closed => write!(f, "closed"),
        }
    }
}

/// What happened, with the data that belongs to that kind of outcome.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure(io::Error),
    Closed,
}

/// An outcome tagged with the engine that produced it.
///
/// Events are built once, handed by reference to every subscriber, then dropped.
/// A subscriber that needs the payload past its callback must copy it out.
#[derive(Debug)]
pub struct Event<T> {
    source: SourceId,
    outcome: Outcome<T>,
}

impl<T> Event<T> {
    pub fn success(source: SourceId, payload: T) -> Self {
        Self {
            source,
            outcome: Outcome::Success(payload),
        }
    }

    pub fn failure(source: SourceId, error: io::Error) -> Self {
        Self {
            source,
            outcome: Outcome::Failure(error),
        }
    }

    pub fn closed(source: SourceId) -> Self {
        Self {
            source,
            outcome: Outcome::Closed,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.outcome {
            Outcome::Success(_) => EventKind::Success,
            Outcome::Failure(_) => EventKind::Failure,
            Outcome::Closed => EventKind::Closed,
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    /// The payload, present only on success.
    pub fn payload(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// The error, present only on failure.
    pub fn error(&self) -> Option<&io::Error> {
        match &self.outcome {
            Outcome::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.outcome, Outcome::Closed)
    }

    pub fn into_payload(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }
}
