//! Error type for engine lifecycle operations.
//!
//! Transport failures observed by a running engine never surface here; they are
//! delivered as [`Event`](crate::Event)s or write callbacks. This type only covers
//! what can go wrong while *managing* an engine: spawning its thread, restarting
//! it, joining it, or opening a transport through a convenience constructor.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to spawn engine thread. {0}")]
    Spawn(#[source] io::Error),
    #[error("The engine has already shut down and cannot be restarted.")]
    Finished,
    #[error("The engine thread panicked.")]
    Panicked,
    #[error("An engine cannot be joined from its own thread.")]
    JoinFromEngine,
    #[error("I/O error. {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
