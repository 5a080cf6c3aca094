//! The background loop shared by every engine.
//!
//! One engine owns one thread. The thread repeats: perform one unit of work, pause,
//! check whether a close was requested. When the loop ends, for whatever reason, the
//! worker's shutdown runs exactly once on that same thread.

use crate::engine::control::{Control, PauseOutcome};

use log::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Turn {
    /// Work was attempted (successfully or not); pause for the regular pause.
    Worked,
    /// Nothing to do this iteration; pause for the idle pause.
    Idle,
    /// The transport reported end of stream; stop without pausing.
    Finished,
}

/// The blocking half of an engine.
pub(crate) trait Worker: Send + 'static {
    /// Performs one blocking operation and reports its outcome to subscribers.
    fn turn(&mut self) -> Turn;

    /// Closes the transport and emits the terminal notifications.
    fn shutdown(&mut self);
}

/// Runs `worker` on the current thread until a close is requested.
///
/// If a turn panics (typically inside a subscriber callback), the shutdown sequence
/// still runs before the panic is resumed, so the transport is closed and pending
/// work is reported.
pub(crate) fn drive<W: Worker>(control: Arc<Control>, mut worker: W) {
    debug!("{} ({}) started", control.name(), control.id());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(&control, &mut worker)));
    if outcome.is_err() {
        error!("{} panicked, shutting down", control.name());
        control.request_close();
    }

    finish(&control, &mut worker);

    if let Err(payload) = outcome {
        panic::resume_unwind(payload);
    }
}

fn run<W: Worker>(control: &Control, worker: &mut W) {
    while control.is_running() {
        let turn = worker.turn();
        let pause = match turn {
            Turn::Worked => control.pause(),
            Turn::Idle => control.idle_pause(),
            Turn::Finished => {
                debug!("{} reached end of stream", control.name());
                control.request_close();
                break;
            }
        };

        match control.sleep(pause) {
            PauseOutcome::Interrupted => {
                debug!("{} pause interrupted, closing", control.name());
                control.request_close();
            }
            // Idle with no pause: yield.
            PauseOutcome::Elapsed if turn == Turn::Idle && pause.is_zero() => thread::yield_now(),
            PauseOutcome::Elapsed | PauseOutcome::Closing => {}
        }
    }
}

/// Runs the shutdown sequence and marks the engine as finished.
///
/// The engine is marked finished even when the shutdown sequence itself panics.
pub(crate) fn finish<W: Worker>(control: &Control, worker: &mut W) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.shutdown()));
    control.mark_finished();
    debug!("{} ({}) stopped", control.name(), control.id());

    if let Err(payload) = outcome {
        panic::resume_unwind(payload);
    }
}
