//! Lifecycle shared by readers, writers and accept loops.
//!
//! - [`control`]: flags, pause timing and thread handle shared with the background thread
//! - [`driver`]: the loop that runs on the background thread
//!
//! An [`Engine`] is created bound to a worker but idle. `start` moves the worker onto
//! a dedicated thread; `close` asks that thread to stop at its next loop boundary.
//! Engines are single-use: once shut down they cannot be restarted.

pub(crate) mod control;
pub(crate) mod driver;

use crate::error::{Error, Result};
use crate::event::SourceId;
use control::Control;
use driver::Worker;

use log::*;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Construction-time settings of one engine.
#[derive(Debug, Clone)]
pub(crate) struct EngineConfig {
    pub(crate) name: Option<String>,
    pub(crate) pause: Duration,
    pub(crate) idle_pause: Duration,
}

impl EngineConfig {
    pub(crate) fn new(pause: Duration, idle_pause: Duration) -> Self {
        Self {
            name: None,
            pause,
            idle_pause,
        }
    }
}

/// Where the worker of an engine currently lives.
enum Slot<W> {
    /// Created, not started yet; the handle still owns the worker.
    Idle(W),
    /// Handed to the background thread.
    Started,
    /// Shut down before it was ever started.
    Closed,
}

/// Owns a worker until it is started, then the control block of its thread.
pub(crate) struct Engine<W: Worker> {
    control: Arc<Control>,
    worker: Mutex<Slot<W>>,
}

impl<W: Worker> Engine<W> {
    /// Builds an engine around `make_worker`, which receives the engine's identity.
    pub(crate) fn new(kind: &str, config: EngineConfig, make_worker: impl FnOnce(SourceId) -> W) -> Self {
        let id = SourceId::next();
        let name = config
            .name
            .unwrap_or_else(|| format!("relay-{kind}-{}", id.as_u64()));
        let control = Control::new(id, name, config.pause, config.idle_pause);

        Self {
            control: Arc::new(control),
            worker: Mutex::new(Slot::Idle(make_worker(id))),
        }
    }

    pub(crate) fn id(&self) -> SourceId {
        self.control.id()
    }

    pub(crate) fn name(&self) -> &str {
        self.control.name()
    }

    /// Launches the background thread.
    ///
    /// Calling this on an engine that is already running does nothing.
    ///
    /// # Returns
    /// `Err(Error::Finished)` if the engine has already shut down, or
    /// `Err(Error::Spawn)` if the thread could not be created
    pub(crate) fn start(&self) -> Result<()> {
        let mut slot = self.worker.lock().unwrap();
        let worker = match std::mem::replace(&mut *slot, Slot::Started) {
            Slot::Idle(worker) => worker,
            Slot::Started if !self.control.is_finished() => return Ok(()),
            Slot::Started => return Err(Error::Finished),
            Slot::Closed => {
                *slot = Slot::Closed;
                return Err(Error::Finished);
            }
        };

        self.control.mark_running();

        let control = self.control.clone();
        let spawned = thread::Builder::new()
            .name(self.control.name().to_string())
            .spawn(move || driver::drive(control, worker));

        match spawned {
            Ok(handle) => {
                self.control.set_thread(handle);
                Ok(())
            }
            Err(e) => {
                error!("Could not spawn thread for {}: {e}", self.control.name());
                self.control.mark_finished();
                Err(Error::Spawn(e))
            }
        }
    }

    /// Requests shutdown.
    ///
    /// A running engine stops at its next loop boundary; a blocking call already in
    /// progress is left to complete. An engine that was never started is shut down
    /// right here, on the caller's thread.
    pub(crate) fn close(&self) {
        let unstarted = {
            let mut slot = self.worker.lock().unwrap();
            match std::mem::replace(&mut *slot, Slot::Closed) {
                Slot::Idle(worker) => Some(worker),
                other => {
                    *slot = other;
                    None
                }
            }
        };

        match unstarted {
            Some(mut worker) => {
                debug!("{} closed before it was started", self.control.name());
                driver::finish(&self.control, &mut worker);
            }
            None => self.control.request_close(),
        }
    }

    /// Wakes the engine from its pause. The engine treats this as a close request.
    pub(crate) fn interrupt(&self) {
        self.control.interrupt();
    }

    /// Waits for the background thread to exit.
    pub(crate) fn join(&self) -> Result<()> {
        if self.control.is_engine_thread() {
            return Err(Error::JoinFromEngine);
        }

        match self.control.take_thread() {
            Some(handle) => handle.join().map_err(|_| Error::Panicked),
            None => Ok(()),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.control.is_finished()
    }

    pub(crate) fn pause(&self) -> Duration {
        self.control.pause()
    }

    pub(crate) fn set_pause(&self, pause: Duration) {
        self.control.set_pause(pause);
    }

    pub(crate) fn idle_pause(&self) -> Duration {
        self.control.idle_pause()
    }

    pub(crate) fn set_idle_pause(&self, idle_pause: Duration) {
        self.control.set_idle_pause(idle_pause);
    }
}

impl<W: Worker> Drop for Engine<W> {
    fn drop(&mut self) {
        self.close();
    }
}
