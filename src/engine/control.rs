//! Shared lifecycle state of one engine.
//!
//! The control block is shared between the public engine handle and its background
//! thread. The handle flips flags and wakes the thread; the thread reads the flags at
//! each loop boundary and during its inter-iteration pause.

use crate::event::SourceId;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread::{JoinHandle, ThreadId};
use std::time::{Duration, Instant};

/// How an inter-iteration pause ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PauseOutcome {
    /// The full duration elapsed, or there was nothing to wait for.
    Elapsed,
    /// A close was requested while pausing.
    Closing,
    /// [`Control::interrupt`] was called; the engine must treat this as a close request.
    Interrupted,
}

struct Timing {
    pause: Duration,
    idle_pause: Duration,
    interrupted: bool,
}

pub(crate) struct Control {
    id: SourceId,
    name: String,
    running: AtomicBool,
    finished: AtomicBool,
    timing: Mutex<Timing>,
    wake: Condvar,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: Mutex<Option<ThreadId>>,
}

impl Control {
    pub(crate) fn new(id: SourceId, name: String, pause: Duration, idle_pause: Duration) -> Self {
        Self {
            id,
            name,
            running: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            timing: Mutex::new(Timing {
                pause,
                idle_pause,
                interrupted: false,
            }),
            wake: Condvar::new(),
            thread: Mutex::new(None),
            thread_id: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> SourceId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_running(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub(crate) fn mark_finished(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Clears the running flag and wakes a pausing engine.
    ///
    /// A blocking I/O call already in progress is not interrupted.
    pub(crate) fn request_close(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _timing = self.timing.lock().unwrap();
        self.wake.notify_all();
    }

    /// Wakes a pausing engine and marks the pause as interrupted.
    pub(crate) fn interrupt(&self) {
        let mut timing = self.timing.lock().unwrap();
        timing.interrupted = true;
        self.wake.notify_all();
    }

    pub(crate) fn pause(&self) -> Duration {
        self.timing.lock().unwrap().pause
    }

    pub(crate) fn set_pause(&self, pause: Duration) {
        self.timing.lock().unwrap().pause = pause;
    }

    pub(crate) fn idle_pause(&self) -> Duration {
        self.timing.lock().unwrap().idle_pause
    }

    pub(crate) fn set_idle_pause(&self, idle_pause: Duration) {
        self.timing.lock().unwrap().idle_pause = idle_pause;
    }

    /// Sleeps for `duration`, returning early on close or interrupt.
    ///
    /// A pending interrupt is consumed even when `duration` is zero, so an interrupt
    /// that lands while the engine is blocked on I/O is honored at the next boundary.
    /// A duration too long to represent as a deadline waits for close or interrupt only.
    pub(crate) fn sleep(&self, duration: Duration) -> PauseOutcome {
        let deadline = Instant::now().checked_add(duration);
        let mut timing = self.timing.lock().unwrap();

        loop {
            if timing.interrupted {
                timing.interrupted = false;
                return PauseOutcome::Interrupted;
            }
            if !self.is_running() {
                return PauseOutcome::Closing;
            }

            timing = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return PauseOutcome::Elapsed;
                    }
                    self.wake.wait_timeout(timing, deadline - now).unwrap().0
                }
                None => self.wake.wait(timing).unwrap(),
            };
        }
    }

    pub(crate) fn set_thread(&self, handle: JoinHandle<()>) {
        *self.thread_id.lock().unwrap() = Some(handle.thread().id());
        *self.thread.lock().unwrap() = Some(handle);
    }

    pub(crate) fn take_thread(&self) -> Option<JoinHandle<()>> {
        self.thread.lock().unwrap().take()
    }

    pub(crate) fn is_engine_thread(&self) -> bool {
        *self.thread_id.lock().unwrap() == Some(std::thread::current().id())
    }
}
