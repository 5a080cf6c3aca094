//! Thread-safe queue of pending write requests.
//!
//! Any thread may push; only the writer thread pops. Once sealed at shutdown, the
//! queue refuses new requests and hands them back so the caller can report them as
//! undeliverable.

use crate::io::request::WriteRequest;

use std::collections::VecDeque;
use std::sync::Mutex;

struct State {
    requests: VecDeque<WriteRequest>,
    sealed: bool,
}

pub(crate) struct RequestQueue {
    state: Mutex<State>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                requests: VecDeque::new(),
                sealed: false,
            }),
        }
    }

    /// Enqueues a request at the back of the queue.
    ///
    /// # Returns
    /// `Err(request)` if the queue has been sealed
    pub(crate) fn push(&self, request: WriteRequest) -> Result<(), WriteRequest> {
        let mut state = self.state.lock().unwrap();
        if state.sealed {
            return Err(request);
        }
        state.requests.push_back(request);
        Ok(())
    }

    /// Dequeues the oldest request, if any.
    pub(crate) fn pop(&self) -> Option<WriteRequest> {
        self.state.lock().unwrap().requests.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Refuses further pushes and returns everything still queued, oldest first.
    pub(crate) fn seal(&self) -> VecDeque<WriteRequest> {
        let mut state = self.state.lock().unwrap();
        state.sealed = true;
        std::mem::take(&mut state.requests)
    }
}
