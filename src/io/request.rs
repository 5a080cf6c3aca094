//! Write requests and their completion targets.
//!
//! A [`WriteRequest`] carries its own optional [`WriteSender`]; exactly one of the three
//! notifications reaches that sender for every request a writer accepts or refuses.

use log::*;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}

/// Private completion target of a write request.
///
/// Exactly one of the three callbacks fires per request, on the writer's thread
/// (or on the caller's thread for a request submitted after the writer shut down).
pub trait WriteSender: Send + Sync {
    fn on_write_success(&self, request: &WriteRequest);

    fn on_write_failure(&self, request: &WriteRequest, error: &io::Error);

    /// The writer shut down before this request could be written.
    fn on_writer_closed(&self, request: &WriteRequest);
}

/// One payload waiting to be written, with its optional completion target.
pub struct WriteRequest {
    id: RequestId,
    data: Vec<u8>,
    sender: Option<Arc<dyn WriteSender>>,
}

impl WriteRequest {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: RequestId::next(),
            data: data.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: Arc<dyn WriteSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sender(&self) -> Option<&Arc<dyn WriteSender>> {
        self.sender.as_ref()
    }

    pub(crate) fn notify_success(self) {
        trace!("{} written ({} bytes)", self.id, self.data.len());
        if let Some(sender) = &self.sender {
            sender.on_write_success(&self);
        }
    }

    pub(crate) fn notify_failure(self, error: &io::Error) {
        debug!("{} failed: {error}", self.id);
        if let Some(sender) = &self.sender {
            sender.on_write_failure(&self, error);
        }
    }

    pub(crate) fn notify_unavailable(self) {
        debug!("{} dropped, writer closed", self.id);
        if let Some(sender) = &self.sender {
            sender.on_writer_closed(&self);
        }
    }
}

impl fmt::Debug for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteRequest")
            .field("id", &self.id)
            .field("len", &self.data.len())
            .field("has_sender", &self.sender.is_some())
            .finish()
    }
}
