#![allow(dead_code)]

use relay::{Event, Listener, Sink, Source, WriteRequest, WriteSender};

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What a listener observed, in a comparable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen<T> {
    Success(T),
    Failure(io::ErrorKind),
    Closed,
}

/// Listener recording every event it receives.
pub struct Recorder<T> {
    seen: Mutex<Vec<Seen<T>>>,
    changed: Condvar,
}

impl<T: Clone + Send> Recorder<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        })
    }

    fn push(&self, seen: Seen<T>) {
        self.seen.lock().unwrap().push(seen);
        self.changed.notify_all();
    }

    pub fn seen(&self) -> Vec<Seen<T>> {
        self.seen.lock().unwrap().clone()
    }

    /// Waits until at least `count` events were recorded.
    pub fn wait_for(&self, count: usize) -> Vec<Seen<T>> {
        let deadline = Instant::now() + WAIT;
        let mut seen = self.seen.lock().unwrap();
        while seen.len() < count {
            let now = Instant::now();
            assert!(now < deadline, "timed out waiting for {count} events, got {:?}", seen.len());
            seen = self.changed.wait_timeout(seen, deadline - now).unwrap().0;
        }
        seen.clone()
    }

    /// Waits until the closing event was recorded.
    pub fn wait_closed(&self) -> Vec<Seen<T>> {
        let deadline = Instant::now() + WAIT;
        let mut seen = self.seen.lock().unwrap();
        while !seen.iter().any(|s| matches!(s, Seen::Closed)) {
            let now = Instant::now();
            assert!(now < deadline, "timed out waiting for the closing event");
            seen = self.changed.wait_timeout(seen, deadline - now).unwrap().0;
        }
        seen.clone()
    }
}

impl<T: Clone + Send> Listener<T> for Recorder<T> {
    fn on_success(&self, event: &Event<T>) {
        self.push(Seen::Success(event.payload().unwrap().clone()));
    }

    fn on_failure(&self, event: &Event<T>) {
        self.push(Seen::Failure(event.error().unwrap().kind()));
    }

    fn on_closed(&self, _event: &Event<T>) {
        self.push(Seen::Closed);
    }
}

/// Spins until `counter` reaches `target`.
pub fn wait_until(counter: &AtomicUsize, target: usize) {
    let deadline = Instant::now() + WAIT;
    while counter.load(Ordering::SeqCst) < target {
        assert!(Instant::now() < deadline, "timed out waiting for counter to reach {target}");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Source replaying a fixed script, then reporting end of stream.
pub struct ScriptedSource<T> {
    script: VecDeque<io::Result<Option<T>>>,
    pub closes: Arc<AtomicUsize>,
    close_fails: bool,
}

impl<T> ScriptedSource<T> {
    pub fn new(script: Vec<io::Result<Option<T>>>) -> Self {
        Self {
            script: script.into(),
            closes: Arc::new(AtomicUsize::new(0)),
            close_fails: false,
        }
    }

    /// Like [`Self::new`], but `close` reports an error.
    pub fn failing_close(script: Vec<io::Result<Option<T>>>) -> Self {
        Self {
            close_fails: true,
            ..Self::new(script)
        }
    }
}

impl<T: Send + 'static> Source for ScriptedSource<T> {
    type Item = T;

    fn next(&mut self) -> io::Result<Option<T>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.close_fails {
            return Err(io::Error::other("scripted close failure"));
        }
        Ok(())
    }
}

/// Source yielding whatever the test sends; end of stream once the sender is dropped.
pub struct ChannelSource<T> {
    items: Receiver<T>,
    pub closes: Arc<AtomicUsize>,
    /// Number of times the engine has entered `next`.
    pub reads: Arc<AtomicUsize>,
}

impl<T> ChannelSource<T> {
    pub fn new() -> (Sender<T>, Self) {
        let (tx, rx) = std::sync::mpsc::channel();
        let source = Self {
            items: rx,
            closes: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        };
        (tx, source)
    }
}

impl<T: Send + 'static> Source for ChannelSource<T> {
    type Item = T;

    fn next(&mut self) -> io::Result<Option<T>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.recv().ok())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink recording writes. Fails every write whose payload equals `fail_on`.
pub struct MemorySink {
    pub written: Arc<Mutex<Vec<Vec<u8>>>>,
    pub closes: Arc<AtomicUsize>,
    fail_on: Option<Vec<u8>>,
    close_fails: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
            close_fails: false,
        }
    }

    /// A sink whose `close` reports an error.
    pub fn failing_close() -> Self {
        Self {
            close_fails: true,
            ..Self::new()
        }
    }

    pub fn failing_on(payload: &[u8]) -> Self {
        Self {
            fail_on: Some(payload.to_vec()),
            ..Self::new()
        }
    }
}

impl Sink for MemorySink {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        if self.fail_on.as_deref() == Some(payload) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted failure"));
        }
        self.written.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.close_fails {
            return Err(io::Error::other("scripted close failure"));
        }
        Ok(())
    }
}

/// Sink whose writes block until the test releases them one at a time.
pub struct GateSink {
    entered: Sender<Vec<u8>>,
    release: Receiver<()>,
    pub closes: Arc<AtomicUsize>,
}

pub struct Gate {
    pub entered: Receiver<Vec<u8>>,
    pub release: Sender<()>,
}

impl GateSink {
    pub fn new() -> (Gate, Self) {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let sink = Self {
            entered: entered_tx,
            release: release_rx,
            closes: Arc::new(AtomicUsize::new(0)),
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (gate, sink)
    }
}

impl Sink for GateSink {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        let _ = self.entered.send(payload.to_vec());
        self.release
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "gate dropped"))
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// How a write request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Written(Vec<u8>),
    Failed(Vec<u8>, io::ErrorKind),
    Unavailable(Vec<u8>),
}

/// Completion target recording every notification.
pub struct CompletionLog {
    entries: Mutex<Vec<Completion>>,
    changed: Condvar,
}

impl CompletionLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        })
    }

    fn push(&self, completion: Completion) {
        self.entries.lock().unwrap().push(completion);
        self.changed.notify_all();
    }

    pub fn entries(&self) -> Vec<Completion> {
        self.entries.lock().unwrap().clone()
    }

    pub fn wait_for(&self, count: usize) -> Vec<Completion> {
        let deadline = Instant::now() + WAIT;
        let mut entries = self.entries.lock().unwrap();
        while entries.len() < count {
            let now = Instant::now();
            assert!(now < deadline, "timed out waiting for {count} completions");
            entries = self.changed.wait_timeout(entries, deadline - now).unwrap().0;
        }
        entries.clone()
    }
}

impl WriteSender for CompletionLog {
    fn on_write_success(&self, request: &WriteRequest) {
        self.push(Completion::Written(request.data().to_vec()));
    }

    fn on_write_failure(&self, request: &WriteRequest, error: &io::Error) {
        self.push(Completion::Failed(request.data().to_vec(), error.kind()));
    }

    fn on_writer_closed(&self, request: &WriteRequest) {
        self.push(Completion::Unavailable(request.data().to_vec()));
    }
}
