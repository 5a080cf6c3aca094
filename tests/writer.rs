mod common;

use common::{Completion, CompletionLog, GateSink, MemorySink, WAIT, init_logging};
use relay::{EngineBuilder, Error, WriteRequest, WriteSender, Writer};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[test]
fn completions_fire_in_submission_order() {
    init_logging();
    let sink = MemorySink::new();
    let written = sink.written.clone();
    let writer = Writer::new(sink);
    let log = CompletionLog::new();

    for i in 0..20 {
        writer.send_with(format!("message {i}"), log.clone());
    }
    writer.start().expect("start");

    let entries = log.wait_for(20);
    let expected: Vec<Completion> = (0..20)
        .map(|i| Completion::Written(format!("message {i}").into_bytes()))
        .collect();
    assert_eq!(entries, expected);
    assert_eq!(written.lock().unwrap().len(), 20);

    writer.close();
    writer.join().expect("join");
}

#[test]
fn failed_write_is_reported_and_writing_continues() {
    init_logging();
    let writer = EngineBuilder::new()
        .pause(Duration::ZERO)
        .writer(MemorySink::failing_on(b"bad"));
    let log = CompletionLog::new();
    writer.start().expect("start");

    writer.send_with("good", log.clone());
    writer.send_with("bad", log.clone());
    writer.send_with("also good", log.clone());

    assert_eq!(
        log.wait_for(3),
        vec![
            Completion::Written(b"good".to_vec()),
            Completion::Failed(b"bad".to_vec(), io::ErrorKind::BrokenPipe),
            Completion::Written(b"also good".to_vec()),
        ]
    );

    writer.close();
    writer.join().expect("join");
}

#[test]
fn queued_requests_are_reported_unavailable_on_close() {
    init_logging();
    let (gate, sink) = GateSink::new();
    let closes = sink.closes.clone();
    let writer = Writer::new(sink);
    let log = CompletionLog::new();
    writer.start().expect("start");

    writer.send_with("in flight", log.clone());
    assert_eq!(gate.entered.recv_timeout(WAIT).unwrap(), b"in flight");

    writer.send_with("queued 1", log.clone());
    writer.send_with("queued 2", log.clone());
    writer.send_with("queued 3", log.clone());
    assert_eq!(writer.pending(), 3);

    writer.close();
    gate.release.send(()).unwrap();
    writer.join().expect("join");

    assert_eq!(
        log.entries(),
        vec![
            Completion::Written(b"in flight".to_vec()),
            Completion::Unavailable(b"queued 1".to_vec()),
            Completion::Unavailable(b"queued 2".to_vec()),
            Completion::Unavailable(b"queued 3".to_vec()),
        ]
    );
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(writer.pending(), 0);
}

#[test]
fn close_with_zero_pause_and_no_sender_drains_and_stops() {
    init_logging();
    let sink = MemorySink::new();
    let closes = sink.closes.clone();
    let writer = Writer::new(sink);
    writer.set_pause(Duration::ZERO);
    writer.start().expect("start");

    writer.send("x");
    writer.close();
    writer.join().expect("join");

    assert!(!writer.is_running());
    assert!(writer.is_finished());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(writer.pending(), 0);
}

#[test]
fn send_after_shutdown_is_reported_unavailable_immediately() {
    init_logging();
    let writer = Writer::new(MemorySink::new());
    let log = CompletionLog::new();
    writer.start().expect("start");
    writer.close();
    writer.join().expect("join");

    writer.send_with("too late", log.clone());

    assert_eq!(
        log.entries(),
        vec![Completion::Unavailable(b"too late".to_vec())]
    );
    assert_eq!(writer.pending(), 0);
}

#[test]
fn unstarted_writer_drains_on_close() {
    init_logging();
    let sink = MemorySink::new();
    let written = sink.written.clone();
    let writer = Writer::new(sink);
    let log = CompletionLog::new();

    writer.send_request(WriteRequest::new("a").with_sender(log.clone()));
    writer.send_request(WriteRequest::new(b"b".to_vec()).with_sender(log.clone()));
    writer.close();

    assert!(written.lock().unwrap().is_empty());
    assert_eq!(
        log.entries(),
        vec![
            Completion::Unavailable(b"a".to_vec()),
            Completion::Unavailable(b"b".to_vec()),
        ]
    );
}

#[test]
fn line_sink_appends_a_newline_per_payload() {
    use relay::{LineSink, Sink};
    use std::io::Write as _;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let out = Shared(Arc::new(Mutex::new(Vec::new())));
    let mut sink = LineSink::new(out.clone());
    sink.write(b"one").unwrap();
    sink.write(b"two").unwrap();
    sink.close().unwrap();

    assert_eq!(&*out.0.lock().unwrap(), b"one\ntwo\n");
    assert_eq!(
        sink.write(b"three").unwrap_err().kind(),
        io::ErrorKind::NotConnected
    );
}

#[test]
fn failing_sink_close_still_reports_queued_requests() {
    init_logging();
    let sink = MemorySink::failing_close();
    let closes = sink.closes.clone();
    let writer = Writer::new(sink);
    let log = CompletionLog::new();

    writer.send_with("a", log.clone());
    writer.send_with("b", log.clone());
    writer.close();

    assert!(writer.is_finished());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(
        log.entries(),
        vec![
            Completion::Unavailable(b"a".to_vec()),
            Completion::Unavailable(b"b".to_vec()),
        ]
    );
}

#[test]
fn unbounded_idle_pause_waits_for_close() {
    init_logging();
    let sink = MemorySink::new();
    let closes = sink.closes.clone();
    let writer = EngineBuilder::new()
        .idle_pause(Duration::MAX)
        .writer(sink);
    writer.start().expect("start");
    std::thread::sleep(Duration::from_millis(50));

    let log = CompletionLog::new();
    writer.send_with("queued", log.clone());
    let closing = Instant::now();
    writer.close();
    writer.join().expect("join");

    assert!(closing.elapsed() < Duration::from_secs(5));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(log.entries(), vec![Completion::Unavailable(b"queued".to_vec())]);
    assert_eq!(writer.pending(), 0);
}

/// Completion target that panics when its write succeeds.
struct Explode;

impl WriteSender for Explode {
    fn on_write_success(&self, _request: &WriteRequest) {
        panic!("completion failure");
    }

    fn on_write_failure(&self, _request: &WriteRequest, _error: &io::Error) {}

    fn on_writer_closed(&self, _request: &WriteRequest) {}
}

#[test]
fn panicking_completion_still_drains_the_queue() {
    init_logging();
    let sink = MemorySink::new();
    let closes = sink.closes.clone();
    let writer = Writer::new(sink);
    let log = CompletionLog::new();

    writer.send_with("first", Arc::new(Explode));
    writer.send_with("second", log.clone());
    writer.start().expect("start");

    assert!(matches!(writer.join(), Err(Error::Panicked)));
    assert!(writer.is_finished());
    assert!(!writer.is_running());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(log.entries(), vec![Completion::Unavailable(b"second".to_vec())]);
    assert_eq!(writer.pending(), 0);

    let late = CompletionLog::new();
    writer.send_with("late", late.clone());
    assert_eq!(late.entries(), vec![Completion::Unavailable(b"late".to_vec())]);
}
