use std::sync::{Arc, Mutex};

use jsrunner_core::{ConsoleRecord, OutputKind};
use jsrunner_engine::{Console, ConsoleValue, OutputSink};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct TestSink {
    records: Mutex<Vec<ConsoleRecord>>,
}

impl TestSink {
    fn take(&self) -> Vec<ConsoleRecord> {
        self.records.lock().unwrap().drain(..).collect()
    }
}

impl OutputSink for TestSink {
    fn emit(&self, record: ConsoleRecord) {
        self.records.lock().unwrap().push(record);
    }
}

fn console() -> (Console, Arc<TestSink>) {
    runner_logging::initialize_for_tests();
    let sink = Arc::new(TestSink::default());
    (Console::new(sink.clone()), sink)
}

#[test]
fn calls_are_recorded_in_order_with_their_channel() {
    let (console, sink) = console();
    console.log(&["a".into()]);
    console.info(&["b".into(), 2i64.into()]);
    console.log(&[serde_json::json!({"k": [1, true]}).into()]);

    let entries: Vec<_> = sink.take().iter().map(ConsoleRecord::entry).collect();
    let texts: Vec<_> = entries.iter().map(|e| (e.kind, e.text.as_str())).collect();
    assert_eq!(
        texts,
        vec![
            (OutputKind::Log, "a"),
            (OutputKind::Info, "b 2"),
            (OutputKind::Log, r#"{"k":[1,true]}"#),
        ]
    );
}

#[test]
fn error_record_carries_message_and_stack() {
    let (console, sink) = console();
    let stack = "Error: boom\n    at input.js:1:7".to_string();
    console.error(&[ConsoleValue::error("boom", Some(stack.clone())), "extra".into()]);

    let record = sink.take().remove(0);
    assert_eq!(record.kind, OutputKind::Error);
    assert_eq!(record.text, format!("{stack} extra"));
    assert_eq!(record.headline, "boom");
    assert_eq!(record.details, Some(stack));
}

#[test]
fn error_with_plain_argument_uses_its_text() {
    let (console, sink) = console();
    console.error(&["bad input".into()]);
    console.error(&[]);

    let records = sink.take();
    assert_eq!(records[0].headline, "bad input");
    assert_eq!(records[0].details, None);
    assert_eq!(records[1].headline, "undefined");
    assert_eq!(records[1].text, "");
}

#[test]
fn warning_headline_joins_arguments() {
    let (console, sink) = console();
    console.warn(&["slow".into(), 12.5f64.into(), "ms".into()]);

    let record = sink.take().remove(0);
    assert_eq!(record.kind, OutputKind::Warn);
    assert_eq!(record.headline, "slow 12.5 ms");
}

#[test]
fn host_errors_use_the_error_channel() {
    let (console, sink) = console();
    console.host_error(ConsoleValue::error("rejected", None));

    let record = sink.take().remove(0);
    assert_eq!(record.kind, OutputKind::Error);
    assert_eq!(record.text, "rejected");
}
