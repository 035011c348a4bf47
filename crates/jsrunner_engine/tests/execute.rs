use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jsrunner_core::{ConsoleRecord, ExecutionResult, OutputKind};
use jsrunner_engine::{execute, Console, ConsoleValue, OutputSink, ScriptError};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct TestSink {
    records: Mutex<Vec<ConsoleRecord>>,
}

impl OutputSink for TestSink {
    fn emit(&self, record: ConsoleRecord) {
        self.records.lock().unwrap().push(record);
    }
}

fn console() -> (Console, Arc<TestSink>) {
    let sink = Arc::new(TestSink::default());
    (Console::new(sink.clone()), sink)
}

#[test]
fn successful_run_keeps_output_order() {
    let (console, sink) = console();
    let runner = |_: &str, console: &Console| -> Result<Option<Duration>, ScriptError> {
        console.log(&["a".into()]);
        console.log(&["b".into()]);
        Ok(None)
    };

    let result = execute(&runner, "console.log('a'); console.log('b')", &console);
    assert!(matches!(result, ExecutionResult::Succeeded { exec_time_ms } if exec_time_ms >= 0.0));

    let entries: Vec<_> = sink
        .records
        .lock()
        .unwrap()
        .iter()
        .map(|r| (r.kind, r.text.clone()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (OutputKind::Log, "a".to_string()),
            (OutputKind::Log, "b".to_string()),
        ]
    );
}

#[test]
fn thrown_error_becomes_failed_result() {
    let (console, sink) = console();
    let runner = |_: &str, _: &Console| -> Result<Option<Duration>, ScriptError> {
        Err(ScriptError::from_value(&ConsoleValue::error(
            "x",
            Some("Error: x\n    at input.js:1:7".to_string()),
        )))
    };

    let result = execute(&runner, "throw new Error(\"x\")", &console);
    assert_eq!(
        result,
        ExecutionResult::Failed {
            message: "x".to_string(),
            details: Some("Error: x\n    at input.js:1:7".to_string()),
        }
    );
    // The controller records the failure; the executor itself prints nothing.
    assert!(sink.records.lock().unwrap().is_empty());
}

#[test]
fn runner_measurement_wins_over_wall_clock() {
    let (console, _) = console();
    let runner = |_: &str, _: &Console| -> Result<Option<Duration>, ScriptError> {
        thread::sleep(Duration::from_millis(20));
        Ok(Some(Duration::from_micros(1500)))
    };

    match execute(&runner, "", &console) {
        ExecutionResult::Succeeded { exec_time_ms } => {
            assert!((exec_time_ms - 1.5).abs() < 1e-9, "got {exec_time_ms}")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn wall_clock_covers_the_synchronous_part() {
    let (console, _) = console();
    let runner = |_: &str, _: &Console| -> Result<Option<Duration>, ScriptError> {
        thread::sleep(Duration::from_millis(15));
        Ok(None)
    };

    match execute(&runner, "", &console) {
        ExecutionResult::Succeeded { exec_time_ms } => assert!(exec_time_ms >= 15.0),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn late_output_still_reaches_the_sink() {
    let (console, sink) = console();
    let runner = |_: &str, console: &Console| -> Result<Option<Duration>, ScriptError> {
        let late = console.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            late.log(&["later".into()]);
        });
        Ok(None)
    };

    let result = execute(&runner, "setTimeout(() => console.log('later'), 10)", &console);
    assert!(matches!(result, ExecutionResult::Succeeded { .. }));

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while sink.records.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(sink.records.lock().unwrap()[0].text, "later");
}
