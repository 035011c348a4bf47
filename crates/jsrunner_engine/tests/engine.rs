use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsrunner_core::{ExecutionResult, FixedSampler, OutputKind, RandSampler, SUGGESTIONS};
use jsrunner_engine::{
    Console, EngineConfig, EngineEvent, EngineHandle, FailureKind, FileCodeSource, ScriptError,
    SourceSettings,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn echo_runner(code: &str, console: &Console) -> Result<Option<Duration>, ScriptError> {
    if let Some(message) = code.strip_prefix("throw ") {
        return Err(ScriptError::new(message));
    }
    console.log(&[code.into()]);
    Ok(Some(Duration::from_millis(500)))
}

fn engine_for(dir: &TempDir, code: Option<&str>) -> EngineHandle {
    runner_logging::initialize_for_tests();
    let file = dir.path().join("input.js");
    if let Some(code) = code {
        fs::write(&file, code).unwrap();
    }
    let config = EngineConfig::new(
        Arc::new(FileCodeSource::new(file, &SourceSettings::default())),
        Arc::new(echo_runner),
    )
    .with_sampler(FixedSampler(0))
    .with_clock(|| "12:34:56".to_string());
    EngineHandle::new(config)
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            return event;
        }
    }
    panic!("engine produced no event");
}

#[test]
fn load_source_reports_current_text() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, Some("console.log(1)"));

    engine.load_source();
    assert_eq!(
        next_event(&engine),
        EngineEvent::SourceLoaded {
            code: "console.log(1)".to_string()
        }
    );
}

#[test]
fn missing_source_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, None);

    engine.load_source();
    match next_event(&engine) {
        EngineEvent::SourceFailed(err) => assert_eq!(err.kind, FailureKind::NotFound),
        other => panic!("unexpected event: {other:?}"),
    }

    fs::write(dir.path().join("input.js"), "ok").unwrap();
    engine.load_source();
    assert!(matches!(next_event(&engine), EngineEvent::SourceLoaded { .. }));
}

#[test]
fn execution_streams_output_before_finishing() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, Some(""));

    engine.execute(4, "hello");
    match next_event(&engine) {
        EngineEvent::Output(record) => {
            assert_eq!(record.kind, OutputKind::Log);
            assert_eq!(record.text, "hello");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(
        next_event(&engine),
        EngineEvent::ExecutionFinished {
            run: 4,
            result: ExecutionResult::Succeeded { exec_time_ms: 500.0 },
            finished_at: "12:34:56".to_string(),
        }
    );
}

#[test]
fn failed_execution_carries_the_message() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, Some(""));

    engine.execute(1, "throw x");
    match next_event(&engine) {
        EngineEvent::ExecutionFinished {
            run: 1,
            result: ExecutionResult::Failed { message, details },
            ..
        } => {
            assert_eq!(message, "x");
            assert_eq!(details, None);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn topics_are_scored_for_the_requested_generation() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, Some("async function f() { await g(); }"));

    engine.score_topics(9);
    match next_event(&engine) {
        EngineEvent::TopicsScored { generation, links } => {
            assert_eq!(generation, 9);
            let detected = links.detected.expect("topic detected");
            assert_ne!(links.suggestion.title, detected.title);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn scoring_without_source_still_suggests() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, None);

    engine.score_topics(2);
    match next_event(&engine) {
        EngineEvent::TopicsScored { generation, links } => {
            assert_eq!(generation, 2);
            assert_eq!(links.detected, None);
            assert_eq!(links.suggestion, SUGGESTIONS[0]);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn host_console_feeds_the_event_stream() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&dir, Some(""));

    engine
        .host_console()
        .host_error(jsrunner_engine::ConsoleValue::error("outside", None));
    match next_event(&engine) {
        EngineEvent::Output(record) => {
            assert_eq!(record.kind, OutputKind::Error);
            assert_eq!(record.headline, "outside");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn seeded_sampler_repeats_its_suggestions() {
    runner_logging::initialize_for_tests();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("input.js");
    fs::write(&file, "let x = 1;").unwrap();

    let draws = |seed: u64| -> Vec<&'static str> {
        let config = EngineConfig::new(
            Arc::new(FileCodeSource::new(file.clone(), &SourceSettings::default())),
            Arc::new(echo_runner),
        )
        .with_sampler(RandSampler::new(ChaCha8Rng::seed_from_u64(seed)));
        let engine = EngineHandle::new(config);
        (0..5)
            .map(|generation| {
                engine.score_topics(generation);
                match next_event(&engine) {
                    EngineEvent::TopicsScored { links, .. } => links.suggestion.title,
                    other => panic!("unexpected event: {other:?}"),
                }
            })
            .collect()
    };

    assert_eq!(draws(11), draws(11));
}
