use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use console::Term;
use jsrunner_core::{update, AppState, Msg, Preferences, RunPhase};
use jsrunner_engine::{
    install_panic_hook, source_for, EngineConfig, NodeRunner, NodeSettings, SourceSettings,
};
use runner_logging::{runner_info, runner_warn};

use super::effects::EffectRunner;
use super::persistence::{self, SETTINGS_FILENAME};
use super::ui::keys::{self, KeyCommand};
use super::ui::render::Presenter;
use super::{logging, Options};

/// How long `--once` waits for learn links after the run settled.
const LINK_GRACE: Duration = Duration::from_secs(1);

pub enum AppEvent {
    Msg(Msg),
    Key(KeyCommand),
}

pub fn run_app(options: Options) -> anyhow::Result<ExitCode> {
    logging::initialize(options.log);

    let settings_path = PathBuf::from(SETTINGS_FILENAME);
    let stored = persistence::load_preferences(&settings_path);
    let prefs = options.apply_overrides(stored);
    if prefs != stored {
        persistence::save_preferences(&settings_path, prefs);
    }

    let source = source_for(&options.source, SourceSettings::default())
        .with_context(|| format!("cannot use {} as a code source", options.source))?;
    let runner = NodeRunner::new(NodeSettings {
        program: options.node.clone(),
        sync_timeout: options.timeout,
    });
    if !runner.is_available() {
        runner_warn!("{} does not start; runs will fail", options.node.display());
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(
        EngineConfig::new(source, Arc::new(runner)),
        settings_path,
        event_tx.clone(),
    );
    install_panic_hook(effects.host_console());
    let presenter = Presenter::new(options.source.clone(), options.reference.clone());
    runner_info!("session started for {}", options.source);

    if options.once {
        run_once(prefs, &effects, &event_rx, &presenter)
    } else {
        let _ = event_tx.send(AppEvent::Msg(Msg::SessionStarted(prefs)));
        spawn_input_reader(event_tx.clone());
        spawn_ticker(event_tx);
        run_interactive(&effects, &event_rx, &presenter)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn dispatch(state: AppState, msg: Msg, effects: &EffectRunner) -> AppState {
    let (state, fx) = update(state, msg);
    effects.enqueue(fx);
    state
}

fn run_interactive(
    effects: &EffectRunner,
    events: &mpsc::Receiver<AppEvent>,
    presenter: &Presenter,
) -> anyhow::Result<()> {
    let term = Term::stdout();
    let mut state = AppState::new();
    while let Ok(event) = events.recv() {
        let msg = match event {
            AppEvent::Msg(msg) => msg,
            AppEvent::Key(command) => match keys::to_msg(command, state.preferences()) {
                Some(msg) => msg,
                None => break,
            },
        };
        // Renders are coalesced onto ticks.
        let render = matches!(msg, Msg::Tick);
        state = dispatch(state, msg, effects);
        if render && state.consume_dirty() {
            presenter.draw(&term, &state.view())?;
        }
    }
    Ok(())
}

fn run_once(
    prefs: Preferences,
    effects: &EffectRunner,
    events: &mpsc::Receiver<AppEvent>,
    presenter: &Presenter,
) -> anyhow::Result<ExitCode> {
    let session = Preferences {
        auto_run: false,
        ..prefs
    };
    let mut state = dispatch(AppState::new(), Msg::SessionStarted(session), effects);
    state = dispatch(state, Msg::RunClicked, effects);

    let mut source_failed = false;
    let mut settled_at: Option<Instant> = None;
    loop {
        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(AppEvent::Msg(msg)) => {
                source_failed |= matches!(msg, Msg::SourceFailed { .. });
                state = dispatch(state, msg, effects);
            }
            Ok(AppEvent::Key(_)) | Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        let finished =
            source_failed || matches!(state.phase(), RunPhase::Succeeded | RunPhase::Failed);
        if finished && settled_at.is_none() {
            settled_at = Some(Instant::now());
        }
        if let Some(at) = settled_at {
            if state.feedback().learn.is_some() || at.elapsed() >= LINK_GRACE {
                break;
            }
        }
    }

    presenter.print(&Term::stdout(), &state.view())?;
    if source_failed || state.phase() == RunPhase::Failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = keys::parse(&line) {
                if tx.send(AppEvent::Key(command)).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(AppEvent::Key(KeyCommand::Quit));
    });
}

fn spawn_ticker(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let interval = Duration::from_millis(75);
        while tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });
}
