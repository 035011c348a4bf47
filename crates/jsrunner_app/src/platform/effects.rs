use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use jsrunner_core::{Effect, Msg};
use jsrunner_engine::{write_atomically, Console, EngineConfig, EngineEvent, EngineHandle};
use runner_logging::{runner_error, runner_info, runner_warn};

use super::app::AppEvent;
use super::persistence;

pub(crate) const CLIPBOARD_FILENAME: &str = ".jsrunner_clipboard.txt";

/// Turns core effects into engine commands and file writes, and feeds engine
/// events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    settings_path: PathBuf,
    clipboard_path: PathBuf,
    events: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        settings_path: PathBuf,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        let engine = EngineHandle::new(config);
        let runner = Self {
            engine,
            settings_path,
            clipboard_path: PathBuf::from(CLIPBOARD_FILENAME),
            events,
        };
        runner.spawn_event_loop();
        runner
    }

    pub fn host_console(&self) -> Console {
        self.engine.host_console()
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadSource => self.engine.load_source(),
                Effect::Execute { run, code } => {
                    runner_info!("Execute run={} code_len={}", run, code.len());
                    self.engine.execute(run, code);
                }
                Effect::ScoreTopics { generation } => self.engine.score_topics(generation),
                Effect::CopyToClipboard { text } => {
                    match write_atomically(&self.clipboard_path, &text) {
                        Ok(()) => {
                            let _ = self.events.send(AppEvent::Msg(Msg::DetailsCopied));
                        }
                        Err(err) => runner_error!(
                            "Failed to copy details to {:?}: {}",
                            self.clipboard_path,
                            err
                        ),
                    }
                }
                Effect::SavePreferences(prefs) => {
                    persistence::save_preferences(&self.settings_path, prefs);
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let events = self.events.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if events.send(AppEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Output(record) => Msg::ConsoleOutput(record),
        EngineEvent::SourceLoaded { code } => Msg::SourceLoaded { code },
        EngineEvent::SourceFailed(err) => {
            runner_warn!("Source failed ({}): {}", err.kind, err);
            Msg::SourceFailed {
                message: err.to_string(),
            }
        }
        EngineEvent::ExecutionFinished {
            run,
            result,
            finished_at,
        } => Msg::ExecutionFinished {
            run,
            result,
            finished_at,
        },
        EngineEvent::TopicsScored { generation, links } => {
            Msg::TopicsScored { generation, links }
        }
    }
}
