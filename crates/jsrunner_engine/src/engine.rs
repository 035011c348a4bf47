use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use jsrunner_core::{score, LearnLinks, RandSampler, SuggestionSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;
use runner_logging::{runner_debug, runner_error, runner_warn};

use crate::console::{ChannelOutputSink, Console};
use crate::execute::execute;
use crate::runner::ScriptRunner;
use crate::source::CodeSource;
use crate::EngineEvent;

/// Shared sampler used for the rotating suggestion.
pub type SharedSampler = Arc<Mutex<dyn SuggestionSampler + Send>>;

/// Produces the timestamp recorded for a successful run.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Collaborators the engine works with.
#[derive(Clone)]
pub struct EngineConfig {
    pub source: Arc<dyn CodeSource>,
    pub runner: Arc<dyn ScriptRunner>,
    pub sampler: SharedSampler,
    pub clock: Clock,
}

impl EngineConfig {
    /// Uses an OS-seeded sampler and local wall-clock time.
    pub fn new(source: Arc<dyn CodeSource>, runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            source,
            runner,
            sampler: Arc::new(Mutex::new(RandSampler::new(StdRng::from_os_rng()))),
            clock: Arc::new(local_clock),
        }
    }

    pub fn with_sampler(mut self, sampler: impl SuggestionSampler + Send + 'static) -> Self {
        self.sampler = Arc::new(Mutex::new(sampler));
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// `%H:%M:%S` in local time.
pub fn local_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

enum EngineCommand {
    LoadSource,
    Execute { run: u64, code: String },
    ScoreTopics { generation: u64 },
}

#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker_tx = event_tx.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    runner_error!("engine runtime failed to start: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::LoadSource => {
                        let source = config.source.clone();
                        let event_tx = worker_tx.clone();
                        runtime.spawn(async move {
                            load_source(source.as_ref(), event_tx).await;
                        });
                    }
                    EngineCommand::ScoreTopics { generation } => {
                        let source = config.source.clone();
                        let sampler = config.sampler.clone();
                        let event_tx = worker_tx.clone();
                        runtime.spawn(async move {
                            score_topics(source.as_ref(), &sampler, generation, event_tx).await;
                        });
                    }
                    // Runs block this thread so their results arrive in order.
                    EngineCommand::Execute { run, code } => {
                        run_script(&config, run, &code, &worker_tx);
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn load_source(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadSource);
    }

    pub fn execute(&self, run: u64, code: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Execute {
            run,
            code: code.into(),
        });
    }

    pub fn score_topics(&self, generation: u64) {
        let _ = self.cmd_tx.send(EngineCommand::ScoreTopics { generation });
    }

    /// A console writing into this engine's event stream, for host-level
    /// error hooks.
    pub fn host_console(&self) -> Console {
        Console::new(Arc::new(ChannelOutputSink::new(self.event_tx.clone())))
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn load_source(source: &dyn CodeSource, event_tx: mpsc::Sender<EngineEvent>) {
    let event = match source.load().await {
        Ok(code) => {
            runner_debug!("loaded {} bytes from {}", code.len(), source.describe());
            EngineEvent::SourceLoaded { code }
        }
        Err(err) => {
            runner_warn!("loading {} failed: {} ({})", source.describe(), err, err.kind);
            EngineEvent::SourceFailed(err)
        }
    };
    let _ = event_tx.send(event);
}

async fn score_topics(
    source: &dyn CodeSource,
    sampler: &SharedSampler,
    generation: u64,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    // Without text there is nothing to detect, but a suggestion is still due.
    let code = source.load().await.unwrap_or_else(|err| {
        runner_warn!("topic scoring could not load {}: {}", source.describe(), err);
        String::new()
    });
    let found = match sampler.lock() {
        Ok(mut guard) => score(&code, &mut *guard),
        Err(poisoned) => score(&code, &mut *poisoned.into_inner()),
    };
    let _ = event_tx.send(EngineEvent::TopicsScored {
        generation,
        links: LearnLinks {
            detected: found.detected,
            suggestion: found.suggestion,
        },
    });
}

fn run_script(config: &EngineConfig, run: u64, code: &str, event_tx: &mpsc::Sender<EngineEvent>) {
    runner_logging::set_run_id(run);
    let console = Console::new(Arc::new(ChannelOutputSink::new(event_tx.clone())));
    let result = execute(config.runner.as_ref(), code, &console);
    let _ = event_tx.send(EngineEvent::ExecutionFinished {
        run,
        result,
        finished_at: (config.clock)(),
    });
}
