use crate::feedback::{FeedbackState, LearnLinks};
use crate::hints::Hint;
use crate::output::{OutputEntry, OutputLog};
use crate::view_model::AppViewModel;
use crate::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Outcome of the synchronous part of one run. Built once the attempt has
/// fully completed or thrown, never before.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Succeeded { exec_time_ms: f64 },
    Failed {
        message: String,
        details: Option<String>,
    },
}

/// The run whose result the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRun {
    pub id: u64,
    pub code: String,
    pub hints: Vec<Hint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub auto_run: bool,
    pub auto_clear: bool,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: RunPhase,
    output: OutputLog,
    feedback: FeedbackState,
    preferences: Preferences,
    generation: u64,
    runs_started: u64,
    active_run: Option<ActiveRun>,
    last_run_at: Option<String>,
    details_copied: bool,
    session_started: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    pub fn feedback(&self) -> &FeedbackState {
        &self.feedback
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    /// Render generation of the current feedback.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_run(&self) -> Option<&ActiveRun> {
        self.active_run.as_ref()
    }

    pub fn last_run_at(&self) -> Option<&str> {
        self.last_run_at.as_deref()
    }

    pub fn details_copied(&self) -> bool {
        self.details_copied
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
        self.dirty = true;
    }

    pub(crate) fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        self.dirty = true;
    }

    /// Marks the session as started; true only the first time.
    pub(crate) fn begin_session(&mut self) -> bool {
        !std::mem::replace(&mut self.session_started, true)
    }

    /// Registers a new run and returns its id.
    pub(crate) fn begin_run(&mut self, code: String, hints: Vec<Hint>) -> u64 {
        self.runs_started += 1;
        self.active_run = Some(ActiveRun {
            id: self.runs_started,
            code,
            hints,
        });
        self.set_phase(RunPhase::Running);
        self.runs_started
    }

    /// Takes the active run if `id` is the one in flight.
    pub(crate) fn finish_run(&mut self, id: u64) -> Option<ActiveRun> {
        if self.phase != RunPhase::Running {
            return None;
        }
        match &self.active_run {
            Some(run) if run.id == id => self.active_run.take(),
            _ => None,
        }
    }

    /// Forgets the run in flight; its result will be ignored when it arrives.
    pub(crate) fn abandon_run(&mut self) {
        self.active_run = None;
    }

    pub(crate) fn push_output(&mut self, entry: OutputEntry) {
        self.output.push(entry);
        self.dirty = true;
    }

    pub(crate) fn clear_output(&mut self) {
        self.output.clear();
        self.dirty = true;
    }

    pub(crate) fn set_last_run_at(&mut self, at: String) {
        self.last_run_at = Some(at);
    }

    pub(crate) fn mark_details_copied(&mut self) {
        self.details_copied = true;
        self.dirty = true;
    }

    /// Replaces the feedback wholesale and opens a new render generation.
    ///
    /// Returns the topic computation for the new generation; results for any
    /// older generation are discarded by `attach_learn_links`.
    pub(crate) fn publish(&mut self, feedback: FeedbackState) -> Effect {
        self.feedback = feedback;
        self.feedback.learn = None;
        self.details_copied = false;
        self.generation += 1;
        self.dirty = true;
        Effect::ScoreTopics {
            generation: self.generation,
        }
    }

    /// Attaches links if `generation` is current and none are attached yet.
    pub(crate) fn attach_learn_links(&mut self, generation: u64, links: LearnLinks) -> bool {
        if generation != self.generation || self.feedback.learn.is_some() {
            return false;
        }
        self.feedback.learn = Some(links);
        self.dirty = true;
        true
    }
}
