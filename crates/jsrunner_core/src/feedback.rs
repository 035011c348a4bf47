use crate::hints::Hint;
use crate::topics::{Suggestion, TopicRule};

pub const STATUS_READY: &str = "Ready";
pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_ERROR: &str = "Execution Error";
pub const STATUS_WARNING: &str = "Warning";
pub const STATUS_CLEARED: &str = "Output Cleared";

pub const ERROR_SUGGESTIONS: [&str; 3] = [
    "Check your code for typos or syntax errors.",
    "Use console.log to debug values.",
    "Refer to the error details above.",
];

pub const WARNING_SUGGESTIONS: [&str; 1] =
    ["Warnings do not stop execution, but review your code."];

pub const READY_HINTS: [&str; 3] = [
    "You can use console.log to print output.",
    "Errors and warnings will appear here.",
    "Execution time and last run will be shown after running.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackKind {
    #[default]
    Info,
    Success,
    Warn,
    Error,
}

impl FeedbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::Info => "info",
            FeedbackKind::Success => "success",
            FeedbackKind::Warn => "warn",
            FeedbackKind::Error => "error",
        }
    }
}

/// Buttons offered alongside run feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickAction {
    ClearOutput,
    /// Replays exactly this source text.
    RunAgain { code: String },
}

impl QuickAction {
    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::ClearOutput => "Clear Output",
            QuickAction::RunAgain { .. } => "Run Again",
        }
    }
}

/// The two reference links attached to a feedback render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnLinks {
    pub detected: Option<&'static TopicRule>,
    pub suggestion: Suggestion,
}

/// The single diagnostic record shown after an action. Replaced wholesale on
/// every publish; only `learn` is filled in later, at most once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackState {
    pub status: String,
    pub message: String,
    pub kind: FeedbackKind,
    pub details: Option<String>,
    pub suggestions: Vec<String>,
    pub exec_time_ms: Option<f64>,
    pub hints: Vec<Hint>,
    pub quick_actions: Vec<QuickAction>,
    pub learn: Option<LearnLinks>,
}

impl FeedbackState {
    pub fn new(status: &str, message: impl Into<String>, kind: FeedbackKind) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn ready() -> Self {
        Self::new(
            STATUS_READY,
            "Edit input.js and click Run or save to execute.",
            FeedbackKind::Info,
        )
        .with_hints(READY_HINTS.iter().map(|text| Hint::new(*text)).collect())
    }

    pub fn running() -> Self {
        Self::new(
            STATUS_RUNNING,
            "Your code is executing...",
            FeedbackKind::Info,
        )
    }

    pub fn succeeded(exec_time_ms: f64) -> Self {
        let mut state = Self::new(
            STATUS_SUCCESS,
            "Code executed successfully.",
            FeedbackKind::Success,
        );
        state.exec_time_ms = Some(exec_time_ms);
        state
    }

    pub fn execution_error(message: impl Into<String>, details: Option<String>) -> Self {
        let mut state = Self::new(STATUS_ERROR, message, FeedbackKind::Error);
        state.details = details.filter(|d| !d.is_empty());
        state.suggestions = ERROR_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        state
    }

    pub fn warning(message: impl Into<String>) -> Self {
        let mut state = Self::new(STATUS_WARNING, message, FeedbackKind::Warn);
        state.suggestions = WARNING_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        state
    }

    pub fn cleared() -> Self {
        Self::new(
            STATUS_CLEARED,
            "The output area has been cleared.",
            FeedbackKind::Info,
        )
    }

    pub fn with_hints(mut self, hints: Vec<Hint>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_quick_actions(mut self, actions: Vec<QuickAction>) -> Self {
        self.quick_actions = actions;
        self
    }

    pub fn run_again_code(&self) -> Option<&str> {
        self.quick_actions.iter().find_map(|action| match action {
            QuickAction::RunAgain { code } => Some(code.as_str()),
            QuickAction::ClearOutput => None,
        })
    }
}

/// Quick actions bound to one source text.
pub fn quick_actions_for(code: &str) -> Vec<QuickAction> {
    vec![
        QuickAction::ClearOutput,
        QuickAction::RunAgain {
            code: code.to_string(),
        },
    ]
}
