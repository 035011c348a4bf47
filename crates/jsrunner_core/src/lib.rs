//! JsRunner core: pure run/feedback state machine, view-model helpers and the
//! pattern-based code analysis behind the feedback panel.
mod effect;
mod feedback;
mod hints;
mod msg;
mod output;
mod state;
mod topics;
mod update;
mod view_model;

pub use effect::Effect;
pub use feedback::{
    quick_actions_for, FeedbackKind, FeedbackState, LearnLinks, QuickAction, ERROR_SUGGESTIONS,
    READY_HINTS, STATUS_CLEARED, STATUS_ERROR, STATUS_READY, STATUS_RUNNING, STATUS_SUCCESS,
    STATUS_WARNING, WARNING_SUGGESTIONS,
};
pub use hints::{analyze, count_functions, unused_bindings, Hint, MAX_FUNCTIONS_BEFORE_SPLIT};
pub use msg::Msg;
pub use output::{ConsoleRecord, OutputEntry, OutputKind, OutputLog};
pub use state::{ActiveRun, AppState, ExecutionResult, Preferences, RunPhase};
pub use topics::{
    detect_topic, pick_suggestion, sanitize, score, topic_scores, FixedSampler, RandSampler,
    Suggestion, SuggestionSampler, TopicMatch, TopicRule, SUGGESTIONS, TOPIC_RULES,
};
pub use update::update;
pub use view_model::{AppViewModel, FeedbackView, LearnLinkView, COPIED_LABEL, COPY_LABEL};
