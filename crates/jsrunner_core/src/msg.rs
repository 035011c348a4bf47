#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Page session started with the persisted preferences.
    SessionStarted(crate::Preferences),
    /// User clicked Run; the source still has to be fetched.
    RunClicked,
    /// Fresh source text arrived for a run.
    SourceLoaded { code: String },
    /// The source could not be retrieved.
    SourceFailed { message: String },
    /// The interceptor captured a console call or a host error.
    ConsoleOutput(crate::ConsoleRecord),
    /// The synchronous part of a run finished.
    ExecutionFinished {
        run: u64,
        result: crate::ExecutionResult,
        finished_at: String,
    },
    /// User clicked the Run Again quick action.
    RunAgainClicked,
    /// User clicked Clear Output (toolbar or quick action).
    ClearClicked,
    /// A topic computation completed for the given render generation.
    TopicsScored {
        generation: u64,
        links: crate::LearnLinks,
    },
    /// User asked to copy the error details.
    CopyDetailsClicked,
    /// The clipboard collaborator accepted the details.
    DetailsCopied,
    /// User toggled an option.
    PreferencesChanged(crate::Preferences),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
