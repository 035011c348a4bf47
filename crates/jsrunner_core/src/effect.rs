#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the source fresh and report `SourceLoaded` or `SourceFailed`.
    LoadSource,
    /// Run `code`, streaming console output, then report `ExecutionFinished`.
    Execute { run: u64, code: String },
    /// Fetch the source independently and report `TopicsScored` for `generation`.
    ScoreTopics { generation: u64 },
    CopyToClipboard { text: String },
    SavePreferences(crate::Preferences),
}
