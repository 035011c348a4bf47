use std::fmt;

/// Console channel a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Log,
    Warn,
    Error,
    Info,
}

impl OutputKind {
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Log,
        OutputKind::Warn,
        OutputKind::Error,
        OutputKind::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Log => "log",
            OutputKind::Warn => "warn",
            OutputKind::Error => "error",
            OutputKind::Info => "info",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured line of program output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputEntry {
    pub fn new(kind: OutputKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Append-only record of everything printed during a session.
///
/// Entries are never reordered or edited; the only other mutation is a full clear.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputLog {
    entries: Vec<OutputEntry>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: OutputEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A console call after formatting, as delivered by the interceptor.
///
/// `headline` and `details` feed the feedback panel when the call is an
/// `error` or `warn`: the headline is the first argument's message (or the
/// joined text for warnings) and the details are its stack trace, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleRecord {
    pub kind: OutputKind,
    pub text: String,
    pub headline: String,
    pub details: Option<String>,
}

impl ConsoleRecord {
    /// Record whose headline is its own text, with no details.
    pub fn plain(kind: OutputKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind,
            headline: text.clone(),
            text,
            details: None,
        }
    }

    pub fn entry(&self) -> OutputEntry {
        OutputEntry::new(self.kind, self.text.clone())
    }
}
