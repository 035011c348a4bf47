//! Output channel interceptor.
//!
//! A [`Console`] exposes one capture point per output kind. Each call is first
//! forwarded to the `log` facade under the `console` target, then formatted
//! into a single line and handed to an [`OutputSink`].

use std::sync::{mpsc, Arc};

use jsrunner_core::{ConsoleRecord, OutputKind};
use serde::{Deserialize, Serialize};

use crate::EngineEvent;

/// Log target used when forwarding console calls.
pub const CONSOLE_TARGET: &str = "console";

/// One argument of a console call, already reduced to what formatting needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleValue {
    /// A string argument, printed as is.
    Text { value: String },
    /// An object or array, carried as its JSON serialization.
    Json { value: String },
    /// An error-like value.
    Error {
        message: String,
        #[serde(default)]
        stack: Option<String>,
    },
    /// Anything else (numbers, booleans, undefined, functions), stringified.
    Other { value: String },
}

impl ConsoleValue {
    pub fn text(value: impl Into<String>) -> Self {
        ConsoleValue::Text {
            value: value.into(),
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        ConsoleValue::Json {
            value: value.to_string(),
        }
    }

    pub fn error(message: impl Into<String>, stack: Option<String>) -> Self {
        ConsoleValue::Error {
            message: message.into(),
            stack,
        }
    }

    pub fn other(value: impl Into<String>) -> Self {
        ConsoleValue::Other {
            value: value.into(),
        }
    }

    /// Text used in the output line: the stack for errors when there is one.
    pub fn render(&self) -> &str {
        match self {
            ConsoleValue::Error { message, stack } => stack
                .as_deref()
                .filter(|stack| !stack.is_empty())
                .unwrap_or(message),
            ConsoleValue::Text { value }
            | ConsoleValue::Json { value }
            | ConsoleValue::Other { value } => value,
        }
    }

    /// Short form for the feedback panel: the message for errors.
    pub fn headline(&self) -> &str {
        match self {
            ConsoleValue::Error { message, .. } if !message.is_empty() => message,
            other => other.render(),
        }
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            ConsoleValue::Error { stack, .. } => stack.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

impl From<&str> for ConsoleValue {
    fn from(value: &str) -> Self {
        ConsoleValue::text(value)
    }
}

impl From<String> for ConsoleValue {
    fn from(value: String) -> Self {
        ConsoleValue::text(value)
    }
}

impl From<serde_json::Value> for ConsoleValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => ConsoleValue::text(text),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                ConsoleValue::json(&value)
            }
            scalar => ConsoleValue::other(scalar.to_string()),
        }
    }
}

impl From<f64> for ConsoleValue {
    fn from(value: f64) -> Self {
        ConsoleValue::other(value.to_string())
    }
}

impl From<i64> for ConsoleValue {
    fn from(value: i64) -> Self {
        ConsoleValue::other(value.to_string())
    }
}

impl From<bool> for ConsoleValue {
    fn from(value: bool) -> Self {
        ConsoleValue::other(value.to_string())
    }
}

/// Space-joined rendering of all arguments.
pub fn format_line(args: &[ConsoleValue]) -> String {
    args.iter()
        .map(ConsoleValue::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Receives formatted console calls.
pub trait OutputSink: Send + Sync {
    fn emit(&self, record: ConsoleRecord);
}

pub struct ChannelOutputSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelOutputSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl OutputSink for ChannelOutputSink {
    fn emit(&self, record: ConsoleRecord) {
        let _ = self.tx.send(EngineEvent::Output(record));
    }
}

/// Cloneable capture handle shared by the runner and host error hooks.
#[derive(Clone)]
pub struct Console {
    sink: Arc<dyn OutputSink>,
}

impl Console {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    pub fn log(&self, args: &[ConsoleValue]) {
        self.capture(OutputKind::Log, args);
    }

    pub fn warn(&self, args: &[ConsoleValue]) {
        self.capture(OutputKind::Warn, args);
    }

    pub fn error(&self, args: &[ConsoleValue]) {
        self.capture(OutputKind::Error, args);
    }

    pub fn info(&self, args: &[ConsoleValue]) {
        self.capture(OutputKind::Info, args);
    }

    /// Routes an uncaught error or rejection into the `error` channel.
    pub fn host_error(&self, reason: ConsoleValue) {
        self.capture(OutputKind::Error, &[reason]);
    }

    pub fn capture(&self, kind: OutputKind, args: &[ConsoleValue]) {
        let text = format_line(args);
        forward(kind, &text);

        let (headline, details) = match kind {
            OutputKind::Error => match args.first() {
                Some(first) => (first.headline().to_string(), first.stack().map(str::to_string)),
                None => ("undefined".to_string(), None),
            },
            OutputKind::Warn => (
                args.iter()
                    .map(ConsoleValue::headline)
                    .collect::<Vec<_>>()
                    .join(" "),
                None,
            ),
            OutputKind::Log | OutputKind::Info => (text.clone(), None),
        };

        self.sink.emit(ConsoleRecord {
            kind,
            text,
            headline,
            details,
        });
    }
}

/// Routes host panics into the `error` channel of `console`, then runs the
/// previously installed hook.
pub fn install_panic_hook(console: Console) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        console.host_error(ConsoleValue::error(format!("host panic: {info}"), None));
        previous(info);
    }));
}

fn forward(kind: OutputKind, text: &str) {
    let level = match kind {
        OutputKind::Log | OutputKind::Info => log::Level::Info,
        OutputKind::Warn => log::Level::Warn,
        OutputKind::Error => log::Level::Error,
    };
    log::log!(target: CONSOLE_TARGET, level, "{text}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_renders_stack_then_message() {
        let with_stack = ConsoleValue::error("x", Some("Error: x\n  at f".to_string()));
        assert_eq!(with_stack.render(), "Error: x\n  at f");
        assert_eq!(with_stack.headline(), "x");

        let bare = ConsoleValue::error("x", Some(String::new()));
        assert_eq!(bare.render(), "x");
        assert_eq!(bare.stack(), None);
    }

    #[test]
    fn json_values_keep_structure() {
        let value = ConsoleValue::from(serde_json::json!({"a": [1, 2]}));
        assert_eq!(value.render(), r#"{"a":[1,2]}"#);
        assert_eq!(ConsoleValue::from(serde_json::json!(null)).render(), "null");
        assert_eq!(ConsoleValue::from(serde_json::json!("s")).render(), "s");
    }

    #[test]
    fn wire_format_is_tagged() {
        let value: ConsoleValue =
            serde_json::from_str(r#"{"type":"error","message":"m","stack":null}"#).unwrap();
        assert_eq!(value, ConsoleValue::error("m", None));
    }
}
