use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use jsrunner_core::OutputKind;
use regex::Regex;
use runner_logging::{runner_debug, runner_warn};
use serde::Deserialize;

use crate::console::{Console, ConsoleValue};

/// A thrown or rejected value from user code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ScriptError {
    pub message: String,
    pub details: Option<String>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Message is the error's message or, for non-errors, its text.
    pub fn from_value(value: &ConsoleValue) -> Self {
        Self {
            message: value.headline().to_string(),
            details: value.stack().map(str::to_string),
        }
    }
}

/// Executes script text, reporting console calls through `console`.
///
/// Returns once the synchronous part of the script is done; asynchronous work
/// may keep writing to `console` afterwards. A runner that can time that
/// synchronous part more precisely than the caller returns the measurement.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, code: &str, console: &Console) -> Result<Option<Duration>, ScriptError>;
}

impl<F> ScriptRunner for F
where
    F: Fn(&str, &Console) -> Result<Option<Duration>, ScriptError> + Send + Sync,
{
    fn run(&self, code: &str, console: &Console) -> Result<Option<Duration>, ScriptError> {
        self(code, console)
    }
}

#[derive(Debug, Clone)]
pub struct NodeSettings {
    pub program: PathBuf,
    /// Kill the process if its synchronous part runs longer than this.
    pub sync_timeout: Duration,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("node"),
            sync_timeout: Duration::from_secs(10),
        }
    }
}

/// Prefix marking protocol lines on the child's stdout.
const MARKER: &str = "\u{1e}JSRUN";

/// Installed with `node -e`; reads the script from stdin.
const PRELUDE: &str = r#"
const MARK = '\u001eJSRUN';
const fs = require('fs');
const vm = require('vm');
const { performance } = require('perf_hooks');
const emit = (record) => fs.writeSync(1, MARK + JSON.stringify(record) + '\n');
const encode = (value) => {
  if (value instanceof Error) {
    return { type: 'error', message: String(value.message ?? ''), stack: value.stack ? String(value.stack) : null };
  }
  if (typeof value === 'string') return { type: 'text', value };
  if (value !== null && typeof value === 'object') {
    try {
      const text = JSON.stringify(value);
      if (text !== undefined) return { type: 'json', value: text };
    } catch (_) {}
  }
  try {
    return { type: 'other', value: String(value) };
  } catch (_) {
    return { type: 'other', value: Object.prototype.toString.call(value) };
  }
};
for (const kind of ['log', 'warn', 'error', 'info']) {
  console[kind] = (...args) => emit({ type: 'console', kind, args: args.map(encode) });
}
process.on('uncaughtException', (error) => emit({ type: 'host_error', reason: encode(error) }));
process.on('unhandledRejection', (reason) => emit({ type: 'host_error', reason: encode(reason) }));
globalThis.require = require;
const code = fs.readFileSync(0, 'utf8');
const started = performance.now();
try {
  vm.runInThisContext(code, { filename: 'input.js' });
  emit({ type: 'done', ok: true, elapsed_ms: performance.now() - started });
} catch (error) {
  emit({ type: 'done', ok: false, error: encode(error) });
}
"#;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireRecord {
    Console {
        kind: String,
        args: Vec<ConsoleValue>,
    },
    HostError {
        reason: ConsoleValue,
    },
    Done {
        ok: bool,
        #[serde(default)]
        elapsed_ms: Option<f64>,
        #[serde(default)]
        error: Option<ConsoleValue>,
    },
}

enum Signal {
    Done(Result<Option<Duration>, ScriptError>),
    Closed,
}

/// Runs scripts in a `node` child process.
///
/// Children whose synchronous part finished keep running so their timers and
/// promises can still print; they are killed when the runner is dropped.
pub struct NodeRunner {
    settings: NodeSettings,
    lingering: Mutex<Vec<Child>>,
}

impl NodeRunner {
    pub fn new(settings: NodeSettings) -> Self {
        Self {
            settings,
            lingering: Mutex::new(Vec::new()),
        }
    }

    /// Whether the configured program can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.settings.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn spawn(&self) -> Result<Child, ScriptError> {
        Command::new(&self.settings.program)
            .arg("-e")
            .arg(PRELUDE)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                ScriptError::new(format!(
                    "failed to start {}: {err}",
                    self.settings.program.display()
                ))
            })
    }

    fn reap_finished(&self) {
        if let Ok(mut children) = self.lingering.lock() {
            children.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
        }
    }

    fn keep(&self, child: Child) {
        if let Ok(mut children) = self.lingering.lock() {
            children.push(child);
        }
    }
}

impl Default for NodeRunner {
    fn default() -> Self {
        Self::new(NodeSettings::default())
    }
}

impl Drop for NodeRunner {
    fn drop(&mut self) {
        if let Ok(children) = self.lingering.get_mut() {
            for child in children.iter_mut() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

impl ScriptRunner for NodeRunner {
    fn run(&self, code: &str, console: &Console) -> Result<Option<Duration>, ScriptError> {
        self.reap_finished();
        let mut child = self.spawn()?;

        let (signal_tx, signal_rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            let console = console.clone();
            thread::spawn(move || pump_stdout(stdout, &console, signal_tx));
        }
        if let Some(stderr) = child.stderr.take() {
            let console = console.clone();
            thread::spawn(move || pump_stderr(stderr, &console));
        }

        // Dropping stdin closes it, which ends the prelude's read.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(code.as_bytes()) {
                runner_warn!("failed to hand script to node: {}", err);
            }
        }

        match signal_rx.recv_timeout(self.settings.sync_timeout) {
            Ok(Signal::Done(result)) => {
                self.keep(child);
                result
            }
            Ok(Signal::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                let status = child
                    .wait()
                    .map_err(|err| ScriptError::new(format!("lost script process: {err}")))?;
                runner_debug!("script process exited early with {}", status);
                if status.success() {
                    Ok(None)
                } else {
                    Err(ScriptError::new(format!("Script process exited with {status}")))
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(ScriptError::new(format!(
                    "Execution timed out after {} ms",
                    self.settings.sync_timeout.as_millis()
                )))
            }
        }
    }
}

fn pump_stdout(stdout: impl Read, console: &Console, signal: mpsc::Sender<Signal>) {
    for line in BufReader::new(stdout).lines() {
        let Ok(line) = line else { break };
        // A record may be glued to a plain write that did not end its line.
        let (plain, payload) = match line.find(MARKER) {
            Some(at) => (&line[..at], Some(&line[at + MARKER.len()..])),
            None => (line.as_str(), None),
        };
        if payload.is_none() || !plain.is_empty() {
            // Plain writes to process.stdout.
            console.log(&[ConsoleValue::other(plain)]);
        }
        let Some(payload) = payload else { continue };
        match serde_json::from_str::<WireRecord>(payload) {
            Ok(WireRecord::Console { kind, args }) => {
                let kind = OutputKind::parse(&kind).unwrap_or(OutputKind::Log);
                console.capture(kind, &args);
            }
            Ok(WireRecord::HostError { reason }) => console.host_error(reason),
            Ok(WireRecord::Done {
                ok,
                elapsed_ms,
                error,
            }) => {
                let result = if ok {
                    Ok(elapsed_ms
                        .filter(|ms| ms.is_finite() && *ms >= 0.0)
                        .map(|ms| Duration::from_secs_f64(ms / 1000.0)))
                } else {
                    Err(error
                        .as_ref()
                        .map(ScriptError::from_value)
                        .unwrap_or_else(|| ScriptError::new("undefined")))
                };
                let _ = signal.send(Signal::Done(result));
            }
            Err(err) => runner_warn!("unreadable record from script process: {}", err),
        }
    }
    let _ = signal.send(Signal::Closed);
}

static NODE_WARNING: OnceLock<Option<Regex>> = OnceLock::new();

/// Whether `line` belongs to one of node's own process warnings, including
/// the `--trace-warnings` tip node prints after the first one.
fn is_node_warning(line: &str) -> bool {
    NODE_WARNING
        .get_or_init(|| Regex::new(r"^(?:\(node:\d+\) \w*Warning:|\(Use `node --trace-)").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(line))
}

fn pump_stderr(stderr: impl Read, console: &Console) {
    for line in BufReader::new(stderr).lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        if is_node_warning(&line) {
            console.warn(&[ConsoleValue::other(line)]);
        } else {
            console.host_error(ConsoleValue::other(line));
        }
    }
}
