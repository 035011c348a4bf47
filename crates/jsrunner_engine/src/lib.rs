//! JsRunner engine: code sources, console interception, script execution and
//! the worker thread that turns effects into events.
mod console;
mod decode;
mod engine;
mod execute;
mod persist;
mod runner;
mod source;
mod types;

pub use console::{
    format_line, install_panic_hook, ChannelOutputSink, Console, ConsoleValue, OutputSink,
    CONSOLE_TARGET,
};
pub use decode::{decode_source, DecodeError, DecodedSource};
pub use engine::{local_clock, Clock, EngineConfig, EngineHandle, SharedSampler};
pub use execute::execute;
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use runner::{NodeRunner, NodeSettings, ScriptError, ScriptRunner};
pub use source::{source_for, CodeSource, FileCodeSource, HttpCodeSource, SourceSettings};
pub use types::{EngineEvent, FailureKind, SourceError};
