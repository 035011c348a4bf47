mod platform;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use platform::logging::LogDestination;
use platform::Options;

/// Run a JavaScript file with node and get feedback on it.
#[derive(Parser, Debug)]
#[command(name = "jsrunner", version)]
#[command(after_help = "\
Keys (type and press Enter):
  r  run            a  run again       c  clear output
  y  copy error     1/2/3  toggle auto-run / auto-clear / dark mode
  q  quit")]
struct Cli {
    /// Script to run: a file path or an http(s) URL
    #[arg(default_value = "input.js")]
    source: String,

    /// Run once as soon as the session starts (saved)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    auto_run: Option<bool>,

    /// Clear the output before every run (saved)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    auto_clear: Option<bool>,

    /// Use the dark palette (saved)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    dark_mode: Option<bool>,

    /// Run a single time, print the feedback and exit non-zero on failure
    #[arg(long)]
    once: bool,

    /// Where log lines go
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    log: LogDestination,

    /// Node executable used to run scripts
    #[arg(long, default_value = "node")]
    node: PathBuf,

    /// Kill a script whose synchronous part runs longer than this
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Reference book the learn links point into
    #[arg(long, default_value = "assets/Eloquent_JavaScript.pdf")]
    reference: String,
}

impl Cli {
    fn into_options(self) -> Options {
        Options {
            source: self.source,
            auto_run: self.auto_run,
            auto_clear: self.auto_clear,
            dark_mode: self.dark_mode,
            once: self.once,
            log: self.log,
            node: self.node,
            timeout: Duration::from_millis(self.timeout_ms),
            reference: self.reference,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    platform::run_app(Cli::parse().into_options())
}
