use std::time::Instant;

use jsrunner_core::ExecutionResult;
use runner_logging::{runner_debug, runner_info};

use crate::console::Console;
use crate::runner::ScriptRunner;

/// Runs `code` once and times its synchronous part.
///
/// The runner's own measurement is preferred; otherwise the wall clock around
/// the call is used. Failed runs carry no timing.
pub fn execute(runner: &dyn ScriptRunner, code: &str, console: &Console) -> ExecutionResult {
    let started = Instant::now();
    let outcome = runner.run(code, console);
    let wall = started.elapsed();

    match outcome {
        Ok(measured) => {
            let elapsed = measured.unwrap_or(wall);
            let exec_time_ms = elapsed.as_secs_f64() * 1000.0;
            runner_info!("script finished in {:.2} ms", exec_time_ms);
            ExecutionResult::Succeeded { exec_time_ms }
        }
        Err(err) => {
            runner_debug!("script failed after {:?}: {}", wall, err);
            ExecutionResult::Failed {
                message: err.message,
                details: err.details,
            }
        }
    }
}
