mod app;
mod effects;
pub mod logging;
mod persistence;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use jsrunner_core::Preferences;

pub use app::run_app;

/// Settings resolved from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub source: String,
    pub auto_run: Option<bool>,
    pub auto_clear: Option<bool>,
    pub dark_mode: Option<bool>,
    pub once: bool,
    pub log: logging::LogDestination,
    pub node: PathBuf,
    pub timeout: Duration,
    pub reference: String,
}

impl Options {
    /// Stored preferences with any command-line overrides applied.
    pub fn apply_overrides(&self, stored: Preferences) -> Preferences {
        Preferences {
            auto_run: self.auto_run.unwrap_or(stored.auto_run),
            auto_clear: self.auto_clear.unwrap_or(stored.auto_clear),
            dark_mode: self.dark_mode.unwrap_or(stored.dark_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_flags() {
        let options = Options {
            source: "input.js".to_string(),
            auto_run: Some(true),
            auto_clear: None,
            dark_mode: Some(false),
            once: false,
            log: logging::LogDestination::Off,
            node: PathBuf::from("node"),
            timeout: Duration::from_secs(1),
            reference: "book.pdf".to_string(),
        };
        let stored = Preferences {
            auto_run: false,
            auto_clear: true,
            dark_mode: true,
        };
        assert_eq!(
            options.apply_overrides(stored),
            Preferences {
                auto_run: true,
                auto_clear: true,
                dark_mode: false,
            }
        );
    }
}
