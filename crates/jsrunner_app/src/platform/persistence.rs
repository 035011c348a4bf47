use std::fs;
use std::path::Path;

use jsrunner_core::Preferences;
use jsrunner_engine::write_atomically;
use runner_logging::{runner_error, runner_info, runner_warn};
use serde::{Deserialize, Serialize};

pub(crate) const SETTINGS_FILENAME: &str = ".jsrunner_settings.ron";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
struct PersistedPreferences {
    auto_run: bool,
    auto_clear: bool,
    dark_mode: bool,
}

impl From<Preferences> for PersistedPreferences {
    fn from(prefs: Preferences) -> Self {
        Self {
            auto_run: prefs.auto_run,
            auto_clear: prefs.auto_clear,
            dark_mode: prefs.dark_mode,
        }
    }
}

impl From<PersistedPreferences> for Preferences {
    fn from(stored: PersistedPreferences) -> Self {
        Self {
            auto_run: stored.auto_run,
            auto_clear: stored.auto_clear,
            dark_mode: stored.dark_mode,
        }
    }
}

/// Missing or unreadable settings fall back to defaults.
pub(crate) fn load_preferences(path: &Path) -> Preferences {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            runner_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    match ron::from_str::<PersistedPreferences>(&content) {
        Ok(stored) => {
            runner_info!("Loaded preferences from {:?}", path);
            stored.into()
        }
        Err(err) => {
            runner_warn!("Failed to parse preferences from {:?}: {}", path, err);
            Preferences::default()
        }
    }
}

pub(crate) fn save_preferences(path: &Path, prefs: Preferences) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&PersistedPreferences::from(prefs), pretty) {
        Ok(text) => text,
        Err(err) => {
            runner_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(path, &content) {
        runner_error!("Failed to write preferences to {:?}: {}", path, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let prefs = load_preferences(&temp.path().join(SETTINGS_FILENAME));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn saved_preferences_load_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILENAME);
        let prefs = Preferences {
            auto_run: true,
            auto_clear: false,
            dark_mode: true,
        };

        save_preferences(&path, prefs);
        assert_eq!(load_preferences(&path), prefs);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILENAME);
        fs::write(&path, "(auto_clear: true)").unwrap();

        let prefs = load_preferences(&path);
        assert!(prefs.auto_clear);
        assert!(!prefs.auto_run);
        assert!(!prefs.dark_mode);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILENAME);
        fs::write(&path, "not ron at all {").unwrap();
        assert_eq!(load_preferences(&path), Preferences::default());
    }
}
