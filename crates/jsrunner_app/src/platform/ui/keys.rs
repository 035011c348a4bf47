use jsrunner_core::{Msg, Preferences};

/// One line typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Run,
    RunAgain,
    Clear,
    CopyDetails,
    ToggleAutoRun,
    ToggleAutoClear,
    ToggleDarkMode,
    Quit,
}

pub const KEY_LEGEND: &str =
    "r run | a run again | c clear | y copy error | 1 auto-run | 2 auto-clear | 3 dark mode | q quit";

pub fn parse(line: &str) -> Option<KeyCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "run" => Some(KeyCommand::Run),
        "a" | "again" => Some(KeyCommand::RunAgain),
        "c" | "clear" => Some(KeyCommand::Clear),
        "y" | "copy" => Some(KeyCommand::CopyDetails),
        "1" => Some(KeyCommand::ToggleAutoRun),
        "2" => Some(KeyCommand::ToggleAutoClear),
        "3" => Some(KeyCommand::ToggleDarkMode),
        "q" | "quit" | "exit" => Some(KeyCommand::Quit),
        _ => None,
    }
}

/// The message a command stands for; `None` for `Quit`.
pub fn to_msg(command: KeyCommand, prefs: Preferences) -> Option<Msg> {
    let msg = match command {
        KeyCommand::Run => Msg::RunClicked,
        KeyCommand::RunAgain => Msg::RunAgainClicked,
        KeyCommand::Clear => Msg::ClearClicked,
        KeyCommand::CopyDetails => Msg::CopyDetailsClicked,
        KeyCommand::ToggleAutoRun => Msg::PreferencesChanged(Preferences {
            auto_run: !prefs.auto_run,
            ..prefs
        }),
        KeyCommand::ToggleAutoClear => Msg::PreferencesChanged(Preferences {
            auto_clear: !prefs.auto_clear,
            ..prefs
        }),
        KeyCommand::ToggleDarkMode => Msg::PreferencesChanged(Preferences {
            dark_mode: !prefs.dark_mode,
            ..prefs
        }),
        KeyCommand::Quit => return None,
    };
    Some(msg)
}
