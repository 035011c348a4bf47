use std::io;

use console::{Style, Term};
use jsrunner_core::{AppViewModel, FeedbackKind, FeedbackView, OutputKind};

use super::keys::KEY_LEGEND;

/// Deep link into the reference book for `page`.
pub fn reference_link(reference: &str, page: u32) -> String {
    format!("{reference}#page={page}&view=FitH")
}

struct Palette {
    heading: Style,
    muted: Style,
    link: Style,
    success: Style,
    info: Style,
    warn: Style,
    error: Style,
}

impl Palette {
    fn new(dark: bool) -> Self {
        if dark {
            Self {
                heading: Style::new().white().bright().bold(),
                muted: Style::new().white().dim(),
                link: Style::new().cyan().bright().underlined(),
                success: Style::new().green().bright(),
                info: Style::new().cyan().bright(),
                warn: Style::new().yellow().bright(),
                error: Style::new().red().bright(),
            }
        } else {
            Self {
                heading: Style::new().black().bold(),
                muted: Style::new().dim(),
                link: Style::new().blue().underlined(),
                success: Style::new().green(),
                info: Style::new().blue(),
                warn: Style::new().yellow(),
                error: Style::new().red(),
            }
        }
    }

    fn feedback(&self, kind: FeedbackKind) -> &Style {
        match kind {
            FeedbackKind::Success => &self.success,
            FeedbackKind::Info => &self.info,
            FeedbackKind::Warn => &self.warn,
            FeedbackKind::Error => &self.error,
        }
    }

    fn entry(&self, kind: OutputKind) -> Option<&Style> {
        match kind {
            OutputKind::Log => None,
            OutputKind::Info => Some(&self.info),
            OutputKind::Warn => Some(&self.warn),
            OutputKind::Error => Some(&self.error),
        }
    }
}

/// Renders view models to the terminal; holds no state of its own.
pub struct Presenter {
    source: String,
    reference: String,
}

impl Presenter {
    pub fn new(source: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reference: reference.into(),
        }
    }

    /// Replaces whatever was on screen with `view`.
    pub fn draw(&self, term: &Term, view: &AppViewModel) -> io::Result<()> {
        term.clear_screen()?;
        self.print(term, view)
    }

    pub fn print(&self, term: &Term, view: &AppViewModel) -> io::Result<()> {
        for line in self.lines(view) {
            term.write_line(&line)?;
        }
        Ok(())
    }

    pub fn lines(&self, view: &AppViewModel) -> Vec<String> {
        let palette = Palette::new(view.preferences.dark_mode);
        let prefs = view.preferences;
        let mut lines = vec![
            format!(
                "{} {}  {}",
                palette.heading.apply_to("JsRunner"),
                self.source,
                palette.muted.apply_to(format!(
                    "[auto-run {}] [auto-clear {}] [dark mode {}]",
                    on_off(prefs.auto_run),
                    on_off(prefs.auto_clear),
                    on_off(prefs.dark_mode)
                ))
            ),
            String::new(),
            palette.heading.apply_to("Output").to_string(),
        ];

        for entry in &view.entries {
            let text = match palette.entry(entry.kind) {
                Some(style) => style.apply_to(&entry.text).to_string(),
                None => entry.text.clone(),
            };
            lines.push(text);
        }

        lines.push(String::new());
        lines.push(palette.heading.apply_to("Feedback").to_string());
        self.feedback_lines(&view.feedback, &palette, &mut lines);

        lines.push(String::new());
        lines.push(palette.muted.apply_to(KEY_LEGEND).to_string());
        lines
    }

    fn feedback_lines(&self, feedback: &FeedbackView, palette: &Palette, lines: &mut Vec<String>) {
        let style = palette.feedback(feedback.kind);
        lines.push(format!(
            "{} {}",
            style.apply_to(format!("{}:", feedback.status)).bold(),
            feedback.message
        ));

        if let Some(exec_time) = &feedback.exec_time {
            lines.push(exec_time.clone());
        }
        if let Some(last_run) = &feedback.last_run {
            lines.push(palette.muted.apply_to(last_run).to_string());
        }

        if let Some(details) = &feedback.details {
            lines.push("Details:".to_string());
            lines.extend(details.lines().map(|line| format!("  {line}")));
            if let Some(label) = feedback.copy_label {
                lines.push(format!("  [y] {label}"));
            }
        }

        if !feedback.suggestions.is_empty() {
            lines.push("Suggestions:".to_string());
            lines.extend(feedback.suggestions.iter().map(|s| format!("  - {s}")));
        }

        if !feedback.hints.is_empty() {
            lines.push("Hints:".to_string());
            for hint in &feedback.hints {
                match &hint.link {
                    Some(link) => lines.push(format!(
                        "  - {} {}",
                        hint.text,
                        palette.link.apply_to(link)
                    )),
                    None => lines.push(format!("  - {}", hint.text)),
                }
            }
        }

        for link in &feedback.learn_links {
            lines.push(format!(
                "{} {}",
                link.label,
                palette
                    .link
                    .apply_to(reference_link(&self.reference, link.page))
            ));
        }

        if !feedback.quick_actions.is_empty() {
            let actions: Vec<String> = feedback
                .quick_actions
                .iter()
                .map(|label| format!("[{}] {label}", action_key(label)))
                .collect();
            lines.push(actions.join("  "));
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn action_key(label: &str) -> char {
    match label {
        "Run Again" => 'a',
        "Clear Output" => 'c',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsrunner_core::{
        update, AppState, ExecutionResult, LearnLinks, Msg, Preferences, SUGGESTIONS,
        TOPIC_RULES,
    };
    use pretty_assertions::assert_eq;

    fn presenter() -> Presenter {
        console::set_colors_enabled(false);
        Presenter::new("input.js", "book.pdf")
    }

    fn step(state: AppState, msg: Msg) -> AppState {
        update(state, msg).0
    }

    fn failed_view() -> AppViewModel {
        let state = step(AppState::new(), Msg::SessionStarted(Preferences::default()));
        let state = step(state, Msg::RunClicked);
        let state = step(
            state,
            Msg::SourceLoaded {
                code: "function f() { console.log(1) }".to_string(),
            },
        );
        let run = state.active_run().map(|run| run.id).unwrap_or_default();
        let state = step(
            state,
            Msg::ExecutionFinished {
                run,
                result: ExecutionResult::Failed {
                    message: "x".to_string(),
                    details: Some("Error: x\n    at input.js:1:7".to_string()),
                },
                finished_at: "10:00:00".to_string(),
            },
        );
        let generation = state.generation();
        let state = step(
            state,
            Msg::TopicsScored {
                generation,
                links: LearnLinks {
                    detected: Some(&TOPIC_RULES[0]),
                    suggestion: SUGGESTIONS[0],
                },
            },
        );
        state.view()
    }

    #[test]
    fn reference_links_use_page_fragment() {
        assert_eq!(reference_link("book.pdf", 49), "book.pdf#page=49&view=FitH");
    }

    #[test]
    fn ready_view_lists_orientation_hints() {
        let state = step(AppState::new(), Msg::SessionStarted(Preferences::default()));
        let lines = presenter().lines(&state.view());

        assert!(lines.contains(
            &"Ready: Edit input.js and click Run or save to execute.".to_string()
        ));
        assert!(lines.contains(&"  - You can use console.log to print output.".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Execution time")));
        assert!(!lines.iter().any(|line| line == "Details:"));
    }

    #[test]
    fn failure_shows_details_copy_and_links_once() {
        let lines = presenter().lines(&failed_view());

        let start = lines.iter().position(|l| l == "Details:").unwrap();
        assert_eq!(
            lines[start..start + 4].to_vec(),
            vec![
                "Details:".to_string(),
                "  Error: x".to_string(),
                "      at input.js:1:7".to_string(),
                "  [y] Copy Error".to_string(),
            ]
        );

        let detected = format!(
            "Learn More About ({}) book.pdf#page={}&view=FitH",
            TOPIC_RULES[0].title, TOPIC_RULES[0].page
        );
        let suggested = format!(
            "Learn More ({}) book.pdf#page={}&view=FitH",
            SUGGESTIONS[0].title, SUGGESTIONS[0].page
        );
        assert_eq!(lines.iter().filter(|l| **l == detected).count(), 1);
        assert_eq!(lines.iter().filter(|l| **l == suggested).count(), 1);
        assert!(lines.contains(&"[c] Clear Output  [a] Run Again".to_string()));
    }
}
