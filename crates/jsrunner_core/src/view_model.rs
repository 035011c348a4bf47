use crate::{AppState, FeedbackKind, Hint, OutputEntry, Preferences, RunPhase};

pub const COPY_LABEL: &str = "Copy Error";
pub const COPIED_LABEL: &str = "Copied!";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: RunPhase,
    pub entries: Vec<OutputEntry>,
    pub feedback: FeedbackView,
    pub preferences: Preferences,
    pub generation: u64,
}

/// Flattened feedback: every optional section is either present and ready to
/// print, or absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackView {
    pub status: String,
    pub message: String,
    pub kind: FeedbackKind,
    pub exec_time: Option<String>,
    pub details: Option<String>,
    pub copy_label: Option<&'static str>,
    pub suggestions: Vec<String>,
    pub hints: Vec<Hint>,
    pub learn_links: Vec<LearnLinkView>,
    pub quick_actions: Vec<&'static str>,
    pub last_run: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnLinkView {
    pub label: String,
    pub title: &'static str,
    pub page: u32,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let feedback = state.feedback();
        let mut learn_links = Vec::new();
        if let Some(links) = feedback.learn {
            if let Some(rule) = links.detected {
                learn_links.push(LearnLinkView {
                    label: format!("Learn More About ({})", rule.title),
                    title: rule.title,
                    page: rule.page,
                });
            }
            if learn_links.iter().all(|link| link.title != links.suggestion.title) {
                learn_links.push(LearnLinkView {
                    label: format!("Learn More ({})", links.suggestion.title),
                    title: links.suggestion.title,
                    page: links.suggestion.page,
                });
            }
        }

        let copy_label = feedback.details.as_ref().map(|_| {
            if state.details_copied() {
                COPIED_LABEL
            } else {
                COPY_LABEL
            }
        });

        Self {
            phase: state.phase(),
            entries: state.output().entries().to_vec(),
            feedback: FeedbackView {
                status: feedback.status.clone(),
                message: feedback.message.clone(),
                kind: feedback.kind,
                exec_time: feedback
                    .exec_time_ms
                    .map(|ms| format!("Execution time: {ms:.2} ms")),
                details: feedback.details.clone(),
                copy_label,
                suggestions: feedback.suggestions.clone(),
                hints: feedback.hints.clone(),
                learn_links,
                quick_actions: feedback.quick_actions.iter().map(|a| a.label()).collect(),
                last_run: state.last_run_at().map(|at| format!("Last run: {at}")),
            },
            preferences: state.preferences(),
            generation: state.generation(),
        }
    }
}
