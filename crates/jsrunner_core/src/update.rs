use crate::feedback::{quick_actions_for, FeedbackState};
use crate::{
    analyze, AppState, ConsoleRecord, Effect, ExecutionResult, Msg, OutputEntry, OutputKind,
    RunPhase,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted(preferences) => {
            // Auto-run is evaluated once per session; repeats are ignored.
            if !state.begin_session() {
                return (state, Vec::new());
            }
            state.set_preferences(preferences);
            state.clear_output();
            state.set_phase(RunPhase::Idle);
            let mut effects = vec![state.publish(FeedbackState::ready())];
            if preferences.auto_run {
                effects.push(Effect::LoadSource);
            }
            effects
        }
        Msg::RunClicked => {
            state.clear_output();
            vec![state.publish(FeedbackState::running()), Effect::LoadSource]
        }
        Msg::SourceLoaded { code } => start_run(&mut state, code),
        Msg::SourceFailed { message } => {
            state.push_output(OutputEntry::new(OutputKind::Error, message.clone()));
            vec![state.publish(FeedbackState::execution_error(message, None))]
        }
        Msg::ConsoleOutput(record) => apply_console(&mut state, record),
        Msg::ExecutionFinished {
            run,
            result,
            finished_at,
        } => {
            let Some(active) = state.finish_run(run) else {
                return (state, Vec::new());
            };
            let actions = quick_actions_for(&active.code);
            let feedback = match result {
                ExecutionResult::Succeeded { exec_time_ms } => {
                    state.set_last_run_at(finished_at);
                    state.set_phase(RunPhase::Succeeded);
                    FeedbackState::succeeded(exec_time_ms)
                }
                ExecutionResult::Failed { message, details } => {
                    let text = details.clone().unwrap_or_else(|| message.clone());
                    state.push_output(OutputEntry::new(OutputKind::Error, text));
                    state.set_phase(RunPhase::Failed);
                    FeedbackState::execution_error(message, details)
                }
            };
            vec![state.publish(feedback.with_hints(active.hints).with_quick_actions(actions))]
        }
        Msg::RunAgainClicked => {
            let code = state.feedback().run_again_code().map(str::to_owned);
            match code {
                Some(code) => start_run(&mut state, code),
                None => Vec::new(),
            }
        }
        Msg::ClearClicked => {
            state.clear_output();
            state.abandon_run();
            state.set_phase(RunPhase::Idle);
            vec![state.publish(FeedbackState::cleared())]
        }
        Msg::TopicsScored { generation, links } => {
            state.attach_learn_links(generation, links);
            Vec::new()
        }
        Msg::CopyDetailsClicked => match &state.feedback().details {
            Some(details) => vec![Effect::CopyToClipboard {
                text: details.clone(),
            }],
            None => Vec::new(),
        },
        Msg::DetailsCopied => {
            if state.feedback().details.is_some() {
                state.mark_details_copied();
            }
            Vec::new()
        }
        Msg::PreferencesChanged(preferences) => {
            if preferences == state.preferences() {
                return (state, Vec::new());
            }
            state.set_preferences(preferences);
            vec![Effect::SavePreferences(preferences)]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// `Idle`/`Succeeded`/`Failed` → `Running` for `code`.
fn start_run(state: &mut AppState, code: String) -> Vec<Effect> {
    if state.preferences().auto_clear {
        state.clear_output();
    }
    let hints = analyze(&code);
    let actions = quick_actions_for(&code);
    let run = state.begin_run(code.clone(), hints.clone());
    let feedback = FeedbackState::running()
        .with_hints(hints)
        .with_quick_actions(actions);
    vec![state.publish(feedback), Effect::Execute { run, code }]
}

/// Appends a captured call; errors and warnings also replace the feedback.
fn apply_console(state: &mut AppState, record: ConsoleRecord) -> Vec<Effect> {
    state.push_output(record.entry());
    match record.kind {
        OutputKind::Error => vec![state.publish(FeedbackState::execution_error(
            record.headline,
            record.details,
        ))],
        OutputKind::Warn => vec![state.publish(FeedbackState::warning(record.headline))],
        OutputKind::Log | OutputKind::Info => Vec::new(),
    }
}
