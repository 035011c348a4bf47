//! Pattern hint engine: regex rules that flag style and maintainability
//! issues in a script's text.
//!
//! Rules run in a fixed order and hints come out in that order. A rule whose
//! pattern fails to compile contributes nothing; `analyze` never fails.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Threshold above which the function-density rule fires.
pub const MAX_FUNCTIONS_BEFORE_SPLIT: usize = 3;

/// A single observation about the submitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub text: String,
    pub link: Option<String>,
}

impl Hint {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Whether a rule fires on a match or on the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fires {
    WhenPresent,
    WhenAbsent,
}

/// Static rule: a pattern, a firing condition and the message it produces.
#[derive(Debug)]
struct HintRule {
    pattern: &'static str,
    fires: Fires,
    message: &'static str,
    link: Option<&'static str>,
}

/// Rules evaluated before the identifier heuristics.
const LINT_RULES: &[HintRule] = &[
    HintRule {
        pattern: r"console\.log",
        fires: Fires::WhenAbsent,
        message: "Tip: Use console.log to print output for debugging.",
        link: Some("https://developer.mozilla.org/en-US/docs/Web/API/console/log"),
    },
    HintRule {
        pattern: r"var ",
        fires: Fires::WhenPresent,
        message: "Consider using let/const instead of var for variable declarations.",
        link: Some(
            "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Statements/let",
        ),
    },
    HintRule {
        pattern: r"document\.write",
        fires: Fires::WhenPresent,
        message: "Avoid using document.write in modern web apps.",
        link: Some("https://developer.mozilla.org/en-US/docs/Web/API/Document/write"),
    },
    HintRule {
        pattern: r"alert\s*\(",
        fires: Fires::WhenPresent,
        message: "Avoid using alert() for user feedback; use the output area instead.",
        link: None,
    },
    HintRule {
        pattern: r"while\s*\(true\)",
        fires: Fires::WhenPresent,
        message: "Infinite loops (while(true)) can freeze the browser.",
        link: None,
    },
];

/// Informational rules evaluated last.
const STYLE_RULES: &[HintRule] = &[
    HintRule {
        pattern: r"=>",
        fires: Fires::WhenPresent,
        message: "Arrow functions detected. Good use of ES6+ features!",
        link: None,
    },
    HintRule {
        pattern: r"\bclass\b",
        fires: Fires::WhenPresent,
        message: "Class syntax detected. Consider using OOP patterns if appropriate.",
        link: None,
    },
];

static LINT_PATTERNS: OnceLock<Vec<Option<Regex>>> = OnceLock::new();
static STYLE_PATTERNS: OnceLock<Vec<Option<Regex>>> = OnceLock::new();
static DECLARATION: OnceLock<Option<Regex>> = OnceLock::new();
static FUNCTION_FORM: OnceLock<Option<Regex>> = OnceLock::new();

fn compile_rules(rules: &[HintRule]) -> Vec<Option<Regex>> {
    rules.iter().map(|rule| Regex::new(rule.pattern).ok()).collect()
}

fn declaration_pattern() -> Option<&'static Regex> {
    DECLARATION
        .get_or_init(|| Regex::new(r"(?:let|const|var)\s+(\w+)").ok())
        .as_ref()
}

fn function_pattern() -> Option<&'static Regex> {
    FUNCTION_FORM
        .get_or_init(|| Regex::new(r"function\s+\w+|=>").ok())
        .as_ref()
}

/// Scans `code` and returns every hint that applies, in rule order.
pub fn analyze(code: &str) -> Vec<Hint> {
    let mut hints = Vec::new();

    let lint = LINT_PATTERNS.get_or_init(|| compile_rules(LINT_RULES));
    apply_rules(code, LINT_RULES, lint, &mut hints);

    for name in unused_bindings(code) {
        hints.push(Hint::new(format!(
            "Variable '{name}' is declared but not used."
        )));
    }

    let functions = count_functions(code);
    if functions > MAX_FUNCTIONS_BEFORE_SPLIT {
        hints.push(Hint::new(format!(
            "You have {functions} functions. Consider splitting code into modules for maintainability."
        )));
    }

    let style = STYLE_PATTERNS.get_or_init(|| compile_rules(STYLE_RULES));
    apply_rules(code, STYLE_RULES, style, &mut hints);

    hints
}

fn apply_rules(code: &str, rules: &[HintRule], patterns: &[Option<Regex>], out: &mut Vec<Hint>) {
    for (rule, pattern) in rules.iter().zip(patterns) {
        let Some(pattern) = pattern else { continue };
        let present = pattern.is_match(code);
        let fires = match rule.fires {
            Fires::WhenPresent => present,
            Fires::WhenAbsent => !present,
        };
        if fires {
            let hint = Hint::new(rule.message);
            out.push(match rule.link {
                Some(link) => hint.with_link(link),
                None => hint,
            });
        }
    }
}

/// Identifiers declared with `let`/`const`/`var` that occur fewer than twice.
///
/// Scope-unaware on purpose: shadowed names, and names repeated inside comments
/// or strings, count as usages. Each name is reported at most once, in
/// declaration order.
pub fn unused_bindings(code: &str) -> Vec<String> {
    let Some(declaration) = declaration_pattern() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut unused = Vec::new();
    for caps in declaration.captures_iter(code) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !seen.insert(name) {
            continue;
        }
        if count_identifier(code, name) < 2 {
            unused.push(name.to_string());
        }
    }
    unused
}

/// Counts word-bounded occurrences of `name` that are not property accesses.
fn count_identifier(code: &str, name: &str) -> usize {
    let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
        return 0;
    };
    pattern
        .find_iter(code)
        .filter(|m| !code[..m.start()].ends_with('.'))
        .count()
}

/// Named `function` declarations plus arrow functions.
pub fn count_functions(code: &str) -> usize {
    function_pattern().map_or(0, |pattern| pattern.find_iter(code).count())
}
