//! Topic scorer: maps a script onto a chapter of the reference book and picks
//! a second, different chapter for further reading.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

/// A weighted pattern group tied to one reference chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRule {
    pub patterns: &'static [&'static str],
    pub title: &'static str,
    pub page: u32,
    pub weight: u32,
}

/// A chapter eligible for the rotating "further reading" link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub title: &'static str,
    pub page: u32,
}

/// Result of scoring one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicMatch {
    pub detected: Option<&'static TopicRule>,
    pub suggestion: Suggestion,
}

pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        patterns: &[r"\bfunction\b", r"=>"],
        title: "Functions",
        page: 49,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"\basync\b", r"\bawait\b", r"Promise"],
        title: "Asynchronous Programming",
        page: 223,
        weight: 3,
    },
    TopicRule {
        patterns: &[r"\bclass\s+\w+"],
        title: "The Secret Life of Objects",
        page: 113,
        weight: 3,
    },
    TopicRule {
        patterns: &[r"\bArray\b", r"\[.*\]", r"\.map\(", r"\.filter\(", r"\.reduce\("],
        title: "Data Structures: Arrays",
        page: 69,
        weight: 2,
    },
    TopicRule {
        patterns: &[
            r"\bObject\b",
            r"\{.*\}",
            r"Object\.keys",
            r"Object\.values",
            r"Object\.entries",
        ],
        title: "Data Structures: Objects",
        page: 69,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"new Set\b", r"\bSet\s*\("],
        title: "Sets",
        page: 69,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"new Map\b", r"\bMap\s*\("],
        title: "Maps",
        page: 69,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"try\s*\{", r"catch\s*\(", r"throw\b", r"Error\b"],
        title: "Bugs and Error Handling",
        page: 157,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"[^\w]/[^\w]", r"RegExp\b"],
        title: "Regular Expressions",
        page: 179,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"(?i)canvas"],
        title: "Drawing on Canvas",
        page: 355,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"\bfetch\b", r"XMLHttpRequest", r"(?i)ajax"],
        title: "HTTP and Forms",
        page: 377,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"addEventListener", r"dispatchEvent", r"CustomEvent"],
        title: "Handling Events",
        page: 311,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"(?i)node\.", r"require\(", r"module\.exports"],
        title: "Node.js",
        page: 421,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"import\s+", r"export\s+"],
        title: "Modules",
        page: 201,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"document\.", r"window\."],
        title: "The Document Object Model",
        page: 289,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"localStorage", r"sessionStorage"],
        title: "Web Storage",
        page: 553,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"JSON\.parse", r"JSON\.stringify"],
        title: "JSON",
        page: 575,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"performance\.", r"(?i)memory"],
        title: "Memory and Performance",
        page: 465,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"test\(", r"assert"],
        title: "Testing",
        page: 619,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"debugger", r"console\.debug"],
        title: "Debugging",
        page: 487,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"function\s*\(", r"=>", r"map\("],
        title: "Functional Programming",
        page: 509,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"catch\(", r"try\{"],
        title: "Error Handling Patterns",
        page: 597,
        weight: 2,
    },
    TopicRule {
        patterns: &[r"(?i)best practice", r"(?i)clean code"],
        title: "Best Practices",
        page: 641,
        weight: 2,
    },
];

// Page numbers already include the book's front matter offset.
pub const SUGGESTIONS: &[Suggestion] = &[
    Suggestion { title: "Introduction", page: 13 },
    Suggestion { title: "Values, Types, and Operators", page: 27 },
    Suggestion { title: "Program Structure", page: 41 },
    Suggestion { title: "Functions", page: 49 },
    Suggestion { title: "Data Structures: Objects and Arrays", page: 69 },
    Suggestion { title: "Higher-Order Functions", page: 91 },
    Suggestion { title: "The Secret Life of Objects", page: 113 },
    Suggestion { title: "Project: A Robot", page: 135 },
    Suggestion { title: "Bugs and Error Handling", page: 157 },
    Suggestion { title: "Regular Expressions", page: 179 },
    Suggestion { title: "Modules", page: 201 },
    Suggestion { title: "Asynchronous Programming", page: 223 },
    Suggestion { title: "Project: Skill-Sharing Website", page: 245 },
    Suggestion { title: "JavaScript and the Browser", page: 267 },
    Suggestion { title: "The Document Object Model", page: 289 },
    Suggestion { title: "Handling Events", page: 311 },
    Suggestion { title: "Project: Platform Game", page: 333 },
    Suggestion { title: "Drawing on Canvas", page: 355 },
    Suggestion { title: "HTTP and Forms", page: 377 },
    Suggestion { title: "Project: A Paint Program", page: 399 },
    Suggestion { title: "Node.js", page: 421 },
    Suggestion { title: "Project: Skill-Sharing Website (Node.js)", page: 443 },
    Suggestion { title: "Memory and Performance", page: 465 },
    Suggestion { title: "Debugging", page: 487 },
    Suggestion { title: "Functional Programming", page: 509 },
    Suggestion { title: "Promises and Async/Await", page: 531 },
    Suggestion { title: "Web Storage", page: 553 },
    Suggestion { title: "JSON", page: 575 },
    Suggestion { title: "Error Handling Patterns", page: 597 },
    Suggestion { title: "Testing", page: 619 },
    Suggestion { title: "Best Practices", page: 641 },
];

/// Uniform index source for the rotating suggestion.
pub trait SuggestionSampler {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Sampler backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandSampler<R> {
    rng: R,
}

impl<R: Rng> RandSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SuggestionSampler for RandSampler<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Always returns the same index, clamped to the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSampler(pub usize);

impl SuggestionSampler for FixedSampler {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

struct CompiledTopic {
    rule: &'static TopicRule,
    patterns: Vec<Regex>,
}

static COMPILED: OnceLock<Vec<CompiledTopic>> = OnceLock::new();
static BLOCK_COMMENT: OnceLock<Option<Regex>> = OnceLock::new();
static LINE_COMMENT: OnceLock<Option<Regex>> = OnceLock::new();
static STRING_LITERAL: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled_topics() -> &'static [CompiledTopic] {
    COMPILED.get_or_init(|| {
        TOPIC_RULES
            .iter()
            .map(|rule| CompiledTopic {
                rule,
                // A pattern that fails to compile simply never matches.
                patterns: rule
                    .patterns
                    .iter()
                    .filter_map(|p| Regex::new(p).ok())
                    .collect(),
            })
            .collect()
    })
}

fn strip(text: String, slot: &'static OnceLock<Option<Regex>>, pattern: &str) -> String {
    match slot.get_or_init(|| Regex::new(pattern).ok()) {
        Some(re) => re.replace_all(&text, "").into_owned(),
        None => text,
    }
}

/// Removes block comments, then line comments, then quoted string literals.
pub fn sanitize(code: &str) -> String {
    let text = strip(code.to_string(), &BLOCK_COMMENT, r"(?s)/\*.*?\*/");
    let text = strip(text, &LINE_COMMENT, r"(?m)//.*$");
    strip(
        text,
        &STRING_LITERAL,
        r#""(?:\\.|[^\\"])*"|'(?:\\.|[^\\'])*'"#,
    )
}

/// Score of one rule: weighted match count plus one per distinct pattern hit.
fn score_compiled(topic: &CompiledTopic, text: &str) -> u32 {
    let mut total = 0u32;
    let mut distinct = 0u32;
    for pattern in &topic.patterns {
        let hits = pattern.find_iter(text).count() as u32;
        if hits > 0 {
            total += hits * topic.rule.weight.max(1);
            distinct += 1;
        }
    }
    total + distinct
}

/// Per-rule scores for already sanitized text, in table order.
pub fn topic_scores(sanitized: &str) -> Vec<(&'static TopicRule, u32)> {
    compiled_topics()
        .iter()
        .map(|topic| (topic.rule, score_compiled(topic, sanitized)))
        .collect()
}

/// The rule with the strictly greatest positive score; earlier rules win ties.
pub fn detect_topic(code: &str) -> Option<&'static TopicRule> {
    let sanitized = sanitize(code);
    if sanitized.trim().is_empty() {
        return None;
    }
    let mut best = None;
    let mut best_score = 0;
    for (rule, score) in topic_scores(&sanitized) {
        if score > best_score {
            best = Some(rule);
            best_score = score;
        }
    }
    best
}

/// Draws a catalog entry whose title differs from `detected`, if one exists.
pub fn pick_suggestion(
    detected: Option<&TopicRule>,
    sampler: &mut dyn SuggestionSampler,
) -> Suggestion {
    let used = detected.map(|rule| rule.title);
    let pool: Vec<&Suggestion> = SUGGESTIONS
        .iter()
        .filter(|s| Some(s.title) != used)
        .collect();
    if pool.is_empty() {
        SUGGESTIONS[sampler.pick(SUGGESTIONS.len()) % SUGGESTIONS.len()]
    } else {
        *pool[sampler.pick(pool.len()) % pool.len()]
    }
}

/// Detects the topic of `code` and pairs it with a rotating suggestion.
pub fn score(code: &str, sampler: &mut dyn SuggestionSampler) -> TopicMatch {
    let detected = detect_topic(code);
    let suggestion = pick_suggestion(detected, sampler);
    TopicMatch {
        detected,
        suggestion,
    }
}
