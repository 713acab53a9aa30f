//! Name Extractor: best-effort recovery of the profile owner's display name.
//!
//! Three strategies run in priority order and the first hit wins:
//! 1. [`NameStrategy::SummaryAnchored`]: modern exports put `Name / Headline / Location`
//!    directly above a "Summary" label.
//! 2. [`NameStrategy::StructuredScan`]: classic exports: score every line near the top.
//! 3. [`NameStrategy::HeaderSlice`]: degraded extractions where the layout collapsed
//!    into one long line; read title-cased tokens from the front of the document.
//!
//! Every strategy applies the same word-shape filter (title case or particle) and
//! role/skill deny lists. Precision is preferred over recall: returning `None` is
//! always acceptable, returning a skill label is not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profile::lexicon::{
    HARD_REJECT_WORDS, LOCATION_TOKENS, NAME_PARTICLES, PROFILE_HOST, PROFILE_URL, ROLE_WORDS,
    SECTION_LABELS, TITLE_STOP_WORDS,
};
use crate::profile::lines::collapse_whitespace;

// ────────────────────────────────────────────────────────────────────────────
// Thresholds
// ────────────────────────────────────────────────────────────────────────────

/// Lines examined above "Summary" (name, headline, location and a little slack).
const SUMMARY_LOOKBACK: usize = 6;
/// Anything longer is a headline or a sentence.
const MAX_NAME_LINE_LEN: usize = 50;
/// Shorter lines are initials or noise.
const MIN_NAME_LINE_LEN: usize = 3;
const MIN_NAME_WORDS: usize = 2;
const MAX_NAME_WORDS: usize = 5;

/// The name always sits in the header block; deeper lines are experience entries.
const STRUCTURED_SCAN_LIMIT: usize = 80;
/// Awarded for passing the lexical gates, and again for all-title-case tokens.
const LEXICAL_SCORE: i32 = 2;
const TITLE_CASE_SCORE: i32 = 2;
/// Large enough that a role or skill word can never reach the acceptance bar alone.
const REJECT_WORD_PENALTY: i32 = 5;
/// A headline (`Title | Company`, `Title at Company`) almost always follows the name.
const HEADLINE_NEXT_SCORE: i32 = 3;
const LOCATION_NEXT_SCORE: i32 = 1;
const SUMMARY_NEAR_SCORE: i32 = 2;
const SECTION_PREV_SCORE: i32 = 1;
/// Acceptance with a headline or summary cue.
const STRONG_CONTEXT_MIN_SCORE: i32 = 5;
/// Acceptance without a cue, for classic exports that open with the bare name.
/// Known to admit a title-cased skill label sitting in the first lines.
const TOP_OF_DOCUMENT_MIN_SCORE: i32 = 4;
const TOP_OF_DOCUMENT_MAX_INDEX: usize = 4;

/// Header length used when neither a contact block nor a profile URL marks its end.
const HEADER_SLICE_MAX_CHARS: usize = 220;
const HEADER_SLICE_MAX_TOKENS: usize = 12;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d[\d\s\-()]+$").unwrap());
static CITY_STATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]+,\s*[A-Z]").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStrategy {
    SummaryAnchored,
    StructuredScan,
    HeaderSlice,
}

/// A proposed name. Only the winning candidate leaves this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameCandidate {
    pub text: String,
    pub score: i32,
    pub source_strategy: NameStrategy,
    pub line_index: usize,
    pub strong_context: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Cascade
// ────────────────────────────────────────────────────────────────────────────

/// Extracts the most plausible personal name from profile text.
pub fn extract_name(text: &str) -> Option<String> {
    extract_name_candidate(text).map(|c| c.text)
}

/// Runs the three strategies in priority order and returns the first hit.
pub fn extract_name_candidate(text: &str) -> Option<NameCandidate> {
    let lines = profile_lines(text);

    name_near_summary(&lines)
        .or_else(|| name_from_structured_scan(&lines))
        .or_else(|| name_from_header_slice(text))
}

/// Trimmed, non-empty lines in document order.
pub fn profile_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy A: summary anchored
// ────────────────────────────────────────────────────────────────────────────

/// Scans upward from the first "Summary" label, closest line first.
pub fn name_near_summary(lines: &[&str]) -> Option<NameCandidate> {
    let summary_index = lines.iter().position(|l| l.eq_ignore_ascii_case("summary"))?;
    let start = summary_index.saturating_sub(SUMMARY_LOOKBACK);

    (start..summary_index).rev().find_map(|i| {
        let line = lines[i];
        let lower = line.to_lowercase();

        if line.is_empty()
            || line.chars().count() > MAX_NAME_LINE_LEN
            || lower.contains(',')
            || lower.contains(" at ")
            || lower.contains('|')
            || lower.contains(PROFILE_HOST)
            || lower
                .split(|c: char| !c.is_alphabetic())
                .any(|t| LOCATION_TOKENS.contains(t))
        {
            return None;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if !(MIN_NAME_WORDS..=MAX_NAME_WORDS).contains(&words.len()) || !has_name_charset(line) {
            return None;
        }
        if words
            .iter()
            .any(|w| ROLE_WORDS.contains(w.to_lowercase().as_str()))
        {
            return None;
        }
        if !words.iter().all(|w| is_name_token(w)) {
            return None;
        }

        Some(NameCandidate {
            text: line.to_string(),
            score: 0,
            source_strategy: NameStrategy::SummaryAnchored,
            line_index: i,
            strong_context: true,
        })
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy B: structured scan
// ────────────────────────────────────────────────────────────────────────────

/// Scores every early line and accepts the best one only with enough confidence.
pub fn name_from_structured_scan(lines: &[&str]) -> Option<NameCandidate> {
    let mut best: Option<NameCandidate> = None;

    for i in 0..lines.len().min(STRUCTURED_SCAN_LIMIT) {
        let Some(candidate) = score_line(lines, i) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    let best = best?;
    let confident = best.strong_context && best.score >= STRONG_CONTEXT_MIN_SCORE;
    let near_top =
        best.score >= TOP_OF_DOCUMENT_MIN_SCORE && best.line_index <= TOP_OF_DOCUMENT_MAX_INDEX;
    (confident || near_top).then_some(best)
}

fn score_line(lines: &[&str], i: usize) -> Option<NameCandidate> {
    let line = lines[i];
    let lower = line.to_lowercase();
    let len = line.chars().count();

    if !(MIN_NAME_LINE_LEN..=MAX_NAME_LINE_LEN).contains(&len) {
        return None;
    }
    if SECTION_LABELS.contains(lower.as_str()) {
        return None;
    }
    if lower.contains('@') || lower.contains(PROFILE_HOST) || lower.contains("page ") {
        return None;
    }
    if line.chars().all(|c| c.is_ascii_digit()) || PHONE_RE.is_match(line) {
        return None;
    }
    if !has_name_charset(line) {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(MIN_NAME_WORDS..=MAX_NAME_WORDS).contains(&words.len()) {
        return None;
    }

    let mut score = LEXICAL_SCORE;
    if !words.iter().all(|w| is_name_token(w)) {
        return None;
    }
    score += TITLE_CASE_SCORE;

    if words
        .iter()
        .any(|w| HARD_REJECT_WORDS.contains(w.to_lowercase().as_str()))
    {
        score -= REJECT_WORD_PENALTY;
    }

    let prev = if i > 0 { lines[i - 1].to_lowercase() } else { String::new() };
    let next = lines.get(i + 1).copied().unwrap_or("");
    let next_lower = next.to_lowercase();

    let mut strong_context = false;
    if next.contains('|') || next_lower.contains(" at ") || next.contains(" - ") {
        score += HEADLINE_NEXT_SCORE;
        strong_context = true;
    }
    if next.contains(',') && CITY_STATE_RE.is_match(next) {
        score += LOCATION_NEXT_SCORE;
    }
    let summary_follows = next_lower == "summary"
        || lines
            .get(i + 2)
            .is_some_and(|l| l.eq_ignore_ascii_case("summary"));
    if summary_follows {
        score += SUMMARY_NEAR_SCORE;
        strong_context = true;
    }
    if SECTION_LABELS.contains(prev.as_str()) {
        score += SECTION_PREV_SCORE;
    }

    Some(NameCandidate {
        text: line.to_string(),
        score,
        source_strategy: NameStrategy::StructuredScan,
        line_index: i,
        strong_context,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy C: header slice
// ────────────────────────────────────────────────────────────────────────────

/// Reads leading title-cased tokens from the flattened document header.
pub fn name_from_header_slice(text: &str) -> Option<NameCandidate> {
    let header = header_slice(text);
    if header.is_empty() {
        return None;
    }

    let cleaned = collapse_whitespace(&header.replace(['|', '•', '·', ','], " "));
    let mut name_tokens: Vec<String> = Vec::new();

    for token in cleaned.split(' ').take(HEADER_SLICE_MAX_TOKENS) {
        if token.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        let plain: String = token
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || matches!(c, '\'' | '.' | '-'))
            .collect();
        if plain.is_empty() {
            break;
        }
        let lower = plain.to_lowercase();
        if TITLE_STOP_WORDS.contains(lower.as_str()) {
            break;
        }
        let looks_like_name = is_capitalized_word(&plain)
            || (plain.len() >= 2 && plain.chars().all(|c| c.is_ascii_uppercase()))
            || NAME_PARTICLES.contains(lower.as_str());
        if !looks_like_name {
            break;
        }
        name_tokens.push(plain);
        if name_tokens.len() >= MAX_NAME_WORDS {
            break;
        }
    }

    if name_tokens.len() < MIN_NAME_WORDS {
        return None;
    }

    Some(NameCandidate {
        text: name_tokens.join(" "),
        score: 0,
        source_strategy: NameStrategy::HeaderSlice,
        line_index: 0,
        strong_context: false,
    })
}

/// The document front up to the contact block or profile URL, else the first 220 chars.
fn header_slice(text: &str) -> String {
    let flattened = collapse_whitespace(text);
    // ASCII lowercasing keeps byte offsets aligned with `flattened`.
    let lower = flattened.to_ascii_lowercase();

    let url_marker = format!(" {PROFILE_URL}");
    let cutoff = [lower.find(" contact "), lower.find(&url_marker)]
        .into_iter()
        .flatten()
        .filter(|&idx| idx > 0)
        .min();

    let slice = match cutoff {
        Some(idx) => &flattened[..idx],
        None => match flattened.char_indices().nth(HEADER_SLICE_MAX_CHARS) {
            Some((idx, _)) => &flattened[..idx],
            None => flattened.as_str(),
        },
    };
    slice.trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Word shape
// ────────────────────────────────────────────────────────────────────────────

/// Letters, whitespace, hyphens, apostrophes and periods only.
fn has_name_charset(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '-' | '\'' | '.'))
}

/// `^[A-Z][A-Za-z'.-]*$`
fn is_capitalized_word(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphabetic() || matches!(c, '\'' | '.' | '-'))
        }
        _ => false,
    }
}

fn is_name_token(word: &str) -> bool {
    is_capitalized_word(word) || NAME_PARTICLES.contains(word.to_lowercase().as_str())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
