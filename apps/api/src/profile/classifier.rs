//! Document Classifier: decides whether extracted PDF text is a profile export.
//!
//! Gates run in order:
//! 1. fewer than [`MIN_DOCUMENT_CHARS`] characters → reject
//! 2. [`MAX_NEGATIVE_INDICATORS`] or more unrelated-document phrases → reject
//! 3. positive scoring (profile URL, page footer, section headers) → accept or reject
//!
//! The layered acceptance rules tolerate exports that lost the profile URL or the
//! page footer during text extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profile::lexicon::{NEGATIVE_INDICATORS, PROFILE_URL, SECTION_HEADERS, UNIQUE_PATTERNS};
use crate::profile::name::extract_name;

/// Shorter documents cannot carry enough signal to classify.
pub const MIN_DOCUMENT_CHARS: usize = 200;
/// Two document-type phrases are enough to call it something else.
const MAX_NEGATIVE_INDICATORS: usize = 2;
/// Each unique profile phrase outweighs a section header.
const UNIQUE_PATTERN_WEIGHT: usize = 3;

/// Rule (a): URL + footer + a few headers.
const FULL_SIGNAL_MIN_HEADERS: usize = 3;
/// Rule (b): no URL, but footer and most headers.
const FOOTER_MIN_HEADERS: usize = 5;
/// Rule (c): neither URL nor footer survived extraction.
const HEADER_ONLY_MIN_HEADERS: usize = 4;
const HEADER_ONLY_MIN_SCORE: usize = 6;

static PAGE_NUMBERING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)page\s+\d+\s+of\s+\d+").unwrap());

/// Why a document was rejected. Each gate has its own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    InsufficientText,
    NotAProfile,
    MissingProfileSignals,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::InsufficientText => {
                "PDF doesn't contain enough text. Please upload a complete LinkedIn profile PDF export."
            }
            Rejection::NotAProfile => {
                "This doesn't appear to be a LinkedIn profile. Please export your profile from LinkedIn (Save as PDF option)."
            }
            Rejection::MissingProfileSignals => {
                "This doesn't appear to be a LinkedIn profile PDF. Please go to your LinkedIn profile, click 'More' -> 'Save to PDF' and upload that file."
            }
        }
    }
}

/// Outcome of classification.
///
/// Invariant: `accepted == false` ⇒ `extracted_name` is `None` and `rejection_reason` is `Some`;
/// `accepted == true` ⇒ `rejection_reason` is `None`. Only constructible via
/// [`ClassificationResult::accept`] / [`ClassificationResult::reject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub accepted: bool,
    pub extracted_name: Option<String>,
    pub rejection_reason: Option<String>,
    #[serde(skip)]
    rejection: Option<Rejection>,
}

impl ClassificationResult {
    fn accept(extracted_name: Option<String>) -> Self {
        Self {
            accepted: true,
            extracted_name: extracted_name.filter(|n| !n.is_empty()),
            rejection_reason: None,
            rejection: None,
        }
    }

    fn reject(rejection: Rejection) -> Self {
        Self {
            accepted: false,
            extracted_name: None,
            rejection_reason: Some(rejection.message().to_string()),
            rejection: Some(rejection),
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }
}

/// Positive evidence gathered from a document that passed the rejection gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSignals {
    pub section_header_matches: usize,
    pub total_score: usize,
    pub has_profile_url: bool,
    pub has_page_numbering: bool,
}

impl ProfileSignals {
    pub fn gather(text: &str) -> Self {
        let lower = text.to_lowercase();
        let section_header_matches = count_matches(&lower, SECTION_HEADERS);
        let unique_matches = count_matches(&lower, UNIQUE_PATTERNS);

        Self {
            section_header_matches,
            total_score: unique_matches * UNIQUE_PATTERN_WEIGHT + section_header_matches,
            has_profile_url: lower.contains(PROFILE_URL),
            has_page_numbering: PAGE_NUMBERING_RE.is_match(text),
        }
    }

    pub fn is_profile(&self) -> bool {
        let full_signal = self.has_profile_url
            && self.has_page_numbering
            && self.section_header_matches >= FULL_SIGNAL_MIN_HEADERS;
        let url_or_footer = self.has_profile_url
            || (self.section_header_matches >= FOOTER_MIN_HEADERS && self.has_page_numbering);
        let headers_only = self.section_header_matches >= HEADER_ONLY_MIN_HEADERS
            && self.total_score >= HEADER_ONLY_MIN_SCORE;

        full_signal || url_or_footer || headers_only
    }
}

/// Classifies extracted text and, on acceptance, attaches the owner's name if one is found.
pub fn classify(text: &str) -> ClassificationResult {
    if text.chars().count() < MIN_DOCUMENT_CHARS {
        return ClassificationResult::reject(Rejection::InsufficientText);
    }

    if negative_indicator_count(text) >= MAX_NEGATIVE_INDICATORS {
        return ClassificationResult::reject(Rejection::NotAProfile);
    }

    if !ProfileSignals::gather(text).is_profile() {
        return ClassificationResult::reject(Rejection::MissingProfileSignals);
    }

    ClassificationResult::accept(extract_name(text))
}

/// Number of distinct unrelated-document phrases present in `text`.
pub fn negative_indicator_count(text: &str) -> usize {
    count_matches(&text.to_lowercase(), NEGATIVE_INDICATORS)
}

fn count_matches(lower: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|p| lower.contains(**p)).count()
}
