//! Text Line Reconstructor: rebuilds visual lines from positioned text-layer fragments.
//!
//! PDF text layers do not always stream text in reading order. Fragments are sorted
//! top-of-page first and clustered by vertical coordinate: a fragment joins the most
//! recently started line when its `y` is within [`Y_THRESHOLD`] of that line's `y`.

use serde::{Deserialize, Serialize};

/// Maximum vertical distance (PDF units) between fragments on the same visual line.
pub const Y_THRESHOLD: f64 = 2.5;

/// A single run of text from the PDF text layer with its vertical position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Vertical component of the text transform. Larger values are higher on the page.
    pub y: f64,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, y: f64) -> Self {
        Self {
            text: text.into(),
            y,
        }
    }
}

/// One visual line of the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedLine {
    pub y: f64,
    pub text: String,
}

/// Groups fragments into visually ordered lines (top to bottom).
pub fn reconstruct_lines(fragments: &[TextFragment]) -> Vec<ReconstructedLine> {
    let mut items: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();
    // Stable sort keeps text-layer order for fragments at the same height.
    items.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut groups: Vec<(f64, Vec<&str>)> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some((line_y, parts)) if (*line_y - item.y).abs() <= Y_THRESHOLD => {
                parts.push(item.text.trim());
            }
            _ => groups.push((item.y, vec![item.text.trim()])),
        }
    }

    groups
        .into_iter()
        .map(|(y, parts)| ReconstructedLine {
            y,
            text: collapse_whitespace(&parts.join(" ")),
        })
        .filter(|line| !line.text.is_empty())
        .collect()
}

/// Renders one page: its reconstructed lines joined by newlines.
pub fn page_text(fragments: &[TextFragment]) -> String {
    reconstruct_lines(fragments)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a whole document. Pages are separated by a blank line and the result is trimmed.
pub fn document_text(pages: &[Vec<TextFragment>]) -> String {
    pages
        .iter()
        .map(|page| page_text(page))
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
