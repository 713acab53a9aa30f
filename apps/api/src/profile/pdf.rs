//! PDF text-layer access.
//!
//! [`TextLayerProvider`] is the seam between the HTTP layer and the PDF library: it
//! yields positioned fragments per page, and [`extract_document_text`] turns them into
//! line-ordered text via [`crate::profile::lines`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use thiserror::Error;

use crate::profile::lines::{document_text, TextFragment};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unreadable PDF: {0}")]
    Unreadable(String),
    #[error("text layer could not be decoded: {0}")]
    TextLayer(String),
    #[error("PDF parser aborted on malformed input")]
    Panicked,
}

/// Produces the positioned text fragments of every page, in page order.
pub trait TextLayerProvider: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractionError>;
}

/// Text-layer provider backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractProvider;

impl TextLayerProvider for PdfExtractProvider {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractionError> {
        // pdf-extract panics on some malformed fonts instead of returning an error.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let doc = pdf_extract::Document::load_mem(bytes)
                .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
            let mut collector = FragmentCollector::default();
            pdf_extract::output_doc(&doc, &mut collector)
                .map_err(|e| ExtractionError::TextLayer(e.to_string()))?;
            Ok(collector.finish())
        }));

        result.unwrap_or(Err(ExtractionError::Panicked))
    }
}

/// Runs the provider off the async runtime and reconstructs the document text.
pub async fn extract_document_text(
    provider: Arc<dyn TextLayerProvider>,
    bytes: Bytes,
) -> Result<String, ExtractionError> {
    let pages = tokio::task::spawn_blocking(move || provider.extract_pages(&bytes))
        .await
        .map_err(|_| ExtractionError::Panicked)??;

    Ok(document_text(&pages))
}

// ────────────────────────────────────────────────────────────────────────────
// OutputDev that records text runs with their baseline
// ────────────────────────────────────────────────────────────────────────────

/// Characters closer than this vertically belong to the same run.
const SAME_RUN_EPSILON: f64 = 0.01;

#[derive(Debug, Default)]
struct FragmentCollector {
    pages: Vec<Vec<TextFragment>>,
    current: Option<TextFragment>,
}

impl FragmentCollector {
    fn flush(&mut self) {
        let Some(fragment) = self.current.take() else {
            return;
        };
        if fragment.text.trim().is_empty() {
            return;
        }
        match self.pages.last_mut() {
            Some(page) => page.push(fragment),
            None => self.pages.push(vec![fragment]),
        }
    }

    fn push_char(&mut self, y: f64, ch: &str) {
        match self.current.as_mut() {
            Some(run) if (run.y - y).abs() < SAME_RUN_EPSILON => run.text.push_str(ch),
            _ => {
                self.flush();
                self.current = Some(TextFragment::new(ch, y));
            }
        }
    }

    fn finish(mut self) -> Vec<Vec<TextFragment>> {
        self.flush();
        self.pages
    }
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.flush();
        self.pages.push(Vec::new());
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        _width: f64,
        _spacing: f64,
        _font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        self.push_char(trm.m32, char);
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        // Words within a run keep their spacing; a pending space separates runs.
        if let Some(run) = self.current.as_mut() {
            if !run.text.ends_with(' ') {
                run.text.push(' ');
            }
        }
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<Vec<TextFragment>>);

    impl TextLayerProvider for FixedPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    struct Exploding;

    impl TextLayerProvider for Exploding {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractionError> {
            panic!("corrupt xref");
        }
    }

    #[test]
    fn test_collector_splits_runs_on_baseline_change() {
        let mut c = FragmentCollector::default();
        c.pages.push(Vec::new());
        for ch in ["J", "a", "n", "e"] {
            c.push_char(700.0, ch);
        }
        c.push_char(680.0, "S");
        let pages = c.finish();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], vec![TextFragment::new("Jane", 700.0), TextFragment::new("S", 680.0)]);
    }

    #[test]
    fn test_collector_drops_blank_runs() {
        let mut c = FragmentCollector::default();
        c.pages.push(Vec::new());
        c.push_char(10.0, " ");
        c.end_line().unwrap();
        assert!(c.finish()[0].is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_an_extraction_error() {
        let err = PdfExtractProvider.extract_pages(b"definitely not a pdf");
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_document_text_reorders_lines() {
        let provider = Arc::new(FixedPages(vec![vec![
            TextFragment::new("Summary", 500.0),
            TextFragment::new("Jane Doe", 700.0),
        ]]));
        let text = extract_document_text(provider, Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe\nSummary");
    }

    #[tokio::test]
    async fn test_provider_panic_becomes_error() {
        let err = extract_document_text(Arc::new(Exploding), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Panicked));
    }
}
