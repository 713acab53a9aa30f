use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::TopicGenerator;
use crate::profile::pdf::TextLayerProvider;
use crate::speaker::github::ProfileLookup;
use crate::speaker::lookup::LookupRunner;
use crate::speaker::session::SpeakerStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub speakers: SpeakerStore,
    /// Pluggable PDF text layer. Default: PdfExtractProvider.
    pub text_layer: Arc<dyn TextLayerProvider>,
    pub github: Arc<dyn ProfileLookup>,
    /// Debounced lookups run against `speakers` and `github`.
    pub lookups: LookupRunner,
    pub generator: TopicGenerator,
}

impl AppState {
    pub fn new(
        config: Config,
        text_layer: Arc<dyn TextLayerProvider>,
        github: Arc<dyn ProfileLookup>,
        generator: TopicGenerator,
    ) -> Self {
        let speakers = SpeakerStore::default();
        let lookups = LookupRunner::new(speakers.clone(), github.clone(), config.lookup_debounce);
        Self {
            config,
            speakers,
            text_layer,
            github,
            lookups,
            generator,
        }
    }
}
