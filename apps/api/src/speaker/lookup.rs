//! Runs the effects produced by [`crate::speaker::session::apply`].
//!
//! Each `ScheduleLookup` becomes one tokio task: wait out the debounce delay,
//! give up if the handle was edited meanwhile, otherwise call the provider and
//! feed the result back as `LookupCompleted`. A superseded request is not
//! aborted; `apply` drops its result when it arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::speaker::github::ProfileLookup;
use crate::speaker::session::{Effect, LookupOutcome, SpeakerEvent, SpeakerStore};

#[derive(Clone)]
pub struct LookupRunner {
    store: SpeakerStore,
    lookup: Arc<dyn ProfileLookup>,
    debounce: Duration,
}

impl LookupRunner {
    pub fn new(store: SpeakerStore, lookup: Arc<dyn ProfileLookup>, debounce: Duration) -> Self {
        Self {
            store,
            lookup,
            debounce,
        }
    }

    pub fn run(&self, speaker_id: Uuid, effects: Vec<Effect>) -> Vec<JoinHandle<()>> {
        effects
            .into_iter()
            .map(|effect| match effect {
                Effect::ScheduleLookup {
                    generation,
                    username,
                } => {
                    let runner = self.clone();
                    tokio::spawn(async move {
                        runner.debounced_lookup(speaker_id, generation, username).await;
                    })
                }
            })
            .collect()
    }

    async fn debounced_lookup(&self, speaker_id: Uuid, generation: u64, username: String) {
        tokio::time::sleep(self.debounce).await;

        if self.store.current_generation(speaker_id).await != Some(generation) {
            return;
        }

        tracing::info!(%speaker_id, generation, "Looking up GitHub profile");
        let outcome = match self.lookup.fetch_profile(&username).await {
            Ok(Some(profile)) => LookupOutcome::Found(profile),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => {
                tracing::warn!(%speaker_id, "GitHub profile lookup failed: {e}");
                LookupOutcome::Failed
            }
        };

        self.store
            .dispatch(
                speaker_id,
                SpeakerEvent::LookupCompleted {
                    generation,
                    username,
                    outcome,
                },
            )
            .await;
    }
}
