//! Detail loading for the active marker.
//!
//! Each activation bumps a generation counter and spawns one fetch. A newer
//! activation aborts the previous task, and a completion that still slips
//! through with an older generation is reported as [`DetailOutcome::Stale`]
//! and never written into the shared state.

use std::sync::Arc;

use sitescout_core::SiteDetail;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{DetailLoadError, LookupError};
use crate::lookup::SiteLookup;
use crate::state::SharedSearchState;

/// A finished detail fetch, tagged with the activation that started it.
#[derive(Debug)]
pub struct DetailCompletion {
    generation: u64,
    site_id: String,
    result: Result<SiteDetail, LookupError>,
}

impl DetailCompletion {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn site_id(&self) -> &str {
        &self.site_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The detail for this site is now in the shared state.
    Applied(String),
    /// The fetch for the active marker failed; the prior detail is untouched.
    Failed(DetailLoadError),
    /// The completion belonged to a superseded activation and was dropped.
    Stale { site_id: String, generation: u64 },
}

struct InFlight {
    generation: u64,
    site_id: String,
    handle: JoinHandle<()>,
}

pub struct MarkerDetailLoader {
    lookup: Arc<dyn SiteLookup>,
    state: SharedSearchState,
    generation: u64,
    pending: Option<InFlight>,
    tx: mpsc::UnboundedSender<DetailCompletion>,
    rx: mpsc::UnboundedReceiver<DetailCompletion>,
}

impl MarkerDetailLoader {
    #[must_use]
    pub fn new(lookup: Arc<dyn SiteLookup>, state: SharedSearchState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            lookup,
            state,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    /// Starts loading `site_id`, superseding any fetch still in flight.
    /// Returns the generation assigned to this activation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self, site_id: &str) -> u64 {
        self.abort_pending();
        self.generation += 1;
        let generation = self.generation;

        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        let id = site_id.to_owned();
        let handle = tokio::spawn(async move {
            let result = lookup.fetch_detail(&id).await;
            let completion = DetailCompletion {
                generation,
                site_id: id,
                result,
            };
            if tx.send(completion).is_err() {
                tracing::debug!(generation, "detail loader gone before fetch finished");
            }
        });

        tracing::debug!(site_id, generation, "detail fetch started");
        self.pending = Some(InFlight {
            generation,
            site_id: site_id.to_owned(),
            handle,
        });
        generation
    }

    /// Waits for the next finished fetch, current or stale.
    pub async fn next_completion(&mut self) -> Option<DetailCompletion> {
        self.rx.recv().await
    }

    /// Applies `completion` if it belongs to the latest activation.
    pub fn complete(&mut self, completion: DetailCompletion) -> DetailOutcome {
        let DetailCompletion {
            generation,
            site_id,
            result,
        } = completion;

        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation);
        if !is_current {
            tracing::debug!(site_id, generation, latest = self.generation, "discarding stale detail");
            return DetailOutcome::Stale {
                site_id,
                generation,
            };
        }

        self.pending = None;
        match result {
            Ok(detail) => {
                tracing::debug!(site_id, generation, "detail loaded");
                self.state.set_site_detail(detail);
                DetailOutcome::Applied(site_id)
            }
            Err(source) => {
                tracing::warn!(site_id, error = %source, "detail load failed");
                DetailOutcome::Failed(DetailLoadError { site_id, source })
            }
        }
    }

    /// Drops the selection: aborts any fetch and clears the held detail.
    pub fn deactivate(&mut self) {
        self.abort_pending();
        self.state.clear_site_detail();
    }

    /// True strictly while a fetch for the active marker is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn loading_site_id(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.site_id.as_str())
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn abort_pending(&mut self) {
        if let Some(in_flight) = self.pending.take() {
            in_flight.handle.abort();
            tracing::debug!(
                site_id = %in_flight.site_id,
                generation = in_flight.generation,
                "aborted superseded detail fetch"
            );
        }
    }
}

impl Drop for MarkerDetailLoader {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sitescout_core::SearchResultSet;

    use super::*;

    /// Resolves every detail immediately; ids starting with `missing` are 404s.
    struct ImmediateLookup;

    #[async_trait]
    impl SiteLookup for ImmediateLookup {
        async fn search(&self, term: &str) -> Result<SearchResultSet, LookupError> {
            Err(LookupError::NotFound(term.to_owned()))
        }

        async fn fetch_detail(&self, site_id: &str) -> Result<SiteDetail, LookupError> {
            if site_id.starts_with("missing") {
                return Err(LookupError::NotFound(site_id.to_owned()));
            }
            Ok(SiteDetail {
                id: site_id.to_owned(),
                name: None,
                image: Some(format!("{site_id}.jpg")),
                attributes: serde_json::Map::new(),
            })
        }
    }

    fn loader(state: &SharedSearchState) -> MarkerDetailLoader {
        MarkerDetailLoader::new(Arc::new(ImmediateLookup), state.clone())
    }

    #[tokio::test]
    async fn applies_latest_activation() {
        let state = SharedSearchState::new();
        let mut loader = loader(&state);

        let generation = loader.activate("eiffel-1");
        assert!(loader.is_loading());

        let completion = loader.next_completion().await.unwrap();
        assert_eq!(completion.generation(), generation);
        assert_eq!(
            loader.complete(completion),
            DetailOutcome::Applied("eiffel-1".to_owned())
        );
        assert!(!loader.is_loading());
        assert_eq!(
            state.site_detail().and_then(|d| d.image),
            Some("eiffel-1.jpg".to_owned())
        );
    }

    #[tokio::test]
    async fn completion_for_superseded_activation_is_discarded() {
        let state = SharedSearchState::new();
        let mut loader = loader(&state);

        let first = loader.activate("eiffel-1");
        let stale = loader.next_completion().await.unwrap();

        loader.activate("louvre-1");
        assert_eq!(
            loader.complete(stale),
            DetailOutcome::Stale {
                site_id: "eiffel-1".to_owned(),
                generation: first,
            }
        );
        assert!(state.site_detail().is_none(), "stale detail must not be written");
        assert!(loader.is_loading());

        let current = loader.next_completion().await.unwrap();
        assert_eq!(
            loader.complete(current),
            DetailOutcome::Applied("louvre-1".to_owned())
        );
        assert_eq!(state.site_detail().map(|d| d.id).as_deref(), Some("louvre-1"));
    }

    #[tokio::test]
    async fn failure_keeps_previous_detail_and_clears_loading() {
        let state = SharedSearchState::new();
        let mut loader = loader(&state);

        loader.activate("eiffel-1");
        let ok = loader.next_completion().await.unwrap();
        loader.complete(ok);

        loader.activate("missing-1");
        let failed = loader.next_completion().await.unwrap();
        let outcome = loader.complete(failed);

        assert!(matches!(
            outcome,
            DetailOutcome::Failed(DetailLoadError { ref site_id, .. }) if site_id == "missing-1"
        ));
        assert!(!loader.is_loading());
        assert_eq!(state.site_detail().map(|d| d.id).as_deref(), Some("eiffel-1"));
    }

    #[tokio::test]
    async fn deactivate_clears_detail_and_loading() {
        let state = SharedSearchState::new();
        let mut loader = loader(&state);

        loader.activate("eiffel-1");
        let ok = loader.next_completion().await.unwrap();
        loader.complete(ok);
        loader.activate("louvre-1");

        loader.deactivate();
        assert!(!loader.is_loading());
        assert!(state.site_detail().is_none());
    }
}
