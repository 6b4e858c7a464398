//! Turns search-term changes into lookups and lookups into map updates.
//!
//! Ordering policy is cancel-and-replace plus last-write-wins: a new term
//! aborts the in-flight search, and a completion whose generation is not the
//! latest is dropped at the apply step.

use std::sync::Arc;

use sitescout_core::SearchResultSet;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::LookupError;
use crate::lookup::SiteLookup;
use crate::map_view::MapViewController;
use crate::surface::MapSurface;

/// A finished search, tagged with the generation that started it.
#[derive(Debug)]
pub struct SearchCompletion {
    generation: u64,
    term: String,
    result: Result<SearchResultSet, LookupError>,
}

impl SearchCompletion {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Debug)]
pub enum SearchInput {
    TermChanged(String),
    Completed(SearchCompletion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The result set replaced the map's sites and center.
    Applied {
        term: String,
        sites: usize,
        cleared_selection: Option<String>,
    },
    /// The remote reported no match; the map's sites were emptied.
    NoResults {
        term: String,
        cleared_selection: Option<String>,
    },
    /// Lookup failed; the map kept its previous sites.
    Failed { term: String, error: LookupError },
    /// A newer search superseded this one.
    Stale { term: String, generation: u64 },
}

struct InFlight {
    generation: u64,
    term: String,
    handle: JoinHandle<()>,
}

pub struct SearchCoordinator {
    lookup: Arc<dyn SiteLookup>,
    terms: watch::Receiver<String>,
    terms_open: bool,
    generation: u64,
    pending: Option<InFlight>,
    tx: mpsc::UnboundedSender<SearchCompletion>,
    rx: mpsc::UnboundedReceiver<SearchCompletion>,
}

impl SearchCoordinator {
    /// A term already present in `terms` is treated as a fresh change, so a
    /// session created after the user typed still searches.
    #[must_use]
    pub fn new(lookup: Arc<dyn SiteLookup>, mut terms: watch::Receiver<String>) -> Self {
        if !terms.borrow().trim().is_empty() {
            terms.mark_changed();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            lookup,
            terms,
            terms_open: true,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    /// Waits for either a term change or a finished search.
    ///
    /// Returns `None` once the term channel has closed.
    pub async fn next_input(&mut self) -> Option<SearchInput> {
        tokio::select! {
            changed = self.terms.changed(), if self.terms_open => match changed {
                Ok(()) => Some(SearchInput::TermChanged(self.terms.borrow_and_update().clone())),
                Err(_) => {
                    self.terms_open = false;
                    None
                }
            },
            Some(completion) = self.rx.recv() => Some(SearchInput::Completed(completion)),
            else => None,
        }
    }

    /// Starts a search for `term`, superseding any search in flight.
    ///
    /// A blank term is a no-op: nothing is fetched, and neither the current
    /// results nor an in-flight search are touched. Returns the generation of
    /// the new search otherwise.
    pub fn on_term(&mut self, term: &str) -> Option<u64> {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("blank search term, keeping current results");
            return None;
        }

        if let Some(in_flight) = self.pending.take() {
            in_flight.handle.abort();
            tracing::debug!(
                term = %in_flight.term,
                generation = in_flight.generation,
                "aborted superseded search"
            );
        }
        self.generation += 1;
        let generation = self.generation;

        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        let owned = term.to_owned();
        let handle = tokio::spawn(async move {
            let result = lookup.search(&owned).await;
            let completion = SearchCompletion {
                generation,
                term: owned,
                result,
            };
            if tx.send(completion).is_err() {
                tracing::debug!(generation, "search coordinator gone before search finished");
            }
        });

        tracing::info!(term, generation, "search started");
        self.pending = Some(InFlight {
            generation,
            term: term.to_owned(),
            handle,
        });
        Some(generation)
    }

    /// Applies `completion` to `map` if it is the latest search.
    pub fn complete<S: MapSurface>(
        &mut self,
        completion: SearchCompletion,
        map: &mut MapViewController<S>,
    ) -> SearchOutcome {
        let SearchCompletion {
            generation,
            term,
            result,
        } = completion;

        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation);
        if !is_current {
            tracing::debug!(term, generation, latest = self.generation, "discarding stale search");
            return SearchOutcome::Stale { term, generation };
        }
        self.pending = None;

        match result {
            Ok(result_set) => {
                let sites = result_set.sites.len();
                let applied = map.on_search_result(result_set);
                tracing::info!(term, sites, "search applied");
                SearchOutcome::Applied {
                    term,
                    sites,
                    cleared_selection: applied.cleared_selection,
                }
            }
            Err(LookupError::NotFound(_)) => {
                tracing::info!(term, "search found nothing");
                let cleared_selection = map.clear_results();
                SearchOutcome::NoResults {
                    term,
                    cleared_selection,
                }
            }
            Err(error) => {
                tracing::warn!(term, error = %error, "search failed, keeping previous results");
                SearchOutcome::Failed { term, error }
            }
        }
    }

    /// A search is in flight or a term change has not been consumed yet.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.pending.is_some() || (self.terms_open && self.terms.has_changed().unwrap_or(false))
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn pending_term(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.term.as_str())
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        if let Some(in_flight) = self.pending.take() {
            in_flight.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use sitescout_core::{GeoPoint, SiteDetail, SiteSummary};

    use super::*;
    use crate::map_view::MapSettings;
    use crate::state::SharedSearchState;
    use crate::surface::Viewport;
    use crate::view::{InfoOverlay, MarkerView};

    struct NullSurface;

    impl MapSurface for NullSurface {
        fn fit_bounds(&mut self, bounds: sitescout_core::Bounds) -> Viewport {
            Viewport {
                center: bounds.center(),
                zoom: 15,
            }
        }
        fn set_view(&mut self, _viewport: Viewport) {}
        fn clear(&mut self) {}
        fn place_marker(&mut self, _marker: &MarkerView) {}
        fn open_overlay(&mut self, _overlay: &InfoOverlay) {}
    }

    /// One site named after the term; `atlantis` is a 404 and `offline` a
    /// transport error.
    #[derive(Default)]
    struct CountingLookup {
        searches: AtomicUsize,
    }

    #[async_trait]
    impl SiteLookup for CountingLookup {
        async fn search(&self, term: &str) -> Result<SearchResultSet, LookupError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            match term {
                "atlantis" => Err(LookupError::NotFound(term.to_owned())),
                "offline" => Err(LookupError::Network("connection refused".to_owned())),
                _ => Ok(SearchResultSet {
                    center: GeoPoint::new(48.8566, 2.3522).unwrap(),
                    sites: vec![SiteSummary {
                        id: format!("{term}-1"),
                        name: term.to_owned(),
                        location: GeoPoint::new(48.8584, 2.2945).unwrap(),
                    }],
                }),
            }
        }

        async fn fetch_detail(&self, site_id: &str) -> Result<SiteDetail, LookupError> {
            Err(LookupError::NotFound(site_id.to_owned()))
        }
    }

    fn coordinator(state: &SharedSearchState) -> (SearchCoordinator, Arc<CountingLookup>) {
        let lookup = Arc::new(CountingLookup::default());
        let coordinator = SearchCoordinator::new(lookup.clone(), state.subscribe_search_term());
        (coordinator, lookup)
    }

    async fn next_completion(coordinator: &mut SearchCoordinator) -> SearchCompletion {
        loop {
            if let Some(SearchInput::Completed(c)) = coordinator.next_input().await {
                return c;
            }
        }
    }

    #[tokio::test]
    async fn blank_term_is_not_searched() {
        let state = SharedSearchState::new();
        let (mut coordinator, lookup) = coordinator(&state);

        assert_eq!(coordinator.on_term(""), None);
        assert_eq!(coordinator.on_term("   "), None);
        assert!(!coordinator.has_pending_work());
        tokio::task::yield_now().await;
        assert_eq!(lookup.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn term_change_is_observed() {
        let state = SharedSearchState::new();
        let (mut coordinator, _lookup) = coordinator(&state);

        state.set_search_term("Paris");
        assert!(coordinator.has_pending_work());
        match coordinator.next_input().await {
            Some(SearchInput::TermChanged(term)) => assert_eq!(term, "Paris"),
            other => panic!("expected a term change, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn existing_term_counts_as_change() {
        let state = SharedSearchState::new();
        state.set_search_term("rome");
        let (coordinator, _lookup) = coordinator(&state);
        assert!(coordinator.has_pending_work());
    }

    #[tokio::test]
    async fn superseded_search_is_stale() {
        let state = SharedSearchState::new();
        let (mut coordinator, _lookup) = coordinator(&state);
        let mut map = MapViewController::<NullSurface>::new(MapSettings::default());

        let first = coordinator.on_term("paris").unwrap();
        let old = next_completion(&mut coordinator).await;
        let second = coordinator.on_term("rome").unwrap();
        assert!(second > first);

        assert_eq!(
            coordinator.complete(old, &mut map),
            SearchOutcome::Stale {
                term: "paris".to_owned(),
                generation: first,
            }
        );
        assert!(map.sites().is_empty());

        let current = next_completion(&mut coordinator).await;
        assert!(matches!(
            coordinator.complete(current, &mut map),
            SearchOutcome::Applied { sites: 1, .. }
        ));
        assert_eq!(map.sites()[0].id, "rome-1");
    }

    #[tokio::test]
    async fn not_found_empties_sites_and_network_error_keeps_them() {
        let state = SharedSearchState::new();
        let (mut coordinator, _lookup) = coordinator(&state);
        let mut map = MapViewController::<NullSurface>::new(MapSettings::default());

        coordinator.on_term("paris");
        let ok = next_completion(&mut coordinator).await;
        coordinator.complete(ok, &mut map);
        assert_eq!(map.sites().len(), 1);

        coordinator.on_term("offline");
        let failed = next_completion(&mut coordinator).await;
        assert!(matches!(
            coordinator.complete(failed, &mut map),
            SearchOutcome::Failed { error: LookupError::Network(_), .. }
        ));
        assert_eq!(map.sites().len(), 1, "transport errors keep prior results");

        coordinator.on_term("atlantis");
        let missing = next_completion(&mut coordinator).await;
        assert!(matches!(
            coordinator.complete(missing, &mut map),
            SearchOutcome::NoResults { .. }
        ));
        assert!(map.sites().is_empty());
    }
}
