//! Session-wide search term and site detail.

use std::sync::Arc;

use sitescout_core::SiteDetail;
use tokio::sync::watch;

/// Single source of truth for the current search term and the most recently
/// fetched site detail.
///
/// Cloning yields another handle onto the same store: a write through any
/// handle is visible to every other handle on its next read. Term changes can
/// be observed through [`SharedSearchState::subscribe_search_term`].
#[derive(Clone)]
pub struct SharedSearchState {
    term: Arc<watch::Sender<String>>,
    detail: Arc<watch::Sender<Option<SiteDetail>>>,
}

impl SharedSearchState {
    #[must_use]
    pub fn new() -> Self {
        let (term, _) = watch::channel(String::new());
        let (detail, _) = watch::channel(None);
        Self {
            term: Arc::new(term),
            detail: Arc::new(detail),
        }
    }

    #[must_use]
    pub fn search_term(&self) -> String {
        self.term.borrow().clone()
    }

    /// Replaces the search term. Subscribers are only notified when the value
    /// actually changes; the empty string is a legal "no search" value.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.term.send_if_modified(|current| {
            if *current == term {
                false
            } else {
                *current = term;
                true
            }
        });
    }

    /// A receiver that wakes on every search-term change after this call.
    #[must_use]
    pub fn subscribe_search_term(&self) -> watch::Receiver<String> {
        self.term.subscribe()
    }

    #[must_use]
    pub fn site_detail(&self) -> Option<SiteDetail> {
        self.detail.borrow().clone()
    }

    pub fn set_site_detail(&self, detail: SiteDetail) {
        self.detail.send_replace(Some(detail));
    }

    pub fn clear_site_detail(&self) {
        self.detail.send_replace(None);
    }
}

impl Default for SharedSearchState {
    fn default() -> Self {
        Self::new()
    }
}
