//! The event loop tying search, map, detail loading and list updates together.

use std::sync::Arc;

use sitescout_client::SitesClient;
use tokio::sync::mpsc;

use crate::coordinator::{SearchCoordinator, SearchInput, SearchOutcome};
use crate::detail::{DetailCompletion, DetailOutcome, MarkerDetailLoader};
use crate::error::MutationError;
use crate::identity::IdentitySource;
use crate::lookup::SiteLookup;
use crate::map_view::{ClickOutcome, MapSettings, MapViewController};
use crate::mutation::{ListMutation, ListMutationGateway, ListStore, MutationReceipt};
use crate::state::SharedSearchState;
use crate::surface::{MapSurface, Viewport};
use crate::view::{Notice, ViewState};

/// The remote services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub lookup: Arc<dyn SiteLookup>,
    pub lists: Arc<dyn ListStore>,
    pub identity: Arc<dyn IdentitySource>,
}

impl Collaborators {
    /// Uses one HTTP client for both lookups and list updates.
    #[must_use]
    pub fn from_client(client: Arc<SitesClient>, identity: Arc<dyn IdentitySource>) -> Self {
        Self {
            lookup: client.clone(),
            lists: client,
            identity,
        }
    }
}

type MutationResult = Result<MutationReceipt, MutationError>;

/// Something the session reacted to in one [`SiteMapSession::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SearchStarted { term: String, generation: u64 },
    /// The term changed to something blank; nothing was fetched.
    SearchSkipped { term: String },
    Search(SearchOutcome),
    Detail(DetailOutcome),
    ListUpdated(MutationResult),
}

/// One user's view of the site map.
///
/// All remote calls run as spawned tasks; their results are applied only
/// from [`SiteMapSession::step`], so every state change happens on the task
/// driving the session.
pub struct SiteMapSession<S> {
    state: SharedSearchState,
    map: MapViewController<S>,
    coordinator: SearchCoordinator,
    loader: MarkerDetailLoader,
    gateway: ListMutationGateway,
    identity: Arc<dyn IdentitySource>,
    mutation_tx: mpsc::UnboundedSender<MutationResult>,
    mutation_rx: mpsc::UnboundedReceiver<MutationResult>,
    mutations_in_flight: usize,
    notice: Option<Notice>,
    last_mutation: Option<MutationResult>,
}

impl<S: MapSurface> SiteMapSession<S> {
    #[must_use]
    pub fn new(
        state: SharedSearchState,
        collaborators: Collaborators,
        settings: MapSettings,
    ) -> Self {
        let Collaborators {
            lookup,
            lists,
            identity,
        } = collaborators;
        let (mutation_tx, mutation_rx) = mpsc::unbounded_channel();
        Self {
            coordinator: SearchCoordinator::new(Arc::clone(&lookup), state.subscribe_search_term()),
            loader: MarkerDetailLoader::new(lookup, state.clone()),
            map: MapViewController::new(settings),
            gateway: ListMutationGateway::new(lists),
            identity,
            state,
            mutation_tx,
            mutation_rx,
            mutations_in_flight: 0,
            notice: None,
            last_mutation: None,
        }
    }

    /// Hands the session a renderable surface and fits it to the current results.
    pub fn attach_surface(&mut self, surface: S) -> Viewport {
        let viewport = self.map.on_bounds_ready(surface);
        self.redraw();
        viewport
    }

    /// Convenience for writing the shared term; the change is picked up by
    /// the next [`Self::step`].
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state.set_search_term(term);
    }

    /// Routes a marker click. Activating a new marker starts its detail fetch.
    pub fn click_marker(&mut self, site_id: &str) -> ClickOutcome {
        let outcome = self.map.on_marker_click(site_id);
        if let ClickOutcome::Activated(id) = &outcome {
            self.loader.activate(id);
            self.redraw();
        }
        outcome
    }

    /// Adds the active site's loaded detail to the list named by the current
    /// search term. The request runs in the background; its result arrives
    /// as [`SessionEvent::ListUpdated`].
    ///
    /// # Errors
    ///
    /// Fails without sending anything when no detail is loaded for the active
    /// marker, nobody is signed in, or the search term is blank.
    pub fn add_active_to_list(&mut self) -> Result<(), MutationError> {
        let mutation = self.prepare_mutation().inspect_err(|e| {
            tracing::warn!(error = %e, "cannot add site to list");
        })?;

        let gateway = self.gateway.clone();
        let tx = self.mutation_tx.clone();
        self.mutations_in_flight += 1;
        tokio::spawn(async move {
            let result = gateway.submit(mutation).await;
            if tx.send(result).is_err() {
                tracing::debug!("session gone before list update finished");
            }
        });
        Ok(())
    }

    /// Waits for the next thing to happen and applies it.
    ///
    /// Returns `None` only if every input has shut down.
    pub async fn step(&mut self) -> Option<SessionEvent> {
        tokio::select! {
            Some(input) = self.coordinator.next_input() => Some(self.on_search_input(input)),
            Some(completion) = self.loader.next_completion() => Some(self.on_detail(completion)),
            Some(result) = self.mutation_rx.recv() => Some(self.on_mutation(result)),
            else => None,
        }
    }

    /// Runs [`Self::step`] until nothing is pending and returns what happened.
    pub async fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while !self.is_idle() {
            match self.step().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// No term change, search, detail fetch or list update is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.coordinator.has_pending_work()
            && !self.loader.is_loading()
            && self.mutations_in_flight == 0
    }

    /// What the hosting view should show right now.
    #[must_use]
    pub fn view(&self) -> ViewState {
        if self.loader.is_loading() {
            return ViewState::Loading;
        }
        let detail = self.state.site_detail();
        ViewState::Ready {
            frame: self.map.frame(detail.as_ref()),
            notice: self.notice.clone(),
        }
    }

    /// Pushes the current view to the attached surface and returns it.
    pub fn draw(&mut self) -> ViewState {
        self.redraw();
        self.view()
    }

    #[must_use]
    pub fn state(&self) -> &SharedSearchState {
        &self.state
    }

    #[must_use]
    pub fn map(&self) -> &MapViewController<S> {
        &self.map
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn last_mutation(&self) -> Option<&MutationResult> {
        self.last_mutation.as_ref()
    }

    fn prepare_mutation(&self) -> Result<ListMutation, MutationError> {
        let active = self
            .map
            .active_marker_id()
            .ok_or(MutationError::NoActiveSite)?;
        let site = self
            .state
            .site_detail()
            .filter(|detail| detail.id == active)
            .ok_or(MutationError::NoActiveSite)?;
        let identity = self
            .identity
            .current()
            .ok_or(MutationError::MissingIdentity)?;
        ListMutation::new(&self.state.search_term(), site, &identity)
    }

    fn on_search_input(&mut self, input: SearchInput) -> SessionEvent {
        match input {
            SearchInput::TermChanged(term) => match self.coordinator.on_term(&term) {
                Some(generation) => SessionEvent::SearchStarted { term, generation },
                None => SessionEvent::SearchSkipped { term },
            },
            SearchInput::Completed(completion) => {
                let outcome = self.coordinator.complete(completion, &mut self.map);
                match &outcome {
                    SearchOutcome::Applied {
                        term,
                        sites,
                        cleared_selection,
                    } => {
                        self.drop_cleared_selection(cleared_selection.as_deref());
                        self.notice = (*sites == 0).then(|| Notice::NoResults { term: term.clone() });
                    }
                    SearchOutcome::NoResults {
                        term,
                        cleared_selection,
                    } => {
                        self.drop_cleared_selection(cleared_selection.as_deref());
                        self.notice = Some(Notice::NoResults { term: term.clone() });
                    }
                    SearchOutcome::Failed { term, error } => {
                        self.notice = Some(Notice::SearchFailed {
                            term: term.clone(),
                            message: error.to_string(),
                        });
                    }
                    SearchOutcome::Stale { .. } => return SessionEvent::Search(outcome),
                }
                self.redraw();
                SessionEvent::Search(outcome)
            }
        }
    }

    fn on_detail(&mut self, completion: DetailCompletion) -> SessionEvent {
        let outcome = self.loader.complete(completion);
        match &outcome {
            DetailOutcome::Applied(_) => {
                if matches!(self.notice, Some(Notice::DetailFailed { .. })) {
                    self.notice = None;
                }
            }
            DetailOutcome::Failed(err) => {
                self.notice = Some(Notice::DetailFailed {
                    site_id: err.site_id.clone(),
                    message: err.source.to_string(),
                });
            }
            DetailOutcome::Stale { .. } => return SessionEvent::Detail(outcome),
        }
        self.redraw();
        SessionEvent::Detail(outcome)
    }

    fn on_mutation(&mut self, result: MutationResult) -> SessionEvent {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
        if let Err(e) = &result {
            self.notice = Some(Notice::ListUpdateFailed {
                list: self.state.search_term(),
                message: e.to_string(),
            });
            self.redraw();
        }
        self.last_mutation = Some(result.clone());
        SessionEvent::ListUpdated(result)
    }

    fn drop_cleared_selection(&mut self, cleared: Option<&str>) {
        if let Some(site_id) = cleared {
            tracing::debug!(site_id, "active site left the results, dropping its detail");
            self.loader.deactivate();
        }
    }

    fn redraw(&mut self) {
        if self.loader.is_loading() {
            if let Some(surface) = self.map.surface_mut() {
                surface.show_loading();
            }
            return;
        }
        let detail = self.state.site_detail();
        self.map.draw(detail.as_ref());
        if let (Some(notice), Some(surface)) = (self.notice.as_ref(), self.map.surface_mut()) {
            surface.show_notice(notice);
        }
    }
}
