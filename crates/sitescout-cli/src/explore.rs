//! Command handlers. Each builds a session against the live API, drives it
//! to idle and prints what the map shows.

use std::sync::Arc;

use sitescout_client::SitesClient;
use sitescout_core::AppConfig;
use sitescout_map::{
    ClickOutcome, Collaborators, DetailOutcome, FileIdentityStore, IdentitySource, MapSettings,
    SearchOutcome, SessionEvent, SharedSearchState, SiteMapSession, StaticIdentity,
};

use crate::text_surface::TextSurface;

type Session = SiteMapSession<TextSurface>;

fn build_client(config: &AppConfig) -> anyhow::Result<Arc<SitesClient>> {
    let client = SitesClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build site API client: {e}"))?;
    Ok(Arc::new(client))
}

fn build_session(config: &AppConfig, email: Option<&str>) -> anyhow::Result<Session> {
    let identity: Arc<dyn IdentitySource> = match email {
        Some(email) => Arc::new(StaticIdentity::signed_in(email)),
        None => Arc::new(FileIdentityStore::new(&config.session_path)),
    };
    let collaborators = Collaborators::from_client(build_client(config)?, identity);
    let mut session = SiteMapSession::new(
        SharedSearchState::new(),
        collaborators,
        MapSettings::from_config(config),
    );
    session.attach_surface(TextSurface::default());
    Ok(session)
}

/// One-line summary of an event, or `None` for events not worth printing.
pub(crate) fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::SearchStarted { term, .. } => Some(format!("searching for \"{term}\"")),
        SessionEvent::SearchSkipped { .. }
        | SessionEvent::Search(SearchOutcome::Stale { .. })
        | SessionEvent::Detail(DetailOutcome::Stale { .. }) => None,
        SessionEvent::Search(SearchOutcome::Applied { term, sites, .. }) => {
            Some(format!("found {sites} site(s) for \"{term}\""))
        }
        SessionEvent::Search(SearchOutcome::NoResults { term, .. }) => {
            Some(format!("no sites found for \"{term}\""))
        }
        SessionEvent::Search(SearchOutcome::Failed { term, error }) => {
            Some(format!("search for \"{term}\" failed: {error}"))
        }
        SessionEvent::Detail(DetailOutcome::Applied(site_id)) => {
            Some(format!("loaded details for {site_id}"))
        }
        SessionEvent::Detail(DetailOutcome::Failed(err)) => Some(err.to_string()),
        SessionEvent::ListUpdated(Ok(receipt)) => Some(format!(
            "added {} to list \"{}\" at {}",
            receipt.site_id,
            receipt.list,
            receipt.added_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        SessionEvent::ListUpdated(Err(err)) => Some(format!("list update failed: {err}")),
    }
}

async fn settle_and_print(session: &mut Session) {
    for event in session.settle().await {
        if let Some(line) = describe(&event) {
            println!("{line}");
        }
    }
    session.draw();
    if let Some(surface) = session.map().surface() {
        print!("{}", surface.render());
    }
}

async fn search_session(
    config: &AppConfig,
    term: &str,
    email: Option<&str>,
) -> anyhow::Result<Session> {
    if term.trim().is_empty() {
        anyhow::bail!("search term must not be empty");
    }
    let mut session = build_session(config, email)?;
    session.set_search_term(term);
    settle_and_print(&mut session).await;
    Ok(session)
}

/// Runs a single search and draws the resulting map.
///
/// # Errors
///
/// Returns an error if the term is blank or the API client cannot be built.
/// Lookup failures are reported on the map, not as errors.
pub(crate) async fn run_search(config: &AppConfig, term: &str) -> anyhow::Result<()> {
    search_session(config, term, None).await?;
    Ok(())
}

/// Prints the raw detail payload for one site.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the lookup fails.
pub(crate) async fn run_detail(config: &AppConfig, site_id: &str) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let detail = client.fetch_detail(site_id).await?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

/// Searches, activates a marker and optionally adds it to the term's list.
///
/// # Errors
///
/// Returns an error if the term is blank, the API client cannot be built or
/// `--select` names a site that is not in the results. A failed list update
/// is printed but does not fail the command.
pub(crate) async fn run_explore(
    config: &AppConfig,
    term: &str,
    select: Option<&str>,
    add: bool,
    email: Option<&str>,
) -> anyhow::Result<()> {
    let mut session = search_session(config, term, email).await?;

    let target = select
        .map(str::to_owned)
        .or_else(|| session.map().sites().first().map(|site| site.id.clone()));
    let Some(site_id) = target else {
        println!("nothing to select");
        return Ok(());
    };

    match session.click_marker(&site_id) {
        ClickOutcome::Activated(_) | ClickOutcome::AlreadyActive => {}
        ClickOutcome::UnknownSite => {
            anyhow::bail!("site {site_id} is not among the results for \"{term}\"")
        }
    }
    settle_and_print(&mut session).await;

    if add {
        match session.add_active_to_list() {
            Ok(()) => settle_and_print(&mut session).await,
            Err(e) => println!("not added: {e}"),
        }
    }
    Ok(())
}
