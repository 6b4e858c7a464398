//! Search-and-map coordination for the site explorer.
//!
//! A [`SiteMapSession`] ties a [`SharedSearchState`] to the remote lookup
//! ([`SiteLookup`]), the map state machine ([`MapViewController`]), per-marker
//! detail loading ([`MarkerDetailLoader`]) and list mutations
//! ([`ListMutationGateway`]). Every remote call runs as a spawned task whose
//! completion comes back tagged with a generation; only the latest
//! generation's result is ever applied.

pub mod coordinator;
pub mod detail;
pub mod error;
pub mod identity;
pub mod lookup;
pub mod map_view;
pub mod mutation;
pub mod session;
pub mod state;
pub mod surface;
pub mod view;

pub use coordinator::{SearchCoordinator, SearchOutcome};
pub use detail::{DetailOutcome, MarkerDetailLoader};
pub use error::{DetailLoadError, LookupError, MutationError};
pub use identity::{FileIdentityStore, IdentitySource, StaticIdentity};
pub use lookup::SiteLookup;
pub use map_view::{ClickOutcome, MapSettings, MapViewController, ResultApplied};
pub use mutation::{ListMutation, ListMutationGateway, ListStore, MutationReceipt};
pub use session::{Collaborators, SessionEvent, SiteMapSession};
pub use state::SharedSearchState;
pub use surface::{MapSurface, Viewport};
pub use view::{InfoOverlay, MapFrame, MarkerView, Notice, OverlayImage, ViewState};
