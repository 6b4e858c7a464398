//! Render-ready snapshots of the map and its overlays.

use std::fmt;

use sitescout_core::{GeoPoint, SiteDetail, SiteSummary};

pub const PLACEHOLDER_ALT: &str = "no image available";

/// One marker per site; `key` is the site id and is stable across redraws.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub key: String,
    pub name: String,
    pub position: GeoPoint,
    pub active: bool,
}

impl MarkerView {
    #[must_use]
    pub fn from_site(site: &SiteSummary, active: bool) -> Self {
        Self {
            key: site.id.clone(),
            name: site.name.clone(),
            position: site.location,
            active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayImage {
    Remote(String),
    Placeholder,
}

impl OverlayImage {
    #[must_use]
    pub fn alt_text(&self) -> &str {
        match self {
            OverlayImage::Remote(_) => "site image",
            OverlayImage::Placeholder => PLACEHOLDER_ALT,
        }
    }
}

/// The expanded info panel anchored to the active marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoOverlay {
    pub marker_key: String,
    pub title: String,
    pub image: OverlayImage,
    pub learn_more_href: String,
}

impl InfoOverlay {
    /// Builds the overlay for `site`. The image is taken from `detail` only
    /// when that detail belongs to the same site.
    #[must_use]
    pub fn for_site(site: &SiteSummary, detail: Option<&SiteDetail>) -> Self {
        let image = detail
            .filter(|d| d.id == site.id)
            .and_then(SiteDetail::image_url)
            .map_or(OverlayImage::Placeholder, |url| {
                OverlayImage::Remote(url.to_owned())
            });
        Self {
            marker_key: site.id.clone(),
            title: site.name.clone(),
            image,
            learn_more_href: format!("/search/{}", site.id),
        }
    }
}

/// Everything needed to draw the map once.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<MarkerView>,
    pub overlay: Option<InfoOverlay>,
}

impl MapFrame {
    #[must_use]
    pub fn active_marker(&self) -> Option<&MarkerView> {
        self.markers.iter().find(|m| m.active)
    }
}

/// A visible, non-fatal status shown alongside the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoResults { term: String },
    SearchFailed { term: String, message: String },
    DetailFailed { site_id: String, message: String },
    ListUpdateFailed { list: String, message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoResults { term } => write!(f, "no sites found for \"{term}\""),
            Notice::SearchFailed { term, message } => {
                write!(f, "search for \"{term}\" failed: {message}")
            }
            Notice::DetailFailed { site_id, message } => {
                write!(f, "could not load site {site_id}: {message}")
            }
            Notice::ListUpdateFailed { list, message } => {
                write!(f, "could not add to list \"{list}\": {message}")
            }
        }
    }
}

/// What the hosting view shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// A detail fetch is outstanding; the whole content area is a spinner.
    Loading,
    Ready {
        frame: MapFrame,
        notice: Option<Notice>,
    },
}

impl ViewState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    #[must_use]
    pub fn frame(&self) -> Option<&MapFrame> {
        match self {
            ViewState::Loading => None,
            ViewState::Ready { frame, .. } => Some(frame),
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            ViewState::Loading => None,
            ViewState::Ready { notice, .. } => notice.as_ref(),
        }
    }
}
