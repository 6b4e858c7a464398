//! Viewport, marker set and marker selection.

use sitescout_core::{
    AppConfig, Bounds, GeoPoint, SearchResultSet, SiteDetail, SiteSummary, StaleSelection,
};

use crate::surface::{MapSurface, Viewport};
use crate::view::{InfoOverlay, MapFrame, MarkerView};

/// Initial viewport and zoom limits for the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    pub center: GeoPoint,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub stale_selection: StaleSelection,
}

impl MapSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            center: config.default_center,
            zoom: config.map_zoom,
            min_zoom: config.map_min_zoom,
            max_zoom: config.map_max_zoom,
            stale_selection: config.stale_selection,
        }
    }

    /// Clamps into `[min_zoom, max_zoom]`; the upper bound wins if the two
    /// are inverted.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: GeoPoint::DEFAULT_CENTER,
            zoom: 15,
            min_zoom: 11,
            max_zoom: 15,
            stale_selection: StaleSelection::Clear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The marker became active; its detail should be loaded.
    Activated(String),
    AlreadyActive,
    /// The id is not part of the current result set.
    UnknownSite,
}

/// What applying a result set changed besides the sites themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultApplied {
    /// The active id dropped because it no longer names a site.
    pub cleared_selection: Option<String>,
    /// Whether the surface was asked to fit bounds.
    pub fitted: bool,
}

/// State machine over `{center, zoom, sites, active marker}`.
///
/// The surface is attached once it can render ([`Self::on_bounds_ready`]) and
/// is reused for every later result; until then results only update state.
pub struct MapViewController<S> {
    settings: MapSettings,
    center: GeoPoint,
    zoom: u8,
    sites: Vec<SiteSummary>,
    active: Option<String>,
    surface: Option<S>,
    viewport: Option<Viewport>,
}

impl<S: MapSurface> MapViewController<S> {
    #[must_use]
    pub fn new(settings: MapSettings) -> Self {
        Self {
            center: settings.center,
            zoom: settings.clamp_zoom(settings.zoom),
            settings,
            sites: Vec::new(),
            active: None,
            surface: None,
            viewport: None,
        }
    }

    /// Replaces `sites` and `center` with `result` wholesale, applies the
    /// stale-selection policy, and fits bounds once if a surface is attached.
    pub fn on_search_result(&mut self, result: SearchResultSet) -> ResultApplied {
        let SearchResultSet { center, sites } = result;
        self.center = center;
        self.sites = sites;

        let cleared_selection = self.reconcile_selection();
        let fitted = self.fit_attached().is_some();
        tracing::debug!(
            center = %self.center,
            sites = self.sites.len(),
            fitted,
            "search result applied to map"
        );
        ResultApplied {
            cleared_selection,
            fitted,
        }
    }

    /// Takes ownership of a renderable surface, fits it to the current
    /// results and keeps it for reuse.
    pub fn on_bounds_ready(&mut self, mut surface: S) -> Viewport {
        let viewport = fit_surface(&mut surface, self.result_bounds(), &self.settings);
        self.surface = Some(surface);
        self.store_viewport(viewport);
        viewport
    }

    /// Empties the marker set but keeps the center and viewport. Used when a
    /// search explicitly finds nothing.
    pub fn clear_results(&mut self) -> Option<String> {
        self.sites.clear();
        self.reconcile_selection()
    }

    pub fn on_marker_click(&mut self, site_id: &str) -> ClickOutcome {
        if self.active.as_deref() == Some(site_id) {
            return ClickOutcome::AlreadyActive;
        }
        if !self.sites.iter().any(|site| site.id == site_id) {
            tracing::debug!(site_id, "ignoring click on unknown marker");
            return ClickOutcome::UnknownSite;
        }
        self.active = Some(site_id.to_owned());
        ClickOutcome::Activated(site_id.to_owned())
    }

    /// Snapshot for rendering. The overlay's image comes from `detail` only
    /// when it belongs to the active site.
    #[must_use]
    pub fn frame(&self, detail: Option<&SiteDetail>) -> MapFrame {
        let active = self.active.as_deref();
        let markers = self
            .sites
            .iter()
            .map(|site| MarkerView::from_site(site, Some(site.id.as_str()) == active))
            .collect();
        let overlay = active
            .and_then(|id| self.sites.iter().find(|site| site.id == id))
            .map(|site| InfoOverlay::for_site(site, detail));

        MapFrame {
            center: self.viewport.map_or(self.center, |v| v.center),
            zoom: self.zoom,
            markers,
            overlay,
        }
    }

    /// Redraws markers and the overlay on the attached surface, if any.
    pub fn draw(&mut self, detail: Option<&SiteDetail>) -> MapFrame {
        let frame = self.frame(detail);
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            for marker in &frame.markers {
                surface.place_marker(marker);
            }
            if let Some(overlay) = &frame.overlay {
                surface.open_overlay(overlay);
            }
        }
        frame
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn sites(&self) -> &[SiteSummary] {
        &self.sites
    }

    #[must_use]
    pub fn active_marker_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    fn result_bounds(&self) -> Bounds {
        self.sites
            .iter()
            .fold(Bounds::around(self.center), |bounds, site| {
                bounds.extend(site.location)
            })
    }

    fn fit_attached(&mut self) -> Option<Viewport> {
        let bounds = self.result_bounds();
        let surface = self.surface.as_mut()?;
        let viewport = fit_surface(surface, bounds, &self.settings);
        self.store_viewport(viewport);
        Some(viewport)
    }

    fn store_viewport(&mut self, viewport: Viewport) {
        self.zoom = viewport.zoom;
        self.viewport = Some(viewport);
    }

    fn reconcile_selection(&mut self) -> Option<String> {
        if self.settings.stale_selection == StaleSelection::Retain {
            return None;
        }
        let dangling = self
            .active
            .as_deref()
            .is_some_and(|id| !self.sites.iter().any(|site| site.id == id));
        if dangling {
            let cleared = self.active.take();
            tracing::debug!(site_id = ?cleared, "cleared selection missing from new results");
            cleared
        } else {
            None
        }
    }
}

fn fit_surface<S: MapSurface>(surface: &mut S, bounds: Bounds, settings: &MapSettings) -> Viewport {
    let fitted = surface.fit_bounds(bounds);
    let zoom = settings.clamp_zoom(fitted.zoom);
    if zoom == fitted.zoom {
        return fitted;
    }
    let clamped = Viewport {
        center: fitted.center,
        zoom,
    };
    surface.set_view(clamped);
    clamped
}
