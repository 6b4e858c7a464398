//! The map rendering seam.

use sitescout_core::{Bounds, GeoPoint};

use crate::view::{InfoOverlay, MarkerView, Notice};

/// A center and zoom level the surface is currently showing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

/// Capability interface onto whatever actually draws the map.
///
/// Clicks on a placed marker are routed back by the host through
/// [`crate::SiteMapSession::click_marker`] using the marker's key.
pub trait MapSurface {
    /// Fits the view to `bounds` and reports the viewport the surface settled on.
    fn fit_bounds(&mut self, bounds: Bounds) -> Viewport;

    fn set_view(&mut self, viewport: Viewport);

    /// Removes every marker and overlay.
    fn clear(&mut self);

    fn place_marker(&mut self, marker: &MarkerView);

    fn open_overlay(&mut self, overlay: &InfoOverlay);

    /// Replaces the whole content area with a loading indicator.
    fn show_loading(&mut self) {}

    fn show_notice(&mut self, _notice: &Notice) {}
}
