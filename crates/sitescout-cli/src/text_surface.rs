//! A `MapSurface` that renders to plain text for the terminal.

use std::fmt::Write as _;

use sitescout_core::Bounds;
use sitescout_map::{InfoOverlay, MapSurface, MarkerView, Notice, OverlayImage, Viewport};

const MAX_ZOOM: f64 = 20.0;

#[derive(Debug, Default)]
pub(crate) struct TextSurface {
    viewport: Option<Viewport>,
    lines: Vec<String>,
}

impl TextSurface {
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        if let Some(viewport) = self.viewport {
            let _ = writeln!(out, "map @ {} zoom {}", viewport.center, viewport.zoom);
        }
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// Web-map zoom level that fits `bounds`: each level halves the visible
/// span, starting from the whole world at zoom 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn zoom_for(bounds: &Bounds) -> u8 {
    let lat_span = bounds.north_east.lat() - bounds.south_west.lat();
    let lng_span = bounds.north_east.lng() - bounds.south_west.lng();
    let span = lat_span.max(lng_span);
    if span <= f64::EPSILON {
        return MAX_ZOOM as u8;
    }
    (360.0 / span).log2().floor().clamp(0.0, MAX_ZOOM) as u8
}

impl MapSurface for TextSurface {
    fn fit_bounds(&mut self, bounds: Bounds) -> Viewport {
        let viewport = Viewport {
            center: bounds.center(),
            zoom: zoom_for(&bounds),
        };
        self.viewport = Some(viewport);
        viewport
    }

    fn set_view(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn place_marker(&mut self, marker: &MarkerView) {
        let bullet = if marker.active { '*' } else { '-' };
        self.lines.push(format!(
            " {bullet} {:<24} {} {}",
            marker.key, marker.position, marker.name
        ));
    }

    fn open_overlay(&mut self, overlay: &InfoOverlay) {
        let image = match &overlay.image {
            OverlayImage::Remote(url) => url.as_str(),
            OverlayImage::Placeholder => overlay.image.alt_text(),
        };
        self.lines.push(format!("   [{}]", overlay.title));
        self.lines.push(format!("   image: {image}"));
        self.lines.push(format!("   learn more: {}", overlay.learn_more_href));
    }

    fn show_loading(&mut self) {
        self.lines.clear();
        self.lines.push("loading...".to_owned());
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.lines.push(format!("! {notice}"));
    }
}
