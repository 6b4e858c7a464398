//! Wire types for the site API.
//!
//! The search endpoint answers with a geocoded center (`lat`/`lon`) and a list
//! of GeoJSON features. Features are kept as raw JSON here and parsed one by
//! one during normalization so a single malformed entry does not sink the
//! whole result set.

use serde::{Deserialize, Serialize};

use sitescout_core::SiteDetail;

// ---------------------------------------------------------------------------
// GET /api/search/{term}
// ---------------------------------------------------------------------------

/// Body of a successful search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub sites: Vec<serde_json::Value>,
}

/// A GeoJSON point feature describing one site.
#[derive(Debug, Deserialize)]
pub struct SiteFeature {
    pub geometry: FeatureGeometry,
    pub properties: FeatureProperties,
}

/// GeoJSON geometry. Coordinates are `[lng, lat]`, in that order.
#[derive(Debug, Deserialize)]
pub struct FeatureGeometry {
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    pub xid: String,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// PATCH /api/lists/{list}
// ---------------------------------------------------------------------------

/// Body of an add-to-list request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToListRequest<'a> {
    pub site_data: &'a SiteDetail,
    /// Lowercased list name; the list API keys lists case-insensitively.
    pub search_value: &'a str,
    pub email: &'a str,
}
