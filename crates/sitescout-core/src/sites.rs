//! Site records produced by the lookup service.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// One search hit, rendered as a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
}

/// Descriptive payload for a single site, fetched when its marker is activated.
///
/// Fields other than `xid`, `name` and `image` are kept verbatim in
/// `attributes` so the whole payload can be forwarded to the list API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetail {
    #[serde(rename = "xid", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl SiteDetail {
    /// The image URL, treating an empty string the same as a missing image.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// The complete output of one search call.
///
/// A new result set always replaces the previous one; sets are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub center: GeoPoint,
    pub sites: Vec<SiteSummary>,
}

impl SearchResultSet {
    #[must_use]
    pub fn empty_at(center: GeoPoint) -> Self {
        Self {
            center,
            sites: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SiteSummary> {
        self.sites.iter().find(|site| site.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}
