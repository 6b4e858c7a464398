//! Normalization of site API payloads into domain types.

use std::collections::HashSet;

use sitescout_core::{GeoPoint, SearchResultSet, SiteDetail, SiteSummary};

use crate::error::ClientError;
use crate::types::{SearchResponse, SiteFeature};

/// Converts a search response into a [`SearchResultSet`].
///
/// Features with a missing id, unusable coordinates, or an id already seen
/// earlier in the response are skipped with a warning. Response order is
/// preserved for the rest.
///
/// # Errors
///
/// Returns [`ClientError::InvalidResponse`] if the geocoded center is out of
/// range; without a center there is nothing to draw.
pub fn normalize_search(
    term: &str,
    response: SearchResponse,
) -> Result<SearchResultSet, ClientError> {
    let center =
        GeoPoint::new(response.lat, response.lon).map_err(|e| ClientError::InvalidResponse {
            context: format!("search(term={term})"),
            reason: e.to_string(),
        })?;

    let mut seen = HashSet::new();
    let sites = response
        .sites
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let feature = serde_json::from_value::<SiteFeature>(raw)
                .map_err(|e| {
                    tracing::warn!(term, index, error = %e, "normalize_search: skipping malformed feature");
                })
                .ok()?;
            let site = feature_to_summary(feature)
                .map_err(|reason| {
                    tracing::warn!(term, index, reason = %reason, "normalize_search: skipping unusable feature");
                })
                .ok()?;
            if seen.insert(site.id.clone()) {
                Some(site)
            } else {
                tracing::debug!(term, id = %site.id, "normalize_search: dropping duplicate site id");
                None
            }
        })
        .collect();

    Ok(SearchResultSet { center, sites })
}

fn feature_to_summary(feature: SiteFeature) -> Result<SiteSummary, String> {
    let id = feature.properties.xid.trim().to_owned();
    if id.is_empty() {
        return Err("empty xid".to_owned());
    }

    let [lng, lat] = feature.geometry.coordinates.as_slice() else {
        return Err(format!(
            "expected [lng, lat], got {} coordinates",
            feature.geometry.coordinates.len()
        ));
    };
    let location = GeoPoint::new(*lat, *lng).map_err(|e| e.to_string())?;

    let name = feature
        .properties
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| id.clone());

    Ok(SiteSummary { id, name, location })
}

/// Fills in the site id when the detail payload omits it.
#[must_use]
pub fn normalize_detail(requested_id: &str, mut detail: SiteDetail) -> SiteDetail {
    if detail.id.trim().is_empty() {
        requested_id.clone_into(&mut detail.id);
    }
    detail
}
