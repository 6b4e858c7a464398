//! The remote lookup seam.

use async_trait::async_trait;
use sitescout_client::SitesClient;
use sitescout_core::{SearchResultSet, SiteDetail};

use crate::error::LookupError;

/// Search-by-term and detail-by-id against the site API.
///
/// Implementations must not cache: every call reaches the remote fresh.
/// Callers never pass an empty term to [`SiteLookup::search`].
#[async_trait]
pub trait SiteLookup: Send + Sync {
    async fn search(&self, term: &str) -> Result<SearchResultSet, LookupError>;

    async fn fetch_detail(&self, site_id: &str) -> Result<SiteDetail, LookupError>;
}

#[async_trait]
impl SiteLookup for SitesClient {
    async fn search(&self, term: &str) -> Result<SearchResultSet, LookupError> {
        SitesClient::search(self, term).await.map_err(|e| {
            tracing::debug!(term, error = %e, "site search failed");
            LookupError::from(e)
        })
    }

    async fn fetch_detail(&self, site_id: &str) -> Result<SiteDetail, LookupError> {
        SitesClient::fetch_detail(self, site_id).await.map_err(|e| {
            tracing::debug!(site_id, error = %e, "site detail fetch failed");
            LookupError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> SitesClient {
        SitesClient::new(&server.uri(), 5, "sitescout-test/0.1")
            .unwrap()
            .with_retries(0, 0)
    }

    #[tokio::test]
    async fn client_failures_surface_as_lookup_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search/atlantis"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/sites/eiffel-1"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let lookup: &dyn SiteLookup = &client;

        assert!(matches!(
            lookup.search("atlantis").await,
            Err(LookupError::NotFound(_))
        ));
        assert!(matches!(
            lookup.fetch_detail("eiffel-1").await,
            Err(LookupError::Network(_))
        ));
    }
}
