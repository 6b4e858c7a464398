//! HTTP client for the site API.
//!
//! Wraps `reqwest` with typed error handling and response normalization.
//! Every call goes to the network; nothing is cached locally.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use sitescout_core::{AppConfig, SearchResultSet, SiteDetail};

use crate::error::ClientError;
use crate::normalize::{normalize_detail, normalize_search};
use crate::retry::retry_with_backoff;
use crate::types::SearchResponse;

/// Client for the site search, detail and list endpoints.
///
/// Use [`SitesClient::new`] with an explicit base URL (a wiremock server in
/// tests) or [`SitesClient::from_config`] in binaries.
pub struct SitesClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SitesClient {
    /// Creates a client with retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so path segments append to
        // the configured prefix instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "expected an http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Creates a client from the application config, including its retry policy.
    ///
    /// # Errors
    ///
    /// Same as [`SitesClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retries(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Enables bounded retries for search and detail lookups.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// transient failure. List mutations are never retried.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Searches for sites around a place name or site id.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the API has no match for `term`.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    /// - [`ClientError::Deserialize`] / [`ClientError::InvalidResponse`] if the
    ///   body does not match the expected shape.
    pub async fn search(&self, term: &str) -> Result<SearchResultSet, ClientError> {
        let url = self.endpoint(&["api", "search", term])?;
        let response: SearchResponse = self
            .get_json(&url, &format!("search(term={term})"))
            .await?;
        let result = normalize_search(term, response)?;
        tracing::debug!(
            term,
            sites = result.sites.len(),
            center = %result.center,
            "search completed"
        );
        Ok(result)
    }

    /// Fetches the detail payload for one site.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the API does not know `site_id`.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn fetch_detail(&self, site_id: &str) -> Result<SiteDetail, ClientError> {
        let url = self.endpoint(&["api", "sites", site_id])?;
        let detail: SiteDetail = self
            .get_json(&url, &format!("site(id={site_id})"))
            .await?;
        Ok(normalize_detail(site_id, detail))
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a GET (with the configured retry policy), maps 404 to
    /// [`ClientError::NotFound`] and other non-2xx statuses to
    /// [`ClientError::UnexpectedStatus`], and parses the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ClientError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url.clone()).send().await?;
            let response = Self::check_status(response)?;
            Ok(response.text().await?)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    pub(crate) fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: response.url().to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
