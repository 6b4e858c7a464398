//! List endpoint for the site API client.

use crate::client::SitesClient;
use crate::error::ClientError;
use crate::types::AddToListRequest;

impl SitesClient {
    /// Adds a site to the user's list addressed by `list_key`.
    ///
    /// Sends `PATCH {base}/api/lists/{list_key}` with `request` as the body,
    /// unchanged. Not retried.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::NotFound`] / [`ClientError::UnexpectedStatus`] if the
    ///   API rejects the request.
    pub async fn add_to_list(
        &self,
        list_key: &str,
        request: &AddToListRequest<'_>,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "lists", list_key])?;
        let response = self.client.patch(url).json(request).send().await?;
        Self::check_status(response)?;
        tracing::debug!(list = request.search_value, site_id = %request.site_data.id, "site added to list");
        Ok(())
    }
}
