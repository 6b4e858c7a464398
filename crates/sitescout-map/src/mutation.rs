//! Adding the active site to a named list.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitescout_client::{AddToListRequest, SitesClient};
use sitescout_core::{Identity, SiteDetail};

use crate::error::MutationError;

/// A fully-prepared "add site to list" request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListMutation {
    /// List name as the user typed it; used to address the list.
    pub list_key: String,
    /// Lowercased list name sent in the request body.
    pub search_value: String,
    pub site: SiteDetail,
    pub email: String,
}

impl ListMutation {
    /// # Errors
    ///
    /// Returns [`MutationError::EmptyListName`] if `list_name` is blank.
    pub fn new(list_name: &str, site: SiteDetail, identity: &Identity) -> Result<Self, MutationError> {
        let list_key = list_name.trim();
        if list_key.is_empty() {
            return Err(MutationError::EmptyListName);
        }
        Ok(Self {
            list_key: list_key.to_owned(),
            search_value: list_key.to_lowercase(),
            site,
            email: identity.email.clone(),
        })
    }
}

/// Remote store of personal lists.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn add_site(&self, mutation: &ListMutation) -> Result<(), MutationError>;
}

#[async_trait]
impl ListStore for SitesClient {
    async fn add_site(&self, mutation: &ListMutation) -> Result<(), MutationError> {
        let request = AddToListRequest {
            site_data: &mutation.site,
            search_value: &mutation.search_value,
            email: &mutation.email,
        };
        self.add_to_list(&mutation.list_key, &request)
            .await
            .map_err(MutationError::from)
    }
}

/// Confirmation of a successful list update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReceipt {
    pub list: String,
    pub site_id: String,
    pub added_at: DateTime<Utc>,
}

/// Sends list mutations and logs their outcome. Failures are returned as
/// values and never retried.
#[derive(Clone)]
pub struct ListMutationGateway {
    store: Arc<dyn ListStore>,
}

impl ListMutationGateway {
    #[must_use]
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    /// Adds `site` to the list named `list_name` on behalf of `identity`.
    ///
    /// # Errors
    ///
    /// - [`MutationError::EmptyListName`] for a blank list name.
    /// - [`MutationError::Network`] / [`MutationError::Rejected`] from the store.
    pub async fn add_to_list(
        &self,
        list_name: &str,
        site: SiteDetail,
        identity: &Identity,
    ) -> Result<MutationReceipt, MutationError> {
        let mutation = ListMutation::new(list_name, site, identity)?;
        self.submit(mutation).await
    }

    /// Sends an already-validated mutation.
    ///
    /// # Errors
    ///
    /// Whatever the underlying [`ListStore`] reports.
    pub async fn submit(&self, mutation: ListMutation) -> Result<MutationReceipt, MutationError> {
        match self.store.add_site(&mutation).await {
            Ok(()) => {
                tracing::info!(
                    list = %mutation.list_key,
                    site_id = %mutation.site.id,
                    "site added to list"
                );
                Ok(MutationReceipt {
                    list: mutation.list_key,
                    site_id: mutation.site.id,
                    added_at: Utc::now(),
                })
            }
            Err(e) => {
                tracing::warn!(
                    list = %mutation.list_key,
                    site_id = %mutation.site.id,
                    error = %e,
                    "list update failed"
                );
                Err(e)
            }
        }
    }
}
