use sitescout_client::ClientError;
use thiserror::Error;

/// Failure of a search or detail lookup.
///
/// Carries rendered messages rather than the transport error so outcomes can
/// be cloned into session events and view notices.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Transport or connectivity failure, including 5xx answers.
    #[error("network error: {0}")]
    Network(String),

    /// The remote explicitly has no data for the term or id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote answered with a body we could not use.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<ClientError> for LookupError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { url } => LookupError::NotFound(url),
            ClientError::Http(_) | ClientError::UnexpectedStatus { .. } => {
                LookupError::Network(err.to_string())
            }
            ClientError::Deserialize { .. }
            | ClientError::InvalidResponse { .. }
            | ClientError::InvalidBaseUrl { .. } => LookupError::Malformed(err.to_string()),
        }
    }
}

/// A detail fetch for an activated marker failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not load details for site {site_id}: {source}")]
pub struct DetailLoadError {
    pub site_id: String,
    #[source]
    pub source: LookupError,
}

/// Adding a site to a list failed. Never fatal to the search/map flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("no site detail is loaded for the active marker")]
    NoActiveSite,

    #[error("no signed-in user")]
    MissingIdentity,

    #[error("list name is empty")]
    EmptyListName,

    #[error("list request failed: {0}")]
    Network(String),

    #[error("list API rejected the request: {0}")]
    Rejected(String),
}

impl From<ClientError> for MutationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(_) => MutationError::Network(err.to_string()),
            ClientError::UnexpectedStatus { status, .. } if status >= 500 => {
                MutationError::Network(err.to_string())
            }
            ClientError::UnexpectedStatus { .. }
            | ClientError::NotFound { .. }
            | ClientError::Deserialize { .. }
            | ClientError::InvalidResponse { .. }
            | ClientError::InvalidBaseUrl { .. } => MutationError::Rejected(err.to_string()),
        }
    }
}
