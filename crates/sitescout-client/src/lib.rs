pub mod client;
pub mod error;
mod lists;
pub mod normalize;
mod retry;
pub mod types;

pub use client::SitesClient;
pub use error::ClientError;
pub use normalize::{normalize_detail, normalize_search};
pub use types::{AddToListRequest, SearchResponse};
