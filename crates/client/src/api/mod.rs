#[allow(clippy::module_inception)]
mod client;
mod error;

pub mod drop;
pub mod file;
pub mod user;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// How a request uses the session's access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never sent (login)
    None,
    /// Sent when one is available
    Optional,
    /// The call fails with [`ApiError::Unauthenticated`] without one
    Required,
}

pub trait ApiRequest {
    type Response: DeserializeOwned;

    const AUTH: Auth = Auth::Required;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
