use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use common::auth::CredentialStore;

use super::error::ApiError;
use super::user::{LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest};
use super::{ApiRequest, Auth};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(remote: &Url, credentials: CredentialStore) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        // endpoint paths are joined relative to the base
        let mut remote = remote.clone();
        if !remote.path().ends_with('/') {
            let path = format!("{}/", remote.path());
            remote.set_path(&path);
        }

        Ok(Self {
            remote,
            client,
            credentials,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let mut request_builder = request.build_request(&self.remote, &self.client)?;

        match (T::AUTH, self.credentials.authorization_header_value()) {
            (Auth::None, _) => {}
            (_, Some(bearer)) => {
                request_builder = request_builder.header(AUTHORIZATION, bearer);
            }
            (Auth::Optional, None) => {}
            (Auth::Required, None) => return Err(ApiError::Unauthenticated),
        }

        let response = request_builder.send().await?;

        if response.status().is_success() {
            let body: Value = response.json().await?;
            Ok(serde_json::from_value(unwrap_envelope(body)?)?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Log in and keep the issued token pair
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .call(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        if !self.credentials.store(&response.access, &response.refresh) {
            return Err(ApiError::InvalidSession);
        }
        tracing::info!("logged in as {}", username);
        Ok(response)
    }

    /// Trade the refresh token for a new pair, replacing the old one
    ///
    /// Backends that do not rotate refresh tokens only return a new access
    /// token; the current refresh token is kept in that case.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let refresh = self
            .credentials
            .read()
            .refresh
            .ok_or(ApiError::Unauthenticated)?;

        let response = self
            .call(RefreshTokenRequest {
                refresh: refresh.clone(),
            })
            .await?;

        let next_refresh = response.refresh.unwrap_or(refresh);
        if !self.credentials.store(&response.access, &next_refresh) {
            return Err(ApiError::InvalidSession);
        }
        tracing::debug!("refreshed session tokens");
        Ok(())
    }

    /// Revoke the refresh token on the backend, then forget the session
    ///
    /// The local session is cleared whatever the backend answers; the
    /// returned error only reports that revocation may not have happened.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.credentials.read().refresh {
            Some(refresh) => self.call(LogoutRequest { refresh }).await.map(|_| ()),
            None => Ok(()),
        };
        self.credentials.clear();
        tracing::info!("logged out");
        result
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

/// Unwrap `{ code, msg, data }` envelopes; other bodies pass through
fn unwrap_envelope(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };
    if !map.contains_key("code") {
        return Ok(Value::Object(map));
    }

    let code = map.get("code").and_then(Value::as_i64).unwrap_or(-1);
    if code != 0 {
        let message = map
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("backend error")
            .to_string();
        return Err(ApiError::Backend { code, message });
    }
    Ok(map.remove("data").unwrap_or(Value::Null))
}
