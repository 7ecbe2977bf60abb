//! Authenticated REST transport for the Veridoc backend.
//!
//! One [`ApiClient`] per backend: a shared `reqwest::Client`, the backend
//! base URL, and an injected [`CredentialProvider`]. Every request carries
//! the current bearer token; a single `401 Unauthorized` triggers one silent
//! credential refresh and one replay of the original request, never more.

pub mod credentials;
pub mod error;

pub use credentials::{CredentialProvider, Refresher, SessionCredentials, StaticToken};
pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config;

/// Connection establishment budget.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Whole-request budget; generous enough for multipart uploads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Thin authenticated REST client. Cheap to share behind an `Arc`.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            credentials,
        }
    }

    /// Client against the configured backend (`VERIDOC_API_URL` or the
    /// development default).
    pub fn from_env(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::new(&config::api_base_url(), credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Typed verbs ─────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.execute(|http| Ok(http.get(&url))).await?;
        Self::decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.execute(|http| Ok(http.post(&url).json(body))).await?;
        Self::decode(response).await
    }

    /// POST where the caller does not care about the response body.
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        self.execute(|http| Ok(http.post(&url).json(body))).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.execute(|http| Ok(http.delete(&url))).await?;
        Ok(())
    }

    /// Multipart POST. Takes a form *builder* rather than a built form
    /// because the 401 replay must reconstruct the request from scratch.
    pub async fn post_multipart<T, F>(&self, path: &str, form: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> Result<Form, ApiError>,
    {
        let url = self.url(path);
        let response = self
            .execute(|http| Ok(http.post(&url).multipart(form()?)))
            .await?;
        Self::decode(response).await
    }

    // ── Internal ────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with the current bearer token. On a 401, refresh the
    /// credential once and replay the rebuilt request; a second 401 (or a
    /// refresh that yields nothing) surfaces as `Unauthorized`.
    async fn execute<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> Result<RequestBuilder, ApiError>,
    {
        let mut request = build(&self.http)?;
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let Some(fresh) = self.credentials.refresh().await? else {
                return Err(ApiError::Unauthorized);
            };
            tracing::debug!("credential refreshed, replaying request");
            let replay = build(&self.http)?.bearer_auth(fresh);
            let response = replay.send().await.map_err(ApiError::from)?;
            return Self::check(response).await;
        }
        Self::check(response).await
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::api(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
