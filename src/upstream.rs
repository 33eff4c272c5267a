//! Clients for the external services this API depends on.
//!
//! - **Session API**: resolves an opaque `FTSession` cookie to a user identity.
//! - **Mailer**: sends email; only exercised here by the mailer health check.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::upstream::error::UpstreamError;

pub mod error;
pub mod mailer;
pub mod session_api;

/// Header carrying the API key on every upstream request.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Identity data behind a session.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserData {
    #[serde(default)]
    pub uuid: String,
}

#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Resolves a session token to the user it belongs to.
    async fn get_user_data(&self, session_id: &str) -> Result<UserData, UpstreamError>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), UpstreamError>;
}

/// Where an upstream service lives and how to authenticate against it.
#[derive(Clone, Debug)]
pub struct ApiInfo {
    /// Human-readable name used in logs, e.g. "Session API"
    pub name: String,
    /// Base url without trailing slash, e.g. https://session.example.com
    pub api_url: String,
    pub api_key: Option<String>,
}

impl ApiInfo {
    pub fn new(name: &str, api_url: &str, api_key: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

/// Shared HTTP plumbing for upstream clients.
#[derive(Clone)]
pub struct BaseApi {
    pub info: ApiInfo,
    client: reqwest::Client,
}

impl BaseApi {
    pub fn new(info: ApiInfo) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("follow-api/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { info, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.info.api_url, path)
    }

    /// Appends each of `segments` to the base url as exactly one path
    /// segment. Separators and query characters inside a segment are
    /// percent-encoded, and `.` / `..` segments are rejected.
    pub fn segment_url(&self, segments: &[&str]) -> Result<reqwest::Url, UpstreamError> {
        if let Some(segment) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(UpstreamError::InvalidPathSegment {
                segment: segment.to_string(),
            });
        }

        let mut url = reqwest::Url::parse(&self.info.api_url)
            .map_err(|e| UpstreamError::RequestFailed(Box::new(e)))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidBaseUrl {
                url: self.info.api_url.clone(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches the API key, sends the request and returns the response body
    /// of a successful (2xx) response.
    ///
    /// `route` is the path template logged in place of the real url, which
    /// may carry credentials.
    pub async fn send(
        &self,
        route: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, UpstreamError> {
        let request = match &self.info.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };

        let req = request.build()?;
        debug!("Making {} request to {} {route}", req.method(), self.info.name);
        let response = self.client.execute(req).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::ApiError {
                api: self.info.name.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
