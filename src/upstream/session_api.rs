//! HTTP client for the identity/session service.

use async_trait::async_trait;
use log::debug;

use crate::upstream::ApiInfo;
use crate::upstream::BaseApi;
use crate::upstream::SessionApi;
use crate::upstream::UserData;
use crate::upstream::error::UpstreamError;

const SESSION_ROUTE: &str = "/sessions/s/{id}";

pub struct HttpSessionApi {
    pub base: BaseApi,
}

impl HttpSessionApi {
    pub fn new(api_url: &str, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let info = ApiInfo::new("Session API", api_url, api_key);
        Ok(Self {
            base: BaseApi::new(info)?,
        })
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn get_user_data(&self, session_id: &str) -> Result<UserData, UpstreamError> {
        debug!("Resolving session with {}", self.base.info.name);
        // The token is an opaque caller-supplied cookie value.
        let url = match self.base.segment_url(&["sessions", "s", session_id]) {
            Ok(url) => url,
            Err(UpstreamError::InvalidPathSegment { .. }) => {
                return Err(UpstreamError::UserNotFound);
            }
            Err(e) => return Err(e),
        };
        let request = self.base.client().get(url);

        let body = match self.base.send(SESSION_ROUTE, request).await {
            Ok(body) => body,
            Err(UpstreamError::ApiError { status: 404, .. }) => {
                return Err(UpstreamError::UserNotFound);
            }
            Err(e) => return Err(e),
        };

        let user: UserData = serde_json::from_str(&body)?;
        if user.uuid.is_empty() {
            return Err(UpstreamError::UserNotFound);
        }
        Ok(user)
    }
}
