//! Maps session tokens to user identities through the session API.

use std::sync::Arc;

use log::debug;

use crate::service::error::ServiceError;
use crate::upstream::SessionApi;
use crate::upstream::error::UpstreamError;

pub struct SessionService {
    api: Arc<dyn SessionApi>,
}

impl SessionService {
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self { api }
    }

    /// Returns the stable user id behind `session_id`.
    ///
    /// The token itself is never inspected here; validity is entirely the
    /// session API's call.
    pub async fn resolve_user_id(&self, session_id: &str) -> Result<String, ServiceError> {
        let user = self.api.get_user_data(session_id).await?;
        if user.uuid.is_empty() {
            return Err(UpstreamError::UserNotFound.into());
        }
        debug!("Session resolved to user {}", user.uuid);
        Ok(user.uuid)
    }
}
