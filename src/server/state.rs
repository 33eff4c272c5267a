use std::sync::Arc;

use crate::config::Config;
use crate::service::Services;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(config: Arc<Config>, services: Arc<Services>) -> Self {
        Self { config, services }
    }
}
