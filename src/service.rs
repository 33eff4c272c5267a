//! Business logic services for subscriptions, sessions and health.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::repository::Repository;
use crate::service::health_service::HealthCheck;
use crate::service::health_service::HealthService;
use crate::service::health_service::MailerHealthCheck;
use crate::service::health_service::WorkerHealthCheck;
use crate::service::session_service::SessionService;
use crate::service::subscription_service::SubscriptionService;
use crate::upstream::Mailer;
use crate::upstream::SessionApi;

pub mod error;
pub mod health_service;
pub mod session_service;
pub mod subscription_service;

/// Container for all application services.
pub struct Services {
    pub subscription: Arc<SubscriptionService>,
    pub session: Arc<SessionService>,
    pub health: Arc<HealthService>,
}

impl Services {
    /// Creates and initializes all services.
    pub fn new(
        db: Arc<Repository>,
        session_api: Arc<dyn SessionApi>,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Result<Self, AppError> {
        let checks: Vec<Arc<dyn HealthCheck>> = vec![
            Arc::new(WorkerHealthCheck::content_worker(db.clone())?),
            Arc::new(WorkerHealthCheck::daily_worker(db.clone())?),
            Arc::new(MailerHealthCheck::new(
                mailer,
                &config.mailer_health_recipient,
            )?),
        ];

        Ok(Self {
            subscription: Arc::new(SubscriptionService::new(db)),
            session: Arc::new(SessionService::new(session_api)),
            health: Arc::new(HealthService::new(checks, &config.date_format)),
        })
    }
}
