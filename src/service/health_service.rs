//! Health checks for the workers and services that alert delivery relies on.
//!
//! Check definitions are plain values handed to each check; results live in
//! the [`HealthService`] that owns the checks, so nothing here is global.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use derive_builder::Builder;
use futures::future::join_all;
use log::debug;
use log::warn;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::repository::Repository;
use crate::upstream::Mailer;

pub const CONTENT_WORKER: &str = "content";
pub const DAILY_WORKER: &str = "daily";

/// The content worker caches articles every few minutes.
const CONTENT_WORKER_MAX_AGE_SECS: i64 = 60 * 15;
/// The daily worker runs once a day; allow a few hours of slack.
const DAILY_WORKER_MAX_AGE_SECS: i64 = 60 * 60 * 28;

const MAILER_PROBE_SUBJECT: &str = "test-subject";
const MAILER_PROBE_BODY: &str = "test-content";

/// Static description of a health check.
#[derive(Builder, Clone, Debug)]
#[builder(setter(into), build_fn(error = "AppError"))]
pub struct HealthCheckInfo {
    pub name: String,
    #[builder(default)]
    pub id: String,
    pub technical_summary: String,
    #[builder(default = "2")]
    pub severity: u8,
    pub business_impact: String,
    #[builder(default)]
    pub panic_guide: String,
}

/// Outcome of the latest run of a check, in the health endpoint's format.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub ok: bool,
    pub technical_summary: String,
    pub severity: u8,
    pub business_impact: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub check_output: String,
    pub panic_guide: String,
    pub last_updated: Option<String>,
}

impl HealthCheckResult {
    /// A check that has not run yet.
    pub fn pending(info: &HealthCheckInfo) -> Self {
        Self {
            name: info.name.clone(),
            id: info.id.clone(),
            ok: false,
            technical_summary: info.technical_summary.clone(),
            severity: info.severity,
            business_impact: info.business_impact.clone(),
            check_output: String::new(),
            panic_guide: info.panic_guide.clone(),
            last_updated: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u8,
    pub name: String,
    pub description: String,
    pub checks: Vec<HealthCheckResult>,
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn info(&self) -> &HealthCheckInfo;

    /// Runs the check once. `Err` carries the check output shown to operators.
    async fn run(&self) -> Result<(), String>;
}

/// Reports a background worker as unhealthy once its last recorded run is
/// older than `max_age`.
pub struct WorkerHealthCheck {
    info: HealthCheckInfo,
    db: Arc<Repository>,
    worker_type: String,
    max_age: Duration,
}

impl WorkerHealthCheck {
    pub fn new(
        info: HealthCheckInfo,
        db: Arc<Repository>,
        worker_type: &str,
        max_age: Duration,
    ) -> Self {
        Self {
            info,
            db,
            worker_type: worker_type.to_string(),
            max_age,
        }
    }

    pub fn content_worker(db: Arc<Repository>) -> Result<Self, AppError> {
        let info = HealthCheckInfoBuilder::default()
            .name("Content caching worker")
            .technical_summary(
                "Worker runs at specific interval to cache content from content api",
            )
            .business_impact("No content for alerts will be available")
            .build()?;
        Ok(Self::new(
            info,
            db,
            CONTENT_WORKER,
            Duration::seconds(CONTENT_WORKER_MAX_AGE_SECS),
        ))
    }

    pub fn daily_worker(db: Arc<Repository>) -> Result<Self, AppError> {
        let info = HealthCheckInfoBuilder::default()
            .name("Daily alerts worker")
            .technical_summary("Worker sends alerts daily, at specific date and time")
            .business_impact("No daily alerts will be sent")
            .build()?;
        Ok(Self::new(
            info,
            db,
            DAILY_WORKER,
            Duration::seconds(DAILY_WORKER_MAX_AGE_SECS),
        ))
    }
}

#[async_trait]
impl HealthCheck for WorkerHealthCheck {
    fn info(&self) -> &HealthCheckInfo {
        &self.info
    }

    async fn run(&self) -> Result<(), String> {
        let heartbeat = self
            .db
            .worker_heartbeat
            .select(&self.worker_type)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("No run recorded for worker `{}`", self.worker_type))?;

        let age = Utc::now() - heartbeat.last_run;
        if age > self.max_age {
            return Err(format!(
                "Worker `{}` last ran {}s ago, expected at most {}s",
                self.worker_type,
                age.num_seconds(),
                self.max_age.num_seconds()
            ));
        }
        Ok(())
    }
}

/// Sends a probe message through the mailer.
pub struct MailerHealthCheck {
    info: HealthCheckInfo,
    mailer: Arc<dyn Mailer>,
    recipient: String,
}

impl MailerHealthCheck {
    pub fn new(mailer: Arc<dyn Mailer>, recipient: &str) -> Result<Self, AppError> {
        let info = HealthCheckInfoBuilder::default()
            .name("Send API")
            .id("send-api")
            .technical_summary("Send email messages")
            .business_impact("No alerts will be sent")
            .build()?;
        Ok(Self {
            info,
            mailer,
            recipient: recipient.to_string(),
        })
    }
}

#[async_trait]
impl HealthCheck for MailerHealthCheck {
    fn info(&self) -> &HealthCheckInfo {
        &self.info
    }

    async fn run(&self) -> Result<(), String> {
        self.mailer
            .send(&self.recipient, MAILER_PROBE_SUBJECT, MAILER_PROBE_BODY)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Runs health checks and keeps the latest result of each.
pub struct HealthService {
    checks: Vec<Arc<dyn HealthCheck>>,
    results: RwLock<Vec<HealthCheckResult>>,
    date_format: String,
}

impl HealthService {
    pub fn new(checks: Vec<Arc<dyn HealthCheck>>, date_format: &str) -> Self {
        let results = checks
            .iter()
            .map(|check| HealthCheckResult::pending(check.info()))
            .collect();
        Self {
            checks,
            results: RwLock::new(results),
            date_format: date_format.to_string(),
        }
    }

    /// Runs every check concurrently and stores the outcomes.
    pub async fn run_checks(&self) -> Vec<HealthCheckResult> {
        let outcomes = join_all(self.checks.iter().map(|check| check.run())).await;
        let last_updated = format_timestamp(Utc::now(), &self.date_format);

        let results: Vec<HealthCheckResult> = self
            .checks
            .iter()
            .zip(outcomes)
            .map(|(check, outcome)| {
                let mut result = HealthCheckResult::pending(check.info());
                result.last_updated = Some(last_updated.clone());
                match outcome {
                    Ok(()) => result.ok = true,
                    Err(output) => {
                        warn!("Health check `{}` failed: {output}", result.name);
                        result.check_output = output;
                    }
                }
                result
            })
            .collect();

        debug!(
            "Health checks complete: {}/{} ok",
            results.iter().filter(|r| r.ok).count(),
            results.len()
        );
        *self.results.write().await = results.clone();
        results
    }

    /// Latest stored results, without running anything.
    pub async fn report(&self) -> HealthReport {
        HealthReport {
            schema_version: 1,
            name: env!("CARGO_PKG_NAME").to_string(),
            description: "Follow and unfollow taxonomies to receive email alerts".to_string(),
            checks: self.results.read().await.clone(),
        }
    }
}

/// Formats `at` with a strftime pattern, falling back to RFC 3339 when the
/// pattern is invalid.
pub fn format_timestamp(at: DateTime<Utc>, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(date_format)).is_err() {
        return at.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(at, "%Y-%m-%d %H:%M:%S"), "2025-03-01 08:30:00");
        assert_eq!(format_timestamp(at, "%Q"), at.to_rfc3339());
    }

    #[test]
    fn test_info_builder_defaults() {
        let info = HealthCheckInfoBuilder::default()
            .name("Check")
            .technical_summary("Summary")
            .business_impact("Impact")
            .build()
            .unwrap();
        assert_eq!(info.severity, 2);
        assert!(info.panic_guide.is_empty());

        let result = HealthCheckResult::pending(&info);
        assert!(!result.ok);
        assert!(result.last_updated.is_none());
    }

    #[test]
    fn test_info_builder_missing_field() {
        let err = HealthCheckInfoBuilder::default().name("Check").build();
        assert!(matches!(err, Err(AppError::AssertionError { .. })));
    }
}
