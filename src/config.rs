//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Literal messages returned to callers on validation failures.
#[derive(Clone, Debug)]
pub struct ErrorMessages {
    pub session_id_required: String,
    pub no_parameters: String,
    pub id_parameter_required: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            session_id_required: "Session id is required".to_string(),
            no_parameters: "No follow or unfollow parameters were provided".to_string(),
            id_parameter_required: "The id parameter is required".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
    pub session_api_url: String,
    pub session_api_key: Option<String>,
    pub mailer_api_url: String,
    pub mailer_api_key: Option<String>,
    /// Recipient of the mailer health probe message.
    pub mailer_health_recipient: String,
    /// `chrono` strftime pattern used for every human-facing timestamp.
    pub date_format: String,
    pub health_check_interval: Duration,
    pub errors: ErrorMessages,
}

impl Config {
    /// Creates a configuration populated with defaults only.
    ///
    /// Call [`Config::load`] to apply the environment on top.
    pub fn new() -> Self {
        Self {
            port: 8080,
            db_url: "sqlite://data/follow.db".to_string(),
            db_path: "data/follow.db".to_string(),
            logs_path: PathBuf::from("logs"),
            session_api_url: String::new(),
            session_api_key: None,
            mailer_api_url: String::new(),
            mailer_api_key: None,
            mailer_health_recipient: "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz".to_string(),
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            health_check_interval: Duration::from_secs(60),
            errors: ErrorMessages::default(),
        }
    }

    /// Reads environment variables, keeping defaults for anything unset.
    pub fn load(&mut self) -> Result<(), AppError> {
        if let Some(port) = optional("PORT") {
            self.port = port.parse().map_err(|_| AppError::InvalidConfig {
                key: "PORT".to_string(),
                value: port,
            })?;
        }
        if let Some(db_url) = optional("DB_URL") {
            self.db_url = db_url;
        }
        if let Some(db_path) = optional("DB_PATH") {
            self.db_path = db_path;
        }
        if let Some(logs_path) = optional("LOGS_PATH") {
            self.logs_path = PathBuf::from(logs_path);
        }

        self.session_api_url = required("SESSION_API_URL")?;
        self.session_api_key = optional("SESSION_API_KEY");
        self.mailer_api_url = required("MAILER_API_URL")?;
        self.mailer_api_key = optional("MAILER_API_KEY");

        if let Some(recipient) = optional("MAILER_HEALTH_RECIPIENT") {
            self.mailer_health_recipient = recipient;
        }
        if let Some(date_format) = optional("DATE_FORMAT") {
            self.date_format = date_format;
        }
        if let Some(interval) = optional("HEALTH_CHECK_INTERVAL") {
            let secs = interval.parse::<u64>().map_err(|_| AppError::InvalidConfig {
                key: "HEALTH_CHECK_INTERVAL".to_string(),
                value: interval.clone(),
            })?;
            self.health_check_interval = Duration::from_secs(secs.max(1));
        }

        if let Some(message) = optional("ERROR_SESSION_ID_REQUIRED") {
            self.errors.session_id_required = message;
        }
        if let Some(message) = optional("ERROR_NO_PARAMETERS") {
            self.errors.no_parameters = message;
        }
        if let Some(message) = optional("ERROR_ID_PARAMETER_REQUIRED") {
            self.errors.id_parameter_required = message;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, AppError> {
    optional(key).ok_or_else(|| AppError::MissingConfig {
        key: key.to_string(),
    })
}
