use log::error;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },

    #[error("Missing config with key \"{key}\"")]
    MissingConfig { key: String },

    #[error("Invalid value \"{value}\" for config key \"{key}\"")]
    InvalidConfig { key: String, value: String },

    #[error("Assertion error: {msg}")]
    AssertionError { msg: String },
}

impl AppError {
    /// Logs an unexpected error under a fresh reference id and returns the id.
    ///
    /// The id is what callers get to see; the details only go to the logs.
    pub fn log_with_ref(error: &dyn std::fmt::Display) -> String {
        let ref_id = Uuid::new_v4().to_string();
        error!("[ref {ref_id}] {error}");
        ref_id
    }
}

impl From<derive_builder::UninitializedFieldError> for AppError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        AppError::AssertionError {
            msg: value.to_string(),
        }
    }
}
