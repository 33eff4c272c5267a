use crate::repository::error::DatabaseError;
use crate::upstream::error::UpstreamError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("UpstreamError: {0}")]
    UpstreamError(#[from] UpstreamError),

    #[error("DatabaseError: {0}")]
    DatabaseError(#[from] DatabaseError),
}
