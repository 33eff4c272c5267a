//! Database table operations and implementations.

use chrono::DateTime;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::entity::SubscriberEntry;
use crate::entity::SubscriptionModel;
use crate::entity::WorkerHeartbeatModel;
use crate::repository::error::DatabaseError;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Base trait for table operations.
///
/// Schemas live in `./migrations`; tables only expose maintenance helpers
/// on top of their own queries.
#[async_trait::async_trait]
pub trait TableBase {
    /// Drops the table.
    async fn drop_table(&self) -> Result<(), DatabaseError>;
    /// Deletes all rows from the table.
    async fn delete_all(&self) -> Result<(), DatabaseError>;
}

macro_rules! impl_table {
    ($struct_name:ident, $table:expr) => {
        #[derive(Clone)]
        pub struct $struct_name {
            base: BaseTable,
        }

        impl $struct_name {
            pub fn new(pool: SqlitePool) -> Self {
                Self {
                    base: BaseTable::new(pool),
                }
            }
        }

        #[async_trait::async_trait]
        impl TableBase for $struct_name {
            async fn drop_table(&self) -> Result<(), DatabaseError> {
                sqlx::query(concat!("DROP TABLE IF EXISTS ", $table))
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }

            async fn delete_all(&self) -> Result<(), DatabaseError> {
                sqlx::query(concat!("DELETE FROM ", $table))
                    .execute(&self.base.pool)
                    .await?;
                Ok(())
            }
        }
    };
}

// ============================================================================
// SubscriptionTable
// ============================================================================

impl_table!(SubscriptionTable, "subscriptions");

impl SubscriptionTable {
    /// Inserts the `(user_id, taxonomy_id)` pair or, if it already exists,
    /// overwrites its name and frequency. `added_at` of an existing row is kept.
    pub async fn upsert(&self, model: &SubscriptionModel) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, taxonomy_id, taxonomy_name, frequency, added_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, taxonomy_id) DO UPDATE SET
                taxonomy_name = excluded.taxonomy_name,
                frequency = excluded.frequency
            "#,
        )
        .bind(&model.user_id)
        .bind(&model.taxonomy_id)
        .bind(&model.taxonomy_name)
        .bind(model.frequency)
        .bind(model.added_at)
        .execute(&self.base.pool)
        .await?;
        Ok(())
    }

    pub async fn select(
        &self,
        user_id: &str,
        taxonomy_id: &str,
    ) -> Result<Option<SubscriptionModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriptionModel>(
            "SELECT * FROM subscriptions WHERE user_id = ? AND taxonomy_id = ?",
        )
        .bind(user_id)
        .bind(taxonomy_id)
        .fetch_optional(&self.base.pool)
        .await?)
    }

    /// All subscriptions of a user, ordered by `added_at` then `taxonomy_id`.
    ///
    /// Rows of one batch share `added_at` but are written concurrently, so
    /// `id` order is not stable within a batch.
    pub async fn select_all_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Vec<SubscriptionModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriptionModel>(
            "SELECT * FROM subscriptions WHERE user_id = ? ORDER BY added_at, taxonomy_id",
        )
        .bind(user_id)
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// Followers of a taxonomy, ordered by `added_at` then `user_id`.
    pub async fn select_subscribers_by_taxonomy_id(
        &self,
        taxonomy_id: &str,
    ) -> Result<Vec<SubscriberEntry>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriberEntry>(
            "SELECT user_id FROM subscriptions WHERE taxonomy_id = ? ORDER BY added_at, user_id",
        )
        .bind(taxonomy_id)
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// Delete a specific subscription. Returns whether a row was removed.
    pub async fn delete_subscription(
        &self,
        user_id: &str,
        taxonomy_id: &str,
    ) -> Result<bool, DatabaseError> {
        let res = sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND taxonomy_id = ?")
            .bind(user_id)
            .bind(taxonomy_id)
            .execute(&self.base.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Delete all subscriptions of a user. Returns the number of rows removed.
    pub async fn delete_all_by_user_id(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let res = sqlx::query("DELETE FROM subscriptions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.base.pool)
            .await?;
        Ok(res.rows_affected())
    }
}

// ============================================================================
// WorkerHeartbeatTable
// ============================================================================

impl_table!(WorkerHeartbeatTable, "worker_heartbeats");

impl WorkerHeartbeatTable {
    pub async fn replace(&self, model: &WorkerHeartbeatModel) -> Result<(), DatabaseError> {
        sqlx::query("REPLACE INTO worker_heartbeats (worker_type, last_run) VALUES (?, ?)")
            .bind(&model.worker_type)
            .bind(model.last_run)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    pub async fn select(
        &self,
        worker_type: &str,
    ) -> Result<Option<WorkerHeartbeatModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, WorkerHeartbeatModel>(
            "SELECT * FROM worker_heartbeats WHERE worker_type = ?",
        )
        .bind(worker_type)
        .fetch_optional(&self.base.pool)
        .await?)
    }

    /// Records a run of `worker_type` at `at`.
    pub async fn touch(&self, worker_type: &str, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.replace(&WorkerHeartbeatModel {
            worker_type: worker_type.to_string(),
            last_run: at,
        })
        .await
    }
}
