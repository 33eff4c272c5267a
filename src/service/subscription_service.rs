//! User subscription management.
//!
//! Subscriptions are stored flat, one row per `(user_id, taxonomy_id)`.
//! Batches are applied as independent point writes that run concurrently;
//! the first failing write fails the batch and writes that already landed
//! stay in place. Every mutating call answers with the user's full set as
//! re-read from storage, never with an echo of its input.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use log::debug;

use crate::entity::SubscriberEntry;
use crate::entity::SubscriptionItem;
use crate::entity::SubscriptionModel;
use crate::entity::Taxonomy;
use crate::repository::Repository;
use crate::service::error::ServiceError;

pub struct SubscriptionService {
    pub db: Arc<Repository>,
}

impl SubscriptionService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Upserts one subscription per item, then returns the user's current set.
    ///
    /// # Performance
    /// * DB calls: N + 1
    pub async fn follow(
        &self,
        user_id: &str,
        items: &[SubscriptionItem],
    ) -> Result<Vec<Taxonomy>, ServiceError> {
        let now = Utc::now();
        let writes = items.iter().map(|item| {
            let model = SubscriptionModel::new(user_id, item, now);
            async move { self.db.subscription.upsert(&model).await }
        });
        try_join_all(writes).await?;
        debug!("User {user_id} followed {} taxonomies", items.len());

        self.list_subscriptions(user_id).await
    }

    /// Removes the subscription of each item. Pairs that do not exist are
    /// skipped silently.
    ///
    /// # Performance
    /// * DB calls: N + 1
    pub async fn unfollow(
        &self,
        user_id: &str,
        items: &[SubscriptionItem],
    ) -> Result<Vec<Taxonomy>, ServiceError> {
        let deletes = items.iter().map(|item| {
            self.db
                .subscription
                .delete_subscription(user_id, &item.taxonomy_id)
        });
        let removed = try_join_all(deletes)
            .await?
            .into_iter()
            .filter(|deleted| *deleted)
            .count();
        debug!(
            "User {user_id} unfollowed {removed} of {} taxonomies",
            items.len()
        );

        self.list_subscriptions(user_id).await
    }

    /// # Performance
    /// * DB calls: 2
    pub async fn unfollow_all(&self, user_id: &str) -> Result<Vec<Taxonomy>, ServiceError> {
        let removed = self.db.subscription.delete_all_by_user_id(user_id).await?;
        debug!("User {user_id} unfollowed all {removed} taxonomies");

        self.list_subscriptions(user_id).await
    }

    /// # Performance
    /// * DB calls: 1
    pub async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Taxonomy>, ServiceError> {
        let rows = self.db.subscription.select_all_by_user_id(user_id).await?;
        Ok(rows.into_iter().map(Taxonomy::from).collect())
    }

    /// Users following `taxonomy_id`, for alert fan-out.
    ///
    /// # Performance
    /// * DB calls: 1
    pub async fn list_subscribers(
        &self,
        taxonomy_id: &str,
    ) -> Result<Vec<SubscriberEntry>, ServiceError> {
        Ok(self
            .db
            .subscription
            .select_subscribers_by_taxonomy_id(taxonomy_id)
            .await?)
    }
}
