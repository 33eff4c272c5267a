//! Stored records and the values derived from them.

use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// Every followable taxonomy is currently an author.
pub const TAXONOMY_TYPE: &str = "authors";

/// Marker that selects [`Frequency::Immediate`] in a subscription descriptor.
pub const IMMEDIATE_MARKER: &str = "immediate";

/// Delivery cadence of a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, Default, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Immediate,
    #[default]
    Daily,
}

impl Frequency {
    /// Maps a descriptor marker to a frequency. Only the exact literal
    /// `immediate` selects immediate delivery.
    pub fn from_marker(marker: &str) -> Self {
        if marker == IMMEDIATE_MARKER {
            Frequency::Immediate
        } else {
            Frequency::Daily
        }
    }
}

/// One requested follow/unfollow, as parsed from a `freq,name,id` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionItem {
    pub taxonomy_id: String,
    pub taxonomy_name: String,
    pub frequency: Frequency,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Malformed subscription `{descriptor}`: expected 3 comma-separated parts, found {parts}")]
    WrongPartCount { descriptor: String, parts: usize },
}

impl FromStr for SubscriptionItem {
    type Err = DescriptorError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = descriptor.split(',').collect();
        let [marker, name, id] = parts.as_slice() else {
            return Err(DescriptorError::WrongPartCount {
                descriptor: descriptor.to_string(),
                parts: parts.len(),
            });
        };

        Ok(Self {
            taxonomy_id: id.to_string(),
            taxonomy_name: name.to_string(),
            frequency: Frequency::from_marker(marker),
        })
    }
}

/// A single `(user_id, taxonomy_id)` subscription row.
///
/// The pair is unique; following again updates `taxonomy_name` and
/// `frequency` in place and keeps the first `added_at`.
#[derive(FromRow, Serialize, Clone, Debug)]
pub struct SubscriptionModel {
    #[serde(default)]
    pub id: i64,
    pub user_id: String,
    pub taxonomy_id: String,
    pub taxonomy_name: String,
    pub frequency: Frequency,
    pub added_at: DateTime<Utc>,
}

impl SubscriptionModel {
    pub fn new(user_id: &str, item: &SubscriptionItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            user_id: user_id.to_string(),
            taxonomy_id: item.taxonomy_id.clone(),
            taxonomy_name: item.taxonomy_name.clone(),
            frequency: item.frequency,
            added_at,
        }
    }
}

/// Public view of a subscription, as listed back to its owner.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Taxonomy {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub frequency: Frequency,
}

impl From<SubscriptionModel> for Taxonomy {
    fn from(model: SubscriptionModel) -> Self {
        Self {
            id: model.taxonomy_id,
            name: model.taxonomy_name,
            r#type: TAXONOMY_TYPE.to_string(),
            frequency: model.frequency,
        }
    }
}

/// A user following some taxonomy, as returned by the reverse lookup.
#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubscriberEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Last time a background worker reported a completed run.
#[derive(FromRow, Serialize, Clone, Debug)]
pub struct WorkerHeartbeatModel {
    pub worker_type: String,
    pub last_run: DateTime<Utc>,
}
