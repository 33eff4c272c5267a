//! Request handlers.
//!
//! Validation order is session cookie, then parameters, then the session
//! lookup. Storage is only touched once all three have passed.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::Query;
use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::SubscriberEntry;
use crate::entity::SubscriptionItem;
use crate::entity::Taxonomy;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::service::health_service::HealthReport;

pub const SESSION_COOKIE: &str = "FTSession";

#[derive(Deserialize, Default, Debug)]
pub struct FollowParams {
    #[serde(default)]
    pub follow: Vec<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct UnfollowParams {
    #[serde(default)]
    pub unfollow: Vec<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct UsersParams {
    pub id: Option<String>,
}

/// Response of every follow/unfollow route: the caller's full current set.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FollowingList {
    pub status: String,
    pub message: String,
    pub taxonomies: Vec<Taxonomy>,
}

impl FollowingList {
    pub fn retrieved(taxonomies: Vec<Taxonomy>) -> Self {
        Self {
            status: "success".to_string(),
            message: "following list retrieved".to_string(),
            taxonomies,
        }
    }
}

fn session_id(state: &AppState, jar: &CookieJar) -> Result<String, ApiError> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation(&state.config.errors.session_id_required))
}

fn parse_items(state: &AppState, descriptors: &[String]) -> Result<Vec<SubscriptionItem>, ApiError> {
    let items = descriptors
        .iter()
        .filter(|descriptor| !descriptor.is_empty())
        .map(|descriptor| descriptor.parse::<SubscriptionItem>())
        .collect::<Result<Vec<_>, _>>()?;

    if items.is_empty() {
        return Err(ApiError::validation(&state.config.errors.no_parameters));
    }
    Ok(items)
}

pub async fn follow(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<FollowParams>,
) -> Result<Json<FollowingList>, ApiError> {
    let session_id = session_id(&state, &jar)?;
    let items = parse_items(&state, &params.follow)?;
    let user_id = state.services.session.resolve_user_id(&session_id).await?;

    let taxonomies = state.services.subscription.follow(&user_id, &items).await?;
    Ok(Json(FollowingList::retrieved(taxonomies)))
}

pub async fn unfollow(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<UnfollowParams>,
) -> Result<Json<FollowingList>, ApiError> {
    let session_id = session_id(&state, &jar)?;
    let items = parse_items(&state, &params.unfollow)?;
    let user_id = state.services.session.resolve_user_id(&session_id).await?;

    let taxonomies = state
        .services
        .subscription
        .unfollow(&user_id, &items)
        .await?;
    Ok(Json(FollowingList::retrieved(taxonomies)))
}

pub async fn unfollow_all(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<FollowingList>, ApiError> {
    let session_id = session_id(&state, &jar)?;
    let user_id = state.services.session.resolve_user_id(&session_id).await?;

    let taxonomies = state.services.subscription.unfollow_all(&user_id).await?;
    Ok(Json(FollowingList::retrieved(taxonomies)))
}

pub async fn users(
    State(state): State<AppState>,
    Query(params): Query<UsersParams>,
) -> Result<Json<Vec<SubscriberEntry>>, ApiError> {
    let taxonomy_id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation(&state.config.errors.id_parameter_required))?;

    let subscribers = state
        .services
        .subscription
        .list_subscribers(&taxonomy_id)
        .await?;
    debug!(
        "Found {} subscribers for taxonomy {taxonomy_id}",
        subscribers.len()
    );
    Ok(Json(subscribers))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.services.health.report().await)
}
