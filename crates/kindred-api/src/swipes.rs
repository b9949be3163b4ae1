//! Handlers for `/swipes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/swipes` | Body: `{"target_id":"...","liked":true}`; 201 + result, 409 if already decided |
//! | `GET`  | `/swipes/{target_id}` | The caller's decision on target; 404 if undecided |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  pair::SwipeResult,
  store::SwipeStore,
  swipe::{NewSwipe, SwipeDecision, UserId},
};
use serde::Deserialize;

use crate::{AppState, auth::AuthedUser, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /swipes`. The swiper is always the
/// authenticated caller; it is never accepted from the body.
#[derive(Debug, Deserialize)]
pub struct SwipeBody {
  pub target_id: UserId,
  pub liked:     bool,
}

/// `POST /swipes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedUser(swiper): AuthedUser,
  Json(body): Json<SwipeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let input = NewSwipe::new(swiper, body.target_id, body.liked);
  let result: SwipeResult = state
    .store
    .record_swipe(input)
    .await
    .map_err(ApiError::from_store)?;

  if let Some(m) = &result.new_match {
    tracing::info!(
      user_a = %m.user_a_id,
      user_b = %m.user_b_id,
      match_id = %m.match_id,
      "match created"
    );
  }

  Ok((StatusCode::CREATED, Json(result)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /swipes/{target_id}` — lets a retrying client resync its view of
/// the ledger without writing.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthedUser(swiper): AuthedUser,
  Path(target_id): Path<UserId>,
) -> Result<Json<SwipeDecision>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let decision = state
    .store
    .get_swipe(&swiper, &target_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no decision on {target_id} yet"))
    })?;
  Ok(Json(decision))
}
