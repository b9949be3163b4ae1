//! Handler for `GET /candidates`.
//!
//! Returns the profile ids the caller has not yet decided on, own id
//! excluded. Recomputed from current ledger state on every call, so a
//! profile decided on between calls never reappears.

use axum::{Json, extract::State};
use kindred_core::{store::SwipeStore, swipe::UserId};

use crate::{AppState, auth::AuthedUser, error::ApiError};

/// `GET /candidates`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
) -> Result<Json<Vec<UserId>>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let candidates = state
    .store
    .list_candidates(&user)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(candidates))
}
