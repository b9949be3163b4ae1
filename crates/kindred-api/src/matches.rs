//! Handler for `GET /matches`.

use axum::{Json, extract::State};
use kindred_core::{pair::Match, store::SwipeStore};

use crate::{AppState, auth::AuthedUser, error::ApiError};

/// `GET /matches` — every match containing the caller, in no particular
/// order.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let matches = state
    .store
    .list_matches(&user)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(matches))
}
