//! Administrative endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/reset/{user_id}` | Bearer token; deletes the user's outgoing decisions |

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{store::SwipeStore, swipe::UserId};
use serde_json::{Value, json};

use crate::{AppState, auth::Admin, error::ApiError};

/// `POST /admin/reset/{user_id}` — the explicit "reset ledger for user"
/// escape hatch. Previously decided profiles resurface for the user;
/// matches survive.
pub async fn reset_user<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  Path(user_id): Path<UserId>,
) -> Result<Json<Value>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let deleted = state
    .store
    .reset_swipes(&user_id)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(user = %user_id, deleted, "swipe ledger reset");
  Ok(Json(json!({ "deleted": deleted })))
}
