//! Handlers for `/profiles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/profiles/me` | Upsert the caller's profile |
//! | `GET`  | `/profiles` | All registered profiles |
//! | `GET`  | `/profiles/{user_id}` | 404 if not registered |

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{
  profile::{Availability, ConnectionPreference, NewProfile, Profile},
  store::SwipeStore,
  swipe::UserId,
};
use serde::Deserialize;

use crate::{AppState, auth::AuthedUser, error::ApiError};

// ─── Upsert ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /profiles/me`. The user id is always the
/// authenticated caller.
#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub display_name:          String,
  pub interests:             Vec<String>,
  pub connection_preference: ConnectionPreference,
  pub availability:          Availability,
  pub voice_intro:           Option<String>,
}

/// `PUT /profiles/me`
pub async fn upsert_me<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  Json(body): Json<ProfileBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let input = NewProfile {
    user_id:               user,
    display_name:          body.display_name,
    interests:             body.interests,
    connection_preference: body.connection_preference,
    availability:          body.availability,
    voice_intro:           body.voice_intro,
  };

  let profile = state
    .store
    .register_profile(input)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(profile))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /profiles`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let profiles = state
    .store
    .list_profiles()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(profiles))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profiles/{user_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _user: AuthedUser,
  Path(user_id): Path<UserId>,
) -> Result<Json<Profile>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let profile = state
    .store
    .get_profile(&user_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {user_id} not found")))?;
  Ok(Json(profile))
}
