//! JSON REST API for Kindred.
//!
//! Exposes an axum [`Router`] backed by any
//! [`kindred_core::store::SwipeStore`]. End-user authentication and TLS are
//! the fronting proxy's responsibility; this layer trusts the injected
//! identity header (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(state, limiter))
//! ```

pub mod admin;
pub mod auth;
pub mod candidates;
pub mod error;
pub mod matches;
pub mod profiles;
pub mod ratelimit;
pub mod swipes;
pub mod transcribe;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post, put},
};
use kindred_core::store::SwipeStore;
use serde::Deserialize;

pub use auth::AdminAuth;
pub use error::ApiError;
pub use ratelimit::{MemoryCounters, RateLimitPolicy, RateLimiter};
pub use transcribe::SpeechClient;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  /// Argon2 PHC hash of the admin bearer token; absent disables the admin
  /// surface.
  #[serde(default)]
  pub admin_token_hash: Option<String>,

  #[serde(default = "default_rate_limit_per_minute")]
  pub rate_limit_per_minute: u32,

  /// External speech-to-text endpoint; both fields absent disables the
  /// transcription passthrough.
  #[serde(default)]
  pub speech_api_url: Option<String>,
  #[serde(default)]
  pub speech_api_key: Option<String>,
}

fn default_rate_limit_per_minute() -> u32 { 60 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SwipeStore> {
  pub store:  Arc<S>,
  pub admin:  Arc<AdminAuth>,
  pub speech: Option<Arc<SpeechClient>>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type. `limiter` is shared across requests;
/// callers hold the same `Arc` so counters survive router clones.
pub fn api_router<S>(state: AppState<S>, limiter: Arc<RateLimiter>) -> Router<()>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Swipes
    .route("/swipes", post(swipes::create::<S>))
    .route("/swipes/{target_id}", get(swipes::get_one::<S>))
    // Discovery
    .route("/candidates", get(candidates::list::<S>))
    .route("/matches", get(matches::list::<S>))
    // Profiles
    .route("/profiles", get(profiles::list::<S>))
    .route("/profiles/me", put(profiles::upsert_me::<S>))
    .route("/profiles/{user_id}", get(profiles::get_one::<S>))
    // Voice intro
    .route("/transcribe", post(transcribe::handler::<S>))
    // Administration
    .route("/admin/reset/{user_id}", post(admin::reset_user::<S>))
    .layer(middleware::from_fn_with_state(limiter, ratelimit::rate_limit))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use kindred_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const ADMIN_TOKEN: &str = "letmein";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(ADMIN_TOKEN.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store:  Arc::new(store),
      admin:  Arc::new(AdminAuth { token_hash: Some(hash) }),
      speech: None,
    }
  }

  fn make_limiter(max_per_minute: u32) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(
      RateLimitPolicy::per_minute(max_per_minute),
      MemoryCounters::default(),
    ))
  }

  fn app(
    state: &AppState<SqliteStore>,
    limiter: &Arc<RateLimiter>,
  ) -> Router {
    api_router(state.clone(), limiter.clone())
  }

  async fn oneshot(
    app: Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(auth::USER_ID_HEADER, user);
    }
    let request = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn profile_body(name: &str) -> Value {
    json!({
      "display_name": name,
      "interests": ["ai", "coffee"],
      "connection_preference": "chat",
      "availability": "evenings",
    })
  }

  async fn register(
    state: &AppState<SqliteStore>,
    limiter: &Arc<RateLimiter>,
    user: &str,
  ) {
    let resp = oneshot(
      app(state, limiter),
      "PUT",
      "/profiles/me",
      Some(user),
      Some(profile_body(user)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  async fn swipe(
    state: &AppState<SqliteStore>,
    limiter: &Arc<RateLimiter>,
    swiper: &str,
    target: &str,
    liked: bool,
  ) -> axum::response::Response {
    oneshot(
      app(state, limiter),
      "POST",
      "/swipes",
      Some(swiper),
      Some(json!({ "target_id": target, "liked": liked })),
    )
    .await
  }

  // ── Recording swipes ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn swipe_returns_201_without_match() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = swipe(&state, &limiter, "u1", "u2", true).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["matched"], json!(false));
    assert_eq!(body["match"], Value::Null);
    assert_eq!(body["decision"]["swiper_id"], json!("u1"));
    assert_eq!(body["decision"]["liked"], json!(true));
  }

  #[tokio::test]
  async fn mutual_like_returns_match_with_canonical_ids() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    swipe(&state, &limiter, "u2", "u1", true).await;
    let resp = swipe(&state, &limiter, "u1", "u2", true).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["matched"], json!(true));
    assert_eq!(body["match"]["user_a_id"], json!("u1"));
    assert_eq!(body["match"]["user_b_id"], json!("u2"));
  }

  #[tokio::test]
  async fn duplicate_swipe_returns_409() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    swipe(&state, &limiter, "u1", "u2", true).await;
    let resp = swipe(&state, &limiter, "u1", "u2", true).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = json_body(resp).await;
    assert!(
      body["error"].as_str().unwrap().contains("already recorded"),
      "error body: {body}"
    );
  }

  #[tokio::test]
  async fn self_swipe_returns_400() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = swipe(&state, &limiter, "u1", "u1", true).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_identity_header_returns_401() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = oneshot(
      app(&state, &limiter),
      "POST",
      "/swipes",
      None,
      Some(json!({ "target_id": "u2", "liked": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn get_swipe_resyncs_a_prior_decision() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    swipe(&state, &limiter, "u1", "u2", false).await;

    let resp =
      oneshot(app(&state, &limiter), "GET", "/swipes/u2", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["liked"], json!(false));

    let resp =
      oneshot(app(&state, &limiter), "GET", "/swipes/u3", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Profiles ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_upsert_and_get_roundtrip() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    register(&state, &limiter, "u1").await;

    let resp =
      oneshot(app(&state, &limiter), "GET", "/profiles/u1", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["display_name"], json!("u1"));
    assert_eq!(body["connection_preference"], json!("chat"));
  }

  #[tokio::test]
  async fn profile_missing_returns_404() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = oneshot(
      app(&state, &limiter),
      "GET",
      "/profiles/ghost",
      Some("u1"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn invalid_profile_returns_400() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = oneshot(
      app(&state, &limiter),
      "PUT",
      "/profiles/me",
      Some("u1"),
      Some(json!({
        "display_name": "Alice",
        "interests": [],
        "connection_preference": "chat",
        "availability": "evenings",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Discovery ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn candidates_exclude_self_and_decided() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    for user in ["u1", "u2", "u3"] {
      register(&state, &limiter, user).await;
    }
    swipe(&state, &limiter, "u1", "u2", false).await;

    let resp =
      oneshot(app(&state, &limiter), "GET", "/candidates", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!(["u3"]));
  }

  #[tokio::test]
  async fn candidates_for_unknown_user_returns_404() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = oneshot(
      app(&state, &limiter),
      "GET",
      "/candidates",
      Some("ghost"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn matches_lists_both_sides() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    register(&state, &limiter, "u1").await;
    register(&state, &limiter, "u2").await;

    // Unreciprocated like: no matches yet.
    swipe(&state, &limiter, "u1", "u2", true).await;
    let resp =
      oneshot(app(&state, &limiter), "GET", "/matches", Some("u1"), None)
        .await;
    assert_eq!(json_body(resp).await, json!([]));

    swipe(&state, &limiter, "u2", "u1", true).await;
    for user in ["u1", "u2"] {
      let resp =
        oneshot(app(&state, &limiter), "GET", "/matches", Some(user), None)
          .await;
      let body = json_body(resp).await;
      assert_eq!(body.as_array().unwrap().len(), 1, "for {user}: {body}");
      assert_eq!(body[0]["user_a_id"], json!("u1"));
    }
  }

  // ── Administration ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_reset_requires_valid_token() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let resp = oneshot(
      app(&state, &limiter),
      "POST",
      "/admin/reset/u1",
      Some("u1"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
      .method("POST")
      .uri("/admin/reset/u1")
      .header(header::AUTHORIZATION, "Bearer wrong")
      .body(Body::empty())
      .unwrap();
    let resp = app(&state, &limiter).oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn admin_reset_resurfaces_candidates() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    register(&state, &limiter, "u1").await;
    register(&state, &limiter, "u2").await;
    swipe(&state, &limiter, "u1", "u2", false).await;

    let request = Request::builder()
      .method("POST")
      .uri("/admin/reset/u1")
      .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
      .body(Body::empty())
      .unwrap();
    let resp = app(&state, &limiter).oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "deleted": 1 }));

    let resp =
      oneshot(app(&state, &limiter), "GET", "/candidates", Some("u1"), None)
        .await;
    assert_eq!(json_body(resp).await, json!(["u2"]));
  }

  // ── Rate limiting ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn over_limit_requests_get_429() {
    let state = make_state().await;
    let limiter = make_limiter(2);
    register(&state, &limiter, "u1").await;
    // Registration hit a different path; /candidates has its own bucket.

    for _ in 0..2 {
      let resp =
        oneshot(app(&state, &limiter), "GET", "/candidates", Some("u1"), None)
          .await;
      assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp =
      oneshot(app(&state, &limiter), "GET", "/candidates", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(
      resp.headers().get("x-ratelimit-remaining").unwrap(),
      "0"
    );
  }

  #[tokio::test]
  async fn rate_limit_headers_on_success() {
    let state = make_state().await;
    let limiter = make_limiter(10);
    register(&state, &limiter, "u1").await;

    let resp =
      oneshot(app(&state, &limiter), "GET", "/candidates", Some("u1"), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "10");
    assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "9");
  }

  // ── Transcription ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn transcribe_unconfigured_returns_503() {
    let state = make_state().await;
    let limiter = make_limiter(1000);

    let request = Request::builder()
      .method("POST")
      .uri("/transcribe")
      .header(auth::USER_ID_HEADER, "u1")
      .header(header::CONTENT_TYPE, "audio/webm")
      .body(Body::from(vec![0u8; 16]))
      .unwrap();
    let resp = app(&state, &limiter).oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }
}
