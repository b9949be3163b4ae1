//! Async HTTP client wrapping the kindred JSON API.

use anyhow::{Context, Result, anyhow};
use kindred_core::{
  pair::{Match, SwipeResult},
  profile::Profile,
  swipe::SwipeDecision,
};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

/// Connection settings for the kindred API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:    String,
  /// The caller identity forwarded in the `x-user-id` header.
  pub user_id:     String,
  /// Bearer token for the admin surface; only needed for `reset`.
  pub admin_token: Option<String>,
}

/// What a swipe attempt amounted to from the client's point of view.
/// A 409 means the ledger already held this decision, which callers treat
/// as confirmation rather than failure.
pub enum SwipeOutcome {
  Recorded(SwipeResult),
  AlreadyDecided,
}

/// Async HTTP client for the kindred JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  /// The identity this client acts as.
  pub fn user_id(&self) -> &str { &self.config.user_id }

  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn identify(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req.header("x-user-id", &self.config.user_id)
  }

  // ── Swipes ────────────────────────────────────────────────────────────────

  /// `POST /api/swipes`
  pub async fn swipe(&self, target_id: &str, liked: bool) -> Result<SwipeOutcome> {
    let resp = self
      .identify(self.client.post(self.url("/swipes")))
      .json(&json!({ "target_id": target_id, "liked": liked }))
      .send()
      .await
      .context("POST /swipes failed")?;

    if resp.status() == StatusCode::CONFLICT {
      return Ok(SwipeOutcome::AlreadyDecided);
    }
    if !resp.status().is_success() {
      return Err(anyhow!("POST /swipes → {}", resp.status()));
    }
    let result = resp.json().await.context("deserialising swipe result")?;
    Ok(SwipeOutcome::Recorded(result))
  }

  /// `GET /api/swipes/{target_id}` — `None` if undecided.
  pub async fn get_swipe(&self, target_id: &str) -> Result<Option<SwipeDecision>> {
    let resp = self
      .identify(self.client.get(self.url(&format!("/swipes/{target_id}"))))
      .send()
      .await
      .context("GET /swipes failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(anyhow!("GET /swipes/{target_id} → {}", resp.status()));
    }
    Ok(Some(resp.json().await.context("deserialising decision")?))
  }

  // ── Discovery ─────────────────────────────────────────────────────────────

  /// `GET /api/candidates`
  pub async fn candidates(&self) -> Result<Vec<String>> {
    let resp = self
      .identify(self.client.get(self.url("/candidates")))
      .send()
      .await
      .context("GET /candidates failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /candidates → {}", resp.status()));
    }
    resp.json().await.context("deserialising candidates")
  }

  /// `GET /api/matches`
  pub async fn matches(&self) -> Result<Vec<Match>> {
    let resp = self
      .identify(self.client.get(self.url("/matches")))
      .send()
      .await
      .context("GET /matches failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /matches → {}", resp.status()));
    }
    resp.json().await.context("deserialising matches")
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  /// `PUT /api/profiles/me`
  pub async fn set_profile(&self, body: serde_json::Value) -> Result<Profile> {
    let resp = self
      .identify(self.client.put(self.url("/profiles/me")))
      .json(&body)
      .send()
      .await
      .context("PUT /profiles/me failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("PUT /profiles/me → {}", resp.status()));
    }
    resp.json().await.context("deserialising profile")
  }

  /// `GET /api/profiles/{user_id}` — `None` if not registered.
  pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
    let resp = self
      .identify(self.client.get(self.url(&format!("/profiles/{user_id}"))))
      .send()
      .await
      .context("GET /profiles failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(anyhow!("GET /profiles/{user_id} → {}", resp.status()));
    }
    Ok(Some(resp.json().await.context("deserialising profile")?))
  }

  // ── Administration ────────────────────────────────────────────────────────

  /// `POST /api/admin/reset/{user_id}` — returns the deleted-decision count.
  pub async fn reset(&self, user_id: &str) -> Result<u64> {
    let token = self
      .config
      .admin_token
      .as_deref()
      .context("reset requires an admin token (--admin-token)")?;

    let resp = self
      .client
      .post(self.url(&format!("/admin/reset/{user_id}")))
      .bearer_auth(token)
      .send()
      .await
      .context("POST /admin/reset failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /admin/reset/{user_id} → {}", resp.status()));
    }
    let body: serde_json::Value =
      resp.json().await.context("deserialising reset result")?;
    body["deleted"]
      .as_u64()
      .context("reset response missing deleted count")
  }
}
