//! Voice-intro transcription passthrough.
//!
//! Profile setup lets a member record a short voice introduction; the
//! transcript is what gets stored. Transcription itself is delegated to an
//! external speech-to-text API — this module only forwards the clip and
//! relays the text back.

use std::{sync::Arc, time::Duration};

use axum::{
  Json,
  extract::{Request, State},
  http::header,
};
use bytes::Bytes;
use kindred_core::store::SwipeStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, auth::AuthedUser, error::ApiError};

/// Largest accepted audio clip.
const MAX_CLIP_BYTES: usize = 10 * 1024 * 1024;

// ─── Client ──────────────────────────────────────────────────────────────────

/// Thin HTTP client for the external speech-to-text endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SpeechClient {
  client:   reqwest::Client,
  endpoint: String,
  api_key:  String,
}

/// Response shape of the speech API: `{"text": "..."}`.
#[derive(Debug, Deserialize)]
struct Transcript {
  text: String,
}

impl SpeechClient {
  pub fn new(endpoint: String, api_key: String) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()?;
    Ok(Self { client, endpoint, api_key })
  }

  /// Forward the clip and return the transcript text.
  pub async fn transcribe(
    &self,
    audio: Bytes,
    content_type: &str,
  ) -> Result<String, ApiError> {
    let resp = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .header(header::CONTENT_TYPE, content_type)
      .body(audio)
      .send()
      .await
      .map_err(|e| ApiError::Unavailable(format!("speech api: {e}")))?;

    if !resp.status().is_success() {
      return Err(ApiError::Unavailable(format!(
        "speech api returned {}",
        resp.status()
      )));
    }

    let transcript: Transcript = resp
      .json()
      .await
      .map_err(|e| ApiError::Unavailable(format!("speech api: {e}")))?;
    Ok(transcript.text)
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /transcribe` — raw audio body, `{"text": ...}` back.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  AuthedUser(user): AuthedUser,
  req: Request,
) -> Result<Json<Value>, ApiError>
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  let speech: Arc<SpeechClient> = state
    .speech
    .clone()
    .ok_or_else(|| ApiError::Unavailable("transcription not configured".into()))?;

  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("audio/webm")
    .to_owned();

  let audio = axum::body::to_bytes(req.into_body(), MAX_CLIP_BYTES)
    .await
    .map_err(|_| ApiError::BadRequest("audio clip too large".into()))?;
  if audio.is_empty() {
    return Err(ApiError::BadRequest("empty audio clip".into()));
  }

  let text = speech.transcribe(audio, &content_type).await?;
  tracing::debug!(user = %user, chars = text.len(), "voice intro transcribed");
  Ok(Json(json!({ "text": text })))
}
