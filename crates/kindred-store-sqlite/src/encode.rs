//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The interests list is
//! stored as compact JSON. User ids are stored verbatim; match ids as
//! hyphenated lowercase UUIDs.

use chrono::{DateTime, Utc};
use kindred_core::{
  pair::Match,
  profile::{Availability, ConnectionPreference, Profile},
  swipe::{SwipeDecision, UserId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UserId ──────────────────────────────────────────────────────────────────

pub fn decode_user_id(s: String) -> Result<UserId> {
  UserId::new(s).map_err(Error::Core)
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_preference(p: ConnectionPreference) -> &'static str {
  match p {
    ConnectionPreference::Workout => "workout",
    ConnectionPreference::Meal => "meal",
    ConnectionPreference::Cowork => "cowork",
    ConnectionPreference::Chat => "chat",
  }
}

pub fn decode_preference(s: &str) -> Result<ConnectionPreference> {
  match s {
    "workout" => Ok(ConnectionPreference::Workout),
    "meal" => Ok(ConnectionPreference::Meal),
    "cowork" => Ok(ConnectionPreference::Cowork),
    "chat" => Ok(ConnectionPreference::Chat),
    other => {
      Err(Error::DateParse(format!("unknown connection preference: {other:?}")))
    }
  }
}

pub fn encode_availability(a: Availability) -> &'static str {
  match a {
    Availability::Mornings => "mornings",
    Availability::Lunchtime => "lunchtime",
    Availability::Afternoons => "afternoons",
    Availability::Evenings => "evenings",
  }
}

pub fn decode_availability(s: &str) -> Result<Availability> {
  match s {
    "mornings" => Ok(Availability::Mornings),
    "lunchtime" => Ok(Availability::Lunchtime),
    "afternoons" => Ok(Availability::Afternoons),
    "evenings" => Ok(Availability::Evenings),
    other => Err(Error::DateParse(format!("unknown availability: {other:?}"))),
  }
}

// ─── Interests ───────────────────────────────────────────────────────────────

pub fn encode_interests(interests: &[String]) -> Result<String> {
  Ok(serde_json::to_string(interests)?)
}

pub fn decode_interests(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:               String,
  pub display_name:          String,
  pub interests:             String,
  pub connection_preference: String,
  pub availability:          String,
  pub voice_intro:           Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:               decode_user_id(self.user_id)?,
      display_name:          self.display_name,
      interests:             decode_interests(&self.interests)?,
      connection_preference: decode_preference(&self.connection_preference)?,
      availability:          decode_availability(&self.availability)?,
      voice_intro:           self.voice_intro,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `swipe_decisions` row.
pub struct RawSwipe {
  pub swiper_id:  String,
  pub target_id:  String,
  pub liked:      bool,
  pub decided_at: String,
}

impl RawSwipe {
  pub fn into_decision(self) -> Result<SwipeDecision> {
    Ok(SwipeDecision {
      swiper_id:  decode_user_id(self.swiper_id)?,
      target_id:  decode_user_id(self.target_id)?,
      liked:      self.liked,
      decided_at: decode_dt(&self.decided_at)?,
    })
  }
}

/// Raw strings read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:   String,
  pub user_a_id:  String,
  pub user_b_id:  String,
  pub matched_at: String,
}

impl RawMatch {
  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:   Uuid::parse_str(&self.match_id)?,
      user_a_id:  decode_user_id(self.user_a_id)?,
      user_b_id:  decode_user_id(self.user_b_id)?,
      matched_at: decode_dt(&self.matched_at)?,
    })
  }
}
