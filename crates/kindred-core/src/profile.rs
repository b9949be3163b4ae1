//! Profile registry types.
//!
//! The reconciliation core consumes only user ids; profile attributes exist
//! so the candidate universe has a source and the discovery UI has
//! something to render. Nothing in match resolution reads these fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, swipe::UserId};

/// How a member prefers to connect with a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPreference {
  Workout,
  Meal,
  Cowork,
  Chat,
}

/// When a member is generally free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
  Mornings,
  Lunchtime,
  Afternoons,
  Evenings,
}

/// A registered member profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:               UserId,
  pub display_name:          String,
  pub interests:             Vec<String>,
  pub connection_preference: ConnectionPreference,
  pub availability:          Availability,
  /// Transcript of the recorded voice introduction, if one was made.
  pub voice_intro:           Option<String>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

/// Input to [`crate::store::SwipeStore::register_profile`].
/// Timestamps are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub user_id:               UserId,
  pub display_name:          String,
  pub interests:             Vec<String>,
  pub connection_preference: ConnectionPreference,
  pub availability:          Availability,
  pub voice_intro:           Option<String>,
}

impl NewProfile {
  /// Enforce the registration constraints: a 1..=50 char display name,
  /// one to five interests, voice intro capped at 1000 chars.
  pub fn validate(&self) -> Result<()> {
    let name = self.display_name.trim();
    if name.is_empty() {
      return Err(Error::InvalidProfile("display name is empty".into()));
    }
    if name.chars().count() > 50 {
      return Err(Error::InvalidProfile(
        "display name exceeds 50 characters".into(),
      ));
    }
    if self.interests.is_empty() || self.interests.len() > 5 {
      return Err(Error::InvalidProfile(
        "between one and five interests required".into(),
      ));
    }
    if let Some(intro) = &self.voice_intro
      && intro.chars().count() > 1000
    {
      return Err(Error::InvalidProfile(
        "voice intro exceeds 1000 characters".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile() -> NewProfile {
    NewProfile {
      user_id:               UserId::new("u1").unwrap(),
      display_name:          "Sarah Chen".into(),
      interests:             vec!["ai".into(), "startups".into()],
      connection_preference: ConnectionPreference::Chat,
      availability:          Availability::Evenings,
      voice_intro:           None,
    }
  }

  #[test]
  fn valid_profile_passes() {
    assert!(profile().validate().is_ok());
  }

  #[test]
  fn empty_display_name_rejected() {
    let mut p = profile();
    p.display_name = "   ".into();
    assert!(matches!(p.validate(), Err(Error::InvalidProfile(_))));
  }

  #[test]
  fn interest_bounds_enforced() {
    let mut p = profile();
    p.interests = vec![];
    assert!(p.validate().is_err());
    p.interests = (0..6).map(|i| format!("interest-{i}")).collect();
    assert!(p.validate().is_err());
  }

  #[test]
  fn oversized_voice_intro_rejected() {
    let mut p = profile();
    p.voice_intro = Some("x".repeat(1001));
    assert!(p.validate().is_err());
  }
}
