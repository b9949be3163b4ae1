//! Swipe decisions — the fundamental unit of the Kindred ledger.
//!
//! A decision is one user's directional like/pass judgment about another
//! user's profile. Decisions are never updated and never deleted in normal
//! flow; the ledger is the audit trail from which matches are derived.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

// ─── UserId ──────────────────────────────────────────────────────────────────

/// An opaque user identity, owned by the external identity provider.
///
/// Kindred never creates, mutates, or deletes users; it only records
/// decisions between them. The only local constraint is non-emptiness,
/// which holds by construction: deserialisation routes through
/// [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl<'de> Deserialize<'de> for UserId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    UserId::new(raw).map_err(serde::de::Error::custom)
  }
}

impl UserId {
  pub fn new(id: impl Into<String>) -> Result<Self> {
    let id = id.into();
    if id.is_empty() {
      return Err(Error::EmptyUserId);
    }
    Ok(Self(id))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for UserId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── SwipeDecision ───────────────────────────────────────────────────────────

/// One recorded directional judgment. Once written, no field ever changes.
///
/// At most one decision exists per ordered `(swiper_id, target_id)` pair;
/// a repeat attempt fails with [`Error::DuplicateSwipe`] and changes
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeDecision {
  pub swiper_id:  UserId,
  pub target_id:  UserId,
  /// `true` = like (right swipe), `false` = pass (left swipe).
  pub liked:      bool,
  /// Server-assigned timestamp; never accepted from callers.
  pub decided_at: DateTime<Utc>,
}

// ─── NewSwipe ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SwipeStore::record_swipe`].
/// `decided_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewSwipe {
  pub swiper_id: UserId,
  pub target_id: UserId,
  pub liked:     bool,
}

impl NewSwipe {
  pub fn new(swiper_id: UserId, target_id: UserId, liked: bool) -> Self {
    Self { swiper_id, target_id, liked }
  }

  /// Reject self-referential swipes. Runs before any storage write.
  pub fn validate(&self) -> Result<()> {
    if self.swiper_id == self.target_id {
      return Err(Error::SelfSwipe(self.swiper_id.clone()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_user_id_rejected() {
    assert!(matches!(UserId::new(""), Err(Error::EmptyUserId)));
    assert!(UserId::new("u1").is_ok());
  }

  #[test]
  fn self_swipe_rejected() {
    let u = UserId::new("u1").unwrap();
    let swipe = NewSwipe::new(u.clone(), u, true);
    assert!(matches!(swipe.validate(), Err(Error::SelfSwipe(_))));
  }

  #[test]
  fn distinct_pair_validates() {
    let swipe = NewSwipe::new(
      UserId::new("u1").unwrap(),
      UserId::new("u2").unwrap(),
      false,
    );
    assert!(swipe.validate().is_ok());
  }
}
