//! Canonical pair ordering and the match record derived from it.
//!
//! A match exists if and only if two complementary liked decisions exist in
//! the ledger. Matches are materialised, monotonic data: created at most
//! once per unordered pair, never mutated, never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  swipe::{SwipeDecision, UserId},
};

// ─── PairKey ─────────────────────────────────────────────────────────────────

/// The canonical representation of an unordered user pair: the
/// lexicographically smaller id first. Storing pairs this way makes
/// duplicate detection a plain uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
  a: UserId,
  b: UserId,
}

impl PairKey {
  /// Build the canonical key for `{x, y}`. Equal ids are rejected — a pair
  /// is always two distinct users.
  pub fn of(x: &UserId, y: &UserId) -> Result<Self> {
    if x == y {
      return Err(Error::SelfSwipe(x.clone()));
    }
    let (a, b) = if x < y { (x, y) } else { (y, x) };
    Ok(Self { a: a.clone(), b: b.clone() })
  }

  pub fn user_a(&self) -> &UserId { &self.a }

  pub fn user_b(&self) -> &UserId { &self.b }
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A confirmed mutual like between two distinct users, ids in canonical
/// order. `matched_at` is the moment the second reciprocal like landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub match_id:   Uuid,
  pub user_a_id:  UserId,
  pub user_b_id:  UserId,
  pub matched_at: DateTime<Utc>,
}

impl Match {
  /// Whether `user` is one of the two matched parties.
  pub fn involves(&self, user: &UserId) -> bool {
    &self.user_a_id == user || &self.user_b_id == user
  }

  /// The other party, if `user` is part of this match.
  pub fn other(&self, user: &UserId) -> Option<&UserId> {
    if &self.user_a_id == user {
      Some(&self.user_b_id)
    } else if &self.user_b_id == user {
      Some(&self.user_a_id)
    } else {
      None
    }
  }
}

// ─── SwipeResult ─────────────────────────────────────────────────────────────

/// Outcome of a successfully recorded swipe. `Ok` implies recorded; the
/// interesting question is whether this decision completed a mutual pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResult {
  pub decision: SwipeDecision,
  pub matched:  bool,
  /// The match this decision completed, if any. A pass never matches.
  #[serde(rename = "match")]
  pub new_match: Option<Match>,
}
