//! Error types for `kindred-core`.

use thiserror::Error;

use crate::swipe::UserId;

#[derive(Debug, Error)]
pub enum Error {
  /// A user attempted to swipe on their own profile. Rejected before any
  /// storage write; callers should treat this as a client bug, not a
  /// retryable condition.
  #[error("self-swipe: {0}")]
  SelfSwipe(UserId),

  /// A decision for this ordered pair already exists. The ledger is
  /// unchanged; callers treat this as confirmation of prior state.
  #[error("swipe already recorded: {swiper_id} -> {target_id}")]
  DuplicateSwipe {
    swiper_id: UserId,
    target_id: UserId,
  },

  /// The referenced user id is unknown to the profile registry.
  #[error("profile not found: {0}")]
  ProfileNotFound(UserId),

  #[error("user id must not be empty")]
  EmptyUserId,

  #[error("invalid profile: {0}")]
  InvalidProfile(String),

  /// The persistence layer could not be reached or the transaction could
  /// not commit. Safe to retry: a replayed swipe lands as a duplicate, not
  /// a double write.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
