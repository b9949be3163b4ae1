//! The `SwipeStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `kindred-store-sqlite`). Higher layers (`kindred-api`, `kindred-cli`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  pair::{Match, SwipeResult},
  profile::{NewProfile, Profile},
  swipe::{NewSwipe, SwipeDecision, UserId},
};

/// Abstraction over a Kindred ledger backend.
///
/// The swipe ledger is append-only: decisions are inserted once and never
/// updated or deleted in normal flow. Matches are derived data, created at
/// most once per unordered pair.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The associated
/// error converts into [`crate::Error`] so callers above the trait can
/// classify failures (duplicate, not-found, unavailable) without naming
/// the backend.
pub trait SwipeStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create or replace the profile for `input.user_id`. `created_at` is
  /// preserved across updates; `updated_at` is set by the store.
  fn register_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Retrieve a profile by user id. Returns `None` if not registered.
  fn get_profile<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// List all registered profiles.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  // ── Swipes — append-only writes ───────────────────────────────────────

  /// Record one directional decision and resolve any match it completes.
  ///
  /// The decision insert, the reciprocal-like check, and the match insert
  /// are a single atomic unit: when two opposite-direction likes race,
  /// exactly one match is created. Fails with
  /// [`crate::Error::DuplicateSwipe`] if this ordered pair was already
  /// decided, and with [`crate::Error::SelfSwipe`] before any write if
  /// `swiper_id == target_id`.
  fn record_swipe(
    &self,
    input: NewSwipe,
  ) -> impl Future<Output = Result<SwipeResult, Self::Error>> + Send + '_;

  /// Point read of the ledger: the decision `swiper_id` made about
  /// `target_id`, if any. Lets a retrying client resync without writing.
  fn get_swipe<'a>(
    &'a self,
    swiper_id: &'a UserId,
    target_id: &'a UserId,
  ) -> impl Future<Output = Result<Option<SwipeDecision>, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Profile ids `user_id` has not yet decided on, own id excluded.
  ///
  /// Recomputed from current ledger state on every call — a profile
  /// decided on between calls never reappears. Ordering is unspecified.
  /// Fails with [`crate::Error::ProfileNotFound`] for an unregistered
  /// user.
  fn list_candidates<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + 'a;

  /// Every match containing `user_id`, in no particular order. Fails with
  /// [`crate::Error::ProfileNotFound`] for an unregistered user.
  fn list_matches<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  // ── Administration ────────────────────────────────────────────────────

  /// Delete every decision made *by* `user_id`, returning the count.
  ///
  /// This is the explicit administrative escape hatch, not a normal flow:
  /// passed-on profiles resurface afterwards. Matches are monotonic and
  /// survive a reset.
  fn reset_swipes<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
