//! [`SqliteStore`] — the SQLite implementation of [`SwipeStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kindred_core::{
  pair::{Match, PairKey, SwipeResult},
  profile::{NewProfile, Profile},
  store::SwipeStore,
  swipe::{NewSwipe, SwipeDecision, UserId},
};

use crate::{
  Error, Result,
  encode::{
    RawMatch, RawProfile, RawSwipe, encode_availability, encode_dt,
    encode_interests, encode_preference,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kindred ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened inside the `record_swipe` transaction. Carried out of the
/// connection-thread closure so domain errors are raised in async context.
enum RecordOutcome {
  /// A decision for this ordered pair already exists; nothing changed.
  Duplicate,
  /// Decision inserted. `resolved` holds `(match_id, matched_at)` strings
  /// when this decision completed (or joined) a mutual pair.
  Recorded { resolved: Option<(String, String)> },
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// `true` if a profile row exists for `user_id`.
  async fn profile_exists(&self, user_id: &UserId) -> Result<bool> {
    let id = user_id.as_str().to_owned();
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM profiles WHERE user_id = ?1",
              rusqlite::params![id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── SwipeStore impl ─────────────────────────────────────────────────────────

impl SwipeStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn register_profile(&self, input: NewProfile) -> Result<Profile> {
    input.validate().map_err(Error::Core)?;

    let now_str       = encode_dt(Utc::now());
    let user_id_str   = input.user_id.as_str().to_owned();
    let display_name  = input.display_name.trim().to_owned();
    let interests_str = encode_interests(&input.interests)?;
    let pref_str      = encode_preference(input.connection_preference).to_owned();
    let avail_str     = encode_availability(input.availability).to_owned();
    let voice_intro   = input.voice_intro.clone();

    let raw: RawProfile = self
      .conn
      .call(move |conn| {
        // Upsert keeps created_at from the original row.
        conn.execute(
          "INSERT INTO profiles (
             user_id, display_name, interests, connection_preference,
             availability, voice_intro, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
           ON CONFLICT(user_id) DO UPDATE SET
             display_name          = excluded.display_name,
             interests             = excluded.interests,
             connection_preference = excluded.connection_preference,
             availability          = excluded.availability,
             voice_intro           = excluded.voice_intro,
             updated_at            = excluded.updated_at",
          rusqlite::params![
            user_id_str,
            display_name,
            interests_str,
            pref_str,
            avail_str,
            voice_intro,
            now_str,
          ],
        )?;

        Ok(conn.query_row(
          "SELECT user_id, display_name, interests, connection_preference,
                  availability, voice_intro, created_at, updated_at
           FROM profiles WHERE user_id = ?1",
          rusqlite::params![user_id_str],
          |row| {
            Ok(RawProfile {
              user_id:               row.get(0)?,
              display_name:          row.get(1)?,
              interests:             row.get(2)?,
              connection_preference: row.get(3)?,
              availability:          row.get(4)?,
              voice_intro:           row.get(5)?,
              created_at:            row.get(6)?,
              updated_at:            row.get(7)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_profile()
  }

  async fn get_profile<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> Result<Option<Profile>> {
    let id = user_id.as_str().to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, display_name, interests, connection_preference,
                      availability, voice_intro, created_at, updated_at
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawProfile {
                  user_id:               row.get(0)?,
                  display_name:          row.get(1)?,
                  interests:             row.get(2)?,
                  connection_preference: row.get(3)?,
                  availability:          row.get(4)?,
                  voice_intro:           row.get(5)?,
                  created_at:            row.get(6)?,
                  updated_at:            row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, display_name, interests, connection_preference,
                  availability, voice_intro, created_at, updated_at
           FROM profiles",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawProfile {
              user_id:               row.get(0)?,
              display_name:          row.get(1)?,
              interests:             row.get(2)?,
              connection_preference: row.get(3)?,
              availability:          row.get(4)?,
              voice_intro:           row.get(5)?,
              created_at:            row.get(6)?,
              updated_at:            row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Swipes — append-only writes ───────────────────────────────────────────

  async fn record_swipe(&self, input: NewSwipe) -> Result<SwipeResult> {
    // Validation failures never reach storage.
    input.validate().map_err(Error::Core)?;
    let pair = PairKey::of(&input.swiper_id, &input.target_id)
      .map_err(Error::Core)?;

    let decided_at = Utc::now();
    // Pre-generated; used only if this decision creates the match row.
    let fresh_match_id = Uuid::new_v4();

    let swiper_str     = input.swiper_id.as_str().to_owned();
    let target_str     = input.target_id.as_str().to_owned();
    let liked          = input.liked;
    let decided_at_str = encode_dt(decided_at);
    let user_a_str     = pair.user_a().as_str().to_owned();
    let user_b_str     = pair.user_b().as_str().to_owned();
    let match_id_str   = fresh_match_id.hyphenated().to_string();

    let outcome: RecordOutcome = self
      .conn
      .call(move |conn| {
        // One transaction around insert + complement check + match create:
        // a racing opposite-direction like either sees this decision or
        // hits the pair uniqueness, so exactly one match row can exist.
        let tx = conn.transaction()?;

        let already_decided: Option<bool> = tx
          .query_row(
            "SELECT liked FROM swipe_decisions
             WHERE swiper_id = ?1 AND target_id = ?2",
            rusqlite::params![swiper_str, target_str],
            |row| row.get(0),
          )
          .optional()?;
        if already_decided.is_some() {
          return Ok(RecordOutcome::Duplicate);
        }

        tx.execute(
          "INSERT INTO swipe_decisions (swiper_id, target_id, liked, decided_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![swiper_str, target_str, liked, decided_at_str],
        )?;

        let mut resolved = None;
        if liked {
          let reciprocal: Option<bool> = tx
            .query_row(
              "SELECT liked FROM swipe_decisions
               WHERE swiper_id = ?1 AND target_id = ?2 AND liked = 1",
              rusqlite::params![target_str, swiper_str],
              |row| row.get(0),
            )
            .optional()?;

          if reciprocal.is_some() {
            // Conflict-as-success: a pre-existing match row is tolerated
            // and read back instead of duplicated.
            tx.execute(
              "INSERT OR IGNORE INTO matches
                 (match_id, user_a_id, user_b_id, matched_at)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![
                match_id_str,
                user_a_str,
                user_b_str,
                decided_at_str,
              ],
            )?;
            let row: (String, String) = tx.query_row(
              "SELECT match_id, matched_at FROM matches
               WHERE user_a_id = ?1 AND user_b_id = ?2",
              rusqlite::params![user_a_str, user_b_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            resolved = Some(row);
          }
        }

        tx.commit()?;
        Ok(RecordOutcome::Recorded { resolved })
      })
      .await?;

    let resolved = match outcome {
      RecordOutcome::Duplicate => {
        return Err(Error::Core(kindred_core::Error::DuplicateSwipe {
          swiper_id: input.swiper_id,
          target_id: input.target_id,
        }));
      }
      RecordOutcome::Recorded { resolved } => resolved,
    };

    let new_match = resolved
      .map(|(id_str, at_str)| -> Result<Match> {
        Ok(Match {
          match_id:   Uuid::parse_str(&id_str)?,
          user_a_id:  pair.user_a().clone(),
          user_b_id:  pair.user_b().clone(),
          matched_at: crate::encode::decode_dt(&at_str)?,
        })
      })
      .transpose()?;

    Ok(SwipeResult {
      decision: SwipeDecision {
        swiper_id: input.swiper_id,
        target_id: input.target_id,
        liked: input.liked,
        decided_at,
      },
      matched: new_match.is_some(),
      new_match,
    })
  }

  async fn get_swipe<'a>(
    &'a self,
    swiper_id: &'a UserId,
    target_id: &'a UserId,
  ) -> Result<Option<SwipeDecision>> {
    let swiper = swiper_id.as_str().to_owned();
    let target = target_id.as_str().to_owned();

    let raw: Option<RawSwipe> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT swiper_id, target_id, liked, decided_at
               FROM swipe_decisions
               WHERE swiper_id = ?1 AND target_id = ?2",
              rusqlite::params![swiper, target],
              |row| {
                Ok(RawSwipe {
                  swiper_id:  row.get(0)?,
                  target_id:  row.get(1)?,
                  liked:      row.get(2)?,
                  decided_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSwipe::into_decision).transpose()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_candidates<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> Result<Vec<UserId>> {
    if !self.profile_exists(user_id).await? {
      return Err(Error::Core(kindred_core::Error::ProfileNotFound(
        user_id.clone(),
      )));
    }

    let id = user_id.as_str().to_owned();
    let raw_ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.user_id FROM profiles p
           WHERE p.user_id != ?1
             AND NOT EXISTS (
               SELECT 1 FROM swipe_decisions s
               WHERE s.swiper_id = ?1 AND s.target_id = p.user_id
             )",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    raw_ids
      .into_iter()
      .map(crate::encode::decode_user_id)
      .collect()
  }

  async fn list_matches<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> Result<Vec<Match>> {
    if !self.profile_exists(user_id).await? {
      return Err(Error::Core(kindred_core::Error::ProfileNotFound(
        user_id.clone(),
      )));
    }

    let id = user_id.as_str().to_owned();
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT match_id, user_a_id, user_b_id, matched_at
           FROM matches
           WHERE user_a_id = ?1 OR user_b_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawMatch {
              match_id:   row.get(0)?,
              user_a_id:  row.get(1)?,
              user_b_id:  row.get(2)?,
              matched_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  // ── Administration ────────────────────────────────────────────────────────

  async fn reset_swipes<'a>(
    &'a self,
    user_id: &'a UserId,
  ) -> Result<u64> {
    let id = user_id.as_str().to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        // The only DELETE this crate issues. Matches stay untouched.
        let n = conn.execute(
          "DELETE FROM swipe_decisions WHERE swiper_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(n as u64)
      })
      .await?;
    Ok(deleted)
  }
}
