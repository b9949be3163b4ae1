//! Error type for `kindred-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] kindred_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

/// Collapse backend failures into the domain taxonomy so callers above the
/// [`kindred_core::store::SwipeStore`] trait can classify them. Domain
/// errors pass through untouched; everything else is a storage failure the
/// caller may retry.
impl From<Error> for kindred_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      Error::Database(db) => {
        kindred_core::Error::StorageUnavailable(db.to_string())
      }
      Error::Json(j) => kindred_core::Error::Serialization(j),
      Error::Uuid(u) => kindred_core::Error::StorageUnavailable(u.to_string()),
      Error::DateParse(d) => kindred_core::Error::StorageUnavailable(d),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
