//! Error types for `taxdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The operation needs a stored row but the value was never saved.
  #[error("{0} has not been saved yet")]
  Unsaved(&'static str),

  #[error("tax return is marked filed but has no {0}")]
  CorruptTaxReturn(&'static str),

  #[error("unknown checked_by code: {0:?}")]
  UnknownCheckedBy(String),

  #[error("filing timestamp out of range: {0}")]
  InvalidTimestamp(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
