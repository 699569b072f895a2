//! Tax return gateway and its filing state machine.
//!
//! A return starts [`ReturnState::Unfiled`] and moves to
//! [`ReturnState::Filed`] when someone files it. There is no way back.
//! Filing again overwrites who filed it and when.
//!
//! In storage the state is spread over three columns: `filed_or_not`,
//! `checked_by` (`"yes"` for a CPA, `"no"` for an assistant) and
//! `tax_return_timestamp` (epoch milliseconds).

use chrono::{DateTime, SubsecRound as _, TimeDelta, Utc};

use crate::{
  client::Client,
  id::{ClientId, TaxReturnId},
  store::TaxOfficeStore,
  Error, Result,
};

// ─── Filer ───────────────────────────────────────────────────────────────────

/// Who filed a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiledBy {
  Cpa,
  Assistant,
}

impl FiledBy {
  /// `"CPA"` means a CPA filed it; any other token means an assistant did.
  pub fn from_token(token: &str) -> Self {
    if token == "CPA" { Self::Cpa } else { Self::Assistant }
  }

  /// The `checked_by` column value.
  pub fn code(self) -> &'static str {
    match self {
      Self::Cpa => "yes",
      Self::Assistant => "no",
    }
  }

  pub fn from_code(code: &str) -> Result<Self> {
    match code {
      "yes" => Ok(Self::Cpa),
      "no" => Ok(Self::Assistant),
      other => Err(Error::UnknownCheckedBy(other.to_owned())),
    }
  }

  /// Phrase used when reporting the filer, e.g. "filed by a CPA".
  pub fn describe(self) -> &'static str {
    match self {
      Self::Cpa => "a CPA",
      Self::Assistant => "a tax filing assistant",
    }
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnState {
  Unfiled,
  Filed { by: FiledBy, at: DateTime<Utc> },
}

impl ReturnState {
  /// Rebuild the state from the three status columns.
  ///
  /// `checked_by` and the timestamp are ignored on an unfiled row. A filed
  /// row must carry both.
  pub fn from_columns(
    filed: bool,
    checked_by: Option<&str>,
    timestamp: Option<i64>,
  ) -> Result<Self> {
    if !filed {
      return Ok(Self::Unfiled);
    }
    let by = FiledBy::from_code(checked_by.ok_or(Error::CorruptTaxReturn("checked_by"))?)?;
    let millis = timestamp.ok_or(Error::CorruptTaxReturn("timestamp"))?;
    let at = DateTime::from_timestamp_millis(millis).ok_or(Error::InvalidTimestamp(millis))?;
    Ok(Self::Filed { by, at })
  }

  pub fn is_filed(&self) -> bool { matches!(self, Self::Filed { .. }) }

  pub fn status(&self) -> FilingStatus {
    match *self {
      Self::Unfiled => FilingStatus { filed: false, checked_by: None, filed_at: None },
      Self::Filed { by, at } => FilingStatus {
        filed:      true,
        checked_by: Some(by),
        filed_at:   Some(at),
      },
    }
  }
}

/// Snapshot of a return's status columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilingStatus {
  pub filed:      bool,
  pub checked_by: Option<FiledBy>,
  pub filed_at:   Option<DateTime<Utc>>,
}

/// The current instant rounded up to the millisecond, the precision a filing
/// timestamp is stored at. Never earlier than a clock reading taken before
/// the call.
pub fn filing_instant() -> DateTime<Utc> {
  let now = Utc::now();
  let mut at = now.trunc_subsecs(3);
  if at < now {
    at += TimeDelta::milliseconds(1);
  }
  at
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxReturn {
  pub id:        Option<TaxReturnId>,
  pub client_id: ClientId,
  pub state:     ReturnState,
}

impl TaxReturn {
  /// Insert an unfiled return for `client`.
  ///
  /// Does not check whether the client already has one; see
  /// [`TaxReturn::create_once`].
  pub async fn create<S: TaxOfficeStore>(store: &S, client: &Client) -> Result<Self, S::Error> {
    let client_id = client.id.ok_or(Error::Unsaved("client"))?;
    store.insert_tax_return(client_id).await
  }

  /// Insert an unfiled return unless `client` already has one. The check and
  /// the insert share a transaction.
  pub async fn create_once<S: TaxOfficeStore>(
    store: &S,
    client: &Client,
  ) -> Result<Option<Self>, S::Error> {
    let client_id = client.id.ok_or(Error::Unsaved("client"))?;
    store.insert_tax_return_once(client_id).await
  }

  pub async fn get<S: TaxOfficeStore>(
    store: &S,
    client_id: ClientId,
  ) -> Result<Option<Self>, S::Error> {
    store.find_tax_return(client_id).await
  }

  pub async fn is_filed<S: TaxOfficeStore>(
    store: &S,
    client_id: ClientId,
  ) -> Result<Option<FilingStatus>, S::Error> {
    store.filing_status(client_id).await
  }

  /// File the return now. The instant is taken in UTC when this is called,
  /// see [`filing_instant`].
  pub async fn mark_filed<S: TaxOfficeStore>(
    &mut self,
    store: &S,
    by: FiledBy,
  ) -> Result<(), S::Error> {
    let at = filing_instant();
    store.record_filing(self.client_id, by, at).await?;
    self.state = ReturnState::Filed { by, at };
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_cpa_is_cpa_everything_else_is_assistant() {
    assert_eq!(FiledBy::from_token("CPA"), FiledBy::Cpa);
    assert_eq!(FiledBy::from_token("Assistant"), FiledBy::Assistant);
    assert_eq!(FiledBy::from_token("cpa"), FiledBy::Assistant);
    assert_eq!(FiledBy::from_token(""), FiledBy::Assistant);
  }

  #[test]
  fn checked_by_codes() {
    assert_eq!(FiledBy::Cpa.code(), "yes");
    assert_eq!(FiledBy::Assistant.code(), "no");
    assert_eq!(FiledBy::from_code("yes").unwrap(), FiledBy::Cpa);
    assert!(matches!(
      FiledBy::from_code("maybe"),
      Err(Error::UnknownCheckedBy(code)) if code == "maybe"
    ));
  }

  #[test]
  fn unfiled_row_ignores_stale_columns() {
    let state = ReturnState::from_columns(false, Some("yes"), Some(1)).unwrap();
    assert_eq!(state, ReturnState::Unfiled);
    assert_eq!(state.status(), FilingStatus { filed: false, checked_by: None, filed_at: None });
  }

  #[test]
  fn filed_row_decodes() {
    let state = ReturnState::from_columns(true, Some("no"), Some(1_700_000_000_250)).unwrap();
    let at = DateTime::from_timestamp_millis(1_700_000_000_250).unwrap();
    assert_eq!(state, ReturnState::Filed { by: FiledBy::Assistant, at });
    assert!(state.is_filed());
    assert_eq!(state.status().checked_by, Some(FiledBy::Assistant));
  }

  #[test]
  fn filing_instant_is_whole_millis_and_not_before_now() {
    for _ in 0..50 {
      let before = Utc::now();
      let at = filing_instant();
      assert!(at >= before);
      assert_eq!(at.timestamp_subsec_nanos() % 1_000_000, 0);
      assert_eq!(DateTime::from_timestamp_millis(at.timestamp_millis()), Some(at));
    }
  }

  #[test]
  fn filed_row_without_filer_is_corrupt() {
    let err = ReturnState::from_columns(true, None, Some(0)).unwrap_err();
    assert!(matches!(err, Error::CorruptTaxReturn("checked_by")));

    let err = ReturnState::from_columns(true, Some("yes"), None).unwrap_err();
    assert!(matches!(err, Error::CorruptTaxReturn("timestamp")));
  }
}
