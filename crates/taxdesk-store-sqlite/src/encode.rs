//! Row types and conversions between SQLite columns and domain types.
//!
//! Columns are always read by name so a reordered SELECT list cannot shift
//! values into the wrong field. Filing instants are stored as epoch
//! milliseconds (UTC).

use chrono::{DateTime, Utc};
use rusqlite::Row;
use taxdesk_core::{
  client::Client,
  id::{AssistantId, ClientId, CpaId, TaxReturnId},
  staff::{Assistant, Cpa, StaffRelation},
  tax_return::{ReturnState, TaxReturn},
};

use crate::Result;

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_epoch(at: DateTime<Utc>) -> i64 { at.timestamp_millis() }

// ─── Staff ───────────────────────────────────────────────────────────────────

/// A row of `cpas` or `tax_filing_assistants`.
pub struct RawStaff {
  pub id:   i64,
  pub name: Option<String>,
}

impl RawStaff {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get("id")?, name: row.get("name")? })
  }

  pub fn into_cpa(self) -> Cpa {
    Cpa { id: Some(CpaId(self.id)), name: self.name.unwrap_or_default() }
  }

  pub fn into_assistant(self) -> Assistant {
    Assistant { id: Some(AssistantId(self.id)), name: self.name.unwrap_or_default() }
  }
}

pub fn relation_from_row(row: &Row<'_>) -> rusqlite::Result<StaffRelation> {
  let staff_name: Option<String> = row.get("staff_name")?;
  let client_name: Option<String> = row.get("client_name")?;
  Ok(StaffRelation {
    staff_name:  staff_name.unwrap_or_default(),
    client_name: client_name.unwrap_or_default(),
  })
}

// ─── Clients ─────────────────────────────────────────────────────────────────

/// Denormalised client row: `clients` left-joined with both staff tables.
pub struct RawClient {
  pub id:                  i64,
  pub name:                Option<String>,
  pub address:             Option<String>,
  pub income:              Option<f64>,
  pub materials_submitted: bool,
  pub cpa_name:            Option<String>,
  pub assistant_name:      Option<String>,
}

impl RawClient {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get("id")?,
      name:                row.get("name")?,
      address:             row.get("address")?,
      income:              row.get("income")?,
      materials_submitted: row.get("materials_submitted")?,
      cpa_name:            row.get("cpa_name")?,
      assistant_name:      row.get("assistant_name")?,
    })
  }

  pub fn into_client(self) -> Client {
    Client {
      id:                  Some(ClientId(self.id)),
      name:                self.name.unwrap_or_default(),
      address:             self.address.unwrap_or_default(),
      income:              self.income.unwrap_or_default(),
      materials_submitted: self.materials_submitted,
      cpa:                 self.cpa_name,
      assistant:           self.assistant_name,
    }
  }
}

// ─── Tax returns ─────────────────────────────────────────────────────────────

/// Raw values read directly from a `tax_returns` row.
pub struct RawTaxReturn {
  pub id:                   i64,
  pub client_id:            i64,
  pub filed_or_not:         bool,
  pub checked_by:           Option<String>,
  pub tax_return_timestamp: Option<i64>,
}

impl RawTaxReturn {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get("id")?,
      client_id:            row.get("client_id")?,
      filed_or_not:         row.get("filed_or_not")?,
      checked_by:           row.get("checked_by")?,
      tax_return_timestamp: row.get("tax_return_timestamp")?,
    })
  }

  pub fn state(&self) -> Result<ReturnState> {
    Ok(ReturnState::from_columns(
      self.filed_or_not,
      self.checked_by.as_deref(),
      self.tax_return_timestamp,
    )?)
  }

  pub fn into_tax_return(self) -> Result<TaxReturn> {
    let state = self.state()?;
    Ok(TaxReturn {
      id: Some(TaxReturnId(self.id)),
      client_id: ClientId(self.client_id),
      state,
    })
  }
}
