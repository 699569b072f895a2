//! The `TaxOfficeStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `taxdesk-store-sqlite`).
//! The gateways in this crate and the interaction shell depend on this
//! abstraction, not on any concrete backend. A store is a handle: it is passed
//! into every gateway call rather than living in a global.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  client::Client,
  id::{AssistantId, ClientId, CpaId},
  staff::{Assistant, Cpa, StaffRelation},
  tax_return::{FiledBy, FilingStatus, TaxReturn},
};

/// Abstraction over a taxdesk storage backend.
///
/// Every method is a single round-trip. Methods documented as atomic run their
/// lookup and write inside one transaction.
pub trait TaxOfficeStore: Send + Sync {
  /// Backend error. Must be able to carry a core [`crate::Error`] so the
  /// gateways can report their own failures through the same type.
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  // ── CPAs ──────────────────────────────────────────────────────────────

  /// Insert a CPA and return the generated id. No duplicate check.
  fn insert_cpa<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<CpaId, Self::Error>> + Send + 'a;

  /// Case-insensitive exact name match; the earliest-created row wins.
  fn find_cpa<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Cpa>, Self::Error>> + Send + 'a;

  /// Every (CPA, client) pair where the client references the CPA.
  fn cpa_client_relations(
    &self,
  ) -> impl Future<Output = Result<Vec<StaffRelation>, Self::Error>> + Send + '_;

  // ── Assistants ────────────────────────────────────────────────────────

  fn insert_assistant<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<AssistantId, Self::Error>> + Send + 'a;

  fn find_assistant<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Assistant>, Self::Error>> + Send + 'a;

  fn assistant_client_relations(
    &self,
  ) -> impl Future<Output = Result<Vec<StaffRelation>, Self::Error>> + Send + '_;

  // ── Clients ───────────────────────────────────────────────────────────

  /// Insert the client's name, address, income and materials flag. Staff
  /// assignments are not written at creation time.
  fn insert_client<'a>(
    &'a self,
    client: &'a Client,
  ) -> impl Future<Output = Result<ClientId, Self::Error>> + Send + 'a;

  /// Case-insensitive lookup returning the denormalised view, with the
  /// assigned CPA and assistant resolved to their names.
  fn find_client<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + 'a;

  fn set_materials_submitted(
    &self,
    client_id: ClientId,
    submitted: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite `cpa_id`. A dangling id is rejected by the foreign key.
  fn assign_cpa(
    &self,
    client_id: ClientId,
    cpa_id: CpaId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite `assistant_id`. A dangling id is rejected by the foreign key.
  fn assign_assistant(
    &self,
    client_id: ClientId,
    assistant_id: AssistantId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Atomic: resolve `cpa_name` and write it to the client. Returns `None`
  /// and writes nothing if no CPA has that name.
  fn assign_cpa_by_name<'a>(
    &'a self,
    client_id: ClientId,
    cpa_name: &'a str,
  ) -> impl Future<Output = Result<Option<Cpa>, Self::Error>> + Send + 'a;

  /// Atomic counterpart of [`Self::assign_cpa_by_name`] for assistants.
  fn assign_assistant_by_name<'a>(
    &'a self,
    client_id: ClientId,
    assistant_name: &'a str,
  ) -> impl Future<Output = Result<Option<Assistant>, Self::Error>> + Send + 'a;

  // ── Tax returns ───────────────────────────────────────────────────────

  /// Insert an unfiled return for the client. Does not check for an
  /// existing one.
  fn insert_tax_return(
    &self,
    client_id: ClientId,
  ) -> impl Future<Output = Result<TaxReturn, Self::Error>> + Send + '_;

  /// Atomic: insert an unfiled return unless the client already has one,
  /// in which case `None` is returned.
  fn insert_tax_return_once(
    &self,
    client_id: ClientId,
  ) -> impl Future<Output = Result<Option<TaxReturn>, Self::Error>> + Send + '_;

  /// The client's return; the earliest row if several exist.
  fn find_tax_return(
    &self,
    client_id: ClientId,
  ) -> impl Future<Output = Result<Option<TaxReturn>, Self::Error>> + Send + '_;

  /// Mark every return of the client filed by `by` at `at`.
  fn record_filing(
    &self,
    client_id: ClientId,
    by: FiledBy,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The status columns of the client's return, or `None` without a return.
  fn filing_status(
    &self,
    client_id: ClientId,
  ) -> impl Future<Output = Result<Option<FilingStatus>, Self::Error>> + Send + '_;
}
