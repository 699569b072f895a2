//! [`SqliteStore`] — the SQLite implementation of [`TaxOfficeStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use taxdesk_core::{
  client::Client,
  id::{AssistantId, ClientId, CpaId, TaxReturnId},
  staff::{Assistant, Cpa, StaffRelation},
  store::TaxOfficeStore,
  tax_return::{FiledBy, FilingStatus, ReturnState, TaxReturn},
};

use crate::{
  encode::{encode_epoch, relation_from_row, RawClient, RawStaff, RawTaxReturn},
  schema::SCHEMA,
  Error, Result,
};

// ─── Staff tables ────────────────────────────────────────────────────────────

/// The two staff tables share one shape; this names the table and the
/// `clients` column that points into it.
#[derive(Clone, Copy)]
struct StaffTable {
  table:     &'static str,
  client_fk: &'static str,
}

const CPAS: StaffTable = StaffTable { table: "cpas", client_fk: "cpa_id" };

const ASSISTANTS: StaffTable = StaffTable {
  table:     "tax_filing_assistants",
  client_fk: "assistant_id",
};

const SELECT_CLIENT_DETAILS: &str = "
  SELECT clients.id                  AS id,
         clients.name                AS name,
         clients.address             AS address,
         clients.income              AS income,
         clients.materials_submitted AS materials_submitted,
         cpas.name                   AS cpa_name,
         tax_filing_assistants.name  AS assistant_name
  FROM clients
  LEFT JOIN cpas                  ON clients.cpa_id       = cpas.id
  LEFT JOIN tax_filing_assistants ON clients.assistant_id = tax_filing_assistants.id
  WHERE LOWER(clients.name) = LOWER(?1)
  ORDER BY clients.id
  LIMIT 1";

const SELECT_TAX_RETURN: &str = "
  SELECT id, client_id, filed_or_not, checked_by, tax_return_timestamp
  FROM tax_returns
  WHERE client_id = ?1
  ORDER BY id
  LIMIT 1";

fn find_staff_in(
  conn: &rusqlite::Connection,
  staff: StaffTable,
  name: &str,
) -> rusqlite::Result<Option<RawStaff>> {
  conn
    .query_row(
      &format!(
        "SELECT id, name FROM {} WHERE LOWER(name) = LOWER(?1) ORDER BY id LIMIT 1",
        staff.table
      ),
      rusqlite::params![name],
      RawStaff::from_row,
    )
    .optional()
}

fn insert_unfiled_return(
  conn: &rusqlite::Connection,
  client_id: ClientId,
) -> rusqlite::Result<TaxReturn> {
  conn.execute(
    "INSERT INTO tax_returns (client_id, filed_or_not, checked_by, tax_return_timestamp)
     VALUES (?1, FALSE, NULL, NULL)",
    rusqlite::params![client_id.get()],
  )?;
  Ok(TaxReturn {
    id: Some(TaxReturnId(conn.last_insert_rowid())),
    client_id,
    state: ReturnState::Unfiled,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A taxdesk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
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

  async fn insert_staff(&self, staff: StaffTable, name: &str) -> Result<i64> {
    let name = name.to_owned();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO {} (name) VALUES (?1)", staff.table),
          rusqlite::params![name],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  async fn find_staff(&self, staff: StaffTable, name: &str) -> Result<Option<RawStaff>> {
    let name = name.to_owned();
    let raw = self
      .conn
      .call(move |conn| Ok(find_staff_in(conn, staff, &name)?))
      .await?;
    Ok(raw)
  }

  /// Inner join: clients without an assignment and staff without clients are
  /// both left out.
  async fn staff_relations(&self, staff: StaffTable) -> Result<Vec<StaffRelation>> {
    let relations = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {t}.name AS staff_name, clients.name AS client_name
           FROM clients
           JOIN {t} ON clients.{fk} = {t}.id
           ORDER BY LOWER({t}.name), clients.id",
          t = staff.table,
          fk = staff.client_fk,
        ))?;
        let rows = stmt
          .query_map([], relation_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(relations)
  }

  async fn assign_staff(&self, staff: StaffTable, client_id: ClientId, staff_id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("UPDATE clients SET {} = ?1 WHERE id = ?2", staff.client_fk),
          rusqlite::params![staff_id, client_id.get()],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn assign_staff_by_name(
    &self,
    staff: StaffTable,
    client_id: ClientId,
    name: &str,
  ) -> Result<Option<RawStaff>> {
    let name = name.to_owned();
    let assigned = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let found = find_staff_in(&tx, staff, &name)?;
        if let Some(member) = &found {
          tx.execute(
            &format!("UPDATE clients SET {} = ?1 WHERE id = ?2", staff.client_fk),
            rusqlite::params![member.id, client_id.get()],
          )?;
        }
        tx.commit()?;
        Ok(found)
      })
      .await?;
    Ok(assigned)
  }
}

// ─── TaxOfficeStore impl ─────────────────────────────────────────────────────

impl TaxOfficeStore for SqliteStore {
  type Error = Error;

  // ── CPAs ──────────────────────────────────────────────────────────────────

  async fn insert_cpa(&self, name: &str) -> Result<CpaId> {
    Ok(CpaId(self.insert_staff(CPAS, name).await?))
  }

  async fn find_cpa(&self, name: &str) -> Result<Option<Cpa>> {
    Ok(self.find_staff(CPAS, name).await?.map(RawStaff::into_cpa))
  }

  async fn cpa_client_relations(&self) -> Result<Vec<StaffRelation>> {
    self.staff_relations(CPAS).await
  }

  // ── Assistants ────────────────────────────────────────────────────────────

  async fn insert_assistant(&self, name: &str) -> Result<AssistantId> {
    Ok(AssistantId(self.insert_staff(ASSISTANTS, name).await?))
  }

  async fn find_assistant(&self, name: &str) -> Result<Option<Assistant>> {
    Ok(self.find_staff(ASSISTANTS, name).await?.map(RawStaff::into_assistant))
  }

  async fn assistant_client_relations(&self) -> Result<Vec<StaffRelation>> {
    self.staff_relations(ASSISTANTS).await
  }

  // ── Clients ───────────────────────────────────────────────────────────────

  async fn insert_client(&self, client: &Client) -> Result<ClientId> {
    let name      = client.name.clone();
    let address   = client.address.clone();
    let income    = client.income;
    let submitted = client.materials_submitted;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clients (name, address, income, materials_submitted)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, address, income, submitted],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ClientId(id))
  }

  async fn find_client(&self, name: &str) -> Result<Option<Client>> {
    let name = name.to_owned();

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_CLIENT_DETAILS, rusqlite::params![name], RawClient::from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawClient::into_client))
  }

  async fn set_materials_submitted(&self, client_id: ClientId, submitted: bool) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE clients SET materials_submitted = ?1 WHERE id = ?2",
          rusqlite::params![submitted, client_id.get()],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn assign_cpa(&self, client_id: ClientId, cpa_id: CpaId) -> Result<()> {
    self.assign_staff(CPAS, client_id, cpa_id.get()).await
  }

  async fn assign_assistant(&self, client_id: ClientId, assistant_id: AssistantId) -> Result<()> {
    self.assign_staff(ASSISTANTS, client_id, assistant_id.get()).await
  }

  async fn assign_cpa_by_name(&self, client_id: ClientId, cpa_name: &str) -> Result<Option<Cpa>> {
    Ok(
      self
        .assign_staff_by_name(CPAS, client_id, cpa_name)
        .await?
        .map(RawStaff::into_cpa),
    )
  }

  async fn assign_assistant_by_name(
    &self,
    client_id: ClientId,
    assistant_name: &str,
  ) -> Result<Option<Assistant>> {
    Ok(
      self
        .assign_staff_by_name(ASSISTANTS, client_id, assistant_name)
        .await?
        .map(RawStaff::into_assistant),
    )
  }

  // ── Tax returns ───────────────────────────────────────────────────────────

  async fn insert_tax_return(&self, client_id: ClientId) -> Result<TaxReturn> {
    let tax_return = self
      .conn
      .call(move |conn| Ok(insert_unfiled_return(conn, client_id)?))
      .await?;
    Ok(tax_return)
  }

  async fn insert_tax_return_once(&self, client_id: ClientId) -> Result<Option<TaxReturn>> {
    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM tax_returns WHERE client_id = ?1 LIMIT 1",
            rusqlite::params![client_id.get()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          return Ok(None);
        }

        let tax_return = insert_unfiled_return(&tx, client_id)?;
        tx.commit()?;
        Ok(Some(tax_return))
      })
      .await?;
    Ok(created)
  }

  async fn find_tax_return(&self, client_id: ClientId) -> Result<Option<TaxReturn>> {
    let raw: Option<RawTaxReturn> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_TAX_RETURN, rusqlite::params![client_id.get()], RawTaxReturn::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTaxReturn::into_tax_return).transpose()
  }

  async fn record_filing(&self, client_id: ClientId, by: FiledBy, at: DateTime<Utc>) -> Result<()> {
    let code  = by.code();
    let epoch = encode_epoch(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE tax_returns
           SET filed_or_not = TRUE, checked_by = ?1, tax_return_timestamp = ?2
           WHERE client_id = ?3",
          rusqlite::params![code, epoch, client_id.get()],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn filing_status(&self, client_id: ClientId) -> Result<Option<FilingStatus>> {
    let raw: Option<RawTaxReturn> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_TAX_RETURN, rusqlite::params![client_id.get()], RawTaxReturn::from_row)
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|row| row.state().map(|state| state.status()))
      .transpose()
  }
}
