//! Staff gateways: CPAs and tax filing assistants.
//!
//! Both kinds of staff have the same shape (a generated id and a name) but live
//! in separate tables and are never interchangeable.

use crate::{
  id::{AssistantId, CpaId},
  store::TaxOfficeStore,
};

/// One row of a staff/client relationship listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRelation {
  pub staff_name:  String,
  pub client_name: String,
}

// ─── CPA ─────────────────────────────────────────────────────────────────────

/// A Certified Public Accountant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpa {
  /// `None` until [`Cpa::save`] has run.
  pub id:   Option<CpaId>,
  pub name: String,
}

impl Cpa {
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: None, name: name.into() }
  }

  /// Insert a new row and keep the generated id. Saving twice creates two
  /// rows.
  pub async fn save<S: TaxOfficeStore>(&mut self, store: &S) -> Result<CpaId, S::Error> {
    let id = store.insert_cpa(&self.name).await?;
    self.id = Some(id);
    Ok(id)
  }

  /// Case-insensitive lookup by name.
  pub async fn get<S: TaxOfficeStore>(store: &S, name: &str) -> Result<Option<Self>, S::Error> {
    store.find_cpa(name).await
  }

  /// All clients currently assigned a CPA, paired with that CPA's name.
  pub async fn list_client_relations<S: TaxOfficeStore>(
    store: &S,
  ) -> Result<Vec<StaffRelation>, S::Error> {
    store.cpa_client_relations().await
  }
}

// ─── Assistant ───────────────────────────────────────────────────────────────

/// A tax filing assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assistant {
  pub id:   Option<AssistantId>,
  pub name: String,
}

impl Assistant {
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: None, name: name.into() }
  }

  pub async fn save<S: TaxOfficeStore>(
    &mut self,
    store: &S,
  ) -> Result<AssistantId, S::Error> {
    let id = store.insert_assistant(&self.name).await?;
    self.id = Some(id);
    Ok(id)
  }

  pub async fn get<S: TaxOfficeStore>(store: &S, name: &str) -> Result<Option<Self>, S::Error> {
    store.find_assistant(name).await
  }

  pub async fn list_client_relations<S: TaxOfficeStore>(
    store: &S,
  ) -> Result<Vec<StaffRelation>, S::Error> {
    store.assistant_client_relations().await
  }
}
