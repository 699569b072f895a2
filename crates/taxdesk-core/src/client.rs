//! Client gateway.
//!
//! A [`Client`] is both the value written on creation and the denormalised
//! view read back by name: on read, the assigned CPA and assistant are
//! resolved to their names.

use std::fmt;

use crate::{
  display::format_income,
  id::{AssistantId, ClientId, CpaId},
  staff::{Assistant, Cpa},
  store::TaxOfficeStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
  /// `None` until [`Client::save`] has run.
  pub id:                  Option<ClientId>,
  pub name:                String,
  pub address:             String,
  /// Whole or fractional dollars; never negative once past the input layer.
  pub income:              f64,
  pub materials_submitted: bool,
  /// Name of the assigned CPA, as of the last read.
  pub cpa:                 Option<String>,
  /// Name of the assigned assistant, as of the last read.
  pub assistant:           Option<String>,
}

impl Client {
  /// A new, unsaved client with no materials and no staff assigned.
  pub fn new(
    name: impl Into<String>,
    address: impl Into<String>,
    income: f64,
  ) -> Self {
    Self {
      id: None,
      name: name.into(),
      address: address.into(),
      income,
      materials_submitted: false,
      cpa: None,
      assistant: None,
    }
  }

  fn require_id(&self) -> crate::Result<ClientId> {
    self.id.ok_or(crate::Error::Unsaved("client"))
  }

  /// Insert a new row and keep the generated id.
  pub async fn save<S: TaxOfficeStore>(&mut self, store: &S) -> Result<ClientId, S::Error> {
    let id = store.insert_client(self).await?;
    self.id = Some(id);
    Ok(id)
  }

  /// Case-insensitive lookup by name.
  pub async fn get<S: TaxOfficeStore>(store: &S, name: &str) -> Result<Option<Self>, S::Error> {
    store.find_client(name).await
  }

  /// Set the materials flag, in memory and in storage. Idempotent.
  pub async fn mark_materials_submitted<S: TaxOfficeStore>(
    &mut self,
    store: &S,
  ) -> Result<(), S::Error> {
    let id = self.require_id()?;
    self.materials_submitted = true;
    store.set_materials_submitted(id, true).await
  }

  /// The in-memory flag; not re-read from storage.
  pub fn materials_status(&self) -> bool { self.materials_submitted }

  /// Point the client at `cpa_id`, replacing any earlier assignment.
  ///
  /// The id is not checked here; the store's foreign key rejects ids that
  /// do not exist. The in-memory `cpa` name is left as it was.
  pub async fn assign_cpa<S: TaxOfficeStore>(
    &self,
    store: &S,
    cpa_id: CpaId,
  ) -> Result<(), S::Error> {
    store.assign_cpa(self.require_id()?, cpa_id).await
  }

  pub async fn assign_assistant<S: TaxOfficeStore>(
    &self,
    store: &S,
    assistant_id: AssistantId,
  ) -> Result<(), S::Error> {
    store.assign_assistant(self.require_id()?, assistant_id).await
  }

  /// Look up a CPA by name and assign it in one transaction.
  ///
  /// Returns the CPA that was assigned, or `None` (with nothing written) when
  /// no CPA has that name.
  pub async fn assign_cpa_named<S: TaxOfficeStore>(
    &mut self,
    store: &S,
    cpa_name: &str,
  ) -> Result<Option<Cpa>, S::Error> {
    let assigned = store.assign_cpa_by_name(self.require_id()?, cpa_name).await?;
    if let Some(cpa) = &assigned {
      self.cpa = Some(cpa.name.clone());
    }
    Ok(assigned)
  }

  pub async fn assign_assistant_named<S: TaxOfficeStore>(
    &mut self,
    store: &S,
    assistant_name: &str,
  ) -> Result<Option<Assistant>, S::Error> {
    let assigned = store
      .assign_assistant_by_name(self.require_id()?, assistant_name)
      .await?;
    if let Some(assistant) = &assigned {
      self.assistant = Some(assistant.name.clone());
    }
    Ok(assigned)
  }
}

impl fmt::Display for Client {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.id {
      Some(id) => writeln!(f, "Client ID: {id}")?,
      None => writeln!(f, "Client ID: (unsaved)")?,
    }
    writeln!(f, "Name: {}", self.name)?;
    writeln!(f, "Address: {}", self.address)?;
    writeln!(f, "Income: {}", format_income(self.income))?;
    writeln!(
      f,
      "Materials: {}",
      if self.materials_submitted { "submitted" } else { "not submitted" }
    )?;
    writeln!(f, "CPA: {}", self.cpa.as_deref().unwrap_or("None"))?;
    write!(f, "Assistant: {}", self.assistant.as_deref().unwrap_or("None"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_client_has_no_assignments() {
    let client = Client::new("Jane Doe", "123 Main St", 50_000.0);
    assert_eq!(client.id, None);
    assert!(!client.materials_status());
    assert_eq!(client.cpa, None);
    assert_eq!(client.assistant, None);
  }

  #[test]
  fn display_renders_detail_block() {
    let mut client = Client::new("Jane Doe", "123 Main St", 50_000.0);
    client.id = Some(ClientId(7));
    client.cpa = Some("Ada Lovelace".into());

    let rendered = client.to_string();
    assert_eq!(
      rendered,
      "Client ID: 7\n\
       Name: Jane Doe\n\
       Address: 123 Main St\n\
       Income: $50,000.00\n\
       Materials: not submitted\n\
       CPA: Ada Lovelace\n\
       Assistant: None"
    );
  }
}
