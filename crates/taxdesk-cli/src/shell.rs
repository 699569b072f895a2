//! The numbered-menu interaction shell.
//!
//! Each menu action is one short conversation: prompt, look up, call a
//! gateway, print the outcome. A failing action is reported and the menu
//! comes back; only end of input or choice 14 leaves the loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono_tz::Tz;
use taxdesk_core::{
  client::Client,
  display::{format_filed_at, title_case},
  staff::{Assistant, Cpa, StaffRelation},
  store::TaxOfficeStore,
  tax_return::{FiledBy, TaxReturn},
};

use crate::prompt::Prompter;

pub const MENU: &str = "-- Menu --

1) Add new client
2) Add new cpa
3) Add new tax filing assistant
4) Mark client materials as submitted
5) Check status of client's materials
6) Create a tax return file for a client
7) Mark a client's tax return as filed
8) Check the status of a client's tax return
9) Assign a cpa to a client
10) Display all cpa-client relationships
11) Assign an assistant to a client
12) Display all assistant-client relationships
13) Get client details
14) Exit

Enter your choice: ";

const NO_CLIENT: &str = "There is no client with that name in the database.";
const NO_TAX_RETURN: &str = "There is no tax return file for this client. Please create one first";

// ─── Menu ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
  AddClient,
  AddCpa,
  AddAssistant,
  MarkMaterials,
  CheckMaterials,
  CreateTaxReturn,
  MarkTaxReturnFiled,
  CheckTaxReturn,
  AssignCpa,
  ListCpaRelations,
  AssignAssistant,
  ListAssistantRelations,
  ClientDetails,
  Exit,
}

impl MenuAction {
  pub fn from_choice(choice: &str) -> Option<Self> {
    Some(match choice {
      "1" => Self::AddClient,
      "2" => Self::AddCpa,
      "3" => Self::AddAssistant,
      "4" => Self::MarkMaterials,
      "5" => Self::CheckMaterials,
      "6" => Self::CreateTaxReturn,
      "7" => Self::MarkTaxReturnFiled,
      "8" => Self::CheckTaxReturn,
      "9" => Self::AssignCpa,
      "10" => Self::ListCpaRelations,
      "11" => Self::AssignAssistant,
      "12" => Self::ListAssistantRelations,
      "13" => Self::ClientDetails,
      "14" => Self::Exit,
      _ => return None,
    })
  }
}

fn is_end_of_input(err: &anyhow::Error) -> bool {
  err
    .downcast_ref::<io::Error>()
    .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

// ─── Shell ───────────────────────────────────────────────────────────────────

pub struct Shell<'s, S, R, W> {
  store:    &'s S,
  io:       Prompter<R, W>,
  /// Zone used when printing filing times.
  timezone: Tz,
}

impl<'s, S, R, W> Shell<'s, S, R, W>
where
  S: TaxOfficeStore,
  R: BufRead,
  W: Write,
{
  pub fn new(store: &'s S, input: R, output: W, timezone: Tz) -> Self {
    Self { store, io: Prompter::new(input, output), timezone }
  }

  /// Run the menu until the user exits or input ends.
  pub async fn run(&mut self) -> Result<()> {
    loop {
      let choice = match self.io.line(MENU) {
        Ok(choice) => choice,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
        Err(e) => return Err(e.into()),
      };

      let Some(action) = MenuAction::from_choice(&choice) else {
        writeln!(self.io.out(), "Invalid input selected. Please try again.")?;
        continue;
      };
      if action == MenuAction::Exit {
        break;
      }

      tracing::debug!(?action, "dispatching menu action");
      if let Err(err) = self.dispatch(action).await {
        if is_end_of_input(&err) {
          break;
        }
        tracing::error!(?action, error = %err, "menu action failed");
        writeln!(self.io.out(), "Something went wrong: {err}")?;
      }
    }
    Ok(())
  }

  async fn dispatch(&mut self, action: MenuAction) -> Result<()> {
    match action {
      MenuAction::AddClient => self.add_client().await,
      MenuAction::AddCpa => self.add_cpa().await,
      MenuAction::AddAssistant => self.add_assistant().await,
      MenuAction::MarkMaterials => self.mark_materials().await,
      MenuAction::CheckMaterials => self.check_materials().await,
      MenuAction::CreateTaxReturn => self.create_tax_return().await,
      MenuAction::MarkTaxReturnFiled => self.mark_tax_return_filed().await,
      MenuAction::CheckTaxReturn => self.check_tax_return().await,
      MenuAction::AssignCpa => self.assign_cpa().await,
      MenuAction::ListCpaRelations => {
        let relations = Cpa::list_client_relations(self.store).await?;
        self.print_relations("CPA", &relations)
      }
      MenuAction::AssignAssistant => self.assign_assistant().await,
      MenuAction::ListAssistantRelations => {
        let relations = Assistant::list_client_relations(self.store).await?;
        self.print_relations("Assistant", &relations)
      }
      MenuAction::ClientDetails => self.client_details().await,
      MenuAction::Exit => Ok(()),
    }
  }

  /// Ask for a client name and look it up, printing the not-found message
  /// when there is no match.
  async fn prompt_client(&mut self, prompt: &str) -> Result<Option<Client>> {
    let name = self.io.line(prompt)?;
    let client = Client::get(self.store, &name).await?;
    if client.is_none() {
      writeln!(self.io.out(), "{NO_CLIENT}")?;
    }
    Ok(client)
  }

  // ── Creation ──────────────────────────────────────────────────────────────

  async fn add_client(&mut self) -> Result<()> {
    let name = self.io.required("Enter client's name: ")?;
    let address = self.io.required("Enter client's address: ")?;
    let income = self.io.income("Enter client's income: ")?;

    let mut client = Client::new(name, address, income);
    let id = client.save(self.store).await?;
    tracing::info!(client_id = %id, "client added");
    writeln!(self.io.out(), "Added client '{}'.", client.name)?;
    Ok(())
  }

  async fn add_cpa(&mut self) -> Result<()> {
    let mut cpa = Cpa::new(self.io.required("Enter CPA's name: ")?);
    let id = cpa.save(self.store).await?;
    tracing::info!(cpa_id = %id, "cpa added");
    writeln!(self.io.out(), "Added CPA '{}'.", cpa.name)?;
    Ok(())
  }

  async fn add_assistant(&mut self) -> Result<()> {
    let mut assistant = Assistant::new(self.io.required("Enter Tax Filing Assistant's name: ")?);
    let id = assistant.save(self.store).await?;
    tracing::info!(assistant_id = %id, "assistant added");
    writeln!(self.io.out(), "Added tax filing assistant '{}'.", assistant.name)?;
    Ok(())
  }

  // ── Materials ─────────────────────────────────────────────────────────────

  async fn mark_materials(&mut self) -> Result<()> {
    let Some(mut client) = self.prompt_client("What is the name of the client? ").await? else {
      return Ok(());
    };
    client.mark_materials_submitted(self.store).await?;
    writeln!(self.io.out(), "Marked {}'s materials as submitted.", client.name)?;
    Ok(())
  }

  async fn check_materials(&mut self) -> Result<()> {
    let Some(client) = self.prompt_client("What is the name of the client? ").await? else {
      return Ok(());
    };
    if client.materials_status() {
      writeln!(self.io.out(), "This client's materials have been submitted.")?;
    } else {
      writeln!(self.io.out(), "This client's materials have not been submitted.")?;
    }
    Ok(())
  }

  // ── Tax returns ───────────────────────────────────────────────────────────

  async fn create_tax_return(&mut self) -> Result<()> {
    let Some(client) = self
      .prompt_client("Enter the name of the client to create a tax return for: ")
      .await?
    else {
      return Ok(());
    };

    match TaxReturn::create_once(self.store, &client).await? {
      Some(_) => {
        tracing::info!(client = %client.name, "tax return created");
        writeln!(self.io.out(), "Created a tax return file for {}.", client.name)?;
      }
      None => writeln!(self.io.out(), "A tax return already exists for that client.")?,
    }
    Ok(())
  }

  async fn mark_tax_return_filed(&mut self) -> Result<()> {
    let Some(client) = self.prompt_client("What is the client's name? ").await? else {
      return Ok(());
    };
    let client_id = client.id.ok_or(taxdesk_core::Error::Unsaved("client"))?;

    let Some(mut tax_return) = TaxReturn::get(self.store, client_id).await? else {
      writeln!(self.io.out(), "{NO_TAX_RETURN}")?;
      return Ok(());
    };

    writeln!(self.io.out(), "Who is filing the return?")?;
    writeln!(self.io.out(), "1) CPA")?;
    writeln!(self.io.out(), "2) Tax Filing Assistant")?;
    let by = match self.io.line("choice: ")?.as_str() {
      "1" => FiledBy::Cpa,
      "2" => FiledBy::Assistant,
      _ => {
        writeln!(self.io.out(), "Invalid. Please enter 1 or 2.")?;
        return Ok(());
      }
    };

    tax_return.mark_filed(self.store, by).await?;
    tracing::info!(client = %client.name, ?by, "tax return filed");
    writeln!(
      self.io.out(),
      "Marked {}'s tax return as filed by {}.",
      title_case(&client.name),
      by.describe()
    )?;
    Ok(())
  }

  async fn check_tax_return(&mut self) -> Result<()> {
    let Some(client) = self.prompt_client("What is the client's name? ").await? else {
      return Ok(());
    };
    let client_id = client.id.ok_or(taxdesk_core::Error::Unsaved("client"))?;

    let Some(status) = TaxReturn::is_filed(self.store, client_id).await? else {
      writeln!(self.io.out(), "{NO_TAX_RETURN}")?;
      return Ok(());
    };

    let name = title_case(&client.name);
    match (status.filed, status.checked_by, status.filed_at) {
      (true, Some(by), Some(at)) => writeln!(
        self.io.out(),
        "{name}'s tax return was filed by {} on {}.",
        by.describe(),
        format_filed_at(at, self.timezone)
      )?,
      _ => writeln!(self.io.out(), "{name}'s tax return has not been filed.")?,
    }
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn assign_cpa(&mut self) -> Result<()> {
    let Some(mut client) = self.prompt_client("What is the client's name? ").await? else {
      return Ok(());
    };
    let cpa_name = self.io.line("Enter the name of the CPA: ")?;

    match client.assign_cpa_named(self.store, &cpa_name).await? {
      Some(cpa) => writeln!(self.io.out(), "Assigned CPA '{}' to {}.", cpa.name, client.name)?,
      None => writeln!(self.io.out(), "There is no CPA with that name.")?,
    }
    Ok(())
  }

  async fn assign_assistant(&mut self) -> Result<()> {
    let Some(mut client) = self.prompt_client("What is the client's name? ").await? else {
      return Ok(());
    };
    let assistant_name = self.io.line("Enter the name of the assistant: ")?;

    match client.assign_assistant_named(self.store, &assistant_name).await? {
      Some(assistant) => writeln!(
        self.io.out(),
        "Assigned assistant '{}' to {}.",
        assistant.name,
        client.name
      )?,
      None => writeln!(self.io.out(), "There is no assistant with that name.")?,
    }
    Ok(())
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  fn print_relations(&mut self, role: &str, relations: &[StaffRelation]) -> Result<()> {
    let out = self.io.out();
    writeln!(out, "--- {role}-Client Relations ---")?;
    for relation in relations {
      writeln!(out, "{role}: {} | Client: {}", relation.staff_name, relation.client_name)?;
    }
    Ok(())
  }

  async fn client_details(&mut self) -> Result<()> {
    let Some(client) = self.prompt_client("What is the client's name? ").await? else {
      return Ok(());
    };
    writeln!(self.io.out(), "--- Client Details ---")?;
    writeln!(self.io.out(), "{client}")?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use taxdesk_core::display::DEFAULT_TIMEZONE;
  use taxdesk_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
  }

  /// Feed `script` to a fresh shell and return everything it printed.
  async fn run_script(store: &SqliteStore, script: &str) -> String {
    let mut out = Vec::new();
    Shell::new(store, script.as_bytes(), &mut out, DEFAULT_TIMEZONE)
      .run()
      .await
      .unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn every_menu_number_maps_to_an_action() {
    for n in 1..=14 {
      assert!(MenuAction::from_choice(&n.to_string()).is_some(), "choice {n}");
    }
    assert_eq!(MenuAction::from_choice("14"), Some(MenuAction::Exit));
    assert_eq!(MenuAction::from_choice("0"), None);
    assert_eq!(MenuAction::from_choice("15"), None);
    assert_eq!(MenuAction::from_choice("one"), None);
  }

  #[tokio::test]
  async fn exit_and_end_of_input_both_stop() {
    let s = store().await;
    let transcript = run_script(&s, "14\n").await;
    assert_eq!(transcript.matches("-- Menu --").count(), 1);

    let transcript = run_script(&s, "").await;
    assert_eq!(transcript.matches("-- Menu --").count(), 1);
  }

  #[tokio::test]
  async fn invalid_choice_returns_to_menu() {
    let s = store().await;
    let transcript = run_script(&s, "99\n14\n").await;
    assert!(transcript.contains("Invalid input selected. Please try again."));
    assert_eq!(transcript.matches("-- Menu --").count(), 2);
  }

  #[tokio::test]
  async fn add_client_then_show_details() {
    let s = store().await;
    let transcript = run_script(
      &s,
      "1\nJane Doe\n123 Main St\n-10\n50000\n13\njane doe\n14\n",
    )
    .await;

    assert!(transcript.contains("Income cannot be negative."));
    assert!(transcript.contains("Added client 'Jane Doe'."));
    assert!(transcript.contains("--- Client Details ---"));
    assert!(transcript.contains("Name: Jane Doe"));
    assert!(transcript.contains("Income: $50,000.00"));
    assert!(transcript.contains("CPA: None"));
  }

  #[tokio::test]
  async fn unknown_client_is_reported() {
    let s = store().await;
    let transcript = run_script(&s, "5\nNobody\n14\n").await;
    assert!(transcript.contains(NO_CLIENT));
  }

  #[tokio::test]
  async fn materials_flow() {
    let s = store().await;
    let transcript = run_script(
      &s,
      "1\nJane Doe\n1 Elm\n10\n5\nJane Doe\n4\nJane Doe\n5\njane doe\n14\n",
    )
    .await;

    let not_yet = transcript
      .find("have not been submitted")
      .expect("initial check");
    let done = transcript.find("have been submitted").expect("second check");
    assert!(not_yet < done);
  }

  #[tokio::test]
  async fn tax_return_lifecycle() {
    let s = store().await;
    let transcript = run_script(
      &s,
      "1\njane doe\n1 Elm\n10\n\
       7\njane doe\n\
       6\njane doe\n\
       6\njane doe\n\
       8\njane doe\n\
       7\njane doe\n3\n\
       7\njane doe\n1\n\
       8\njane doe\n\
       14\n",
    )
    .await;

    assert!(transcript.contains(NO_TAX_RETURN));
    assert!(transcript.contains("Created a tax return file for jane doe."));
    assert!(transcript.contains("A tax return already exists for that client."));
    assert!(transcript.contains("Jane Doe's tax return has not been filed."));
    assert!(transcript.contains("Invalid. Please enter 1 or 2."));
    assert!(transcript.contains("Marked Jane Doe's tax return as filed by a CPA."));
    let filed_line = transcript
      .lines()
      .find(|line| line.contains("Jane Doe's tax return was filed by a CPA on "))
      .expect("filing status line");
    assert!(
      filed_line.ends_with(" EST.") || filed_line.ends_with(" EDT."),
      "not shown in Eastern time: {filed_line}"
    );
  }

  #[tokio::test]
  async fn assignments_and_relation_listings() {
    let s = store().await;
    let transcript = run_script(
      &s,
      "1\nJane Doe\n1 Elm\n10\n\
       1\nJohn Roe\n2 Oak\n20\n\
       2\nAda\n\
       3\nBob\n\
       9\nJane Doe\nNobody\n\
       9\nJane Doe\nada\n\
       11\nJohn Roe\nbob\n\
       10\n\
       12\n\
       14\n",
    )
    .await;

    assert!(transcript.contains("There is no CPA with that name."));
    assert!(transcript.contains("Assigned CPA 'Ada' to Jane Doe."));
    assert!(transcript.contains("Assigned assistant 'Bob' to John Roe."));
    assert!(transcript.contains("--- CPA-Client Relations ---\nCPA: Ada | Client: Jane Doe\n"));
    assert!(transcript.contains(
      "--- Assistant-Client Relations ---\nAssistant: Bob | Client: John Roe\n"
    ));
  }

  #[tokio::test]
  async fn input_ending_mid_action_exits_cleanly() {
    let s = store().await;
    let transcript = run_script(&s, "1\nJane Doe\n").await;
    assert!(!transcript.contains("Something went wrong"));
    assert!(Client::get(&s, "Jane Doe").await.unwrap().is_none());
  }
}
