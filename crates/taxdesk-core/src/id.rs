//! Typed row identifiers.
//!
//! Every table uses a generated integer key. Wrapping each one in its own
//! type keeps a CPA id from being passed where a client id is expected.

use std::fmt;

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }
  };
}

row_id!(
  /// Key of a row in `cpas`.
  CpaId
);
row_id!(
  /// Key of a row in `tax_filing_assistants`.
  AssistantId
);
row_id!(
  /// Key of a row in `clients`.
  ClientId
);
row_id!(
  /// Key of a row in `tax_returns`.
  TaxReturnId
);
