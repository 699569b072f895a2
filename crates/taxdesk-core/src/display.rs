//! Formatting helpers shared by the gateways and the shell.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Timezone filing times are shown in unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::US::Eastern;

/// Render a filing instant in `tz`, e.g. `2024-01-15 12:30:00 PM EST`.
pub fn format_filed_at(at: DateTime<Utc>, tz: Tz) -> String {
  at.with_timezone(&tz)
    .format("%Y-%m-%d %I:%M:%S %p %Z")
    .to_string()
}

/// Dollar amount with thousands separators and cents, e.g. `$50,000.00`.
pub fn format_income(amount: f64) -> String {
  let fixed = format!("{:.2}", amount.abs());
  let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

  let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, digit) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }

  let sign = if amount < 0.0 { "-" } else { "" };
  format!("{sign}${grouped}.{cents}")
}

/// Upper-case the first letter of every word and lower-case the rest.
/// Any non-alphabetic character starts a new word, so `o'neil` becomes
/// `O'Neil`.
pub fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut at_word_start = true;
  for ch in text.chars() {
    if ch.is_alphabetic() {
      if at_word_start {
        out.extend(ch.to_uppercase());
      } else {
        out.extend(ch.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(ch);
      at_word_start = true;
    }
  }
  out
}
