//! Line-oriented prompting over any reader/writer pair.
//!
//! End of input is reported as [`io::ErrorKind::UnexpectedEof`] so callers can
//! tell "the user closed stdin" apart from real I/O failures.

use std::io::{self, BufRead, Write};

/// Why a typed income was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeError {
  NotNumeric,
  Negative,
}

/// Parse a non-negative, finite dollar amount.
pub fn parse_income(raw: &str) -> Result<f64, IncomeError> {
  let value: f64 = raw.trim().parse().map_err(|_| IncomeError::NotNumeric)?;
  if !value.is_finite() {
    return Err(IncomeError::NotNumeric);
  }
  if value < 0.0 {
    return Err(IncomeError::Negative);
  }
  Ok(value)
}

pub struct Prompter<R, W> {
  input:  R,
  output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  pub fn new(input: R, output: W) -> Self { Self { input, output } }

  pub fn out(&mut self) -> &mut W { &mut self.output }

  /// Print `prompt` and read one line, trimmed.
  pub fn line(&mut self, prompt: &str) -> io::Result<String> {
    write!(self.output, "{prompt}")?;
    self.output.flush()?;

    let mut buf = String::new();
    if self.input.read_line(&mut buf)? == 0 {
      return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(buf.trim().to_owned())
  }

  /// Like [`Prompter::line`] but re-asks until the answer is non-empty.
  pub fn required(&mut self, prompt: &str) -> io::Result<String> {
    loop {
      let answer = self.line(prompt)?;
      if !answer.is_empty() {
        return Ok(answer);
      }
      writeln!(self.output, "Input cannot be empty. Try again.")?;
    }
  }

  /// Re-asks until the answer is a non-negative number.
  pub fn income(&mut self, prompt: &str) -> io::Result<f64> {
    loop {
      match parse_income(&self.line(prompt)?) {
        Ok(value) => return Ok(value),
        Err(IncomeError::Negative) => writeln!(
          self.output,
          "Income cannot be negative. Please enter a valid number."
        )?,
        Err(IncomeError::NotNumeric) => writeln!(
          self.output,
          "Inputted income is not valid. Enter a numeric value."
        )?,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn income_parsing() {
    assert_eq!(parse_income("50000"), Ok(50_000.0));
    assert_eq!(parse_income(" 12.5 "), Ok(12.5));
    assert_eq!(parse_income("0"), Ok(0.0));
    assert_eq!(parse_income("-1"), Err(IncomeError::Negative));
    assert_eq!(parse_income("lots"), Err(IncomeError::NotNumeric));
    assert_eq!(parse_income("inf"), Err(IncomeError::NotNumeric));
    assert_eq!(parse_income(""), Err(IncomeError::NotNumeric));
  }

  #[test]
  fn required_reprompts_on_blank() {
    let mut out = Vec::new();
    let mut io = Prompter::new("\n   \nJane\n".as_bytes(), &mut out);
    assert_eq!(io.required("Name: ").unwrap(), "Jane");
    drop(io);

    let transcript = String::from_utf8(out).unwrap();
    assert_eq!(transcript.matches("Input cannot be empty. Try again.").count(), 2);
  }

  #[test]
  fn income_reprompts_until_valid() {
    let mut out = Vec::new();
    let mut io = Prompter::new("abc\n-5\n100\n".as_bytes(), &mut out);
    assert_eq!(io.income("Income: ").unwrap(), 100.0);
    drop(io);

    let transcript = String::from_utf8(out).unwrap();
    assert!(transcript.contains("Enter a numeric value."));
    assert!(transcript.contains("Income cannot be negative."));
  }

  #[test]
  fn end_of_input_is_unexpected_eof() {
    let mut io = Prompter::new("".as_bytes(), io::sink());
    let err = io.line("anything? ").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
  }
}
