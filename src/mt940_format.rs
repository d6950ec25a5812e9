//! MT940 SWIFT format parser.
//!
//! MT940 is a SWIFT format for electronic account statements. This module
//! extracts the transaction records (`:61:` statement lines with their `:86:`
//! information) that the rewriter walks alongside the raw text.

use crate::error::{Error, Result};
use crate::types::{is_detail_continuation, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Represents a parsed MT940 statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mt940Statement {
    /// Transactions in file order.
    pub transactions: Vec<TransactionRecord>,
}

impl Mt940Statement {
    /// Read and parse the statement stored at `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ypbank_mt940_sek2eur::mt940_format::Mt940Statement;
    ///
    /// let statement = Mt940Statement::from_path("statement.mt940")?;
    /// println!("{} transactions", statement.transactions.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parse statement text that has already been read into memory.
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut statement = Mt940Statement::default();
        let mut awaiting_details = false;
        let mut in_details = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end();

            if in_details && is_detail_continuation(line) {
                if let Some(details) = statement
                    .transactions
                    .last_mut()
                    .and_then(|t| t.details.as_mut())
                {
                    details.push('\n');
                    details.push_str(line);
                }
                continue;
            }
            in_details = false;

            if line.starts_with(":61:") {
                // Statement Line
                let record = parse_transaction_line(line).map_err(|e| Error::Mt940ParseError {
                    line: line_no,
                    message: e.to_string(),
                })?;
                statement.transactions.push(record);
                awaiting_details = true;
            } else if let Some(rest) = line.strip_prefix(":86:") {
                // Information to Account Owner
                if awaiting_details {
                    if let Some(last) = statement.transactions.last_mut() {
                        last.details = Some(rest.to_string());
                        in_details = true;
                    }
                }
                awaiting_details = false;
            } else if line.starts_with(':') {
                awaiting_details = false;
            }
        }

        Ok(statement)
    }
}

/// Parse one `:61:` line.
///
/// Format: `:61:2401150115D12,50NTRFINV-2024-01//B24011500001`
/// - value date `YYMMDD`
/// - optional entry date `MMDD`
/// - mark `C`, `D`, `RC` or `RD`
/// - optional funds code letter
/// - amount with `,` as decimal separator
/// - transaction type letter and 3-character identification code, kept
///   together as the 4-character transaction code (e.g. `NTRF`, `FCHK`)
/// - customer reference, then `//` and bank reference
fn parse_transaction_line(line: &str) -> Result<TransactionRecord> {
    let content = line
        .get(4..)
        .ok_or_else(|| Error::ParseError(format!("Transaction line too short: {}", line)))?;

    let value_date_str = content
        .get(0..6)
        .ok_or_else(|| Error::ParseError(format!("Transaction line too short: {}", line)))?;
    let date = parse_mt940_date(value_date_str)?;

    // Entry date is optional
    let mut pos = 6;
    if content
        .get(pos..pos + 4)
        .is_some_and(|s| s.bytes().all(|b| b.is_ascii_digit()))
    {
        pos += 4;
    }

    let rest = content.get(pos..).unwrap_or("");
    let (negative, mark_len) = if rest.starts_with("RC") {
        (true, 2)
    } else if rest.starts_with("RD") {
        (false, 2)
    } else if rest.starts_with('D') {
        (true, 1)
    } else if rest.starts_with('C') {
        (false, 1)
    } else {
        return Err(Error::ParseError(format!("Missing D/C mark in: {}", line)));
    };
    pos += mark_len;

    // Funds code (third character of the currency code)
    if content
        .get(pos..)
        .and_then(|s| s.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
    {
        pos += 1;
    }

    let rest_of_line = content
        .get(pos..)
        .ok_or_else(|| Error::ParseError(format!("Missing amount in: {}", line)))?;
    let amount_end = rest_of_line
        .find(|c: char| !(c.is_ascii_digit() || c == ','))
        .unwrap_or(rest_of_line.len());
    let amount_str = &rest_of_line[..amount_end];
    let amount = parse_mt940_amount(amount_str)?;
    let amount = if negative { -amount } else { amount };

    let mut record = TransactionRecord::new(date, amount);

    let tail = &rest_of_line[amount_end..];
    let references = match tail.get(0..4) {
        Some(code) if is_transaction_code(code) => {
            record.transaction_code = Some(code.to_string());
            &tail[4..]
        }
        _ => tail,
    };

    let (customer, bank) = match references.split_once("//") {
        Some((customer, bank)) => (customer, Some(bank)),
        None => (references, None),
    };
    record.customer_reference = non_empty(customer);
    record.bank_reference = bank.and_then(non_empty);

    Ok(record)
}

/// Type letter followed by three uppercase letters, digits or spaces.
fn is_transaction_code(code: &str) -> bool {
    let mut chars = code.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ')
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse an MT940 amount, accepting `,` or `.` as decimal separator.
pub fn parse_mt940_amount(amount_str: &str) -> Result<Decimal> {
    let normalized = amount_str.trim().replace(',', ".");
    let normalized = normalized.strip_suffix('.').unwrap_or(&normalized);
    if normalized.is_empty() {
        return Err(Error::InvalidAmount(amount_str.to_string()));
    }
    Decimal::from_str(normalized).map_err(|_| Error::InvalidAmount(amount_str.to_string()))
}

/// Parse MT940 date format (YYMMDD) to NaiveDate.
pub fn parse_mt940_date(date_str: &str) -> Result<NaiveDate> {
    if date_str.len() != 6 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(format!("Invalid MT940 date: {}", date_str)));
    }

    // All-digit ASCII, so byte slicing is safe
    let year: i32 = date_str[0..2]
        .parse()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;
    let month: u32 = date_str[2..4]
        .parse()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;
    let day: u32 = date_str[4..6]
        .parse()
        .map_err(|_| Error::InvalidDate(date_str.to_string()))?;

    // Assume 2000+ for years < 50, otherwise 1900+
    let full_year = if year < 50 { 2000 + year } else { 1900 + year };

    NaiveDate::from_ymd_opt(full_year, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{}-{}-{}", full_year, month, day)))
}

/// Format NaiveDate to MT940 format (YYMMDD).
pub fn format_mt940_date(date: &NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
:20:STMT0001
:25:1234567890SEK
:28C:00001/001
:60F:C240101SEK1000,00
:61:2401150115C250,50NTRFINV-77//B240115001
:86:Salary January
:61:240120D100,00NMSCNONREF
:86:Groceries
Store 42
:62F:C240131SEK1150,50
-}
";

    #[test]
    fn test_parse_mt940_date() {
        let date = parse_mt940_date("250218").unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 2);
        assert_eq!(date.day(), 18);
        assert!(parse_mt940_date("251318").is_err());
        assert!(parse_mt940_date("2502").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_mt940_amount("1000,00").unwrap(), Decimal::new(100000, 2));
        assert_eq!(parse_mt940_amount("12,5").unwrap(), Decimal::new(125, 1));
        assert_eq!(parse_mt940_amount("100,").unwrap(), Decimal::new(100, 0));
        assert_eq!(parse_mt940_amount("7.25").unwrap(), Decimal::new(725, 2));
        assert!(parse_mt940_amount("").is_err());
        assert!(parse_mt940_amount("abc").is_err());
    }

    #[test]
    fn test_parse_statement() {
        let statement = Mt940Statement::parse_str(SAMPLE).unwrap();
        assert_eq!(statement.transactions.len(), 2);

        let first = &statement.transactions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(first.amount, Decimal::new(25050, 2));
        assert_eq!(first.transaction_code.as_deref(), Some("NTRF"));
        assert_eq!(first.customer_reference.as_deref(), Some("INV-77"));
        assert_eq!(first.bank_reference.as_deref(), Some("B240115001"));
        assert_eq!(first.details.as_deref(), Some("Salary January"));

        let second = &statement.transactions[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(second.amount, Decimal::new(-10000, 2));
        assert_eq!(second.transaction_code.as_deref(), Some("NMSC"));
        assert_eq!(second.customer_reference.as_deref(), Some("NONREF"));
        assert_eq!(second.bank_reference, None);
        assert_eq!(second.details.as_deref(), Some("Groceries\nStore 42"));
    }

    #[test]
    fn test_reversal_marks_and_funds_code() {
        let rc = parse_transaction_line(":61:240105RC10,00NTRFREF1").unwrap();
        assert_eq!(rc.amount, Decimal::new(-1000, 2));

        let rd = parse_transaction_line(":61:240105RD10,00NTRFREF1").unwrap();
        assert_eq!(rd.amount, Decimal::new(1000, 2));

        let funds = parse_transaction_line(":61:2401050105DR5,25NCHGREF2").unwrap();
        assert_eq!(funds.amount, Decimal::new(-525, 2));
        assert_eq!(funds.transaction_code.as_deref(), Some("NCHG"));
        assert_eq!(funds.customer_reference.as_deref(), Some("REF2"));
    }

    #[test]
    fn test_transaction_type_kept_with_code() {
        let record = parse_transaction_line(":61:240105C1,00FCHKREF1").unwrap();
        assert_eq!(record.transaction_code.as_deref(), Some("FCHK"));
        assert_eq!(record.customer_reference.as_deref(), Some("REF1"));

        let short = parse_transaction_line(":61:240105C1,00NT").unwrap();
        assert_eq!(short.transaction_code, None);
        assert_eq!(short.customer_reference.as_deref(), Some("NT"));
    }

    #[test]
    fn test_transaction_without_code() {
        let record = parse_transaction_line(":61:240105C10,00").unwrap();
        assert_eq!(record.transaction_code, None);
        assert_eq!(record.customer_reference, None);
        assert_eq!(record.details, None);
    }

    #[test]
    fn test_malformed_transaction_reports_line() {
        let err = Mt940Statement::parse_str(":20:X\n:61:24011X0115C1,00NTRF\n").unwrap_err();
        match err {
            Error::Mt940ParseError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_statement_level_info_not_attached() {
        let text = ":61:240105C10,00NTRFREF\n:62F:C240131SEK10,00\n:86:Closing note\n";
        let statement = Mt940Statement::parse_str(text).unwrap();
        assert_eq!(statement.transactions[0].details, None);
    }

    #[test]
    fn test_format_mt940_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_mt940_date(&date), "240307");
    }
}
