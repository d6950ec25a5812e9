//! SEK to EUR rewriting of MT940 statement text.
//!
//! The raw lines are walked in file order next to the parsed transaction
//! records. Balance and transaction lines get their currency and amount
//! replaced, every other line is copied through untouched.

use crate::error::{Error, Result};
use crate::mt940_format::{format_mt940_date, parse_mt940_amount, parse_mt940_date, Mt940Statement};
use crate::rates::RateSource;
use crate::types::{
    is_detail_continuation, Marker, StatementLine, TransactionRecord, SOURCE_CURRENCY,
    TARGET_CURRENCY,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs;
use std::path::{Path, PathBuf};

/// Transaction type and identification code written when a record has none.
pub const DEFAULT_TRANSACTION_CODE: &str = "NMSC";

/// Customer reference written when a record has none.
pub const DEFAULT_CUSTOMER_REFERENCE: &str = "NONREF";

/// Convert the statement at `input` and write the result to `output`.
///
/// The output file is only created once every line converted, so a failed
/// rate lookup or misaligned statement leaves nothing behind. Returns the
/// number of transactions converted.
///
/// # Examples
///
/// ```no_run
/// use ypbank_mt940_sek2eur::rates::{ApiConfig, ExchangeRateApi};
/// use ypbank_mt940_sek2eur::rewriter::convert;
///
/// let api = ExchangeRateApi::new(ApiConfig::new("my-api-key"))?;
/// convert("statement.mt940", "converted_statement.mt940", &api)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert<P, Q, R>(input: P, output: Q, rates: &R) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: RateSource + ?Sized,
{
    let source = fs::read_to_string(input.as_ref())?;
    let statement = Mt940Statement::parse_str(&source)?;
    log::info!(
        "Parsed {} transactions from {}",
        statement.transactions.len(),
        input.as_ref().display()
    );

    let converted = rewrite(&source, &statement.transactions, rates)?;
    fs::write(output.as_ref(), converted)?;
    log::info!("Wrote {}", output.as_ref().display());

    Ok(statement.transactions.len())
}

/// Number of transactions in the statement at `input`.
pub fn count_transactions<P: AsRef<Path>>(input: P) -> Result<usize> {
    Ok(Mt940Statement::from_path(input)?.transactions.len())
}

/// `converted_<name>` next to the input file.
pub fn default_output_path<P: AsRef<Path>>(input: P) -> Result<PathBuf> {
    let input = input.as_ref();
    let name = input
        .file_name()
        .ok_or_else(|| Error::Config(format!("{} is not a file path", input.display())))?;
    Ok(input.with_file_name(format!("converted_{}", name.to_string_lossy())))
}

/// Rewrite statement text using the records parsed from that same text.
pub fn rewrite<R: RateSource + ?Sized>(
    source: &str,
    records: &[TransactionRecord],
    rates: &R,
) -> Result<String> {
    let lines = StatementLine::split_all(source);
    let mut cursor = records.iter();
    let mut current: Option<&TransactionRecord> = None;
    // The parser only attaches the `:86:` block directly after a `:61:`
    let mut awaiting_details = false;
    let mut replaced_details = false;
    let mut out = String::with_capacity(source.len());
    let mut last_line = 0;

    for line in &lines {
        last_line = line.number;

        // Already emitted from the record's details
        if replaced_details && is_detail_continuation(line.text.trim_end()) {
            continue;
        }
        replaced_details = false;

        let attached_details = awaiting_details && line.marker == Marker::TransactionDetail;
        if line.text.starts_with(':') {
            awaiting_details = line.marker == Marker::TransactionEntry;
        }

        match line.marker {
            Marker::OpeningBalance => {
                let date = records.first().map(|r| r.date);
                out.push_str(&rewrite_balance(line, date, rates)?);
            }
            Marker::ClosingBalance => {
                let date = records.last().map(|r| r.date);
                out.push_str(&rewrite_balance(line, date, rates)?);
            }
            Marker::AccountIdentifier => {
                out.push_str(&line.text.replace(SOURCE_CURRENCY, TARGET_CURRENCY));
            }
            Marker::TransactionEntry => {
                let record = cursor.next().ok_or_else(|| Error::CursorMismatch {
                    line: line.number,
                    message: format!(
                        "statement has more :61: lines than the {} parsed transactions",
                        records.len()
                    ),
                })?;
                current = Some(record);
                out.push_str(&rewrite_entry(line, record, rates)?);
            }
            Marker::TransactionDetail => {
                let details = current.and_then(|r| r.details.as_deref());
                out.push_str(Marker::TransactionDetail.tag());
                if let Some(details) = details {
                    out.push_str(&details.replace('\n', line.terminator));
                    replaced_details = attached_details;
                }
            }
            Marker::Passthrough => out.push_str(line.text),
        }
        out.push_str(line.terminator);
    }

    let left = cursor.len();
    if left > 0 {
        return Err(Error::CursorMismatch {
            line: last_line,
            message: format!("{} parsed transactions have no matching :61: line", left),
        });
    }

    Ok(out)
}

fn rewrite_balance<R: RateSource + ?Sized>(
    line: &StatementLine<'_>,
    rate_date: Option<NaiveDate>,
    rates: &R,
) -> Result<String> {
    let Some((prefix, amount_part)) = line.text.split_once(SOURCE_CURRENCY) else {
        log::warn!(
            "Line {} ({}) has no {} amount, left unchanged",
            line.number,
            line.marker,
            SOURCE_CURRENCY
        );
        return Ok(line.text.to_string());
    };

    let convert_line = || -> Result<String> {
        let amount = parse_mt940_amount(amount_part)?;
        // No transactions: fall back to the balance's own date
        let date = match rate_date {
            Some(date) => date,
            None => balance_date(line.marker, prefix)?,
        };
        let rate = rates.exchange_rate(date, SOURCE_CURRENCY, TARGET_CURRENCY)?;
        let converted = convert_amount(amount, rate.rate)?;
        log::debug!(
            "Line {}: {} {} x {} = {} {}",
            line.number,
            amount,
            SOURCE_CURRENCY,
            rate.rate,
            converted,
            TARGET_CURRENCY
        );
        Ok(format!("{}{}{}", prefix, TARGET_CURRENCY, format_amount(converted)))
    };

    convert_line().map_err(|e| e.at_line(line.number, line.marker))
}

fn rewrite_entry<R: RateSource + ?Sized>(
    line: &StatementLine<'_>,
    record: &TransactionRecord,
    rates: &R,
) -> Result<String> {
    let convert_line = || -> Result<String> {
        let rate = rates.exchange_rate(record.date, SOURCE_CURRENCY, TARGET_CURRENCY)?;
        let converted = convert_amount(record.amount.abs(), rate.rate)?;
        log::debug!(
            "Line {}: {} {} x {} = {} {}",
            line.number,
            record.amount,
            SOURCE_CURRENCY,
            rate.rate,
            converted,
            TARGET_CURRENCY
        );
        Ok(format!(
            "{}{}{}{}{}{}",
            Marker::TransactionEntry.tag(),
            format_mt940_date(&record.date),
            record.debit_credit(),
            format_amount(converted),
            record
                .transaction_code
                .as_deref()
                .unwrap_or(DEFAULT_TRANSACTION_CODE),
            record
                .customer_reference
                .as_deref()
                .unwrap_or(DEFAULT_CUSTOMER_REFERENCE),
        ))
    };

    convert_line().map_err(|e| e.at_line(line.number, line.marker))
}

/// `YYMMDD` right after the tag and the D/C mark, e.g. `:60F:C240101`.
fn balance_date(marker: Marker, prefix: &str) -> Result<NaiveDate> {
    let start = marker.tag().len() + 1;
    let date_str = prefix
        .get(start..start + 6)
        .ok_or_else(|| Error::InvalidDate(format!("No balance date in: {}", prefix)))?;
    parse_mt940_date(date_str)
}

/// `amount * rate` rounded to cents, half to even.
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(rate)
        .map(|v| v.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .ok_or_else(|| Error::InvalidAmount(format!("{} x {} overflows", amount, rate)))
}

/// Exactly two decimal places with `.` as separator.
pub fn format_amount(amount: Decimal) -> String {
    let mut amount = amount;
    amount.rescale(2);
    amount.to_string()
}
