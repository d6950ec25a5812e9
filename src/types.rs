//! Common types shared by the parser, the rate fetcher and the rewriter.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Currency the statements are issued in.
pub const SOURCE_CURRENCY: &str = "SEK";

/// Currency the statements are rewritten to.
pub const TARGET_CURRENCY: &str = "EUR";

/// A single `:61:` statement line with its `:86:` details, as parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Value date of the transaction.
    pub date: NaiveDate,

    /// Signed amount, negative for debits.
    pub amount: Decimal,

    /// Transaction type letter and identification code (e.g. `NTRF`).
    pub transaction_code: Option<String>,

    /// Reference for the account owner, the part before `//`.
    pub customer_reference: Option<String>,

    /// Reference of the account servicing institution, the part after `//`.
    pub bank_reference: Option<String>,

    /// Information to account owner from `:86:`, continuation lines joined by `\n`.
    pub details: Option<String>,
}

impl TransactionRecord {
    /// Create a record without references or details.
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount,
            transaction_code: None,
            customer_reference: None,
            bank_reference: None,
            details: None,
        }
    }

    /// Credit for non-negative amounts, debit otherwise.
    pub fn debit_credit(&self) -> DebitCredit {
        DebitCredit::from_amount(self.amount)
    }
}

/// Debit/Credit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitCredit {
    /// Debit transaction (outgoing).
    Debit,
    /// Credit transaction (incoming).
    Credit,
}

impl DebitCredit {
    pub fn from_amount(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            DebitCredit::Debit
        } else {
            DebitCredit::Credit
        }
    }

    /// MT940 mark letter.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebitCredit::Debit => "D",
            DebitCredit::Credit => "C",
        }
    }
}

impl fmt::Display for DebitCredit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical rate for one currency pair on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// 1 `from_currency` = `rate` `to_currency`.
    pub rate: Decimal,
    /// Date the rate applies to.
    pub date: NaiveDate,
}

/// Classification of a statement line by its leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `:60F:`
    OpeningBalance,
    /// `:62F:`
    ClosingBalance,
    /// `:25:`
    AccountIdentifier,
    /// `:61:`
    TransactionEntry,
    /// `:86:`
    TransactionDetail,
    /// Anything else, copied verbatim.
    Passthrough,
}

impl Marker {
    const TAGGED: [Marker; 5] = [
        Marker::OpeningBalance,
        Marker::ClosingBalance,
        Marker::AccountIdentifier,
        Marker::TransactionEntry,
        Marker::TransactionDetail,
    ];

    /// Classify a line by its prefix.
    pub fn classify(line: &str) -> Self {
        Self::TAGGED
            .into_iter()
            .find(|marker| line.starts_with(marker.tag()))
            .unwrap_or(Marker::Passthrough)
    }

    /// Tag prefix of the marker, empty for passthrough lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Marker::OpeningBalance => ":60F:",
            Marker::ClosingBalance => ":62F:",
            Marker::AccountIdentifier => ":25:",
            Marker::TransactionEntry => ":61:",
            Marker::TransactionDetail => ":86:",
            Marker::Passthrough => "",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Marker::OpeningBalance => "opening balance",
            Marker::ClosingBalance => "closing balance",
            Marker::AccountIdentifier => "account identifier",
            Marker::TransactionEntry => "transaction entry",
            Marker::TransactionDetail => "transaction detail",
            Marker::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Passthrough => f.write_str(self.name()),
            _ => write!(f, "{} {}", self.name(), self.tag()),
        }
    }
}

/// One raw line of a statement, split from its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Line content without terminator.
    pub text: &'a str,
    /// `"\n"`, `"\r\n"` or `""` for an unterminated last line.
    pub terminator: &'a str,
    pub marker: Marker,
}

impl<'a> StatementLine<'a> {
    /// Split statement text into classified lines, keeping terminators.
    pub fn split_all(source: &'a str) -> Vec<StatementLine<'a>> {
        source
            .split_inclusive('\n')
            .enumerate()
            .map(|(idx, raw)| {
                let text = raw
                    .strip_suffix("\r\n")
                    .or_else(|| raw.strip_suffix('\n'))
                    .unwrap_or(raw);
                StatementLine {
                    number: idx + 1,
                    text,
                    terminator: &raw[text.len()..],
                    marker: Marker::classify(text),
                }
            })
            .collect()
    }
}

/// Lines following `:86:` that carry more detail text rather than a new field.
pub fn is_detail_continuation(line: &str) -> bool {
    !line.is_empty() && !line.starts_with([':', '-', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Marker::classify(":60F:C240101SEK1000,00"), Marker::OpeningBalance);
        assert_eq!(Marker::classify(":62F:C240131SEK900,00"), Marker::ClosingBalance);
        assert_eq!(Marker::classify(":25:1234567890SEK"), Marker::AccountIdentifier);
        assert_eq!(Marker::classify(":61:2401150115C100,00NTRFNONREF"), Marker::TransactionEntry);
        assert_eq!(Marker::classify(":86:Salary"), Marker::TransactionDetail);
        assert_eq!(Marker::classify(":60M:C240101SEK1000,00"), Marker::Passthrough);
        assert_eq!(Marker::classify(":28C:00001/001"), Marker::Passthrough);
        assert_eq!(Marker::classify(""), Marker::Passthrough);
    }

    #[test]
    fn test_split_keeps_terminators() {
        let lines = StatementLine::split_all(":20:REF\r\n:25:123SEK\n-}");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, ":20:REF");
        assert_eq!(lines[0].terminator, "\r\n");
        assert_eq!(lines[1].marker, Marker::AccountIdentifier);
        assert_eq!(lines[1].terminator, "\n");
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].terminator, "");
    }

    #[test]
    fn test_debit_credit_from_amount() {
        assert_eq!(DebitCredit::from_amount(Decimal::new(-1, 2)), DebitCredit::Debit);
        assert_eq!(DebitCredit::from_amount(Decimal::ZERO), DebitCredit::Credit);
        assert_eq!(DebitCredit::from_amount(Decimal::new(1, 2)), DebitCredit::Credit);
    }

    #[test]
    fn test_detail_continuation() {
        assert!(is_detail_continuation("more text"));
        assert!(!is_detail_continuation(":62F:C240131SEK1,00"));
        assert!(!is_detail_continuation("-}"));
        assert!(!is_detail_continuation("{5:}"));
        assert!(!is_detail_continuation(""));
    }
}
