//! YP Bank MT940 SEK→EUR Converter Library
//!
//! Rewrites MT940 bank statements issued in SEK so that every balance and
//! transaction is stated in EUR, using the historical daily rate for the date
//! of each record.
//!
//! # Modules
//!
//! - [`mt940_format`]: parses `:61:`/`:86:` transaction records
//! - [`rates`]: historical exchange-rate lookup behind the [`RateSource`] trait
//! - [`rewriter`]: line-by-line statement rewriting and transaction counting
//!
//! # Examples
//!
//! ## Counting transactions
//!
//! ```no_run
//! use ypbank_mt940_sek2eur::rewriter::count_transactions;
//!
//! let count = count_transactions("statement.mt940")?;
//! println!("The number of transactions in the statement: {}", count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Converting a statement with a custom rate source
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use ypbank_mt940_sek2eur::{rewriter, RateSource, Result};
//!
//! struct Fixed;
//!
//! impl RateSource for Fixed {
//!     fn fetch_rate(&self, _date: NaiveDate, _from: &str, _to: &str) -> Result<Decimal> {
//!         Ok(Decimal::new(920, 4))
//!     }
//! }
//!
//! let converted = rewriter::rewrite(":60F:C240101SEK1000,00\n", &[], &Fixed)?;
//! assert_eq!(converted, ":60F:C240101EUR92.00\n");
//! # Ok::<(), ypbank_mt940_sek2eur::Error>(())
//! ```

pub mod error;
pub mod types;
pub mod mt940_format;
pub mod rates;
pub mod rewriter;

// Re-export commonly used types
pub use error::{Error, Result};
pub use rates::{ApiConfig, ExchangeRateApi, RateSource};
pub use types::{DebitCredit, ExchangeRate, Marker, TransactionRecord};
