//! # Currency Conversion
//!
//! Date-sensitive exchange rates and conversion between a document's
//! currency and the company currency.
//!
//! ## Rate Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A rate is "units of currency per 1 unit of company currency".         │
//! │                                                                         │
//! │  Company currency USD (rate 1)                                         │
//! │  EUR rate 0.9 on 2026-01-01                                            │
//! │                                                                         │
//! │  convert(9.00 EUR → USD) = 9.00 × (1 / 0.9) = 10.00 USD                │
//! │                                                                         │
//! │  The rate used is the latest one dated on or before the document date. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::CurrencyError;
use crate::money::Money;
use crate::types::CurrencyCode;

// =============================================================================
// Converter Trait
// =============================================================================

/// Converts amounts between currencies at a given date.
///
/// The ledger synchronizer only depends on this trait, so callers can back
/// it with a [`RateTable`] loaded from storage or with a fixed test rate.
pub trait CurrencyConverter {
    fn convert(
        &self,
        amount: Money,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Money, CurrencyError>;
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// One dated rate of a currency against the company currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: CurrencyCode,
    pub date: NaiveDate,
    /// Units of `currency` per one unit of company currency.
    pub rate: Decimal,
}

// =============================================================================
// Rate Table
// =============================================================================

/// In-memory rate history keyed by currency and effective date.
#[derive(Debug, Clone)]
pub struct RateTable {
    company_currency: CurrencyCode,
    rates: HashMap<CurrencyCode, BTreeMap<NaiveDate, Decimal>>,
}

impl RateTable {
    /// Creates an empty table for a company currency.
    pub fn new(company_currency: CurrencyCode) -> Self {
        RateTable {
            company_currency,
            rates: HashMap::new(),
        }
    }

    /// Builds a table from a list of rates.
    pub fn from_rates(
        company_currency: CurrencyCode,
        rates: impl IntoIterator<Item = ExchangeRate>,
    ) -> Result<Self, CurrencyError> {
        let mut table = RateTable::new(company_currency);
        for rate in rates {
            table.insert(rate)?;
        }
        Ok(table)
    }

    pub fn company_currency(&self) -> &CurrencyCode {
        &self.company_currency
    }

    /// Adds or replaces the rate of a currency for a date.
    pub fn insert(&mut self, rate: ExchangeRate) -> Result<(), CurrencyError> {
        if rate.rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate {
                currency: rate.currency,
            });
        }
        self.rates
            .entry(rate.currency)
            .or_default()
            .insert(rate.date, rate.rate);
        Ok(())
    }

    /// Returns the rate effective on `date`: the latest one dated on or
    /// before it. The company currency is always 1.
    pub fn rate_on(&self, currency: &CurrencyCode, date: NaiveDate) -> Result<Decimal, CurrencyError> {
        if *currency == self.company_currency {
            return Ok(Decimal::ONE);
        }

        self.rates
            .get(currency)
            .and_then(|history| history.range(..=date).next_back())
            .map(|(_, rate)| *rate)
            .ok_or_else(|| CurrencyError::RateNotFound {
                currency: currency.clone(),
                date,
            })
    }
}

impl CurrencyConverter for RateTable {
    fn convert(
        &self,
        amount: Money,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Money, CurrencyError> {
        if from == to {
            return Ok(amount);
        }

        let from_rate = self.rate_on(from, date)?;
        let to_rate = self.rate_on(to, date)?;
        let factor = to_rate
            .checked_div(from_rate)
            .ok_or(CurrencyError::Overflow)?;
        amount.scale(factor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
