use crate::error::FxError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The local settlement currency for every duty computation.
pub const LOCAL_CURRENCY: &str = "NGN";

/// ISO 4217-style currency code.
///
/// Codes are normalised to upper case, so `"usd"` and `"USD"` compare equal.
///
/// # Examples
///
/// ```
/// use duty_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("usd");
/// assert_eq!(usd.as_str(), "USD");
/// assert_eq!(CurrencyCode::naira().symbol(), "₦");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    /// The Nigerian naira, the currency every breakdown is expressed in.
    pub fn naira() -> Self {
        Self::new(LOCAL_CURRENCY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display symbol used in summaries and exports.
    ///
    /// Codes without a dedicated symbol fall back to the code followed by a space.
    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "NGN" => "₦".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "CNY" | "JPY" => "¥".to_string(),
            "INR" => "₹".to_string(),
            other => format!("{} ", other),
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::naira()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Resolves the exchange rate for a foreign currency into local currency.
///
/// The engine never looks rates up itself. Callers resolve the rate first
/// (from a rate table, a remote store, a manual override) and pass the number in.
pub trait RateSource {
    /// Units of local currency per one unit of `currency`.
    fn resolve_rate(&self, currency: &CurrencyCode) -> Result<Decimal, FxError>;
}

impl<F> RateSource for F
where
    F: Fn(&CurrencyCode) -> Option<Decimal>,
{
    fn resolve_rate(&self, currency: &CurrencyCode) -> Result<Decimal, FxError> {
        let rate = self(currency).ok_or_else(|| FxError::RateNotFound {
            currency: currency.clone(),
        })?;
        positive_rate(currency, rate)
    }
}

fn positive_rate(currency: &CurrencyCode, rate: Decimal) -> Result<Decimal, FxError> {
    if rate <= Decimal::ZERO {
        return Err(FxError::InvalidRate {
            currency: currency.clone(),
            rate,
        });
    }
    Ok(rate)
}

/// In-memory table of exchange rates into a single local currency.
///
/// # Examples
///
/// ```
/// use duty_engine::core::currency::{CurrencyCode, FxRateTable, RateSource};
/// use rust_decimal_macros::dec;
///
/// let mut rates = FxRateTable::new(CurrencyCode::naira());
/// rates.set_rate(CurrencyCode::new("USD"), dec!(1500)).unwrap();
///
/// let converted = rates.convert(dec!(10), &CurrencyCode::new("USD")).unwrap();
/// assert_eq!(converted, dec!(15000));
/// assert_eq!(rates.resolve_rate(&CurrencyCode::naira()).unwrap(), dec!(1));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FxRateTable {
    /// The currency every rate converts into.
    pub local: CurrencyCode,
    /// foreign -> units of local per one foreign unit.
    rates: HashMap<CurrencyCode, Decimal>,
}

impl FxRateTable {
    pub fn new(local: CurrencyCode) -> Self {
        Self {
            local,
            rates: HashMap::new(),
        }
    }

    /// Set the rate: 1 unit of `from` = `rate` units of local currency.
    pub fn set_rate(&mut self, from: CurrencyCode, rate: Decimal) -> Result<(), FxError> {
        positive_rate(&from, rate)?;
        self.rates.insert(from, rate);
        Ok(())
    }

    /// Convert a foreign amount into local currency.
    pub fn convert(&self, amount: Decimal, from: &CurrencyCode) -> Result<Decimal, FxError> {
        let rate = self.resolve_rate(from)?;
        amount.checked_mul(rate).ok_or_else(|| FxError::Overflow {
            currency: from.clone(),
            amount,
        })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateSource for FxRateTable {
    fn resolve_rate(&self, currency: &CurrencyCode) -> Result<Decimal, FxError> {
        if *currency == self.local {
            return Ok(Decimal::ONE);
        }
        // Deserialized tables bypass `set_rate`, so the rate is checked again here.
        let rate = self
            .rates
            .get(currency)
            .copied()
            .ok_or_else(|| FxError::RateNotFound {
                currency: currency.clone(),
            })?;
        positive_rate(currency, rate)
    }
}
