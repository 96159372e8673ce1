use crate::core::currency::{CurrencyCode, RateSource};
use crate::error::DutyError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which candidate total a breakdown reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyMode {
    /// Full landed-cost duty total including VAT.
    #[default]
    WithVat,
    /// The full total without VAT.
    NoVat,
    /// FCS and ETLS only.
    Idec,
}

impl DutyMode {
    pub const ALL: [DutyMode; 3] = [DutyMode::WithVat, DutyMode::NoVat, DutyMode::Idec];

    pub fn label(&self) -> &'static str {
        match self {
            DutyMode::WithVat => "With VAT",
            DutyMode::NoVat => "No VAT",
            DutyMode::Idec => "IDEC",
        }
    }
}

impl fmt::Display for DutyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DutyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "with-vat" | "vat" => Ok(DutyMode::WithVat),
            "no-vat" | "novat" => Ok(DutyMode::NoVat),
            "idec" => Ok(DutyMode::Idec),
            other => Err(format!("unknown duty mode '{}'", other)),
        }
    }
}

/// Names the input that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyField {
    InvoiceAmount,
    FreightAmount,
    ExchangeRate,
    Insurance,
    DutyRate,
    LevyRate,
}

impl fmt::Display for DutyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DutyField::InvoiceAmount => "invoice amount",
            DutyField::FreightAmount => "freight amount",
            DutyField::ExchangeRate => "exchange rate",
            DutyField::Insurance => "insurance",
            DutyField::DutyRate => "duty rate",
            DutyField::LevyRate => "levy rate",
        };
        f.write_str(name)
    }
}

/// Everything one duty calculation needs, already resolved to numbers.
///
/// Built once at the call boundary and never mutated; every builder method
/// consumes and returns the value.
///
/// # Examples
///
/// ```
/// use duty_engine::duty::inputs::{DutyInputs, DutyMode};
/// use duty_engine::core::currency::CurrencyCode;
/// use rust_decimal_macros::dec;
///
/// let inputs = DutyInputs::new(dec!(1000), dec!(100), CurrencyCode::new("USD"), dec!(1500))
///     .with_duty_rate(dec!(20))
///     .with_levy_rate(dec!(5))
///     .with_mode(DutyMode::NoVat);
///
/// assert_eq!(inputs.exchange_rate(), dec!(1500));
/// assert!(inputs.insurance_override().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyInputs {
    invoice_amount: Decimal,
    freight_amount: Decimal,
    currency: CurrencyCode,
    exchange_rate: Decimal,
    #[serde(default)]
    insurance_override: Option<Decimal>,
    #[serde(default)]
    duty_rate_percent: Decimal,
    #[serde(default)]
    levy_rate_percent: Decimal,
    #[serde(default)]
    mode: DutyMode,
}

impl DutyInputs {
    /// Inputs with zero duty and levy rates, derived insurance and [`DutyMode::WithVat`].
    pub fn new(
        invoice_amount: Decimal,
        freight_amount: Decimal,
        currency: CurrencyCode,
        exchange_rate: Decimal,
    ) -> Self {
        Self {
            invoice_amount,
            freight_amount,
            currency,
            exchange_rate,
            insurance_override: None,
            duty_rate_percent: Decimal::ZERO,
            levy_rate_percent: Decimal::ZERO,
            mode: DutyMode::default(),
        }
    }

    /// Like [`DutyInputs::new`], with the exchange rate looked up from `source`.
    pub fn resolve(
        invoice_amount: Decimal,
        freight_amount: Decimal,
        currency: CurrencyCode,
        source: &impl RateSource,
    ) -> Result<Self, DutyError> {
        let rate = source.resolve_rate(&currency)?;
        Ok(Self::new(invoice_amount, freight_amount, currency, rate))
    }

    /// Insurance in local currency, used verbatim instead of the derived 1.5%.
    pub fn with_insurance(mut self, insurance: Decimal) -> Self {
        self.insurance_override = Some(insurance);
        self
    }

    pub fn with_duty_rate(mut self, percent: Decimal) -> Self {
        self.duty_rate_percent = percent;
        self
    }

    pub fn with_levy_rate(mut self, percent: Decimal) -> Self {
        self.levy_rate_percent = percent;
        self
    }

    pub fn with_mode(mut self, mode: DutyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the exchange rate, e.g. with a manual override from the form.
    pub fn with_exchange_rate(mut self, rate: Decimal) -> Self {
        self.exchange_rate = rate;
        self
    }

    /// Check every numeric input. The first failing field is reported.
    pub fn validate(&self) -> Result<(), DutyError> {
        if self.exchange_rate <= Decimal::ZERO {
            return Err(DutyError::NonPositiveExchangeRate(self.exchange_rate));
        }

        let mut checks = vec![
            (DutyField::InvoiceAmount, self.invoice_amount),
            (DutyField::FreightAmount, self.freight_amount),
            (DutyField::DutyRate, self.duty_rate_percent),
            (DutyField::LevyRate, self.levy_rate_percent),
        ];
        if let Some(insurance) = self.insurance_override {
            checks.push((DutyField::Insurance, insurance));
        }

        match checks.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            Some((field, value)) => Err(DutyError::Negative { field, value }),
            None => Ok(()),
        }
    }

    // --- Accessors ---

    pub fn invoice_amount(&self) -> Decimal {
        self.invoice_amount
    }

    pub fn freight_amount(&self) -> Decimal {
        self.freight_amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn insurance_override(&self) -> Option<Decimal> {
        self.insurance_override
    }

    pub fn duty_rate_percent(&self) -> Decimal {
        self.duty_rate_percent
    }

    pub fn levy_rate_percent(&self) -> Decimal {
        self.levy_rate_percent
    }

    pub fn mode(&self) -> DutyMode {
        self.mode
    }
}
