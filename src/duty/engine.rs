use crate::core::currency::CurrencyCode;
use crate::core::money::format_money_fixed;
use crate::duty::inputs::{DutyInputs, DutyMode};
use crate::error::DutyError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Derived insurance as a share of invoice + freight, when no override is given.
pub const INSURANCE_RATE: Decimal = dec!(0.015);
/// FCS, charged on the local invoice value only.
pub const FCS_RATE: Decimal = dec!(0.04);
/// Surcharge, charged on duty.
pub const SURCHARGE_RATE: Decimal = dec!(0.07);
/// ETLS, charged on CIF.
pub const ETLS_RATE: Decimal = dec!(0.005);
/// VAT, charged on CIF plus every other derived charge.
pub const VAT_RATE: Decimal = dec!(0.075);

const HUNDRED: Decimal = dec!(100);

/// Full landed-cost breakdown for one set of [`DutyInputs`].
///
/// All figures are in local currency at full precision. Use the
/// [`money`](crate::core::money) formatters to present them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyBreakdown {
    pub currency: CurrencyCode,
    pub exchange_rate: Decimal,
    pub invoice_local: Decimal,
    pub freight_local: Decimal,
    /// The insurance actually used: the override or the derived 1.5%.
    pub insurance: Decimal,
    pub insurance_derived: bool,
    pub cif: Decimal,
    pub fcs: Decimal,
    pub duty: Decimal,
    pub levy: Decimal,
    pub surcharge: Decimal,
    pub etls: Decimal,
    pub vat_base: Decimal,
    pub vat: Decimal,
    pub mode: DutyMode,
    /// The candidate total selected by `mode`.
    pub total: Decimal,
}

impl DutyBreakdown {
    /// The candidate total for any mode, independent of the selected one.
    pub fn total_for(&self, mode: DutyMode) -> Decimal {
        let idec = self.fcs + self.etls;
        let no_vat = idec + self.surcharge + self.duty + self.levy;
        match mode {
            DutyMode::Idec => idec,
            DutyMode::NoVat => no_vat,
            DutyMode::WithVat => no_vat + self.vat,
        }
    }

    /// Labelled `(label, amount)` pairs in display order, ending with the total.
    pub fn items(&self) -> [(&'static str, Decimal); 8] {
        [
            ("CIF", self.cif),
            ("FCS", self.fcs),
            ("Duty", self.duty),
            ("Levy", self.levy),
            ("Surcharge", self.surcharge),
            ("ETLS", self.etls),
            ("VAT", self.vat),
            ("Total", self.total),
        ]
    }

    /// Copy-to-clipboard text, one `Label: ₦amount` line per item.
    pub fn summary(&self) -> String {
        let symbol = CurrencyCode::naira().symbol();
        self.items()
            .iter()
            .map(|(label, amount)| {
                let figure = format_money_fixed(&symbol, *amount);
                if *label == "Total" {
                    format!("Total ({}): {}", self.mode, figure)
                } else {
                    format!("{}: {}", label, figure)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for DutyBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = CurrencyCode::naira().symbol();
        writeln!(f, "=== Duty Breakdown ===")?;
        writeln!(f, "Currency:       {} @ {}", self.currency, self.exchange_rate)?;
        writeln!(f, "Invoice:        {}", format_money_fixed(&symbol, self.invoice_local))?;
        writeln!(f, "Freight:        {}", format_money_fixed(&symbol, self.freight_local))?;
        writeln!(
            f,
            "Insurance:      {}{}",
            format_money_fixed(&symbol, self.insurance),
            if self.insurance_derived { " (1.5%)" } else { "" }
        )?;
        writeln!(f, "VAT base:       {}", format_money_fixed(&symbol, self.vat_base))?;
        writeln!(f)?;
        writeln!(f, "{}", self.summary())
    }
}

/// The duty computation engine.
///
/// Stateless: every call is independent and safe to run in parallel.
pub struct DutyEngine;

impl DutyEngine {
    /// Compute the landed-cost breakdown for `inputs`.
    ///
    /// # Algorithm
    ///
    /// 1. Convert invoice and freight at the exchange rate.
    /// 2. Insurance = override, or 1.5% of (invoice + freight).
    /// 3. CIF = invoice + freight + insurance.
    /// 4. FCS = 4% of invoice.
    /// 5. Duty = CIF × duty rate.
    /// 6. Levy = CIF × levy rate.
    /// 7. Surcharge = 7% of duty.
    /// 8. ETLS = 0.5% of CIF.
    /// 9. VAT = 7.5% of (CIF + FCS + surcharge + ETLS + duty + levy).
    /// 10. Total by mode: everything plus VAT, everything without VAT, or FCS + ETLS.
    ///
    /// # Examples
    ///
    /// ```
    /// use duty_engine::duty::engine::DutyEngine;
    /// use duty_engine::duty::inputs::DutyInputs;
    /// use duty_engine::core::currency::CurrencyCode;
    /// use rust_decimal_macros::dec;
    ///
    /// let inputs = DutyInputs::new(dec!(1000), dec!(100), CurrencyCode::new("USD"), dec!(1500))
    ///     .with_duty_rate(dec!(20))
    ///     .with_levy_rate(dec!(5));
    /// let breakdown = DutyEngine::compute(&inputs).unwrap();
    ///
    /// assert_eq!(breakdown.cif, dec!(1674750));
    /// assert_eq!(breakdown.total, dec!(674402.08125));
    /// ```
    pub fn compute(inputs: &DutyInputs) -> Result<DutyBreakdown, DutyError> {
        if let Err(e) = inputs.validate() {
            log::warn!("rejected duty inputs: {}", e);
            return Err(e);
        }

        let rate = inputs.exchange_rate();
        let invoice_local = mul(inputs.invoice_amount(), rate, "invoice conversion")?;
        let freight_local = mul(inputs.freight_amount(), rate, "freight conversion")?;
        let goods = add(invoice_local, freight_local, "insurance base")?;

        let (insurance, insurance_derived) = match inputs.insurance_override() {
            Some(insurance) => (insurance, false),
            None => (mul(goods, INSURANCE_RATE, "insurance")?, true),
        };

        let cif = add(goods, insurance, "CIF")?;
        let fcs = mul(invoice_local, FCS_RATE, "FCS")?;
        let duty = mul(cif, inputs.duty_rate_percent(), "duty")? / HUNDRED;
        let levy = mul(cif, inputs.levy_rate_percent(), "levy")? / HUNDRED;
        let surcharge = mul(duty, SURCHARGE_RATE, "surcharge")?;
        let etls = mul(cif, ETLS_RATE, "ETLS")?;

        let vat_base = [fcs, surcharge, etls, duty, levy]
            .into_iter()
            .try_fold(cif, |acc, x| add(acc, x, "VAT base"))?;
        let vat = mul(vat_base, VAT_RATE, "VAT")?;
        // vat_base + vat bounds every candidate total.
        add(vat_base, vat, "total")?;

        let mut breakdown = DutyBreakdown {
            currency: inputs.currency().clone(),
            exchange_rate: rate,
            invoice_local,
            freight_local,
            insurance,
            insurance_derived,
            cif,
            fcs,
            duty,
            levy,
            surcharge,
            etls,
            vat_base,
            vat,
            mode: inputs.mode(),
            total: Decimal::ZERO,
        };
        breakdown.total = breakdown.total_for(inputs.mode());

        log::debug!(
            "computed duty for {} {} ({}): total {}",
            inputs.invoice_amount(),
            inputs.currency(),
            inputs.mode(),
            breakdown.total
        );
        Ok(breakdown)
    }
}

fn mul(a: Decimal, b: Decimal, step: &'static str) -> Result<Decimal, DutyError> {
    a.checked_mul(b).ok_or(DutyError::Overflow { step })
}

fn add(a: Decimal, b: Decimal, step: &'static str) -> Result<Decimal, DutyError> {
    a.checked_add(b).ok_or(DutyError::Overflow { step })
}
