use crate::core::currency::CurrencyCode;
use crate::quotation::charges::{ChargeLine, ChargeList};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Free-text contact details for the sender or recipient of a quotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyDetails {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PartyDetails {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Everything on a quotation except the charge lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationHeader {
    pub reference: Option<String>,
    pub issue_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub currency: CurrencyCode,
    pub sender: PartyDetails,
    pub recipient: PartyDetails,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub payment_details: Option<String>,
}

impl QuotationHeader {
    /// A naira quotation dated `issue_date` with every other field empty.
    pub fn new(issue_date: NaiveDate) -> Self {
        Self {
            reference: None,
            issue_date,
            valid_until: None,
            currency: CurrencyCode::naira(),
            sender: PartyDetails::default(),
            recipient: PartyDetails::default(),
            notes: None,
            terms: None,
            payment_details: None,
        }
    }
}

/// Immutable export payload: the header plus a copy of the charge lines and
/// the grand total as the list computed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationDocument {
    #[serde(flatten)]
    pub header: QuotationHeader,
    pub lines: Vec<ChargeLine>,
    pub grand_total: Decimal,
}

impl QuotationDocument {
    /// Snapshot the current state of `charges`.
    pub fn snapshot(charges: &ChargeList, header: QuotationHeader) -> Self {
        Self {
            header,
            lines: charges.lines().to_vec(),
            grand_total: charges.grand_total(),
        }
    }
}
