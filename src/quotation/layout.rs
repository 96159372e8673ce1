//! Canonical, renderer-neutral view of a quotation.
//!
//! Every exporter reads from [`QuotationLayout`]; none of them touches the
//! charge lines or recomputes a total on its own.

use crate::quotation::document::{PartyDetails, QuotationDocument};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Substituted for any missing piece of text.
pub const PLACEHOLDER: &str = "-";

/// A labelled block of contact lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyBlock {
    pub heading: &'static str,
    /// The party name, or [`PLACEHOLDER`].
    pub name: String,
    /// Address, phone and email, in that order, when present.
    pub details: Vec<String>,
}

impl PartyBlock {
    fn from_party(heading: &'static str, party: &PartyDetails) -> Self {
        let details = [&party.address, &party.phone, &party.email]
            .into_iter()
            .filter_map(|field| non_blank(field.as_deref()))
            .collect();
        Self {
            heading,
            name: single_line(party.name.as_deref()),
            details,
        }
    }
}

/// One charge row with its subtotal already resolved.
///
/// The description is collapsed onto one line, so line-oriented renderers
/// keep one charge per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutRow {
    pub number: usize,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotationLayout {
    pub title: &'static str,
    pub reference: String,
    pub issue_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub currency_symbol: String,
    pub sender: PartyBlock,
    pub recipient: PartyBlock,
    pub rows: Vec<LayoutRow>,
    pub grand_total: Decimal,
    pub notes: String,
    pub terms: String,
    pub payment_details: String,
}

impl QuotationLayout {
    pub fn from_document(doc: &QuotationDocument) -> Self {
        let header = &doc.header;
        let rows = doc
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| LayoutRow {
                number: i + 1,
                description: single_line(Some(line.description())),
                quantity: line.quantity(),
                unit_price: line.unit_price(),
                subtotal: line.subtotal(),
            })
            .collect();

        Self {
            title: "QUOTATION",
            reference: single_line(header.reference.as_deref()),
            issue_date: header.issue_date,
            valid_until: header.valid_until,
            currency_symbol: header.currency.symbol(),
            sender: PartyBlock::from_party("From", &header.sender),
            recipient: PartyBlock::from_party("To", &header.recipient),
            rows,
            grand_total: doc.grand_total,
            notes: text_or_placeholder(header.notes.as_deref()),
            terms: text_or_placeholder(header.terms.as_deref()),
            payment_details: text_or_placeholder(header.payment_details.as_deref()),
        }
    }

    /// `valid_until` formatted, or [`PLACEHOLDER`].
    pub fn valid_until_text(&self, fmt: &str) -> String {
        self.valid_until
            .map(|d| d.format(fmt).to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// The trailing blocks, in export order.
    pub fn closing_blocks(&self) -> [(&'static str, &str); 3] {
        [
            ("Notes", self.notes.as_str()),
            ("Terms", self.terms.as_str()),
            ("Payment Details", self.payment_details.as_str()),
        ]
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn text_or_placeholder(text: Option<&str>) -> String {
    non_blank(text).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Runs of whitespace, newlines included, become a single space.
fn single_line(text: Option<&str>) -> String {
    let joined = text
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    text_or_placeholder(Some(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::charges::ChargeList;
    use crate::quotation::document::QuotationHeader;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sparse_document_gets_placeholders() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut header = QuotationHeader::new(date);
        header.sender.name = Some("   ".into());
        let doc = QuotationDocument::snapshot(&ChargeList::new(), header);

        let layout = QuotationLayout::from_document(&doc);
        assert_eq!(layout.sender.name, PLACEHOLDER);
        assert!(layout.sender.details.is_empty());
        assert_eq!(layout.recipient.name, PLACEHOLDER);
        assert_eq!(layout.reference, PLACEHOLDER);
        assert_eq!(layout.rows[0].description, PLACEHOLDER);
        assert_eq!(layout.notes, PLACEHOLDER);
        assert_eq!(layout.valid_until_text("%Y-%m-%d"), PLACEHOLDER);
        assert_eq!(layout.currency_symbol, "₦");
    }

    #[test]
    fn test_single_line_fields_collapse_whitespace() {
        let mut charges = ChargeList::new();
        charges
            .push_line("Clearing\nand \t forwarding\r\n", dec!(1), dec!(100))
            .unwrap();
        let mut header = QuotationHeader::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        header.sender.name = Some("Harbour\nClearing  Ltd".into());
        header.notes = Some("Line one\nLine two".into());
        let doc = QuotationDocument::snapshot(&charges, header);

        let layout = QuotationLayout::from_document(&doc);
        assert_eq!(layout.rows[1].description, "Clearing and forwarding");
        assert_eq!(layout.sender.name, "Harbour Clearing Ltd");
        // Free-text blocks keep their line breaks.
        assert_eq!(layout.notes, "Line one\nLine two");
    }

    #[test]
    fn test_rows_carry_document_totals() {
        let mut charges = ChargeList::new();
        charges.push_line("Agency fee", dec!(3), dec!(1200.50)).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut header = QuotationHeader::new(date);
        header.recipient = PartyDetails {
            name: Some("Bola Imports".into()),
            phone: Some("+234 801 000 0000".into()),
            ..Default::default()
        };
        let doc = QuotationDocument::snapshot(&charges, header);

        let layout = QuotationLayout::from_document(&doc);
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[1].number, 2);
        assert_eq!(layout.rows[1].subtotal, dec!(3601.50));
        assert_eq!(layout.grand_total, doc.grand_total);
        assert_eq!(layout.recipient.details, vec!["+234 801 000 0000".to_string()]);
    }
}
