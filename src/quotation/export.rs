use crate::core::money::{format_fixed, format_grouped, format_money, format_money_fixed};
use crate::quotation::document::QuotationDocument;
use crate::quotation::layout::{PartyBlock, QuotationLayout};
use chrono::NaiveDate;
use serde::Serialize;

/// A rendered export, ready to write or hand to a downstream encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Turns the canonical layout into one output form.
///
/// Rendering never fails: missing data has already been replaced by
/// placeholders in the layout.
pub trait Renderer {
    fn render(&self, layout: &QuotationLayout) -> String;

    /// Date-stamped file name for this output form.
    fn file_name(&self, date: NaiveDate) -> String;

    fn export(&self, doc: &QuotationDocument) -> Artifact {
        let layout = QuotationLayout::from_document(doc);
        Artifact {
            file_name: self.file_name(doc.header.issue_date),
            contents: self.render(&layout),
        }
    }
}

fn stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Print
// ---------------------------------------------------------------------------

/// Fixed-size page layout for printing.
///
/// Every currency figure carries exactly two decimals. Pages are separated
/// by a form feed and end with a page counter.
#[derive(Debug, Clone, Copy)]
pub struct PrintExporter {
    pub width: usize,
    pub lines_per_page: usize,
}

impl Default for PrintExporter {
    /// A4 at 10 characters per inch: 80 columns, 60 lines.
    fn default() -> Self {
        Self {
            width: 80,
            lines_per_page: 60,
        }
    }
}

// Minimum column widths; wider figures widen their column.
const QTY_WIDTH: usize = 8;
const MONEY_WIDTH: usize = 15;
const NUMBER_WIDTH: usize = 3;
const MIN_DESCRIPTION_WIDTH: usize = 10;

/// Column widths of the charge table, sized to the widest cell.
struct Columns {
    number: usize,
    description: usize,
    quantity: usize,
    money: usize,
}

/// Pre-formatted figures of one row.
struct RowCells {
    quantity: String,
    unit_price: String,
    amount: String,
}

impl PrintExporter {
    /// `None` when the figures leave too little room for descriptions.
    fn columns(&self, layout: &QuotationLayout, cells: &[RowCells]) -> Option<Columns> {
        let number = layout
            .rows
            .iter()
            .map(|r| r.number.to_string().len())
            .fold(NUMBER_WIDTH, usize::max);
        let quantity = cells
            .iter()
            .map(|c| c.quantity.chars().count())
            .fold(QTY_WIDTH, usize::max);
        let money = cells
            .iter()
            .flat_map(|c| [c.unit_price.chars().count(), c.amount.chars().count()])
            .fold(MONEY_WIDTH, usize::max);

        // four single-space column gaps
        let fixed = number + quantity + 2 * money + 4;
        let description = self.width.checked_sub(fixed)?;
        (description >= MIN_DESCRIPTION_WIDTH).then_some(Columns {
            number,
            description,
            quantity,
            money,
        })
    }

    fn table(&self, layout: &QuotationLayout, out: &mut Vec<String>) {
        let cells: Vec<RowCells> = layout
            .rows
            .iter()
            .map(|row| RowCells {
                quantity: format_grouped(row.quantity),
                unit_price: format_fixed(row.unit_price),
                amount: format_fixed(row.subtotal),
            })
            .collect();
        let thin = "-".repeat(self.width);

        let Some(cols) = self.columns(layout, &cells) else {
            // Stacked rows: each figure on its own right-aligned line.
            out.push("Charges".to_string());
            out.push(thin.clone());
            for (row, cell) in layout.rows.iter().zip(&cells) {
                out.extend(wrap(&format!("{}. {}", row.number, row.description), self.width));
                out.push(right_label("  Qty:", &cell.quantity, self.width));
                out.push(right_label("  Unit Price:", &cell.unit_price, self.width));
                out.push(right_label("  Amount:", &cell.amount, self.width));
            }
            out.push(thin);
            return;
        };

        out.push(format!(
            "{:<nw$} {:<dw$} {:>qw$} {:>mw$} {:>mw$}",
            "#",
            "Description",
            "Qty",
            "Unit Price",
            "Amount",
            nw = cols.number,
            dw = cols.description,
            qw = cols.quantity,
            mw = cols.money,
        ));
        out.push(thin.clone());
        for (row, cell) in layout.rows.iter().zip(&cells) {
            for (i, chunk) in wrap(&row.description, cols.description).iter().enumerate() {
                if i == 0 {
                    out.push(format!(
                        "{:<nw$} {:<dw$} {:>qw$} {:>mw$} {:>mw$}",
                        row.number,
                        chunk,
                        cell.quantity,
                        cell.unit_price,
                        cell.amount,
                        nw = cols.number,
                        dw = cols.description,
                        qw = cols.quantity,
                        mw = cols.money,
                    ));
                } else {
                    out.push(format!("{:<nw$} {}", "", chunk, nw = cols.number));
                }
            }
        }
        out.push(thin);
    }

    fn body(&self, layout: &QuotationLayout) -> Vec<String> {
        let rule = "=".repeat(self.width);
        let mut out = Vec::new();

        out.push(centre(layout.title, self.width));
        out.push(rule.clone());
        out.push(format!("Reference: {}", layout.reference));
        out.push(format!("Date: {}", stamp(layout.issue_date)));
        out.push(format!("Valid until: {}", layout.valid_until_text("%Y-%m-%d")));
        out.push(String::new());

        for block in [&layout.sender, &layout.recipient] {
            self.party(block, &mut out);
            out.push(String::new());
        }

        self.table(layout, &mut out);

        let symbol = &layout.currency_symbol;
        out.push(right_label(
            "Subtotal:",
            &format_money_fixed(symbol, layout.grand_total),
            self.width,
        ));
        out.push(right_label(
            "Grand Total:",
            &format_money_fixed(symbol, layout.grand_total),
            self.width,
        ));
        out.push(rule);

        for (heading, text) in layout.closing_blocks() {
            out.push(String::new());
            out.push(format!("{}:", heading));
            for line in text.lines() {
                out.extend(wrap(line, self.width));
            }
        }
        out
    }

    fn party(&self, block: &PartyBlock, out: &mut Vec<String>) {
        out.push(format!("{}:", block.heading));
        out.extend(wrap(&block.name, self.width));
        for detail in &block.details {
            out.extend(wrap(detail, self.width));
        }
    }

    /// Split the body into pages, each padded to `lines_per_page`.
    pub fn pages(&self, layout: &QuotationLayout) -> Vec<Vec<String>> {
        // two lines reserved for the footer
        let per_page = self.lines_per_page.saturating_sub(2).max(1);
        let body = self.body(layout);
        let chunks: Vec<&[String]> = body.chunks(per_page).collect();
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let mut page = chunk.to_vec();
                page.resize(per_page, String::new());
                page.push(String::new());
                page.push(right_label("", &format!("Page {} of {}", i + 1, total), self.width));
                page
            })
            .collect()
    }
}

impl Renderer for PrintExporter {
    fn render(&self, layout: &QuotationLayout) -> String {
        self.pages(layout)
            .iter()
            .map(|page| page.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\x0C")
    }

    fn file_name(&self, date: NaiveDate) -> String {
        format!("quotation-{}-print.txt", stamp(date))
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParagraphStyle {
    Title,
    Heading,
    Body,
    Total,
}

/// One paragraph of an office document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub text: String,
}

impl Paragraph {
    fn new(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Structured paragraphs for a word-processor document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExporter;

impl DocumentExporter {
    pub fn paragraphs(&self, layout: &QuotationLayout) -> Vec<Paragraph> {
        use ParagraphStyle::*;
        let symbol = &layout.currency_symbol;
        let mut out = vec![
            Paragraph::new(Title, layout.title),
            Paragraph::new(Body, format!("Reference: {}", layout.reference)),
            Paragraph::new(Body, format!("Date: {}", layout.issue_date.format("%d %B %Y"))),
            Paragraph::new(
                Body,
                format!("Valid until: {}", layout.valid_until_text("%d %B %Y")),
            ),
        ];

        for block in [&layout.sender, &layout.recipient] {
            out.push(Paragraph::new(Heading, block.heading));
            let mut text = vec![block.name.clone()];
            text.extend(block.details.iter().cloned());
            out.push(Paragraph::new(Body, text.join("\n")));
        }

        out.push(Paragraph::new(Heading, "Charges"));
        for row in &layout.rows {
            out.push(Paragraph::new(
                Body,
                format!(
                    "{}. {}\nQuantity: {} × {} = {}",
                    row.number,
                    row.description,
                    format_grouped(row.quantity),
                    format_money(symbol, row.unit_price),
                    format_money(symbol, row.subtotal),
                ),
            ));
        }
        out.push(Paragraph::new(
            Total,
            format!("Grand Total: {}", format_money(symbol, layout.grand_total)),
        ));

        for (heading, text) in layout.closing_blocks() {
            out.push(Paragraph::new(Heading, heading));
            out.push(Paragraph::new(Body, text));
        }
        out
    }
}

impl Renderer for DocumentExporter {
    fn render(&self, layout: &QuotationLayout) -> String {
        self.paragraphs(layout)
            .into_iter()
            .map(|p| match p.style {
                ParagraphStyle::Title => p.text.to_uppercase(),
                ParagraphStyle::Heading => format!("{}\n{}", p.text, "-".repeat(p.text.chars().count())),
                ParagraphStyle::Body | ParagraphStyle::Total => p.text,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn file_name(&self, date: NaiveDate) -> String {
        format!("quotation-{}.txt", stamp(date))
    }
}

// ---------------------------------------------------------------------------
// Share text
// ---------------------------------------------------------------------------

pub const BULLET: &str = "•";

/// Line-oriented message for chat apps, ending with the grand total.
#[derive(Debug, Clone, Default)]
pub struct ShareTextExporter {
    /// Recipient phone number for the deep-link; any formatting is stripped.
    pub phone: Option<String>,
}

impl ShareTextExporter {
    /// `https://wa.me/[phone]?text=<percent-encoded message>`.
    pub fn deep_link(&self, message: &str) -> String {
        let phone: String = self
            .phone
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        format!("https://wa.me/{}?text={}", phone, urlencoding::encode(message))
    }
}

impl Renderer for ShareTextExporter {
    fn render(&self, layout: &QuotationLayout) -> String {
        let symbol = &layout.currency_symbol;
        let mut out = vec![
            format!("*{}*", layout.title),
            format!("Ref: {}", layout.reference),
            format!("Date: {}", stamp(layout.issue_date)),
            String::new(),
            format!("*{}:* {}", layout.sender.heading, layout.sender.name),
            format!("*{}:* {}", layout.recipient.heading, layout.recipient.name),
            String::new(),
            "*Charges:*".to_string(),
        ];
        for row in &layout.rows {
            out.push(format!(
                "{} {} — {}",
                BULLET,
                row.description,
                format_money(symbol, row.subtotal)
            ));
        }
        out.push(String::new());
        for (heading, text) in layout.closing_blocks() {
            out.push(format!("*{}:* {}", heading, text));
        }
        out.push(String::new());
        out.push(format!(
            "*Grand Total:* {}",
            format_money(symbol, layout.grand_total)
        ));
        out.join("\n")
    }

    fn file_name(&self, date: NaiveDate) -> String {
        format!("quotation-{}-share.txt", stamp(date))
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn centre(text: &str, width: usize) -> String {
    format!("{:^width$}", text, width = width).trim_end().to_string()
}

fn right_label(label: &str, value: &str, width: usize) -> String {
    let used = label.chars().count() + value.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{}{}{}", label, " ".repeat(gap), value)
}

/// Greedy word wrap by character count; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotation::charges::{ChargeList, ChargeUpdate};
    use crate::quotation::document::{PartyDetails, QuotationHeader};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_document() -> QuotationDocument {
        let mut charges = ChargeList::new();
        let first = charges.lines()[0].id();
        charges
            .update_line(first, ChargeUpdate::Description("Customs processing".into()))
            .unwrap();
        charges
            .update_line(first, ChargeUpdate::UnitPrice(dec!(5000)))
            .unwrap();
        charges
            .push_line("Terminal handling", dec!(2), dec!(1500))
            .unwrap();
        charges.add_line("Documentation");

        let mut header = QuotationHeader::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        header.reference = Some("Q-0042".into());
        header.sender = PartyDetails::named("Harbour Clearing Ltd");
        header.payment_details = Some("Bank transfer".into());
        QuotationDocument::snapshot(&charges, header)
    }

    #[test]
    fn test_share_text_template() {
        let text = ShareTextExporter::default().export(&sample_document()).contents;
        let lines: Vec<&str> = text.lines().collect();

        let bullets: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| l.starts_with(BULLET))
            .collect();
        assert_eq!(
            bullets,
            vec![
                "• Customs processing — ₦5,000",
                "• Terminal handling — ₦3,000",
                "• Documentation — ₦0",
            ]
        );
        assert!(text.contains("*From:* Harbour Clearing Ltd"));
        assert!(text.contains("*To:* -"));
        assert!(text.ends_with("₦8,000"));
    }

    #[test]
    fn test_share_text_one_charge_per_line() {
        let mut charges = ChargeList::new();
        let first = charges.lines()[0].id();
        charges
            .update_line(first, ChargeUpdate::Description("Clearing\nand forwarding".into()))
            .unwrap();
        charges
            .update_line(first, ChargeUpdate::UnitPrice(dec!(100)))
            .unwrap();
        let doc = QuotationDocument::snapshot(
            &charges,
            QuotationHeader::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        );

        let text = ShareTextExporter::default().export(&doc).contents;
        assert!(text.lines().any(|l| l == "• Clearing and forwarding — ₦100"));
        assert!(!text.lines().any(|l| l.starts_with("and forwarding")));
    }

    #[test]
    fn test_deep_link_encoding() {
        let exporter = ShareTextExporter {
            phone: Some("+234 (801) 000-0000".into()),
        };
        let link = exporter.deep_link("Total: ₦8,000\nThanks & bye");
        assert!(link.starts_with("https://wa.me/2348010000000?text="));
        assert!(link.ends_with("Total%3A%20%E2%82%A68%2C000%0AThanks%20%26%20bye"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_print_figures_fixed() {
        let layout = QuotationLayout::from_document(&sample_document());
        let text = PrintExporter::default().render(&layout);
        assert!(text.contains("5,000.00"));
        assert!(text.contains("3,000.00"));
        assert!(text.contains("Grand Total:"));
        assert!(text.contains("₦8,000.00"));
        assert!(text.ends_with("Page 1 of 1"));

        let order = ["From:", "To:", "Description", "Subtotal:", "Grand Total:", "Notes:", "Payment Details:"];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_print_pages_fixed_size() {
        let mut charges = ChargeList::new();
        for i in 0..120 {
            charges.push_line(format!("Item {}", i), dec!(1), dec!(10)).unwrap();
        }
        let doc = QuotationDocument::snapshot(
            &charges,
            QuotationHeader::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        );
        let exporter = PrintExporter::default();
        let pages = exporter.pages(&QuotationLayout::from_document(&doc));

        assert!(pages.len() > 1);
        for page in &pages {
            assert_eq!(page.len(), exporter.lines_per_page);
            assert!(page.iter().all(|l| l.chars().count() <= exporter.width));
        }
        let rendered = exporter.render(&QuotationLayout::from_document(&doc));
        assert_eq!(rendered.matches('\x0C').count(), pages.len() - 1);
    }

    fn single_line_document(quantity: Decimal, unit_price: Decimal) -> QuotationDocument {
        let mut charges = ChargeList::new();
        let first = charges.lines()[0].id();
        charges
            .update_line(first, ChargeUpdate::Description("Vessel charter".into()))
            .unwrap();
        charges
            .update_line(first, ChargeUpdate::Quantity(quantity))
            .unwrap();
        charges
            .update_line(first, ChargeUpdate::UnitPrice(unit_price))
            .unwrap();
        QuotationDocument::snapshot(
            &charges,
            QuotationHeader::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        )
    }

    #[test]
    fn test_print_large_figures_stay_within_width() {
        let exporter = PrintExporter::default();

        let doc = single_line_document(dec!(1), dec!(12000000000));
        let pages = exporter.pages(&QuotationLayout::from_document(&doc));
        assert!(pages.iter().flatten().all(|l| l.chars().count() <= exporter.width));
        let text = pages.concat().join("\n");
        assert!(text.contains("Description"));
        assert!(text.contains("12,000,000,000.00"));

        // Too wide for side-by-side columns: figures are stacked under the row.
        let doc = single_line_document(dec!(100), dec!(100000000000000000000));
        let pages = exporter.pages(&QuotationLayout::from_document(&doc));
        assert!(pages.iter().flatten().all(|l| l.chars().count() <= exporter.width));
        let text = pages.concat().join("\n");
        assert!(text.contains("1. Vessel charter"));
        assert!(text.contains("100,000,000,000,000,000,000.00"));
        assert!(text.contains("10,000,000,000,000,000,000,000.00"));
    }

    #[test]
    fn test_quantities_rounded_alike_in_print_and_document() {
        let doc = single_line_document(dec!(0.3333333333333333), dec!(30));
        let layout = QuotationLayout::from_document(&doc);

        let print = PrintExporter::default().render(&layout);
        let document = DocumentExporter.render(&layout);
        assert!(print.contains(" 0.33 "));
        assert!(!print.contains("0.333"));
        assert!(document.contains("Quantity: 0.33 ×"));
        assert!(print
            .lines()
            .all(|l| l.chars().count() <= PrintExporter::default().width));
    }

    #[test]
    fn test_document_paragraphs() {
        let layout = QuotationLayout::from_document(&sample_document());
        let paragraphs = DocumentExporter.paragraphs(&layout);
        assert_eq!(paragraphs[0].style, ParagraphStyle::Title);

        let total = paragraphs
            .iter()
            .find(|p| p.style == ParagraphStyle::Total)
            .unwrap();
        assert_eq!(total.text, "Grand Total: ₦8,000");
        assert!(paragraphs
            .iter()
            .any(|p| p.text == "2. Terminal handling\nQuantity: 2 × ₦1,500 = ₦3,000"));
    }

    #[test]
    fn test_file_names_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(PrintExporter::default().file_name(date), "quotation-2026-03-07-print.txt");
        assert_eq!(DocumentExporter.file_name(date), "quotation-2026-03-07.txt");
        assert_eq!(ShareTextExporter::default().file_name(date), "quotation-2026-03-07-share.txt");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 5), vec![""]);
    }
}
