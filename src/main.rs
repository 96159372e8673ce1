//! duty-engine CLI
//!
//! Compute customs duty breakdowns and render quotations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Duty on a $1,000 invoice at a fixed rate
//! duty-engine duty --invoice 1000 --freight 100 --currency USD --rate 1500 \
//!     --duty-rate 20 --levy-rate 5
//!
//! # Resolve the rate from a rates file, JSON output
//! duty-engine duty --invoice 1000 --currency EUR --rates rates.json --format json
//!
//! # Render a quotation as share text
//! duty-engine quote --input quote.json --format share
//! ```

use chrono::{Local, NaiveDate};
use duty_engine::core::currency::{CurrencyCode, FxRateTable};
use duty_engine::duty::engine::DutyEngine;
use duty_engine::duty::inputs::{DutyInputs, DutyMode};
use duty_engine::quotation::charges::{ChargeList, ChargeUpdate};
use duty_engine::quotation::document::{PartyDetails, QuotationDocument, QuotationHeader};
use duty_engine::quotation::export::{
    DocumentExporter, PrintExporter, Renderer, ShareTextExporter,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process;

fn print_usage() {
    eprintln!(
        r#"duty-engine — customs duty calculation and quotation export

USAGE:
    duty-engine <COMMAND> [OPTIONS]

COMMANDS:
    duty        Compute a landed-cost duty breakdown
    quote       Render a quotation file
    help        Show this message

OPTIONS (duty):
    --invoice <N>       Invoice amount in foreign currency (required)
    --freight <N>       Freight amount in foreign currency (default: 0)
    --currency <CODE>   Invoice currency (default: USD)
    --rate <N>          Exchange rate, naira per unit (overrides --rates)
    --rates <FILE>      JSON rates file
    --duty-rate <N>     Duty rate in percent (default: 0)
    --levy-rate <N>     Levy rate in percent (default: 0)
    --insurance <N>     Insurance in naira (default: 1.5% of invoice + freight)
    --mode <MODE>       with-vat (default), no-vat or idec
    --format <FORMAT>   text (default), summary or json

OPTIONS (quote):
    --input <FILE>      Path to JSON quotation file (required)
    --format <FORMAT>   print, document (default), share or link
    --date <DATE>       Issue date, YYYY-MM-DD (default: today)
    --output-dir <DIR>  Write the export there under its date-stamped name

EXAMPLES:
    duty-engine duty --invoice 1000 --freight 100 --rate 1500 --duty-rate 20 --levy-rate 5
    duty-engine duty --invoice 250 --currency EUR --rates rates.json --mode idec
    duty-engine quote --input quote.json --format print --output-dir out/"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Pull the value following a flag.
fn flag_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn parse_decimal(raw: &str, flag: &str) -> Decimal {
    raw.trim()
        .replace(',', "")
        .parse()
        .unwrap_or_else(|e| fail(format!("invalid number for {} '{}': {}", flag, raw, e)))
}

/// JSON schema for a rates file.
#[derive(serde::Deserialize)]
struct RatesFile {
    #[serde(default)]
    local: Option<String>,
    rates: HashMap<String, Decimal>,
}

fn load_rates(path: &str) -> FxRateTable {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));
    let file: RatesFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Expected format:");
        eprintln!(r#"{{ "local": "NGN", "rates": {{ "USD": "1500", "EUR": "1620" }} }}"#);
        fail(format!("parsing JSON: {}", e))
    });

    let local = file
        .local
        .map(CurrencyCode::new)
        .unwrap_or_else(CurrencyCode::naira);
    let mut table = FxRateTable::new(local);
    for (code, rate) in file.rates {
        table
            .set_rate(CurrencyCode::new(code), rate)
            .unwrap_or_else(|e| fail(e));
    }
    log::info!("loaded {} exchange rates from {}", table.len(), path);
    table
}

fn cmd_duty(args: &[String]) {
    let mut invoice = None;
    let mut freight = Decimal::ZERO;
    let mut currency = CurrencyCode::new("USD");
    let mut rate = None;
    let mut rates_path = None;
    let mut duty_rate = Decimal::ZERO;
    let mut levy_rate = Decimal::ZERO;
    let mut insurance = None;
    let mut mode = DutyMode::default();
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--invoice" => invoice = Some(parse_decimal(&flag_value(args, &mut i, flag), flag)),
            "--freight" => freight = parse_decimal(&flag_value(args, &mut i, flag), flag),
            "--currency" => currency = CurrencyCode::new(flag_value(args, &mut i, flag)),
            "--rate" => rate = Some(parse_decimal(&flag_value(args, &mut i, flag), flag)),
            "--rates" => rates_path = Some(flag_value(args, &mut i, flag)),
            "--duty-rate" => duty_rate = parse_decimal(&flag_value(args, &mut i, flag), flag),
            "--levy-rate" => levy_rate = parse_decimal(&flag_value(args, &mut i, flag), flag),
            "--insurance" => {
                insurance = Some(parse_decimal(&flag_value(args, &mut i, flag), flag))
            }
            "--mode" => {
                mode = flag_value(args, &mut i, flag)
                    .parse::<DutyMode>()
                    .unwrap_or_else(|e| fail(e))
            }
            "--format" => format = flag_value(args, &mut i, flag),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    let invoice = invoice.unwrap_or_else(|| fail("--invoice <N> is required"));

    let mut inputs = match (rate, rates_path) {
        (Some(rate), _) => DutyInputs::new(invoice, freight, currency, rate),
        (None, Some(path)) => {
            let table = load_rates(&path);
            DutyInputs::resolve(invoice, freight, currency, &table).unwrap_or_else(|e| fail(e))
        }
        (None, None) => fail("an exchange rate is required: pass --rate <N> or --rates <FILE>"),
    };
    inputs = inputs
        .with_duty_rate(duty_rate)
        .with_levy_rate(levy_rate)
        .with_mode(mode);
    if let Some(insurance) = insurance {
        inputs = inputs.with_insurance(insurance);
    }

    let breakdown = DutyEngine::compute(&inputs).unwrap_or_else(|e| fail(e));

    match format.as_str() {
        "json" => match serde_json::to_string_pretty(&breakdown) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
        "summary" => println!("{}", breakdown.summary()),
        "text" => print!("{}", breakdown),
        other => fail(format!("unknown format '{}': use text, summary or json", other)),
    }
}

/// JSON schema for a quotation file.
#[derive(serde::Deserialize)]
struct QuoteFile {
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    valid_until: Option<NaiveDate>,
    #[serde(default)]
    sender: PartyDetails,
    #[serde(default)]
    recipient: PartyDetails,
    lines: Vec<LineInput>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    terms: Option<String>,
    #[serde(default)]
    payment_details: Option<String>,
}

#[derive(serde::Deserialize)]
struct LineInput {
    description: String,
    #[serde(default = "default_quantity")]
    quantity: Decimal,
    #[serde(default)]
    unit_price: Decimal,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

fn load_quote(path: &str, issue_date: NaiveDate) -> QuotationDocument {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));
    let file: QuoteFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "reference": "Q-001",
  "sender": {{ "name": "Harbour Clearing Ltd" }},
  "recipient": {{ "name": "Bola Imports", "phone": "+2348010000000" }},
  "lines": [ {{ "description": "Customs processing", "quantity": 1, "unit_price": "5000" }} ]
}}"#
        );
        fail(format!("parsing JSON: {}", e))
    });

    let mut charges = ChargeList::new();
    let mut lines = file.lines.into_iter();
    if let Some(first) = lines.next() {
        let id = charges.lines()[0].id();
        for update in [
            ChargeUpdate::Description(first.description),
            ChargeUpdate::Quantity(first.quantity),
            ChargeUpdate::UnitPrice(first.unit_price),
        ] {
            charges.update_line(id, update).unwrap_or_else(|e| fail(e));
        }
    }
    for line in lines {
        charges
            .push_line(line.description, line.quantity, line.unit_price)
            .unwrap_or_else(|e| fail(e));
    }

    let mut header = QuotationHeader::new(issue_date);
    header.reference = file.reference;
    header.valid_until = file.valid_until;
    if let Some(code) = file.currency {
        header.currency = CurrencyCode::new(code);
    }
    header.sender = file.sender;
    header.recipient = file.recipient;
    header.notes = file.notes;
    header.terms = file.terms;
    header.payment_details = file.payment_details;

    log::info!("loaded quotation with {} charge lines from {}", charges.len(), path);
    QuotationDocument::snapshot(&charges, header)
}

fn cmd_quote(args: &[String]) {
    let mut input_path = None;
    let mut format = "document".to_string();
    let mut date = None;
    let mut output_dir = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" => input_path = Some(flag_value(args, &mut i, flag)),
            "--format" => format = flag_value(args, &mut i, flag),
            "--date" => {
                let raw = flag_value(args, &mut i, flag);
                date = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .unwrap_or_else(|e| fail(format!("invalid date '{}': {}", raw, e))),
                );
            }
            "--output-dir" => output_dir = Some(flag_value(args, &mut i, flag)),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let issue_date = date.unwrap_or_else(|| Local::now().date_naive());
    let doc = load_quote(&path, issue_date);

    let artifact = match format.as_str() {
        "print" => PrintExporter::default().export(&doc),
        "document" => DocumentExporter.export(&doc),
        "share" | "link" => {
            let exporter = ShareTextExporter {
                phone: doc.header.recipient.phone.clone(),
            };
            let mut artifact = exporter.export(&doc);
            if format == "link" {
                artifact.contents = exporter.deep_link(&artifact.contents);
            }
            artifact
        }
        other => fail(format!(
            "unknown format '{}': use print, document, share or link",
            other
        )),
    };

    match output_dir {
        Some(dir) => {
            let target = Path::new(&dir).join(&artifact.file_name);
            fs::write(&target, &artifact.contents)
                .unwrap_or_else(|e| fail(format!("writing '{}': {}", target.display(), e)));
            eprintln!("Wrote {}", target.display());
        }
        None => println!("{}", artifact.contents),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "duty" => cmd_duty(rest),
        "quote" => cmd_quote(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
