//! # duty-engine
//!
//! Customs duty calculation and quotation aggregation.
//!
//! Converts an invoice in a foreign currency into a landed-cost breakdown
//! in naira (CIF, FCS, duty, levy, surcharge, ETLS, VAT) and assembles
//! quotation charge lines into print, document and share-text exports.
//!
//! ## Architecture
//!
//! - **core** — Currency codes, injected exchange-rate sources, money formatting
//! - **duty** — Input validation and the duty computation pipeline
//! - **quotation** — Charge-line aggregation, snapshots, layout and exporters
//! - **error** — Error types for every fallible operation

pub mod core;
pub mod duty;
pub mod error;
pub mod quotation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, FxRateTable, RateSource};
    pub use crate::duty::engine::{DutyBreakdown, DutyEngine};
    pub use crate::duty::inputs::{DutyInputs, DutyMode};
    pub use crate::error::{ChargeError, DutyError, FxError};
    pub use crate::quotation::charges::{ChargeLine, ChargeLineId, ChargeList, ChargeUpdate};
    pub use crate::quotation::document::{PartyDetails, QuotationDocument, QuotationHeader};
    pub use crate::quotation::export::{
        DocumentExporter, PrintExporter, Renderer, ShareTextExporter,
    };
    pub use crate::quotation::layout::QuotationLayout;
}
