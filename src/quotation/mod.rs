//! Quotation building: the charge-line model, snapshots and exporters.

pub mod charges;
pub mod document;
pub mod export;
pub mod layout;
