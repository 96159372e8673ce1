//! Foundational types shared by the duty engine and the quotation model.

pub mod currency;
pub mod money;
