//! Customs duty computation: inputs, validation and the landed-cost pipeline.

pub mod engine;
pub mod inputs;
