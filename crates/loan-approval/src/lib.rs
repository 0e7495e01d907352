//! Loan approval inference pipeline.
//!
//! Loads pre-fitted artifacts once, then turns each submitted application into
//! an approval decision: feature derivation, categorical encoding, scaling and
//! classification.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
