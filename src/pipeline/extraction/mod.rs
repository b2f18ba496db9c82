//! Structured-field extraction for clinical notes and remittance advice.
//!
//! Extraction never fails. Each field independently falls back to a
//! documented placeholder, and the `*_with_report` variants say which
//! fields did.

pub mod types;
pub mod fields;
pub mod tokenizer;
pub mod denial_codes;
pub mod clinical;
pub mod remittance;

pub use types::*;
pub use fields::*;
pub use denial_codes::*;
pub use clinical::{extract_clinical, extract_clinical_with_report};
pub use remittance::{extract_claims, extract_claims_with_report};
