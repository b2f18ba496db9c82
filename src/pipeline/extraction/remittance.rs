use std::str::FromStr;

use rust_decimal::Decimal;

use super::denial_codes::{
    describe_denial_code, DENIAL_CODE_NOT_FOUND, DENIAL_DESCRIPTION_NOT_FOUND,
};
use super::fields::{Extracted, ExtractionReport};
use super::types::ClaimRecord;

/// Line labels inside a claim block.
pub mod labels {
    pub const CLAIM_NUMBER: &str = "Claim Number";
    pub const PATIENT_NAME: &str = "Patient Name";
    pub const DATE_OF_SERVICE: &str = "Date of Service";
    pub const PROCEDURE_CODE: &str = "Procedure Code";
    pub const BILLED_AMOUNT: &str = "Billed Amount";
    pub const ALLOWED_AMOUNT: &str = "Allowed Amount";
    pub const PATIENT_RESPONSIBILITY: &str = "Patient Responsibility";
    pub const PAID_AMOUNT: &str = "Paid Amount";
    pub const CARC: &str = "CARC";
}

/// Placeholders substituted for missing claim fields.
pub mod sentinels {
    pub const CLAIM_NUMBER: &str = "UNKNOWN-CLAIM";
    pub const PATIENT_NAME: &str = "Unknown Patient";
    pub const DATE: &str = "0000-00-00";
    pub const PROCEDURE_CODE: &str = "00000";
}

/// One claim block: the header remainder and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClaimBlock<'a> {
    header: &'a str,
    lines: Vec<&'a str>,
}

/// Extract every claim block. Text before the first claim header is ignored.
pub fn extract_claims(text: &str) -> Vec<ClaimRecord> {
    extract_claims_with_report(text)
        .into_iter()
        .map(|(claim, _)| claim)
        .collect()
}

/// Extract every claim block with a per-claim defaulted-field report.
pub fn extract_claims_with_report(text: &str) -> Vec<(ClaimRecord, ExtractionReport)> {
    let claims: Vec<_> = split_claim_blocks(text)
        .into_iter()
        .map(|block| parse_claim_block(&block))
        .collect();

    tracing::debug!(claim_count = claims.len(), "Remittance claims extracted");
    claims
}

/// Segment the remittance at `<n>. Claim Number: ` header lines.
fn split_claim_blocks(text: &str) -> Vec<ClaimBlock<'_>> {
    let mut blocks: Vec<ClaimBlock<'_>> = Vec::new();

    for line in text.lines() {
        if let Some(header) = parse_claim_header(line) {
            blocks.push(ClaimBlock {
                header,
                lines: Vec::new(),
            });
        } else if let Some(current) = blocks.last_mut() {
            current.lines.push(line);
        }
    }

    blocks
}

/// Returns the text after `Claim Number:` when `line` is a claim header.
fn parse_claim_header(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?.trim_start();
    let rest = rest.strip_prefix(labels::CLAIM_NUMBER)?.trim_start();
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

/// Split `Label: value`, ignoring a leading list bullet.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    let trimmed = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .unwrap_or(trimmed);
    let (label, value) = trimmed.split_once(':')?;
    Some((label.trim(), value.trim()))
}

impl<'a> ClaimBlock<'a> {
    /// Value of the first line carrying `label`.
    fn field(&self, label: &str) -> Option<&'a str> {
        self.lines
            .iter()
            .filter_map(|line| split_label(*line))
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v)
    }
}

fn first_token(value: &str) -> Option<&str> {
    value.split_whitespace().next()
}

fn text_field(block: &ClaimBlock<'_>, label: &str, sentinel: &str) -> Extracted<String> {
    let found = block
        .field(label)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Extracted::or_default_with(found, || sentinel.to_string())
}

fn token_field(block: &ClaimBlock<'_>, label: &str, sentinel: &str) -> Extracted<String> {
    let found = block.field(label).and_then(first_token).map(str::to_string);
    Extracted::or_default_with(found, || sentinel.to_string())
}

fn amount_field(block: &ClaimBlock<'_>, label: &str) -> Extracted<Decimal> {
    let found = block.field(label).and_then(parse_amount);
    Extracted::or_default_with(found, zero_amount)
}

/// Parse `$1,250.00`-style amounts exactly. Source scale is preserved.
fn parse_amount(value: &str) -> Option<Decimal> {
    let token = first_token(value)?;
    let cleaned: String = token
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

fn zero_amount() -> Decimal {
    Decimal::new(0, 2)
}

fn parse_claim_block(block: &ClaimBlock<'_>) -> (ClaimRecord, ExtractionReport) {
    let mut report = ExtractionReport::default();

    let claim_number = report.take(
        labels::CLAIM_NUMBER,
        Extracted::or_default_with(first_token(block.header).map(str::to_string), || {
            sentinels::CLAIM_NUMBER.to_string()
        }),
    );

    let (denial_code, denial_description) =
        match block.field(labels::CARC).and_then(first_token) {
            Some(code) => (code.to_string(), describe_denial_code(code).to_string()),
            None => {
                report.defaulted.push(labels::CARC);
                (
                    DENIAL_CODE_NOT_FOUND.to_string(),
                    DENIAL_DESCRIPTION_NOT_FOUND.to_string(),
                )
            }
        };

    let claim = ClaimRecord {
        patient_name: report.take(
            labels::PATIENT_NAME,
            text_field(block, labels::PATIENT_NAME, sentinels::PATIENT_NAME),
        ),
        date_of_service: report.take(
            labels::DATE_OF_SERVICE,
            text_field(block, labels::DATE_OF_SERVICE, sentinels::DATE),
        ),
        procedure_code: report.take(
            labels::PROCEDURE_CODE,
            token_field(block, labels::PROCEDURE_CODE, sentinels::PROCEDURE_CODE),
        ),
        billed_amount: report.take(
            labels::BILLED_AMOUNT,
            amount_field(block, labels::BILLED_AMOUNT),
        ),
        allowed_amount: report.take(
            labels::ALLOWED_AMOUNT,
            amount_field(block, labels::ALLOWED_AMOUNT),
        ),
        patient_responsibility: report.take(
            labels::PATIENT_RESPONSIBILITY,
            amount_field(block, labels::PATIENT_RESPONSIBILITY),
        ),
        paid_amount: report.take(labels::PAID_AMOUNT, amount_field(block, labels::PAID_AMOUNT)),
        claim_number,
        denial_code,
        denial_description,
    };

    if !report.is_complete() {
        tracing::debug!(
            claim_number = %claim.claim_number,
            defaulted = ?report.defaulted,
            "Claim fields fell back to placeholders"
        );
    }

    (claim, report)
}
