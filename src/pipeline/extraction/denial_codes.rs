use std::collections::HashMap;
use std::sync::LazyLock;

/// Placeholder code when a claim block has no `CARC:` line.
pub const DENIAL_CODE_NOT_FOUND: &str = "NOT_FOUND";

/// Description paired with [`DENIAL_CODE_NOT_FOUND`].
pub const DENIAL_DESCRIPTION_NOT_FOUND: &str = "No denial code found";

/// Description for a code that is present but not in the table.
pub const DENIAL_DESCRIPTION_UNKNOWN: &str = "Unknown";

/// CARC/RARC code → human-readable denial reason. Read-only after first use.
static DENIAL_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("CO-50", "Medical Necessity"),
        ("CO-45", "Coding Error or Fee Schedule Issue"),
        ("N30", "Coverage Issue"),
    ])
});

/// Resolve a denial code by exact match. Unmapped codes, including case
/// variants of mapped ones, resolve to `"Unknown"`.
pub fn describe_denial_code(code: &str) -> &'static str {
    DENIAL_CODES
        .get(code.trim())
        .copied()
        .unwrap_or(DENIAL_DESCRIPTION_UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(describe_denial_code("CO-50"), "Medical Necessity");
        assert_eq!(
            describe_denial_code("CO-45"),
            "Coding Error or Fee Schedule Issue"
        );
        assert_eq!(describe_denial_code("N30"), "Coverage Issue");
    }

    #[test]
    fn lookup_ignores_padding() {
        assert_eq!(describe_denial_code(" CO-50 "), "Medical Necessity");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(describe_denial_code("co-50"), DENIAL_DESCRIPTION_UNKNOWN);
        assert_eq!(describe_denial_code("n30"), DENIAL_DESCRIPTION_UNKNOWN);
    }

    #[test]
    fn unmapped_code_is_unknown() {
        assert_eq!(describe_denial_code("CO-97"), "Unknown");
    }

    #[test]
    fn not_found_sentinel_differs_from_unknown() {
        assert_ne!(DENIAL_DESCRIPTION_NOT_FOUND, DENIAL_DESCRIPTION_UNKNOWN);
    }
}
