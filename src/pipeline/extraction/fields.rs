use serde::Serialize;

/// A field value tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    /// Found in the source document.
    Present(T),
    /// Not found (or malformed); holds the documented placeholder.
    Defaulted(T),
}

impl<T> Extracted<T> {
    /// `Present(v)` when `found` is `Some`, otherwise the placeholder.
    pub fn or_default_with(found: Option<T>, placeholder: impl FnOnce() -> T) -> Self {
        match found {
            Some(v) => Extracted::Present(v),
            None => Extracted::Defaulted(placeholder()),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Extracted::Defaulted(_))
    }

    pub fn into_value(self) -> T {
        match self {
            Extracted::Present(v) | Extracted::Defaulted(v) => v,
        }
    }
}

/// Which labels of one document fell back to their placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub defaulted: Vec<&'static str>,
}

impl ExtractionReport {
    /// Unwrap a tagged field, noting `label` if it was defaulted.
    pub fn take<T>(&mut self, label: &'static str, field: Extracted<T>) -> T {
        if field.is_defaulted() {
            self.defaulted.push(label);
        }
        field.into_value()
    }

    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }

    pub fn was_defaulted(&self, label: &str) -> bool {
        self.defaulted.iter().any(|l| *l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_when_found() {
        let field = Extracted::or_default_with(Some("Jane Doe".to_string()), || "x".into());
        assert!(!field.is_defaulted());
        assert_eq!(field.into_value(), "Jane Doe");
    }

    #[test]
    fn defaulted_when_missing() {
        let field: Extracted<String> = Extracted::or_default_with(None, || "0000-00-00".into());
        assert!(field.is_defaulted());
        assert_eq!(field.into_value(), "0000-00-00");
    }

    #[test]
    fn report_records_only_defaulted_labels() {
        let mut report = ExtractionReport::default();
        let name = report.take("Patient Name", Extracted::Present("A".to_string()));
        let dob = report.take("DOB", Extracted::Defaulted("0000-00-00".to_string()));
        assert_eq!(name, "A");
        assert_eq!(dob, "0000-00-00");
        assert_eq!(report.defaulted, vec!["DOB"]);
        assert!(report.was_defaulted("DOB"));
        assert!(!report.is_complete());
    }
}
