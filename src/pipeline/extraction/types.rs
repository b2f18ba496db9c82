use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Insertion-ordered string-keyed map.
///
/// Clinical notes list systems, vitals and exam sections in a meaningful
/// order; the generated prompt repeats them in that same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> FieldMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FieldMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for FieldMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One physical-examination entry: a flat finding or a section of
/// named sub-findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamFinding {
    Finding(String),
    Section(FieldMap<String>),
}

impl Serialize for ExamFinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExamFinding::Finding(text) => serializer.serialize_str(text),
            ExamFinding::Section(map) => map.serialize(serializer),
        }
    }
}

/// Structured clinical note. Every field is always populated; fields the
/// source did not contain hold their documented placeholder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClinicalRecord {
    pub patient_name: String,
    pub date_of_birth: String,
    pub date_of_service: String,
    pub provider: String,
    pub chief_complaint: String,
    pub history_of_present_illness: String,
    pub review_of_systems: FieldMap<String>,
    pub vital_signs: FieldMap<String>,
    pub physical_examination: FieldMap<ExamFinding>,
    pub prior_imaging_results: String,
    /// Never empty.
    pub orders: Vec<String>,
    pub assessment: String,
    /// Never empty.
    pub plan: Vec<String>,
}

/// One claim block from a remittance advice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClaimRecord {
    pub claim_number: String,
    pub patient_name: String,
    pub date_of_service: String,
    pub procedure_code: String,
    pub billed_amount: Decimal,
    pub allowed_amount: Decimal,
    pub patient_responsibility: Decimal,
    pub paid_amount: Decimal,
    /// CARC code as written, or `NOT_FOUND` when the block has none.
    pub denial_code: String,
    pub denial_description: String,
}
