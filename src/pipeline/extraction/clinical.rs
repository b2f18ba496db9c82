use super::fields::{Extracted, ExtractionReport};
use super::tokenizer::{parse_note, NoteTree, NoteValue};
use super::types::{ClinicalRecord, ExamFinding, FieldMap};

/// Source labels of the clinical note grammar.
pub mod labels {
    pub const PATIENT_NAME: &str = "Patient Name";
    pub const DOB: &str = "DOB";
    pub const DATE_OF_SERVICE: &str = "Date of Service";
    pub const PROVIDER: &str = "Provider";
    pub const CHIEF_COMPLAINT: &str = "Chief Complaint (CC)";
    pub const HPI: &str = "History of Present Illness (HPI)";
    pub const ROS: &str = "Review of Systems (ROS)";
    pub const VITAL_SIGNS: &str = "Vital Signs";
    pub const PHYSICAL_EXAM: &str = "Physical Examination";
    pub const PRIOR_IMAGING: &str = "Results (Prior to Imaging)";
    pub const ORDERS: &str = "Orders";
    pub const ASSESSMENT: &str = "Assessment";
    pub const PLAN: &str = "Plan";
}

/// Placeholders substituted for missing clinical fields.
pub mod sentinels {
    pub const PATIENT_NAME: &str = "Unknown Patient";
    pub const DATE: &str = "0000-00-00";
    pub const PROVIDER: &str = "Unknown Provider";
    pub const NOT_DOCUMENTED: &str = "Not documented";
    pub const NOT_MEASURED: &str = "Not Measured";
    pub const ROS_KEY: &str = "Review of Systems";
    pub const EXAM_KEY: &str = "Physical Examination";
    pub const NO_ORDERS: &str = "No orders documented";
    pub const NO_PLAN: &str = "No plan documented";

    /// Vitals reported as `Not Measured` when the note has no vitals block.
    pub const DEFAULT_VITALS: [&str; 5] = [
        "Blood Pressure",
        "Heart Rate",
        "Respiratory Rate",
        "Temperature",
        "Oxygen Saturation",
    ];
}

/// Extract a clinical record. Never fails: missing fields hold placeholders.
pub fn extract_clinical(text: &str) -> ClinicalRecord {
    extract_clinical_with_report(text).0
}

/// Extract a clinical record and report which labels were defaulted.
pub fn extract_clinical_with_report(text: &str) -> (ClinicalRecord, ExtractionReport) {
    let tree = parse_note(text);
    let mut report = ExtractionReport::default();

    let record = ClinicalRecord {
        patient_name: report.take(
            labels::PATIENT_NAME,
            scalar(&tree, labels::PATIENT_NAME, sentinels::PATIENT_NAME),
        ),
        date_of_birth: report.take(labels::DOB, scalar(&tree, labels::DOB, sentinels::DATE)),
        date_of_service: report.take(
            labels::DATE_OF_SERVICE,
            scalar(&tree, labels::DATE_OF_SERVICE, sentinels::DATE),
        ),
        provider: report.take(
            labels::PROVIDER,
            scalar(&tree, labels::PROVIDER, sentinels::PROVIDER),
        ),
        chief_complaint: report.take(
            labels::CHIEF_COMPLAINT,
            scalar(&tree, labels::CHIEF_COMPLAINT, sentinels::NOT_DOCUMENTED),
        ),
        history_of_present_illness: report.take(
            labels::HPI,
            scalar(&tree, labels::HPI, sentinels::NOT_DOCUMENTED),
        ),
        review_of_systems: report.take(labels::ROS, review_of_systems(&tree)),
        vital_signs: report.take(labels::VITAL_SIGNS, vital_signs(&tree)),
        physical_examination: report.take(labels::PHYSICAL_EXAM, physical_examination(&tree)),
        prior_imaging_results: report.take(
            labels::PRIOR_IMAGING,
            scalar(&tree, labels::PRIOR_IMAGING, sentinels::NOT_DOCUMENTED),
        ),
        orders: report.take(labels::ORDERS, list(&tree, labels::ORDERS, sentinels::NO_ORDERS)),
        assessment: report.take(
            labels::ASSESSMENT,
            scalar(&tree, labels::ASSESSMENT, sentinels::NOT_DOCUMENTED),
        ),
        plan: report.take(labels::PLAN, list(&tree, labels::PLAN, sentinels::NO_PLAN)),
    };

    if !report.is_complete() {
        tracing::debug!(
            defaulted = ?report.defaulted,
            "Clinical note fields fell back to placeholders"
        );
    }

    (record, report)
}

fn scalar(tree: &NoteTree, label: &str, sentinel: &str) -> Extracted<String> {
    let found = tree
        .find(label)
        .and_then(NoteValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Extracted::or_default_with(found, || sentinel.to_string())
}

fn list(tree: &NoteTree, label: &str, sentinel: &str) -> Extracted<Vec<String>> {
    let found = match tree.find(label) {
        Some(NoteValue::List(items)) if !items.is_empty() => Some(items.clone()),
        _ => None,
    };
    Extracted::or_default_with(found, || vec![sentinel.to_string()])
}

/// Scalar entries of a group, in order. `None` when absent or empty.
fn text_group(tree: &NoteTree, label: &str) -> Option<FieldMap<String>> {
    let Some(NoteValue::Group(entries)) = tree.find(label) else {
        return None;
    };
    let map = text_entries(entries);
    (!map.is_empty()).then_some(map)
}

fn text_entries(entries: &[(String, NoteValue)]) -> FieldMap<String> {
    entries
        .iter()
        .filter_map(|(k, v)| {
            v.as_text()
                .filter(|s| !s.trim().is_empty())
                .map(|s| (k.clone(), s.trim().to_string()))
        })
        .collect()
}

fn review_of_systems(tree: &NoteTree) -> Extracted<FieldMap<String>> {
    Extracted::or_default_with(text_group(tree, labels::ROS), || {
        [(sentinels::ROS_KEY, sentinels::NOT_DOCUMENTED.to_string())]
            .into_iter()
            .collect()
    })
}

fn vital_signs(tree: &NoteTree) -> Extracted<FieldMap<String>> {
    Extracted::or_default_with(text_group(tree, labels::VITAL_SIGNS), || {
        sentinels::DEFAULT_VITALS
            .iter()
            .map(|name| (*name, sentinels::NOT_MEASURED.to_string()))
            .collect()
    })
}

fn physical_examination(tree: &NoteTree) -> Extracted<FieldMap<ExamFinding>> {
    let found = match tree.find(labels::PHYSICAL_EXAM) {
        Some(NoteValue::Group(entries)) => {
            let mut exam = FieldMap::new();
            for (section, value) in entries {
                match value {
                    NoteValue::Group(children) => {
                        let sub = text_entries(children);
                        if !sub.is_empty() {
                            exam.insert(section.clone(), ExamFinding::Section(sub));
                        }
                    }
                    other => {
                        if let Some(text) = other.as_text().filter(|s| !s.trim().is_empty()) {
                            let finding = ExamFinding::Finding(text.trim().to_string());
                            exam.insert(section.clone(), finding);
                        }
                    }
                }
            }
            (!exam.is_empty()).then_some(exam)
        }
        _ => None,
    };

    Extracted::or_default_with(found, || {
        [(
            sentinels::EXAM_KEY,
            ExamFinding::Finding(sentinels::NOT_DOCUMENTED.to_string()),
        )]
        .into_iter()
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_NOTE: &str = r#"{
    "Patient Name": "John Smith",
    "DOB": "1968-04-12",
    "Date of Service": "2024-03-05",
    "Provider": "Dr. Emily Carter, MD",
    "Chief Complaint (CC)": "Persistent left knee pain",
    "History of Present Illness (HPI)": (
        56-year-old male with 3 months of left knee pain after a fall (twisting injury).
        Pain worsens with stairs; failed 6 weeks of NSAIDs and physical therapy.
    ),
    "Review of Systems (ROS)": {
        "Constitutional": "No fever or weight loss",
        "Musculoskeletal": "Left knee pain and swelling"
    },
    "Vital Signs": {
        "Blood Pressure": "132/84 mmHg",
        "Heart Rate": "76 bpm",
        "Temperature": "98.4 F"
    },
    "Physical Examination": {
        "General": "Alert, in mild distress",
        "Left Knee": {
            "Inspection": "Moderate effusion",
            "Special Tests": "Positive McMurray test"
        }
    },
    "Results (Prior to Imaging)": (
        X-ray left knee: no fracture, mild joint space narrowing.
    ),
    "Orders": [
        "MRI left knee without contrast",
        "Orthopedic referral"
    ],
    "Assessment and Plan": {
        "Assessment": (
            Suspected medial meniscus tear, left knee.
        ),
        "Plan": [
            "Obtain MRI to confirm tear",
            "Continue activity modification"
        ]
    }
}"#;

    #[test]
    fn full_note_has_no_placeholders() {
        let (record, report) = extract_clinical_with_report(FULL_NOTE);
        assert!(report.is_complete(), "defaulted: {:?}", report.defaulted);
        assert_eq!(record.patient_name, "John Smith");
        assert_eq!(record.date_of_birth, "1968-04-12");
        assert_eq!(record.date_of_service, "2024-03-05");
        assert_eq!(record.provider, "Dr. Emily Carter, MD");
        assert_eq!(record.chief_complaint, "Persistent left knee pain");
        assert!(record.history_of_present_illness.starts_with("56-year-old male"));
        assert!(record.history_of_present_illness.contains("(twisting injury)"));
        assert_eq!(
            record.review_of_systems.get("Musculoskeletal").map(String::as_str),
            Some("Left knee pain and swelling")
        );
        assert_eq!(record.vital_signs.len(), 3);
        assert_eq!(
            record.prior_imaging_results,
            "X-ray left knee: no fracture, mild joint space narrowing."
        );
        assert_eq!(
            record.orders,
            vec!["MRI left knee without contrast", "Orthopedic referral"]
        );
        assert_eq!(record.assessment, "Suspected medial meniscus tear, left knee.");
        assert_eq!(record.plan.len(), 2);
    }

    #[test]
    fn physical_exam_keeps_flat_and_nested_sections() {
        let record = extract_clinical(FULL_NOTE);
        assert_eq!(
            record.physical_examination.get("General"),
            Some(&ExamFinding::Finding("Alert, in mild distress".into()))
        );
        let Some(ExamFinding::Section(knee)) = record.physical_examination.get("Left Knee") else {
            panic!("expected nested knee section");
        };
        assert_eq!(
            knee.get("Special Tests").map(String::as_str),
            Some("Positive McMurray test")
        );
    }

    #[test]
    fn missing_dob_uses_zero_date() {
        let note = FULL_NOTE.replace(r#""DOB": "1968-04-12","#, "");
        let (record, report) = extract_clinical_with_report(&note);
        assert_eq!(record.date_of_birth, "0000-00-00");
        assert_eq!(report.defaulted, vec![labels::DOB]);
    }

    #[test]
    fn empty_input_defaults_every_field() {
        let (record, report) = extract_clinical_with_report("");
        assert_eq!(report.defaulted.len(), 13);
        assert_eq!(record.patient_name, sentinels::PATIENT_NAME);
        assert_eq!(record.date_of_service, sentinels::DATE);
        assert_eq!(record.provider, sentinels::PROVIDER);
        assert_eq!(record.chief_complaint, sentinels::NOT_DOCUMENTED);
        assert_eq!(record.history_of_present_illness, sentinels::NOT_DOCUMENTED);
        assert_eq!(record.prior_imaging_results, sentinels::NOT_DOCUMENTED);
        assert_eq!(record.assessment, sentinels::NOT_DOCUMENTED);
        assert_eq!(record.orders, vec![sentinels::NO_ORDERS]);
        assert_eq!(record.plan, vec![sentinels::NO_PLAN]);
        assert_eq!(
            record.review_of_systems.get(sentinels::ROS_KEY).map(String::as_str),
            Some(sentinels::NOT_DOCUMENTED)
        );
        assert_eq!(
            record.physical_examination.get(sentinels::EXAM_KEY),
            Some(&ExamFinding::Finding(sentinels::NOT_DOCUMENTED.into()))
        );
    }

    #[test]
    fn missing_vitals_default_to_five_not_measured() {
        let record = extract_clinical(r#""Patient Name": "Jane Doe""#);
        assert_eq!(record.vital_signs.len(), 5);
        for name in sentinels::DEFAULT_VITALS {
            assert_eq!(
                record.vital_signs.get(name).map(String::as_str),
                Some(sentinels::NOT_MEASURED)
            );
        }
    }

    #[test]
    fn empty_list_uses_placeholder() {
        let (record, report) = extract_clinical_with_report(r#""Orders": [ ]"#);
        assert_eq!(record.orders, vec![sentinels::NO_ORDERS]);
        assert!(report.was_defaulted(labels::ORDERS));
    }

    #[test]
    fn list_where_scalar_expected_is_a_miss() {
        let (record, report) = extract_clinical_with_report(r#""Provider": [ "Dr. A" ]"#);
        assert_eq!(record.provider, sentinels::PROVIDER);
        assert!(report.was_defaulted(labels::PROVIDER));
    }

    #[test]
    fn blank_scalar_is_a_miss() {
        let record = extract_clinical(r#""Patient Name": "   ""#);
        assert_eq!(record.patient_name, sentinels::PATIENT_NAME);
    }

    #[test]
    fn top_level_assessment_and_plan_are_found() {
        let record = extract_clinical(
            r#""Assessment": "Osteoarthritis", "Plan": [ "Weight loss", "Follow up in 6 weeks" ]"#,
        );
        assert_eq!(record.assessment, "Osteoarthritis");
        assert_eq!(record.plan, vec!["Weight loss", "Follow up in 6 weeks"]);
    }
}
