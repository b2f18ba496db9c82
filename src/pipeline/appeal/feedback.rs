use super::types::ValidationResult;

/// Letters scoring at or below this tone score get a tone instruction.
pub const TONE_THRESHOLD: i8 = 7;

pub const NAME_INSTRUCTION: &str = "State the patient's full name explicitly, in the opening \
paragraph and again wherever the patient is referenced.";

pub const CLAIM_NUMBER_INSTRUCTION: &str = "Include the claim number prominently, in the \
subject line and in the first paragraph.";

pub const TONE_INSTRUCTION: &str = "Adopt a more persuasive, empathetic and authoritative \
professional tone, as a treating physician advocating for the patient.";

pub const NECESSITY_INSTRUCTION: &str = "Strengthen the evidence-based medical necessity \
argument: cite specific findings from the examination, imaging and history, and state \
explicitly why the procedure was medically necessary.";

/// One corrective instruction per failed criterion, in a fixed order.
pub fn synthesize_feedback(result: &ValidationResult) -> Vec<String> {
    let mut instructions = Vec::new();

    if !result.contains_patient_name {
        instructions.push(NAME_INSTRUCTION.to_string());
    }
    if !result.contains_claim_number {
        instructions.push(CLAIM_NUMBER_INSTRUCTION.to_string());
    }
    if result.sentiment_score <= TONE_THRESHOLD {
        instructions.push(TONE_INSTRUCTION.to_string());
    }
    if !result.contains_medical_necessity {
        instructions.push(NECESSITY_INSTRUCTION.to_string());
    }

    instructions
}
