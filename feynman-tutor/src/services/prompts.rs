//! Prompt templates for the three model capabilities
//!
//! Decomposition, tutor persona and feedback scoring. Templates are fixed
//! text parameterized only by concept metadata, the audience framing and
//! the flattened transcript.

use feynman_common::db::{AudienceLevel, ProgressStatus, Turn};

/// Fixed learner utterance that opens every review session
pub const OPENING_UTTERANCE: &str = "I'm ready to explain this concept.";

/// Lower bound on a decomposition batch
pub const MIN_CONCEPTS: usize = 5;

/// Upper bound on a decomposition batch
pub const MAX_CONCEPTS: usize = 15;

/// Audience-specific framing phrase inserted into the tutor persona
pub fn audience_framing(level: AudienceLevel) -> &'static str {
    match level {
        AudienceLevel::Classmate => {
            "a fellow classmate who is taking the same course but missed this lecture. \
             You know the basic vocabulary of the subject but not this topic"
        }
        AudienceLevel::MiddleSchooler => {
            "a curious middle school student, about twelve years old, with no background \
             in this subject. You understand everyday words but not technical terms"
        }
        AudienceLevel::Child => {
            "a five-year-old child. You only understand very simple, everyday words and \
             you love asking \"why?\""
        }
    }
}

/// System instruction for concept decomposition
pub fn decomposition_system_prompt() -> String {
    format!(
        "You are an expert teacher preparing study material. Break the lecture text the \
         user provides into between {min} and {max} discrete, bite-sized learning concepts.\n\
         \n\
         Respond with ONLY a JSON array, no prose and no Markdown. Each element must be an \
         object with exactly two string fields:\n\
         - \"concept_name\": a short title (at most eight words)\n\
         - \"concept_description\": two or three sentences explaining the concept\n\
         \n\
         Example: [{{\"concept_name\": \"Photosynthesis Inputs and Outputs\", \
         \"concept_description\": \"...\"}}]",
        min = MIN_CONCEPTS,
        max = MAX_CONCEPTS,
    )
}

/// User message carrying the lecture body for decomposition
pub fn decomposition_user_prompt(lecture_name: &str, raw_text: &str) -> String {
    format!("Lecture title: {}\n\nLecture text:\n{}", lecture_name, raw_text)
}

/// Tutor persona instruction for one concept and audience
pub fn persona_prompt(concept_name: &str, concept_description: &str, level: AudienceLevel) -> String {
    format!(
        "You are role-playing as {framing}.\n\
         \n\
         A student is going to teach you the concept \"{name}\" using the Feynman technique. \
         For your reference only, the concept is: {description}\n\
         \n\
         Rules:\n\
         - Stay in character. Never lecture, never reveal or state the answer yourself.\n\
         - Ask exactly one short question at a time (one to three sentences).\n\
         - When the student uses a term you would not know, ask what it means.\n\
         - Ask for an example or an analogy when an explanation is abstract.\n\
         - If the explanation is wrong, express gentle confusion instead of correcting it.\n\
         - Use only words your character would understand.",
        framing = audience_framing(level),
        name = concept_name,
        description = concept_description,
    )
}

/// Flatten a transcript into labeled `Student:` / `Tutor:` dialogue lines
pub fn flatten_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|turn| format!("{}: {}", turn.role.speaker_label(), turn.content.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System instruction for feedback scoring
pub fn feedback_system_prompt() -> String {
    format!(
        "You evaluate how well a student explained a concept to a tutor during a Feynman \
         technique review. Respond with ONLY a JSON object of this exact shape:\n\
         {{\n\
         \x20 \"summary\": string (two or three sentences of encouraging, specific feedback),\n\
         \x20 \"clearlyExplained\": [string] (points the student explained clearly),\n\
         \x20 \"unclearPoints\": [string] (points that were vague, wrong or missing),\n\
         \x20 \"jargonUsed\": [string] (technical terms used without explanation),\n\
         \x20 \"progressLevel\": one of \"{ns}\", \"{rv}\", \"{un}\", \"{ms}\"\n\
         }}\n\
         \n\
         Choose progressLevel with these criteria:\n\
         - \"{ns}\": no real attempt, or the explanation is off-track\n\
         - \"{rv}\": attempted, but with major gaps or misconceptions\n\
         - \"{un}\": mostly correct with minor gaps\n\
         - \"{ms}\": complete and correct, and the student used an analogy or example",
        ns = ProgressStatus::NotStarted,
        rv = ProgressStatus::Reviewing,
        un = ProgressStatus::Understood,
        ms = ProgressStatus::Mastered,
    )
}

/// User message carrying concept metadata and the flattened dialogue
pub fn feedback_user_prompt(concept_name: &str, concept_description: &str, transcript: &[Turn]) -> String {
    format!(
        "Concept: {}\nReference description: {}\n\nDialogue:\n{}",
        concept_name,
        concept_description,
        flatten_transcript(transcript)
    )
}

/// Strip a Markdown code fence wrapped around a model payload
///
/// Models asked for bare JSON still occasionally answer with
/// "```json ... ```"; anything else is returned trimmed and untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_embeds_concept_and_framing() {
        let prompt = persona_prompt("Photosynthesis", "Plants make glucose.", AudienceLevel::Child);
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("Plants make glucose."));
        assert!(prompt.contains("five-year-old"));
    }

    #[test]
    fn test_each_audience_has_distinct_framing() {
        let a = audience_framing(AudienceLevel::Classmate);
        let b = audience_framing(AudienceLevel::MiddleSchooler);
        let c = audience_framing(AudienceLevel::Child);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_flatten_transcript_labels_speakers() {
        let transcript = vec![
            Turn::user(OPENING_UTTERANCE),
            Turn::assistant("What do plants eat?"),
            Turn::user("  Sunlight, sort of.  "),
        ];
        assert_eq!(
            flatten_transcript(&transcript),
            "Student: I'm ready to explain this concept.\nTutor: What do plants eat?\nStudent: Sunlight, sort of."
        );
    }

    #[test]
    fn test_feedback_prompt_lists_all_levels() {
        let prompt = feedback_system_prompt();
        for status in ProgressStatus::ALL {
            assert!(prompt.contains(status.as_str()), "missing {}", status);
        }
        assert!(prompt.contains("\"jargonUsed\""));
    }

    #[test]
    fn test_decomposition_prompt_states_bounds() {
        let prompt = decomposition_system_prompt();
        assert!(prompt.contains("between 5 and 15"));
        assert!(prompt.contains("concept_description"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  [1]  "), "[1]");
        assert_eq!(strip_code_fence("```json [1]"), "```json [1]");
    }
}
