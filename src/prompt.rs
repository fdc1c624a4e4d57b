//! Prompt construction for question generation.
//!
//! Each question kind has a template with `{difficulty}`, `{topic}` and
//! `{format_instructions}` placeholders. Format instructions embed the JSON
//! Schema of the target type so the reply can be decoded strictly.

use schemars::JsonSchema;

use crate::schema::{
    Difficulty, FillBlankQuestion, McqQuestion, QuestionKind, BLANK_MARKER, MCQ_OPTION_COUNT,
};

const OUTPUT_RULES: &str = "You must return ONLY a valid JSON object.\n\
Do NOT include explanations, markdown, examples, or extra text.";

/// Template for multiple-choice questions.
pub const MCQ_TEMPLATE: &str = "Generate a {difficulty} multiple-choice question about {topic}.\n\n\
{output_rules}\n\n\
{format_instructions}";

/// Template for fill-in-the-blank questions.
pub const FILL_BLANK_TEMPLATE: &str = "Generate a {difficulty} fill-in-the-blank question about {topic}.\n\n\
{output_rules}\n\n\
{format_instructions}";

/// Render `{key}` placeholders from `vars` in a single pass.
///
/// `{{` and `}}` produce literal braces. Unknown placeholders are left as-is,
/// and substituted values are never re-scanned, so a topic containing
/// `{format_instructions}` stays literal.
///
/// # Example
///
/// ```
/// use quiz_pipeline::prompt::render;
///
/// let out = render("About {topic}: {{\"k\": 1}}", &[("topic", "rust")]);
/// assert_eq!(out, r#"About rust: {"k": 1}"#);
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some((_, value)) = vars.iter().find(|(k, _)| *k == key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// The template for a question kind.
pub fn template_for(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Mcq => MCQ_TEMPLATE,
        QuestionKind::FillBlank => FILL_BLANK_TEMPLATE,
    }
}

/// Machine-readable description of the reply shape for a question kind.
pub fn format_instructions(kind: QuestionKind) -> String {
    match kind {
        QuestionKind::Mcq => schema_instructions::<McqQuestion>(&format!(
            "\"options\" must contain exactly {} strings, and \"correct_answer\" must be \
             copied verbatim from \"options\".",
            MCQ_OPTION_COUNT
        )),
        QuestionKind::FillBlank => schema_instructions::<FillBlankQuestion>(&format!(
            "\"question\" must contain {} where the answer belongs, and \"answer\" is the \
             text that fills it.",
            BLANK_MARKER
        )),
    }
}

fn schema_instructions<T: JsonSchema>(constraints: &str) -> String {
    let schema = schemars::schema_for!(T);
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below. \
         Do not add properties that are not in the schema.\n\n\
         Here is the output schema:\n```\n{:#}\n```\n\n{}",
        schema.as_value(),
        constraints
    )
}

/// Build the complete prompt for one question.
///
/// Pure: the same inputs always give the same prompt.
pub fn build_prompt(kind: QuestionKind, topic: &str, difficulty: Difficulty) -> String {
    let instructions = format_instructions(kind);
    render(
        template_for(kind),
        &[
            ("difficulty", difficulty.as_str()),
            ("topic", topic.trim()),
            ("output_rules", OUTPUT_RULES),
            ("format_instructions", &instructions),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_and_unescapes() {
        let out = render("{a} and {b} {{x}}", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "1 and 2 {x}");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("hi {name}", &[]), "hi {name}");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render("{topic} / {other}", &[("topic", "{other}"), ("other", "X")]);
        assert_eq!(out, "{other} / X");
    }

    #[test]
    fn test_render_lone_closing_brace() {
        assert_eq!(render("a } b", &[]), "a } b");
    }

    #[test]
    fn test_mcq_prompt_mentions_topic_difficulty_and_schema() {
        let prompt = build_prompt(QuestionKind::Mcq, "Indian History", Difficulty::Hard);
        assert!(prompt.starts_with("Generate a hard multiple-choice question about Indian History."));
        assert!(prompt.contains("ONLY a valid JSON object"));
        assert!(prompt.contains("\"correct_answer\""));
        assert!(prompt.contains("\"options\""));
        assert!(prompt.contains("exactly 4"));
        assert!(!prompt.contains("{format_instructions}"));
    }

    #[test]
    fn test_fill_blank_prompt_mentions_marker() {
        let prompt = build_prompt(QuestionKind::FillBlank, "Geography", Difficulty::Easy);
        assert!(prompt.starts_with("Generate a easy fill-in-the-blank question about Geography."));
        assert!(prompt.contains("\"answer\""));
        assert!(prompt.contains("___"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(QuestionKind::Mcq, "Rust", Difficulty::Medium);
        let b = build_prompt(QuestionKind::Mcq, "Rust", Difficulty::Medium);
        assert_eq!(a, b);
    }
}
