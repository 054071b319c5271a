// Shared prompt fragments.
// Each feature module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Fragment that pins the evaluation output to the four-field feedback schema.
pub const FEEDBACK_JSON_INSTRUCTION: &str = r#"Respond ONLY with a JSON object in exactly this format:
{
  "correctness": <number from 0 to 10>,
  "clarity": <number from 0 to 10>,
  "confidence": <number from 0 to 10>,
  "overall_feedback": "<two to four sentences of constructive feedback>"
}
Do NOT include any text outside the JSON object."#;

/// Scoring rubric shared by every evaluation prompt.
pub const SCORING_RUBRIC: &str = "\
Score each dimension from 0 to 10:
- correctness: technical accuracy and completeness of the answer
- clarity: structure and how easy the answer is to follow
- confidence: how assured and decisive the answer sounds";

/// Fills `{key}` placeholders in a single left-to-right pass.
/// Substituted values are never rescanned, so caller text that happens to
/// contain `{question}` or similar lands in the prompt verbatim.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let filled = values.iter().find_map(|(key, value)| {
            after_brace
                .strip_prefix(key)?
                .strip_prefix('}')
                .map(|tail| (*value, tail))
        });
        match filled {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}
