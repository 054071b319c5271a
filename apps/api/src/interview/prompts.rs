// Interview prompt templates.

use crate::llm_client::prompts::{fill_template, FEEDBACK_JSON_INSTRUCTION, SCORING_RUBRIC};

pub const QUESTION_TEMPLATE: &str = r#"You are an experienced interviewer for {domain} roles.
Ask ONE realistic interview question a candidate in {domain} is likely to face.
Return only the question text, with no numbering, preamble or answer."#;

pub const EVALUATION_TEMPLATE: &str = r#"You are an experienced interviewer evaluating a candidate's answer.

QUESTION:
{question}

CANDIDATE ANSWER:
{answer}

{rubric}

{json_instruction}"#;

pub fn build_question_prompt(domain: &str) -> String {
    fill_template(QUESTION_TEMPLATE, &[("domain", domain.trim())])
}

pub fn build_evaluation_prompt(question: &str, answer: &str) -> String {
    fill_template(
        EVALUATION_TEMPLATE,
        &[
            ("question", question),
            ("answer", answer),
            ("rubric", SCORING_RUBRIC),
            ("json_instruction", FEEDBACK_JSON_INSTRUCTION),
        ],
    )
}
