// Resume pipeline prompt templates.
// All prompts for the resume module are defined here.

use crate::llm_client::prompts::{fill_template, FEEDBACK_JSON_INSTRUCTION, SCORING_RUBRIC};

pub const RESUME_QUESTIONS_TEMPLATE: &str = r#"You are an experienced technical interviewer. Read the candidate's resume below and prepare an interview.

RESUME:
{resume_text}

INSTRUCTIONS:
1. Generate exactly 5 interview questions.
2. Number the questions 1 to 5, one per line, in the form "1. <question>".
3. Every question must be specific to the skills, experience and projects stated in this resume.
4. Mix technical depth questions with questions about the candidate's concrete contributions.
5. Return only the numbered questions, with no introduction or closing remarks."#;

pub const RESUME_EVALUATION_TEMPLATE: &str = r#"You are an experienced technical interviewer evaluating a candidate's answer.
Judge the answer against the candidate's own resume as well as general technical accuracy.

RESUME:
{resume_text}

QUESTION:
{question}

CANDIDATE ANSWER:
{answer}

{rubric}

{json_instruction}"#;

/// Interview-question prompt for a cleaned resume text. Deterministic.
pub fn build_resume_questions_prompt(resume_text: &str) -> String {
    fill_template(RESUME_QUESTIONS_TEMPLATE, &[("resume_text", resume_text)])
}

/// Answer-evaluation prompt grounded in the candidate's resume.
pub fn build_resume_evaluation_prompt(resume_text: &str, question: &str, answer: &str) -> String {
    fill_template(
        RESUME_EVALUATION_TEMPLATE,
        &[
            ("resume_text", resume_text),
            ("question", question),
            ("answer", answer),
            ("rubric", SCORING_RUBRIC),
            ("json_instruction", FEEDBACK_JSON_INSTRUCTION),
        ],
    )
}
