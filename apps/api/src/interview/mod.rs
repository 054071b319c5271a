// Interview practice: domain questions and answer evaluation.
// Both endpoints make a single model call with the primary model. They do not
// go through generate_with_fallback, unlike the resume pipeline.

pub mod handlers;
pub mod prompts;
