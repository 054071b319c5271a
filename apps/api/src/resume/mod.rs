// Resume pipeline: PDF upload → text extraction → tailored interview questions,
// plus resume-grounded answer evaluation.
// All LLM calls go through llm_client::generate_with_fallback.

pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod upload;
