//! Resume Analysis: orchestrates the resume pipeline.
//!
//! Flow: uploaded file → extract text → delete file → normalize/validate →
//!       build prompt → generate_with_fallback → response payload.
//!
//! The model is never called unless the extracted text passes validation.

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::feedback::{parse_feedback, FeedbackResult};
use crate::llm_client::{generate_with_fallback, GenerativeModel, ModelPair, RetryPolicy};
use crate::resume::extractor::{char_length, clean_text, word_count, TextExtractor};
use crate::resume::prompts::{build_resume_evaluation_prompt, build_resume_questions_prompt};
use crate::resume::upload::UploadedFile;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetadata {
    pub text_length: usize,
    pub word_count: usize,
}

/// Response for a successful resume upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisResponse {
    /// Raw model output: five numbered questions.
    pub questions: String,
    pub resume_text: String,
    pub metadata: TextMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeEvaluationResponse {
    pub feedback: FeedbackResult,
    pub score: f64,
}

/// The collaborators a pipeline run needs.
pub struct Pipeline<'a> {
    pub extractor: &'a dyn TextExtractor,
    pub llm: &'a dyn GenerativeModel,
    pub models: &'a ModelPair,
    pub retry: &'a RetryPolicy,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

impl Pipeline<'_> {
    /// Extracts and cleans the text of `upload`, consuming it.
    /// The file is removed once extraction finishes, whatever the outcome.
    pub async fn extract_resume_text(&self, upload: UploadedFile) -> Result<String, AppError> {
        let extracted = self.extractor.extract(upload.path()).await;
        upload.discard();
        Ok(clean_text(&extracted?)?)
    }

    /// Runs the full upload pipeline and assembles the response payload.
    pub async fn analyze_resume(
        &self,
        upload: UploadedFile,
    ) -> Result<ResumeAnalysisResponse, AppError> {
        let name = upload.original_name().unwrap_or("<unnamed>").to_string();
        debug!("Analyzing upload {name} ({} bytes)", upload.size());
        let resume_text = self.extract_resume_text(upload).await?;
        let metadata = TextMetadata {
            text_length: char_length(&resume_text),
            word_count: word_count(&resume_text),
        };
        info!(
            "Extracted {} characters ({} words) from {name}",
            metadata.text_length, metadata.word_count
        );

        let prompt = build_resume_questions_prompt(&resume_text);
        let questions = generate_with_fallback(self.llm, self.models, &prompt, self.retry).await?;

        Ok(ResumeAnalysisResponse {
            questions,
            resume_text,
            metadata,
        })
    }

    /// Evaluates an answer against the candidate's resume and scores the feedback.
    pub async fn evaluate_answer(
        &self,
        resume_text: &str,
        question: &str,
        answer: &str,
    ) -> Result<ResumeEvaluationResponse, AppError> {
        let prompt = build_resume_evaluation_prompt(resume_text, question, answer);
        let raw = generate_with_fallback(self.llm, self.models, &prompt, self.retry).await?;

        let feedback = parse_feedback(&raw);
        match feedback.overall_feedback() {
            Some(summary) => debug!("Structured feedback: {summary}"),
            None if !feedback.is_structured() => {
                info!("Model feedback was not valid JSON; returning raw text")
            }
            None => {}
        }
        let score = feedback.safe_score();
        Ok(ResumeEvaluationResponse { feedback, score })
    }
}
