use std::sync::Arc;

use crate::auth::identity::IdentityProvider;
use crate::auth::store::UserStore;
use crate::config::Config;
use crate::llm_client::{GenerativeModel, ModelPair, RetryPolicy};
use crate::resume::extractor::TextExtractor;
use crate::resume::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every client is built once in `main` and shared by reference count.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn GenerativeModel>,
    pub models: ModelPair,
    pub retry: RetryPolicy,
    /// Pluggable text extractor. Default: `PdfExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    pub identity: Arc<dyn IdentityProvider>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline {
            extractor: self.extractor.as_ref(),
            llm: self.llm.as_ref(),
            models: &self.models,
            retry: &self.retry,
        }
    }
}
