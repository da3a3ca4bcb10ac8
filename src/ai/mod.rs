//! Hosted-model answering and local summarization.
//!
//! [`gemini::GeminiClient`] turns a question plus retrieved note text into an
//! answer. [`summarize::summarize`] is a purely local sentence extractor.

pub mod gemini;
pub mod summarize;

use thiserror::Error;

pub use gemini::GeminiClient;
pub use summarize::summarize;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("{0} not found in the environment or .env file")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("provider returned no text")]
    EmptyResponse,
}

impl AiError {
    /// Displayable text for the failure, in the form shown in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey(var) => format!("⚠️ Error: {var} not found."),
            other => format!("❌ AI Engine Error: {other}"),
        }
    }
}

/// Prompt sent to the hosted model for a question over retrieved notes.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a secure vault assistant. Use the following retrieved notes to answer.\n\
         Notes Context: {context}\n\
         User Question: {question}\n"
    )
}
