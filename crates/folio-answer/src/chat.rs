use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::types::RetrievedResult;
use folio_vector::RetrievalContext;

use crate::selector::AnswerSelector;

pub const NO_INFORMATION_RESPONSE: &str =
    "Sorry, I couldn't find any relevant information to answer your question.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Question is empty")]
    EmptyQuestion,
}

/// Reply body handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub docs: Vec<RetrievedResult>,
}

/// Answer one user question end to end: validate, retrieve, select.
pub fn chat(ctx: &RetrievalContext, selector: &AnswerSelector, question: &str, top_k: usize) -> Result<ChatResponse, ChatError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ChatError::EmptyQuestion);
    }
    tracing::info!("Received question: {}", question);

    let docs = ctx.retrieve_documents(question, top_k);
    tracing::info!("Retrieved {} documents", docs.len());

    match selector.select(docs, question) {
        Some(answer) => Ok(ChatResponse { response: answer.response, docs: answer.docs }),
        None => Ok(ChatResponse { response: NO_INFORMATION_RESPONSE.to_string(), docs: Vec::new() }),
    }
}
