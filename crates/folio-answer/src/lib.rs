//! Answer selection on top of retrieval: FAQ pair extraction, fuzzy question
//! matching, and the chat entry point used by the HTTP layer.

pub mod chat;
pub mod faq;
pub mod matcher;
pub mod selector;

pub use chat::{chat, ChatError, ChatResponse, NO_INFORMATION_RESPONSE};
pub use faq::{extract_pairs, FaqScanner, MalformedBlock, QaPair};
pub use matcher::{similarity, SequenceMatcher};
pub use selector::{select_answer, Answer, AnswerSelector, AnswerSource, DEFAULT_MIN_RATIO};
