use serde::{Deserialize, Serialize};

use folio_core::types::RetrievedResult;

use crate::faq::extract_pairs;
use crate::matcher::similarity;

pub const DEFAULT_MIN_RATIO: f64 = 0.6;

/// Where the response text came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSource {
    /// A FAQ pair whose question matched with this ratio.
    Faq { ratio: f64 },
    /// The top-ranked retrieved chunk.
    TopChunk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub response: String,
    pub docs: Vec<RetrievedResult>,
    pub source: AnswerSource,
}

/// Picks a reply out of retrieved chunks.
///
/// FAQ pairs found in the chunks are matched against the user's question; the
/// best one wins if its ratio is strictly above `min_ratio`. Otherwise the
/// top-ranked chunk is returned verbatim (trimmed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerSelector {
    min_ratio: f64,
}

impl Default for AnswerSelector {
    fn default() -> Self { Self { min_ratio: DEFAULT_MIN_RATIO } }
}

impl AnswerSelector {
    pub fn new(min_ratio: f64) -> Self { Self { min_ratio } }

    pub fn min_ratio(&self) -> f64 { self.min_ratio }

    /// `None` when `results` is empty.
    pub fn select(&self, results: Vec<RetrievedResult>, question: &str) -> Option<Answer> {
        let top = results.first()?.text.trim().to_string();
        let context = results.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join("\n");

        let mut best: Option<(f64, String)> = None;
        for pair in extract_pairs(&context) {
            let ratio = similarity(&pair.question, question);
            if best.as_ref().map_or(true, |(score, _)| ratio > *score) {
                best = Some((ratio, pair.answer));
            }
        }

        let (response, source) = match best {
            Some((ratio, answer)) if ratio > self.min_ratio => {
                tracing::info!("Fuzzy match found with score {:.2}", ratio);
                (answer, AnswerSource::Faq { ratio })
            }
            _ => {
                tracing::info!("No strong match found; using top-ranked context snippet");
                (top, AnswerSource::TopChunk)
            }
        };
        Some(Answer { response, docs: results, source })
    }
}

/// [`AnswerSelector::select`] with the default threshold.
pub fn select_answer(results: Vec<RetrievedResult>, question: &str) -> Option<Answer> {
    AnswerSelector::default().select(results, question)
}
