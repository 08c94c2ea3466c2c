//! Scanner for `Q: <question> A: <answer>` blocks embedded in free text.
//!
//! A block starts at `Q:`. The question runs to the first `A:` that follows
//! at least one question character; the answer runs to the next line that
//! starts with `Q:` (a `\nQ:` sequence) or to the end of the text, and may
//! span several lines. Leading whitespace after each marker and trailing
//! whitespace before `A:` are not part of the captured text. Blocks never
//! overlap: scanning resumes where the previous answer ended.

use thiserror::Error;

const QUESTION_MARKER: &str = "Q:";
const ANSWER_MARKER: &str = "A:";
const NEXT_BLOCK: &str = "\nQ:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// A `Q:` marker that could not be turned into a pair. `offset` is the byte
/// position of the marker in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBlock {
    #[error("question at byte {offset} has no `A:` marker")]
    MissingAnswerMarker { offset: usize },
    #[error("question at byte {offset} has an empty answer")]
    EmptyAnswer { offset: usize },
}

pub struct FaqScanner<'a> {
    text: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> FaqScanner<'a> {
    pub fn new(text: &'a str) -> Self { Self { text, pos: 0, done: false } }

    fn next_block(&mut self) -> Option<Result<QaPair, MalformedBlock>> {
        let text = self.text;
        let offset = self.pos + text[self.pos..].find(QUESTION_MARKER)?;
        let q_begin = skip_whitespace(text, offset + QUESTION_MARKER.len());

        // The question owns at least its first non-blank character, so an
        // `A:` right after `Q:` is question text rather than the answer
        // marker, and a blank question never forms a pair.
        let Some(first) = text[q_begin..].chars().next() else {
            self.done = true;
            return Some(Err(MalformedBlock::MissingAnswerMarker { offset }));
        };
        let search_from = q_begin + first.len_utf8();
        let Some(a_rel) = text[search_from..].find(ANSWER_MARKER) else {
            // No `A:` anywhere after this point, so no later block can match either.
            self.done = true;
            return Some(Err(MalformedBlock::MissingAnswerMarker { offset }));
        };
        let a_marker = search_from + a_rel;
        let question = text[q_begin..a_marker].trim_end();

        let a_begin = skip_whitespace(text, a_marker + ANSWER_MARKER.len());
        if a_begin >= text.len() {
            self.done = true;
            return Some(Err(MalformedBlock::EmptyAnswer { offset }));
        }
        let a_end = text[a_begin..].find(NEXT_BLOCK).map_or(text.len(), |rel| a_begin + rel);
        self.pos = a_end;

        let answer = text[a_begin..a_end].trim();
        Some(Ok(QaPair { question: question.to_string(), answer: answer.to_string() }))
    }
}

impl Iterator for FaqScanner<'_> {
    type Item = Result<QaPair, MalformedBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { return None; }
        let item = self.next_block();
        if item.is_none() { self.done = true; }
        item
    }
}

/// Every well-formed pair in `text`, in order of appearance. Malformed blocks
/// are logged and skipped.
pub fn extract_pairs(text: &str) -> Vec<QaPair> {
    FaqScanner::new(text)
        .filter_map(|block| match block {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::debug!("Skipping FAQ block: {}", e);
                None
            }
        })
        .collect()
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..].char_indices().find(|(_, c)| !c.is_whitespace()).map_or(text.len(), |(i, _)| from + i)
}
