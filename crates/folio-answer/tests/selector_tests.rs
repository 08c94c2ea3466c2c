use folio_answer::{select_answer, AnswerSelector, AnswerSource, DEFAULT_MIN_RATIO};
use folio_core::types::{ChunkMeta, RetrievedResult};

fn hit(index: usize, text: &str, score: f32) -> RetrievedResult {
    RetrievedResult { index, text: text.to_string(), score, metadata: ChunkMeta { source_file: Some("faq.txt".into()) } }
}

fn faq_hits() -> Vec<RetrievedResult> {
    vec![
        hit(3, "  I build backend services in Rust.  ", 0.4),
        hit(0, "Q: What is your name? A: I am a bot.", 0.9),
        hit(1, "Q: Where are you based? A: Lisbon, Portugal.", 1.1),
    ]
}

#[test]
fn close_question_returns_the_faq_answer() {
    let answer = select_answer(faq_hits(), "what is ur name").unwrap();
    assert_eq!(answer.response, "I am a bot.");
    match answer.source {
        AnswerSource::Faq { ratio } => assert!((ratio - 30.0 / 33.0).abs() < 1e-9),
        other => panic!("unexpected source {other:?}"),
    }
}

#[test]
fn best_matching_pair_wins_regardless_of_rank() {
    let answer = select_answer(faq_hits(), "Where are you located?").unwrap();
    assert_eq!(answer.response, "Lisbon, Portugal.");
}

#[test]
fn weak_match_falls_back_to_top_chunk() {
    let answer = select_answer(faq_hits(), "I like hiking and coffee.").unwrap();
    assert_eq!(answer.response, "I build backend services in Rust.");
    assert_eq!(answer.source, AnswerSource::TopChunk);
}

#[test]
fn ratio_equal_to_threshold_is_not_enough() {
    // "abc" vs "abcdefg" scores exactly 0.6.
    let results = vec![hit(0, "top chunk", 0.1), hit(1, "Q: ABC A: letters", 0.2)];
    let answer = AnswerSelector::new(DEFAULT_MIN_RATIO).select(results.clone(), "abcdefg").unwrap();
    assert_eq!(answer.response, "top chunk");

    let looser = AnswerSelector::new(0.5).select(results, "abcdefg").unwrap();
    assert_eq!(looser.response, "letters");
}

#[test]
fn ties_keep_the_first_pair() {
    let results = vec![hit(0, "Q: Same? A: first\nQ: Same? A: second", 0.0)];
    assert_eq!(select_answer(results, "same?").unwrap().response, "first");
}

#[test]
fn pairs_are_found_across_joined_chunks() {
    // Chunks are joined with newlines, so a `Q:` chunk terminates the previous answer.
    let results = vec![hit(5, "Q: Do you freelance? A: Sometimes.", 0.3), hit(6, "Q: Rates? A: On request.", 0.5)];
    let answer = select_answer(results, "do you freelance?").unwrap();
    assert_eq!(answer.response, "Sometimes.");
}

#[test]
fn docs_are_passed_through_unchanged() {
    let hits = faq_hits();
    let answer = select_answer(hits.clone(), "what is your name?").unwrap();
    assert_eq!(answer.docs, hits);
}

#[test]
fn no_results_means_no_answer() {
    assert!(select_answer(Vec::new(), "anything").is_none());
}

#[test]
fn chunks_without_pairs_use_the_top_chunk() {
    let results = vec![hit(2, "Contact me by email.", 0.2), hit(4, "I like hiking.", 0.7)];
    let answer = AnswerSelector::default().select(results, "how do I reach you").unwrap();
    assert_eq!(answer.response, "Contact me by email.");
    assert_eq!(answer.source, AnswerSource::TopChunk);
}

#[test]
fn source_serializes_with_a_kind_tag() {
    let json = serde_json::to_value(AnswerSource::Faq { ratio: 1.0 }).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "faq", "ratio": 1.0 }));
    let json = serde_json::to_value(AnswerSource::TopChunk).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "top_chunk" }));
}

#[test]
fn answer_on_its_own_line_is_matched() {
    let results = vec![hit(0, "Q: What is your name?\nA: I am a bot.", 0.2)];
    assert_eq!(select_answer(results.clone(), "what is your name").unwrap().response, "I am a bot.");
    assert_eq!(
        select_answer(results, "do you ship internationally").unwrap().response,
        "Q: What is your name?\nA: I am a bot."
    );
}
