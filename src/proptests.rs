//! Property-based tests for add/remove round-trips and ranking-order
//! agreement across policies. Kept as a standalone `#[cfg(test)]` module
//! (rather than inline in each component) since these properties span
//! several modules at once.

#![cfg(test)]

use crate::document::DocumentStatus;
use crate::engine::Engine;
use crate::executors::Policy;
use crate::stop_words::StopWords;
use proptest::prelude::*;

fn ascii_word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn document_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(ascii_word(), 1..10).prop_map(|words| words.join(" "))
}

proptest! {
    /// add(id, ...) then remove(id) restores count and word_frequencies.
    #[test]
    fn add_remove_round_trip(text in document_text(), ratings in proptest::collection::vec(-100i32..100, 0..5)) {
        let mut engine = Engine::with_stop_words(StopWords::default());
        let before = engine.count();
        engine.add(1, text, DocumentStatus::Actual, &ratings).unwrap();
        engine.remove(1);
        prop_assert_eq!(engine.count(), before);
        prop_assert!(engine.word_frequencies(1).is_empty());
    }

    /// Sequenced and parallel find_top agree on the ordered id list for
    /// arbitrary single-word queries over a small fixed corpus.
    #[test]
    fn sequenced_and_parallel_rankers_agree(word in ascii_word()) {
        let mut engine = Engine::with_stop_words(StopWords::default());
        engine.add(1, format!("{word} one two"), DocumentStatus::Actual, &[1]).unwrap();
        engine.add(2, format!("one {word} {word}"), DocumentStatus::Actual, &[2]).unwrap();
        engine.add(3, "three four five".into(), DocumentStatus::Actual, &[3]).unwrap();

        let seq = engine.find_top_actual(Policy::Sequenced, &word).unwrap();
        let par = engine.find_top_actual(Policy::Parallel, &word).unwrap();

        let seq_ids: Vec<i32> = seq.iter().map(|d| d.id).collect();
        let par_ids: Vec<i32> = par.iter().map(|d| d.id).collect();
        prop_assert_eq!(seq_ids, par_ids);
    }

    /// find_top never returns more than MAX_RESULT_DOCUMENT_COUNT results.
    #[test]
    fn result_size_is_bounded(n in 0usize..20) {
        let mut engine = Engine::with_stop_words(StopWords::default());
        for i in 0..n {
            engine.add(i as i32, "cat".into(), DocumentStatus::Actual, &[i as i32]).unwrap();
        }
        let results = engine.find_top_actual(Policy::Sequenced, "cat").unwrap();
        prop_assert!(results.len() <= crate::config::MAX_RESULT_DOCUMENT_COUNT);
    }
}
