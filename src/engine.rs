//! The public facade tying the index, ranker, and batch pipeline together.

use crate::document::{Document, DocumentStatus};
use crate::errors::Result;
use crate::executors::Policy;
use crate::index::Index;
use crate::config::EngineConfig;
use crate::ranking;
use crate::stop_words::StopWords;
use ahash::AHashMap;
use tracing::debug;

/// An in-memory TF-IDF search engine over a fixed stop-word set.
///
/// Mutations (`add`, `remove`) must not run concurrently with queries or
/// with each other — callers embedding `Engine` in a multi-threaded
/// service are responsible for serializing them (e.g. behind a
/// readers-writer lock).
pub struct Engine {
    index: Index,
    config: EngineConfig,
}

impl Engine {
    /// Builds an engine from a whitespace-delimited stop-word string, the
    /// common case of the external interface. Fails with `InvalidArgument`
    /// if any stop word contains a control character. For a stop-word set
    /// built from an arbitrary string sequence, build it with
    /// [`StopWords::from_iter`] and pass it to [`Engine::with_stop_words`].
    pub fn new(stop_words: &str) -> Result<Self> {
        Ok(Self::with_stop_words(StopWords::from_str(stop_words)?))
    }

    /// Builds an engine from an already-constructed stop-word set and
    /// default tunables.
    pub fn with_stop_words(stop_words: StopWords) -> Self {
        Self::with_config(stop_words, EngineConfig::default())
    }

    /// Builds an engine with explicit tunables (bucket count, epsilon,
    /// top-k), e.g. for tests that want a smaller `bucket_count`.
    pub fn with_config(stop_words: StopWords, config: EngineConfig) -> Self {
        Self { index: Index::new(stop_words), config }
    }

    pub fn add(&mut self, id: i32, text: String, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        let result = self.index.add(id, text, status, ratings);
        if let Err(ref err) = result {
            debug!("add({id}) rejected: {err}");
        }
        result
    }

    /// Removes `id` under the sequenced policy. A no-op if `id` is absent.
    pub fn remove(&mut self, id: i32) {
        self.index.remove(Policy::Sequenced, id);
    }

    /// Removes `id`, parallelizing the per-word index cleanup via C7.
    pub fn remove_parallel(&mut self, id: i32) {
        self.index.remove(Policy::Parallel, id);
    }

    /// Ranked search. `predicate` receives `(id, status, rating)`; see
    /// [`Engine::find_top_actual`] and [`Engine::find_top_with_status`] for
    /// the common cases.
    pub fn find_top<P>(&self, policy: Policy, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(i32, DocumentStatus, i32) -> bool + Sync,
    {
        let result = ranking::find_top(&self.index, &self.config, policy, raw_query, predicate);
        match &result {
            Ok(docs) if docs.is_empty() => debug!("find_top({raw_query:?}) matched no documents"),
            Err(err) => debug!("find_top({raw_query:?}) failed: {err}"),
            _ => {}
        }
        result
    }

    /// `find_top` restricted to `DocumentStatus::Actual`, the engine's
    /// default filter when no predicate is supplied.
    pub fn find_top_actual(&self, policy: Policy, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top(policy, raw_query, Self::actual_only)
    }

    /// `find_top` restricted to a single status.
    pub fn find_top_with_status(
        &self,
        policy: Policy,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top(policy, raw_query, move |_, doc_status, _| doc_status == status)
    }

    fn actual_only(_id: i32, status: DocumentStatus, _rating: i32) -> bool {
        status == DocumentStatus::Actual
    }

    pub fn count(&self) -> usize {
        self.index.count()
    }

    pub fn id_at(&self, index: usize) -> Result<i32> {
        self.index.id_at(index)
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.index.iter_ids()
    }

    pub fn match_document(&self, policy: Policy, raw_query: &str, id: i32) -> Result<(Vec<String>, DocumentStatus)> {
        self.index.match_document(policy, raw_query, id)
    }

    pub fn word_frequencies(&self, id: i32) -> AHashMap<String, f64> {
        self.index.word_frequencies(id)
    }

    /// Maps `queries` to per-query result lists in parallel, restricted to
    /// `DocumentStatus::Actual`. `result[i]` corresponds to `queries[i]`.
    pub fn process_queries(&self, queries: &[String]) -> Vec<Result<Vec<Document>>> {
        crate::batch::process_queries(self, queries)
    }

    /// `process_queries(queries)` flattened in query order, preserving each
    /// query's ranker order.
    pub fn process_queries_joined(&self, queries: &[String]) -> Vec<Result<Document>> {
        crate::batch::process_queries_joined(self, queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchEngineError;
    use crate::stop_words::StopWords;

    /// Installs a subscriber so the `debug!` events in `add`/`find_top` are
    /// visible under `cargo test -- --nocapture`, the same
    /// `tracing_subscriber::fmt()` pattern used in `position_analyzer_cli.rs`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn match_s6() {
        init_tracing();
        let mut engine = Engine::with_stop_words(StopWords::from_str("in the").unwrap());
        engine.add(2, "jet from a port".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(0, "cat in the city".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(1, "dog house".into(), DocumentStatus::Actual, &[]).unwrap();

        let (matched, status) = engine.match_document(Policy::Sequenced, "jet", 2).unwrap();
        assert_eq!(matched, vec!["jet".to_string()]);
        assert_eq!(status, DocumentStatus::Actual);

        let (mut matched, status) = engine.match_document(Policy::Sequenced, "cat city", 0).unwrap();
        matched.sort();
        assert_eq!(matched, vec!["cat".to_string(), "city".to_string()]);
        assert_eq!(status, DocumentStatus::Actual);

        let (matched, _) = engine.match_document(Policy::Sequenced, "dog", 1).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn add_then_remove_restores_observable_state() {
        let mut engine = Engine::with_stop_words(StopWords::default());
        let before = engine.count();
        engine.add(9, "cat dog".into(), DocumentStatus::Actual, &[3, 5]).unwrap();
        engine.remove(9);
        assert_eq!(engine.count(), before);
        assert!(engine.word_frequencies(9).is_empty());
        assert!(engine.find_top_actual(Policy::Sequenced, "cat").unwrap().is_empty());
    }

    #[test]
    fn id_at_and_iter_ids_agree() {
        let mut engine = Engine::with_stop_words(StopWords::default());
        engine.add(1, "a".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(2, "b".into(), DocumentStatus::Actual, &[]).unwrap();
        let via_iter: Vec<i32> = engine.iter_ids().collect();
        let via_index: Vec<i32> = (0..engine.count()).map(|i| engine.id_at(i).unwrap()).collect();
        assert_eq!(via_iter, via_index);
    }

    #[test]
    fn find_top_with_status_filters_by_status() {
        let mut engine = Engine::with_stop_words(StopWords::default());
        engine.add(1, "cat".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(2, "cat".into(), DocumentStatus::Banned, &[]).unwrap();
        let results = engine.find_top_with_status(Policy::Sequenced, "cat", DocumentStatus::Banned).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 2);
    }

    #[test]
    fn new_builds_stop_words_from_a_whitespace_delimited_string() {
        let mut engine = Engine::new("in the").unwrap();
        engine.add(42, "cat in the city".into(), DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        assert!(engine.find_top_actual(Policy::Sequenced, "in").unwrap().is_empty());
        assert_eq!(engine.find_top_actual(Policy::Sequenced, "cat").unwrap().len(), 1);
    }

    #[test]
    fn new_rejects_a_control_character_in_a_stop_word() {
        let err = Engine::new("in th\te").unwrap_err();
        assert!(matches!(err, SearchEngineError::InvalidArgument(_)));
    }
}
