//! The inverted index: `W2D`, its mirror `D2W`, and per-document metadata
//! and lifecycle operations (components C4 and C9).

use crate::document::{self, DocumentData, DocumentStatus};
use crate::errors::{Result, SearchEngineError};
use crate::executors::{self, Policy};
use crate::query;
use crate::stop_words::StopWords;
use crate::tokenizer;
use ahash::AHashMap;
use parking_lot::Mutex;

/// Owns `W2D`, `D2W`, `DOCS`, and `IDS`. Tokens are stored as owned
/// `String`s rather than borrows into document text: it costs an extra
/// allocation per distinct token but sidesteps self-referential lifetime
/// coupling between `DOCS` and the index maps.
#[derive(Debug, Default)]
pub struct Index {
    stop_words: StopWords,
    w2d: AHashMap<String, AHashMap<i32, f64>>,
    d2w: AHashMap<i32, AHashMap<String, f64>>,
    docs: AHashMap<i32, DocumentData>,
    ids: Vec<i32>,
}

impl Index {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            stop_words,
            w2d: AHashMap::default(),
            d2w: AHashMap::default(),
            docs: AHashMap::default(),
            ids: Vec::new(),
        }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Adds a document. Validates the id and every non-stop token before
    /// mutating any state, so a failing call leaves the index unchanged.
    pub fn add(&mut self, id: i32, text: String, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        if id < 0 {
            return Err(SearchEngineError::InvalidArgument(format!(
                "document id must be non-negative, got {id}"
            )));
        }
        if self.docs.contains_key(&id) {
            return Err(SearchEngineError::InvalidArgument(format!(
                "document id {id} already exists"
            )));
        }

        let mut non_stop_tokens: Vec<&str> = Vec::new();
        for token in tokenizer::split(&text) {
            if self.stop_words.contains(token) {
                continue;
            }
            if !tokenizer::validate(token) {
                return Err(SearchEngineError::InvalidArgument(format!(
                    "document {id} contains an invalid token: {token:?}"
                )));
            }
            non_stop_tokens.push(token);
        }

        let total = non_stop_tokens.len();
        let mut counts: AHashMap<&str, usize> = AHashMap::default();
        for token in &non_stop_tokens {
            *counts.entry(*token).or_insert(0) += 1;
        }

        let mut word_tfs: AHashMap<String, f64> = AHashMap::default();
        for (word, count) in counts {
            word_tfs.insert(word.to_string(), count as f64 / total as f64);
        }

        for (word, tf) in &word_tfs {
            self.w2d.entry(word.clone()).or_default().insert(id, *tf);
        }
        self.d2w.insert(id, word_tfs);

        let rating = document::compute_average_rating(ratings);
        self.docs.insert(id, DocumentData { rating, status, text });
        self.ids.push(id);
        Ok(())
    }

    /// Removes `id`. A no-op if `id` is absent. `policy` only affects how
    /// the removal work across `id`'s distinct words is scheduled; the
    /// result is identical either way.
    pub fn remove(&mut self, policy: Policy, id: i32) {
        let Some(words) = self.d2w.remove(&id) else {
            return;
        };
        let word_list: Vec<String> = words.into_keys().collect();

        // A single mutex guarding every erase, mirroring the original
        // source's `RemoveDocument` (one `std::mutex` shared across the
        // parallel `for_each` over word pointers): concurrent workers may
        // compute which word to erase in parallel, but the erase itself is
        // serialized.
        let w2d_mutex = Mutex::new(&mut self.w2d);
        executors::for_each(policy, &word_list, |word| {
            let mut w2d = w2d_mutex.lock();
            if let Some(inner) = w2d.get_mut(word) {
                inner.remove(&id);
                if inner.is_empty() {
                    w2d.remove(word);
                }
            }
        });

        self.docs.remove(&id);
        self.ids.retain(|&existing| existing != id);
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn id_at(&self, index: usize) -> Result<i32> {
        self.ids.get(index).copied().ok_or_else(|| {
            SearchEngineError::OutOfRange(format!(
                "index {index} out of range for {} documents",
                self.ids.len()
            ))
        })
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.ids.iter().copied()
    }

    /// Returns an empty mapping when `id` is absent (not an error).
    pub fn word_frequencies(&self, id: i32) -> AHashMap<String, f64> {
        self.d2w.get(&id).cloned().unwrap_or_default()
    }

    /// Parses `raw_query` and matches it against document `id`. Fails with
    /// `OutOfRange` if `id` is absent, in both policies.
    pub fn match_document(
        &self,
        policy: Policy,
        raw_query: &str,
        id: i32,
    ) -> Result<(Vec<String>, DocumentStatus)> {
        let doc = self
            .docs
            .get(&id)
            .ok_or_else(|| SearchEngineError::OutOfRange(format!("unknown document id {id}")))?;

        let parsed = match policy {
            Policy::Sequenced => query::parse_sequenced(raw_query, &self.stop_words)?,
            Policy::Parallel => query::parse_parallel(raw_query, &self.stop_words)?,
        };

        let Some(words) = self.d2w.get(&id) else {
            return Ok((Vec::new(), doc.status));
        };

        if parsed.minus.iter().any(|w| words.contains_key(w)) {
            return Ok((Vec::new(), doc.status));
        }

        let mut matched: Vec<String> = parsed
            .plus
            .iter()
            .filter(|w| words.contains_key(w.as_str()))
            .cloned()
            .collect();
        matched.sort_unstable();
        matched.dedup();

        Ok((matched, doc.status))
    }

    pub(crate) fn postings(&self, word: &str) -> Option<&AHashMap<i32, f64>> {
        self.w2d.get(word)
    }

    pub(crate) fn doc_data(&self, id: i32) -> Option<&DocumentData> {
        self.docs.get(&id)
    }
}
