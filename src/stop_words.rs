//! Immutable stop-word set.

use crate::errors::{Result, SearchEngineError};
use crate::tokenizer;
use ahash::AHashSet;

/// A lexicographically ordered, immutable set of tokens excluded from
/// indexing and queries. Constructed once, never mutated afterward.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: AHashSet<String>,
}

impl StopWords {
    /// Builds a stop-word set from a single whitespace-delimited string.
    /// Empty tokens are dropped, duplicates collapse. Fails with
    /// `InvalidArgument` if any surviving token contains a control byte.
    pub fn from_str(text: &str) -> Result<Self> {
        Self::from_iter(tokenizer::split(text))
    }

    /// Builds a stop-word set from any iterable of strings, same rules as
    /// [`StopWords::from_str`].
    pub fn from_iter<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = AHashSet::default();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !tokenizer::validate(word) {
                return Err(SearchEngineError::InvalidArgument(format!(
                    "stop word contains a control character: {word:?}"
                )));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    /// True iff `word` is a stop word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
