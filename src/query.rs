//! Query parsing: turns a raw query string into deduplicated plus/minus
//! token lists, with negation and stop-word handling.

use crate::errors::{Result, SearchEngineError};
use crate::stop_words::StopWords;
use crate::tokenizer;

/// A parsed query: deduplicated plus (required) and minus (excluded) words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub plus: Vec<String>,
    pub minus: Vec<String>,
}

impl Query {
    /// Sorts and dedupes both word lists. Used by the sequenced finalization
    /// mode; the parallel mode leaves the lists as parsed and tolerates
    /// duplicates via the sharded accumulator.
    fn sort_uniq(&mut self) {
        self.plus.sort_unstable();
        self.plus.dedup();
        self.minus.sort_unstable();
        self.minus.dedup();
    }
}

/// One query word after stripping a leading `-`, classified plus/minus.
struct QueryWord<'a> {
    data: &'a str,
    is_minus: bool,
}

fn parse_query_word<'a>(raw: &'a str) -> Result<QueryWord<'a>> {
    let (is_minus, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    if rest.is_empty() {
        return Err(SearchEngineError::InvalidArgument(format!(
            "empty query word after stripping '-': {raw:?}"
        )));
    }
    if rest.starts_with('-') {
        return Err(SearchEngineError::InvalidArgument(format!(
            "query word has more than one leading '-': {raw:?}"
        )));
    }
    if !tokenizer::validate(rest) {
        return Err(SearchEngineError::InvalidArgument(format!(
            "query word contains a control character: {raw:?}"
        )));
    }

    Ok(QueryWord {
        data: rest,
        is_minus,
    })
}

/// Parses `raw_query` under the sequenced policy: both lists end up sorted
/// and deduplicated.
pub fn parse_sequenced(raw_query: &str, stop_words: &StopWords) -> Result<Query> {
    let mut query = parse(raw_query, stop_words)?;
    query.sort_uniq();
    Ok(query)
}

/// Parses `raw_query` under the parallel policy: lists are left in parse
/// order, possibly containing duplicates.
pub fn parse_parallel(raw_query: &str, stop_words: &StopWords) -> Result<Query> {
    parse(raw_query, stop_words)
}

fn parse(raw_query: &str, stop_words: &StopWords) -> Result<Query> {
    let words = tokenizer::split(raw_query);
    let mut query = Query {
        plus: Vec::with_capacity(words.len()),
        minus: Vec::new(),
    };

    for raw_word in words {
        let word = parse_query_word(raw_word)?;
        if stop_words.contains(word.data) {
            continue;
        }
        if word.is_minus {
            query.minus.push(word.data.to_string());
        } else {
            query.plus.push(word.data.to_string());
        }
    }

    Ok(query)
}
