//! TF-IDF relevance scoring and ranking: the sequenced and
//! parallel variants of `find_top`.

use crate::concurrent_map::ConcurrentAccumulator;
use crate::config::EngineConfig;
use crate::document::{Document, DocumentStatus};
use crate::errors::Result;
use crate::executors::{self, Policy};
use crate::index::Index;
use crate::query::{self, Query};
use ahash::AHashMap;
use std::cmp::Ordering;

/// Computes TF-IDF relevance for `raw_query` against `index`, applies
/// `predicate`, drops documents whose score is canceled by a minus word,
/// sorts by (relevance desc, rating desc, id asc), and truncates to
/// `config.max_result_document_count`.
pub fn find_top<P>(
    index: &Index,
    config: &EngineConfig,
    policy: Policy,
    raw_query: &str,
    predicate: P,
) -> Result<Vec<Document>>
where
    P: Fn(i32, DocumentStatus, i32) -> bool + Sync,
{
    let query = match policy {
        Policy::Sequenced => query::parse_sequenced(raw_query, index.stop_words())?,
        Policy::Parallel => query::parse_parallel(raw_query, index.stop_words())?,
    };

    // A query with no plus words (empty, all stop words, or only minus
    // terms) can never accumulate relevance for any document.
    if query.plus.is_empty() {
        return Ok(Vec::new());
    }

    let mut results = match policy {
        Policy::Sequenced => find_all_sequenced(index, &query, &predicate),
        Policy::Parallel => find_all_parallel(index, config, &query, &predicate),
    };

    sort_and_truncate(&mut results, config);
    Ok(results)
}

fn find_all_sequenced<P>(index: &Index, query: &Query, predicate: &P) -> Vec<Document>
where
    P: Fn(i32, DocumentStatus, i32) -> bool,
{
    let n_docs = index.count();
    let mut relevance: AHashMap<i32, f64> = AHashMap::default();

    for word in &query.plus {
        let Some(postings) = index.postings(word) else {
            continue;
        };
        let idf = inverse_document_frequency(n_docs, postings.len());
        for (&doc_id, &tf) in postings {
            let Some(doc) = index.doc_data(doc_id) else {
                continue;
            };
            if predicate(doc_id, doc.status, doc.rating) {
                *relevance.entry(doc_id).or_insert(0.0) += tf * idf;
            }
        }
    }

    for word in &query.minus {
        let Some(postings) = index.postings(word) else {
            continue;
        };
        for &doc_id in postings.keys() {
            relevance.remove(&doc_id);
        }
    }

    materialize(index, relevance)
}

fn find_all_parallel<P>(
    index: &Index,
    config: &EngineConfig,
    query: &Query,
    predicate: &P,
) -> Vec<Document>
where
    P: Fn(i32, DocumentStatus, i32) -> bool + Sync,
{
    let n_docs = index.count();
    let accumulator: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(config.bucket_count);

    executors::for_each(Policy::Parallel, &query.plus, |word| {
        let Some(postings) = index.postings(word) else {
            return;
        };
        let idf = inverse_document_frequency(n_docs, postings.len());
        for (&doc_id, &tf) in postings {
            let Some(doc) = index.doc_data(doc_id) else {
                continue;
            };
            if predicate(doc_id, doc.status, doc.rating) {
                *accumulator.at_mut(doc_id) += tf * idf;
            }
        }
    });

    executors::for_each(Policy::Parallel, &query.minus, |word| {
        let Some(postings) = index.postings(word) else {
            return;
        };
        for &doc_id in postings.keys() {
            accumulator.erase(&doc_id);
        }
    });

    materialize(index, accumulator.build_ordinary())
}

fn inverse_document_frequency(n_docs: usize, doc_frequency: usize) -> f64 {
    (n_docs as f64 / doc_frequency as f64).ln()
}

fn materialize(index: &Index, relevance: AHashMap<i32, f64>) -> Vec<Document> {
    relevance
        .into_iter()
        .map(|(id, relevance)| {
            let rating = index.doc_data(id).map(|d| d.rating).unwrap_or(0);
            Document { id, relevance, rating }
        })
        .collect()
}

/// `a` ranks strictly ahead of `b`: higher relevance, or a near-tied
/// relevance (within `epsilon`) broken by higher rating.
fn ranks_ahead(a: &Document, b: &Document, epsilon: f64) -> bool {
    a.relevance > b.relevance || ((a.relevance - b.relevance).abs() < epsilon && a.rating > b.rating)
}

fn sort_and_truncate(results: &mut Vec<Document>, config: &EngineConfig) {
    results.sort_by(|a, b| {
        if ranks_ahead(a, b, config.epsilon) {
            Ordering::Less
        } else if ranks_ahead(b, a, config.epsilon) {
            Ordering::Greater
        } else {
            a.id.cmp(&b.id)
        }
    });
    results.truncate(config.max_result_document_count);
}
