//! Batch query pipeline: map N queries to N result lists in
//! parallel, optionally flattened while preserving query order.

use crate::document::{Document, DocumentStatus};
use crate::engine::Engine;
use crate::errors::Result;
use crate::executors::Policy;

/// Runs every query in `queries` through `Engine::find_top` under the
/// parallel policy, restricted to `DocumentStatus::Actual` documents.
/// `result[i]` corresponds to `queries[i]`.
///
/// Writes into the output positionally via `par_iter().map().collect()`
/// rather than pre-sizing a buffer and appending into it, which under
/// concurrent writers leaves a half-empty prefix.
pub fn process_queries(engine: &Engine, queries: &[String]) -> Vec<Result<Vec<Document>>> {
    crate::executors::transform(Policy::Parallel, queries, |query| {
        engine.find_top(Policy::Parallel, query, |_, status, _| status == DocumentStatus::Actual)
    })
}

/// `process_queries(queries)` flattened in query order; within each query,
/// ranker order is preserved. Errors are propagated per-query rather than
/// aborting the whole batch.
pub fn process_queries_joined(engine: &Engine, queries: &[String]) -> Vec<Result<Document>> {
    process_queries(engine, queries)
        .into_iter()
        .flat_map(|result| match result {
            Ok(docs) => docs.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stop_words::StopWords;

    fn sample_engine() -> Engine {
        let mut engine = Engine::with_stop_words(StopWords::default());
        engine.add(43, "one dog two dog".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(45, "one cat two cat".into(), DocumentStatus::Actual, &[]).unwrap();
        engine.add(47, "jet cat from a port".into(), DocumentStatus::Actual, &[]).unwrap();
        engine
    }

    #[test]
    fn process_queries_maps_each_query_independently() {
        let engine = sample_engine();
        let queries = vec!["cat".to_string(), "dog".to_string(), "zzz".to_string()];
        let results = process_queries(&engine, &queries);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().len(), 2);
        assert_eq!(results[1].as_ref().unwrap().len(), 1);
        assert!(results[2].as_ref().unwrap().is_empty());
    }

    #[test]
    fn joined_equals_in_order_flattening() {
        let engine = sample_engine();
        let queries = vec!["cat".to_string(), "dog".to_string()];
        let per_query = process_queries(&engine, &queries);
        let joined = process_queries_joined(&engine, &queries);

        let expected: Vec<i32> = per_query
            .into_iter()
            .flat_map(|r| r.unwrap().into_iter().map(|d| d.id))
            .collect();
        let actual: Vec<i32> = joined.into_iter().map(|r| r.unwrap().id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn malformed_query_errors_without_aborting_the_batch() {
        let engine = sample_engine();
        let queries = vec!["cat".to_string(), "--bad".to_string(), "dog".to_string()];
        let results = process_queries(&engine, &queries);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
