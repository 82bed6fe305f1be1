//! Tunable constants for the engine, grounded on the `MAX_RESULT_DOCUMENT_COUNT`
//! / `EPSILON` / `BUCKETS_NUM` constants block at the top of the original
//! `search_server.h`, collected here instead of scattered across modules.

/// Maximum number of documents `find_top` returns.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevance-comparison tolerance used when breaking ranking ties by rating.
pub const EPSILON: f64 = 1e-6;

/// Default number of buckets in the sharded concurrent accumulator.
pub const BUCKET_COUNT_DEFAULT: usize = 8;

/// Size of the `RequestQueue` rolling window, in "minutes" (one per query).
pub const MIN_IN_DAY: usize = 1440;

/// Engine-wide tunables. Constructed with [`Default`]; fields are public so
/// callers embedding the engine in a larger service can override them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_result_document_count: usize,
    pub epsilon: f64,
    pub bucket_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_result_document_count: MAX_RESULT_DOCUMENT_COUNT,
            epsilon: EPSILON,
            bucket_count: BUCKET_COUNT_DEFAULT,
        }
    }
}
