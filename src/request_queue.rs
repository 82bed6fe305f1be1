//! A request-queue wrapper: observes a rolling window of queries and
//! reports how many returned no results. Its only dependency on the core
//! is [`Engine::find_top`]; it has no stop-word/index knowledge of its own.

use crate::config::MIN_IN_DAY;
use crate::document::{Document, DocumentStatus};
use crate::engine::Engine;
use crate::errors::Result;
use crate::executors::Policy;
use std::collections::VecDeque;

struct QueryResult {
    timestamp: u64,
    result_count: usize,
}

/// Wraps an [`Engine`], recording a rolling window of the last
/// [`MIN_IN_DAY`] requests and the count among them that returned zero
/// results.
pub struct RequestQueue<'a> {
    engine: &'a Engine,
    requests: VecDeque<QueryResult>,
    empty_results: usize,
    current_time: u64,
}

impl<'a> RequestQueue<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            requests: VecDeque::new(),
            empty_results: 0,
            current_time: 0,
        }
    }

    /// Runs `find_top` with a custom predicate and records the result.
    pub fn add_find_request<P>(&mut self, policy: Policy, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(i32, DocumentStatus, i32) -> bool + Sync,
    {
        let result = self.engine.find_top(policy, raw_query, predicate)?;
        self.record(result.len());
        Ok(result)
    }

    /// Runs `find_top` restricted to a single status and records the result.
    pub fn add_find_request_with_status(
        &mut self,
        policy: Policy,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.add_find_request(policy, raw_query, move |_, doc_status, _| doc_status == status)
    }

    /// Runs `find_top` restricted to `DocumentStatus::Actual` and records
    /// the result.
    pub fn add_find_request_actual(&mut self, policy: Policy, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with_status(policy, raw_query, DocumentStatus::Actual)
    }

    /// Count of requests in the current rolling window that returned zero
    /// results.
    pub fn no_result_requests(&self) -> usize {
        self.empty_results
    }

    fn record(&mut self, result_count: usize) {
        self.current_time += 1;
        while let Some(front) = self.requests.front() {
            if self.current_time - front.timestamp < MIN_IN_DAY as u64 {
                break;
            }
            if front.result_count == 0 {
                self.empty_results -= 1;
            }
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult {
            timestamp: self.current_time,
            result_count,
        });
        if result_count == 0 {
            self.empty_results += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stop_words::StopWords;

    fn sample_engine() -> Engine {
        let mut engine = Engine::with_stop_words(StopWords::default());
        engine.add(1, "cat".into(), DocumentStatus::Actual, &[]).unwrap();
        engine
    }

    #[test]
    fn counts_empty_results_within_the_window() {
        let engine = sample_engine();
        let mut queue = RequestQueue::new(&engine);
        queue.add_find_request_actual(Policy::Sequenced, "cat").unwrap();
        queue.add_find_request_actual(Policy::Sequenced, "zzz").unwrap();
        queue.add_find_request_actual(Policy::Sequenced, "zzz").unwrap();
        assert_eq!(queue.no_result_requests(), 2);
    }

    #[test]
    fn expires_requests_older_than_the_window() {
        let engine = sample_engine();
        let mut queue = RequestQueue::new(&engine);
        queue.add_find_request_actual(Policy::Sequenced, "zzz").unwrap();
        for _ in 0..MIN_IN_DAY {
            queue.add_find_request_actual(Policy::Sequenced, "cat").unwrap();
        }
        assert_eq!(queue.no_result_requests(), 0);
    }
}
