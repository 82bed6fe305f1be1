//! Data-parallel for-each and transform primitives, used by
//! the ranker and the batch query pipeline.
//!
//! Built on `rayon::prelude::*`, mirroring its use elsewhere in this
//! codebase's ranking and query modules. `rayon`'s work-stealing scheduler
//! handles chunking internally; we expose the sequenced/parallel choice as
//! an explicit policy so call sites read the same way either mode is
//! described.

use rayon::prelude::*;

/// Execution policy shared by the ranker, matcher, remover, and batch
/// pipeline. No async suspension points exist; `Parallel` calls are
/// synchronous and block the caller until all workers join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Sequenced,
    Parallel,
}

/// Runs `f` over every element of `items`. Under [`Policy::Sequenced`],
/// traverses in iterator order on the calling thread. Under
/// [`Policy::Parallel`], partitions the input across a work-stealing pool
/// and joins before returning.
pub fn for_each<T, F>(policy: Policy, items: &[T], f: F)
where
    T: Sync,
    F: Fn(&T) + Sync + Send,
{
    match policy {
        Policy::Sequenced => items.iter().for_each(f),
        Policy::Parallel => items.par_iter().for_each(f),
    }
}

/// Applies `f` positionally: `output[i] = f(&input[i])`. Preserves
/// positional correspondence in both policies.
pub fn transform<T, R, F>(policy: Policy, input: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match policy {
        Policy::Sequenced => input.iter().map(|item| f(item)).collect(),
        Policy::Parallel => input.par_iter().map(|item| f(item)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn for_each_sequenced_visits_everything_once() {
        let items = vec![1, 2, 3, 4, 5];
        let sum = AtomicUsize::new(0);
        for_each(Policy::Sequenced, &items, |x| {
            sum.fetch_add(*x, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 15);
    }

    #[test]
    fn for_each_parallel_visits_everything_once() {
        let items: Vec<usize> = (1..=1000).collect();
        let sum = AtomicUsize::new(0);
        for_each(Policy::Parallel, &items, |x| {
            sum.fetch_add(*x, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 500_500);
    }

    #[test]
    fn transform_preserves_positional_correspondence() {
        let input = vec![1, 2, 3, 4];
        let seq = transform(Policy::Sequenced, &input, |x| x * 2);
        let par = transform(Policy::Parallel, &input, |x| x * 2);
        assert_eq!(seq, vec![2, 4, 6, 8]);
        assert_eq!(seq, par);
    }
}
