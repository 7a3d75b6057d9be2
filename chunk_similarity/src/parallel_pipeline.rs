// THEORY:
// The pairwise scan is the only part of the analyzer whose cost grows faster than
// the input: K chunks means K * (K - 1) / 2 comparisons. Every comparison is
// independent, so the scan splits cleanly by row: a worker that owns rows
// `start..end` compares each of those chunks against every later chunk.
//
// Rows near the top of the triangle have more work than rows near the bottom, so
// ranges are handed out round-robin in small blocks rather than as one contiguous
// slab per worker. Each worker returns its own `MatchSet`; the sets are merged once
// all workers finish. `MatchSet` is ordered, so the merged result does not depend on
// which worker finished first.

use crate::core_modules::chunk::chunk::ChunkValue;
use crate::core_modules::matcher::matcher::{MatchSet, match_rows};
use crate::core_modules::threshold::threshold::SimilarityThreshold;
use crate::error::{Result, SimilarityError};
use futures::future::join_all;
use log::trace;
use std::ops::Range;
use std::sync::Arc;

const ROWS_PER_BLOCK: usize = 16;

/// Splits the pairwise chunk scan across blocking worker tasks.
#[derive(Debug, Clone)]
pub struct ParallelMatcher {
    workers: usize,
}

impl Default for ParallelMatcher {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
        }
    }
}

impl ParallelMatcher {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(SimilarityError::Config(
                "parallel matcher needs at least one worker".to_string(),
            ));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Row blocks for each worker, dealt round-robin.
    fn assign_rows(&self, chunk_count: usize) -> Vec<Vec<Range<usize>>> {
        let mut assignments = vec![Vec::new(); self.workers];
        let blocks = (0..chunk_count).step_by(ROWS_PER_BLOCK).map(|start| {
            start..(start + ROWS_PER_BLOCK).min(chunk_count)
        });
        for (i, block) in blocks.enumerate() {
            assignments[i % self.workers].push(block);
        }
        assignments.retain(|rows| !rows.is_empty());
        assignments
    }

    /// Finds every unordered pair of chunks within `threshold` of each other.
    pub async fn match_pairs(
        &self,
        chunks: &[ChunkValue],
        threshold: SimilarityThreshold,
    ) -> Result<MatchSet> {
        let shared: Arc<[ChunkValue]> = Arc::from(chunks);
        self.scan_blocks(chunks.len(), move |rows| match_rows(&shared, rows, threshold))
            .await
    }

    /// Runs `scan` over every row block on blocking worker tasks and merges the results.
    pub(crate) async fn scan_blocks<F>(&self, chunk_count: usize, scan: F) -> Result<MatchSet>
    where
        F: Fn(Range<usize>) -> MatchSet + Send + Sync + 'static,
    {
        let scan = Arc::new(scan);

        let tasks = self
            .assign_rows(chunk_count)
            .into_iter()
            .enumerate()
            .map(|(worker, rows)| {
                let scan = Arc::clone(&scan);
                tokio::task::spawn_blocking(move || {
                    let mut matches = MatchSet::new();
                    for range in rows {
                        trace!("Worker {worker} scanning rows {range:?}");
                        matches.merge((*scan)(range));
                    }
                    matches
                })
            });

        let mut matches = MatchSet::new();
        for result in join_all(tasks).await {
            let partial = result.map_err(|e| SimilarityError::Worker(e.to_string()))?;
            matches.merge(partial);
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::matcher::matcher::match_pairs;

    fn wobbly_chunks(count: usize) -> Vec<ChunkValue> {
        (0..count).map(|i| ((i * 37) % 101) as ChunkValue).collect()
    }

    #[test]
    fn rows_are_covered_exactly_once() {
        let matcher = ParallelMatcher::new(3).unwrap();
        let mut rows: Vec<usize> = matcher
            .assign_rows(100)
            .into_iter()
            .flatten()
            .flatten()
            .collect();
        rows.sort_unstable();
        assert_eq!(rows, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn idle_workers_are_not_spawned() {
        let matcher = ParallelMatcher::new(8).unwrap();
        assert_eq!(matcher.assign_rows(20).len(), 2);
        assert!(matcher.assign_rows(0).is_empty());
    }

    #[test]
    fn zero_workers_is_config_error() {
        assert!(matches!(ParallelMatcher::new(0), Err(SimilarityError::Config(_))));
    }

    #[tokio::test]
    async fn same_set_as_sequential() {
        let chunks = wobbly_chunks(300);
        let expected = match_pairs(&chunks, 4);

        for workers in [1, 2, 5, 16] {
            let matcher = ParallelMatcher::new(workers).unwrap();
            let matches = matcher.match_pairs(&chunks, 4).await.unwrap();
            assert_eq!(matches, expected, "workers = {workers}");
        }
    }

    #[tokio::test]
    async fn panicking_worker_is_worker_error() {
        let matcher = ParallelMatcher::new(2).unwrap();
        let result = matcher
            .scan_blocks(64, |rows| {
                if rows.start == 0 {
                    panic!("scan failed on the first block");
                }
                MatchSet::new()
            })
            .await;
        assert!(matches!(result, Err(SimilarityError::Worker(_))));
    }

    #[tokio::test]
    async fn empty_and_singleton_inputs() {
        let matcher = ParallelMatcher::default();
        assert!(matcher.match_pairs(&[], 10).await.unwrap().is_empty());
        assert!(matcher.match_pairs(&[7], 10).await.unwrap().is_empty());
    }
}
