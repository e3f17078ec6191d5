//! Batch evaluation engine: independent queries run concurrently.
//!
//! Each worker evaluates one query on its own operator tree; only the
//! index reader is shared, and index reads are read-only and reentrant.
//! A failing query produces an error entry for that query id and the
//! batch continues with the remainder.

use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{KontosError, Result};
use crate::index::reader::IndexReader;
use crate::parallel::config::BatchConfig;
use crate::query::eval::{CancelToken, evaluate_with_cancel};
use crate::query::model::RetrievalModel;
use crate::query::node::QueryNode;
use crate::query::score_list::ScoreList;

/// One query in a batch, tagged with the caller's query identifier.
#[derive(Debug, Clone)]
pub struct BatchQuery {
    /// Caller-visible query identifier.
    pub id: String,
    /// The parsed operator tree.
    pub node: QueryNode,
}

impl BatchQuery {
    /// Create a batch query.
    pub fn new<S: Into<String>>(id: S, node: QueryNode) -> Self {
        BatchQuery {
            id: id.into(),
            node,
        }
    }
}

/// The outcome of one query in a batch: either its sorted, truncated
/// results or the error that killed it.
#[derive(Debug)]
pub struct BatchResult {
    /// The query identifier this result belongs to.
    pub id: String,
    /// Sorted and truncated results, or the per-query failure.
    pub outcome: Result<ScoreList>,
}

/// Counters over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Queries that produced a result list.
    pub completed: u64,
    /// Queries that failed or were cancelled.
    pub failed: u64,
}

/// Batch evaluation engine over a shared read-only index.
pub struct BatchEngine {
    config: BatchConfig,
    thread_pool: ThreadPool,
    stats: Mutex<BatchStats>,
}

impl BatchEngine {
    /// Create a new batch engine.
    pub fn new(config: BatchConfig) -> Result<Self> {
        let thread_pool_size = config.thread_pool_size.unwrap_or_else(num_cpus::get);

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(thread_pool_size)
            .thread_name(|i| format!("kontos-batch-{i}"))
            .build()
            .map_err(|e| KontosError::internal(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            config,
            thread_pool,
            stats: Mutex::new(BatchStats::default()),
        })
    }

    /// Evaluate a batch of queries, one result per query in input order.
    pub fn run(
        &self,
        queries: &[BatchQuery],
        model: &RetrievalModel,
        reader: &dyn IndexReader,
    ) -> Vec<BatchResult> {
        self.run_with_cancel(queries, model, reader, &CancelToken::new())
    }

    /// Evaluate a batch with a shared cancellation token.
    pub fn run_with_cancel(
        &self,
        queries: &[BatchQuery],
        model: &RetrievalModel,
        reader: &dyn IndexReader,
        cancel: &CancelToken,
    ) -> Vec<BatchResult> {
        use rayon::prelude::*;

        let results: Vec<BatchResult> = self.thread_pool.install(|| {
            queries
                .par_iter()
                .map(|query| {
                    let outcome = self.run_one(query, model, reader, cancel);
                    BatchResult {
                        id: query.id.clone(),
                        outcome,
                    }
                })
                .collect()
        });

        let mut stats = self.stats.lock();
        for result in &results {
            match result.outcome {
                Ok(_) => stats.completed += 1,
                Err(_) => stats.failed += 1,
            }
        }

        results
    }

    fn run_one(
        &self,
        query: &BatchQuery,
        model: &RetrievalModel,
        reader: &dyn IndexReader,
        cancel: &CancelToken,
    ) -> Result<ScoreList> {
        let mut results = evaluate_with_cancel(&query.node, model, reader, cancel)?;
        results.sort();
        results.truncate(self.config.output_length);
        Ok(results)
    }

    /// Counters accumulated over all batches run so far.
    pub fn stats(&self) -> BatchStats {
        *self.stats.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;

    fn sample_index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_document(1, "body", &["cat", "dog"]);
        index.add_document(2, "body", &["cat"]);
        index.add_document(3, "body", &["dog", "cat", "dog"]);
        index
    }

    #[test]
    fn test_batch_runs_all_queries() {
        let index = sample_index();
        let engine = BatchEngine::new(BatchConfig {
            thread_pool_size: Some(2),
            output_length: 10,
        })
        .unwrap();

        let queries = vec![
            BatchQuery::new("q1", QueryNode::term("cat")),
            BatchQuery::new(
                "q2",
                QueryNode::And(vec![QueryNode::term("cat"), QueryNode::term("dog")]),
            ),
        ];

        let results = engine.run(&queries, &RetrievalModel::RankedBoolean, &index);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "q1");
        assert_eq!(results[1].id, "q2");

        let q1 = results[0].outcome.as_ref().unwrap();
        assert_eq!(q1.len(), 3);
        let q2 = results[1].outcome.as_ref().unwrap();
        let docs: Vec<u64> = q2.iter().map(|e| e.doc_id).collect();
        assert_eq!(docs, vec![3, 1]);

        assert_eq!(engine.stats().completed, 2);
        assert_eq!(engine.stats().failed, 0);
    }

    #[test]
    fn test_failed_query_is_isolated() {
        let index = sample_index();
        let engine = BatchEngine::new(BatchConfig::default()).unwrap();

        let queries = vec![
            BatchQuery::new(
                "bad",
                QueryNode::Near {
                    n: 1,
                    children: vec![QueryNode::term("cat")],
                },
            ),
            BatchQuery::new("good", QueryNode::term("dog")),
        ];

        let results = engine.run(&queries, &RetrievalModel::RankedBoolean, &index);
        assert!(results[0].outcome.is_err());
        assert!(results[1].outcome.is_ok());
        assert_eq!(engine.stats().failed, 1);
        assert_eq!(engine.stats().completed, 1);
    }

    #[test]
    fn test_output_truncated_to_configured_length() {
        let index = sample_index();
        let engine = BatchEngine::new(BatchConfig {
            thread_pool_size: Some(1),
            output_length: 1,
        })
        .unwrap();

        let queries = vec![BatchQuery::new("q", QueryNode::term("cat"))];
        let results = engine.run(&queries, &RetrievalModel::RankedBoolean, &index);
        assert_eq!(results[0].outcome.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_cancelled_batch_reports_cancellation() {
        let index = sample_index();
        let engine = BatchEngine::new(BatchConfig::default()).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let queries = vec![BatchQuery::new("q", QueryNode::term("cat"))];
        let results =
            engine.run_with_cancel(&queries, &RetrievalModel::RankedBoolean, &index, &cancel);
        assert!(matches!(
            results[0].outcome,
            Err(KontosError::OperationCancelled(_))
        ));
    }
}
