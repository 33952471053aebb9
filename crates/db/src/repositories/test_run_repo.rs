//! Repository for stored smoke-test runs.

use spiral_core::test_suite::TestSummary;

use crate::models::test_run::{CreateTestRun, TestRun};
use crate::Store;

/// Runs kept in memory; older runs are dropped first.
const MAX_STORED_RUNS: usize = 50;

pub struct TestRunRepo;

impl TestRunRepo {
    pub async fn insert(store: &Store, input: CreateTestRun) -> TestRun {
        let mut table = store.tables().test_runs.write().await;
        let run = TestRun {
            id: table.seq.next(),
            started_at: input.started_at,
            finished_at: input.finished_at,
            summary: TestSummary::from_results(&input.results),
            results: input.results,
        };
        table.rows.push(run.clone());
        if table.rows.len() > MAX_STORED_RUNS {
            let excess = table.rows.len() - MAX_STORED_RUNS;
            table.rows.drain(..excess);
        }
        run
    }

    pub async fn latest(store: &Store) -> Option<TestRun> {
        store.tables().test_runs.read().await.rows.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spiral_core::test_suite::{TestCase, TestResult};

    #[tokio::test]
    async fn latest_returns_most_recent_run() {
        let store = Store::default();
        assert!(TestRunRepo::latest(&store).await.is_none());

        let case = TestCase::get("p", "Products", "/api/products", 200);
        for observed in [200, 500] {
            TestRunRepo::insert(
                &store,
                CreateTestRun {
                    started_at: Utc::now(),
                    finished_at: Utc::now(),
                    results: vec![TestResult::observed(&case, observed, 3)],
                },
            )
            .await;
        }

        let latest = TestRunRepo::latest(&store).await.unwrap();
        assert_eq!(latest.id, 2);
        assert_eq!(latest.summary.failed, 1);
    }

    #[tokio::test]
    async fn old_runs_are_dropped() {
        let store = Store::default();
        for _ in 0..(MAX_STORED_RUNS + 3) {
            TestRunRepo::insert(
                &store,
                CreateTestRun {
                    started_at: Utc::now(),
                    finished_at: Utc::now(),
                    results: vec![],
                },
            )
            .await;
        }
        assert_eq!(store.tables().test_runs.read().await.rows.len(), MAX_STORED_RUNS);
    }
}
