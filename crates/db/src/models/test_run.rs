//! Stored smoke-test runs.

use serde::Serialize;
use spiral_core::test_suite::{TestResult, TestSummary};
use spiral_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub id: DbId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
}

/// DTO for recording a finished run.
#[derive(Debug, Clone)]
pub struct CreateTestRun {
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub results: Vec<TestResult>,
}
