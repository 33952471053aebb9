//! Smoke-test descriptors and result evaluation.
//!
//! The retailer and admin dashboards expose "test suite" pages that replay a
//! list of requests against the API and compare the observed status with the
//! expected one. The runner lives in the API crate; this module owns the
//! descriptors and the pass/warn/fail rule.

use serde::{Deserialize, Serialize};

/// Paths under this prefix cannot be part of a suite (the runner would call
/// itself).
pub const RESERVED_PREFIX: &str = "/api/test-suites";

/// Upper bound on the pacing delay between cases.
pub const MAX_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Testing,
    Passed,
    Failed,
    Warning,
}

/// One request to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_expected_status() -> u16 {
    200
}

impl TestCase {
    pub fn get(id: &str, name: &str, path: &str, expected_status: u16) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            method: default_method(),
            path: path.to_string(),
            expected_status,
            body: None,
        }
    }

    /// Problems that prevent the case from being run at all.
    pub fn check(&self) -> Result<(), String> {
        if !self.path.starts_with("/api/") {
            return Err(format!("Test '{}': path must start with /api/", self.id));
        }
        if self.path.starts_with(RESERVED_PREFIX) {
            return Err(format!(
                "Test '{}': paths under {RESERVED_PREFIX} cannot be tested",
                self.id
            ));
        }
        if !matches!(
            self.method.to_ascii_uppercase().as_str(),
            "GET" | "POST" | "PUT" | "DELETE" | "PATCH"
        ) {
            return Err(format!("Test '{}': unsupported method {}", self.id, self.method));
        }
        Ok(())
    }
}

/// Compare an observed status code with the expected one.
///
/// A different success code (e.g. 201 for an expected 200) is a warning, not
/// a failure.
pub fn evaluate(expected: u16, observed: u16) -> TestStatus {
    let is_2xx = |code: u16| (200..300).contains(&code);
    if expected == observed {
        TestStatus::Passed
    } else if is_2xx(expected) && is_2xx(observed) {
        TestStatus::Warning
    } else {
        TestStatus::Failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub method: String,
    pub path: String,
    pub expected_status: u16,
    /// `None` when the request could not be executed.
    pub observed_status: Option<u16>,
    pub status: TestStatus,
    pub message: String,
    pub duration_ms: u64,
}

impl TestResult {
    pub fn observed(case: &TestCase, observed: u16, duration_ms: u64) -> Self {
        let status = evaluate(case.expected_status, observed);
        let message = match status {
            TestStatus::Passed => format!("Status {observed} as expected"),
            TestStatus::Warning => format!(
                "Status {observed} differs from expected {} but is successful",
                case.expected_status
            ),
            _ => format!("Expected status {}, got {observed}", case.expected_status),
        };
        Self::build(case, Some(observed), status, message, duration_ms)
    }

    pub fn errored(case: &TestCase, message: impl Into<String>, duration_ms: u64) -> Self {
        Self::build(case, None, TestStatus::Failed, message.into(), duration_ms)
    }

    fn build(
        case: &TestCase,
        observed_status: Option<u16>,
        status: TestStatus,
        message: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: case.id.clone(),
            name: case.name.clone(),
            method: case.method.to_ascii_uppercase(),
            path: case.path.clone(),
            expected_status: case.expected_status,
            observed_status,
            status,
            message,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Warning => summary.warnings += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Pending | TestStatus::Testing => {}
            }
        }
        summary
    }
}

/// Read-only suite covering each public area of the API.
pub fn default_suite() -> Vec<TestCase> {
    vec![
        TestCase::get("products-list", "List products", "/api/products", 200),
        TestCase::get("inventory-stats", "Inventory stats", "/api/inventory/stats", 200),
        TestCase::get("campaign-status", "Campaign status", "/api/campaigns/status", 200),
        TestCase::get(
            "campaign-admin-status",
            "Campaign admin status",
            "/api/campaigns/admin/status",
            200,
        ),
        TestCase::get(
            "profile-analytics",
            "Business profile analytics",
            "/api/retailer-business-profile/analytics",
            200,
        ),
        TestCase::get("wallet-summary", "Wallet summary", "/api/wallet/1", 200),
        TestCase::get(
            "wallet-loyalty",
            "Loyalty tier",
            "/api/wallet/1/loyalty-tier",
            200,
        ),
        TestCase::get(
            "product-missing",
            "Unknown product is 404",
            "/api/products/999999",
            404,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
