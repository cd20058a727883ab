//! Verification results and their aggregation.

use serde::{Deserialize, Serialize};

/// Result of verifying one fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Fixture family the case came from.
    pub family: String,
    pub case_name: String,
    /// Exported symbol exercised.
    pub function: String,
    /// Contract clause checked.
    pub contract: String,
    pub passed: bool,
    /// Expected output from the fixture (`parity` when unconstrained).
    pub expected: String,
    /// Outcome rendered through the exported entry point.
    pub actual: String,
    /// Outcome rendered through the host libc directly.
    pub reference: String,
    /// Why the case failed, when it did.
    pub diff: Option<String>,
}

/// Pass/fail totals plus every individual result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
