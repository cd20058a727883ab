//! Report generation for conformance results.

use lfs64shim_abi::fcntl_abi::variadic_slot_is_uniform;
use lfs64shim_abi::symbols::SHIM_SYMBOLS;
use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// One row of the exported-symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRow {
    pub name: String,
    pub forwards_to: String,
    pub prototype: String,
    pub convention: String,
}

/// The exported-symbol table in serializable form.
#[must_use]
pub fn symbol_rows() -> Vec<SymbolRow> {
    SHIM_SYMBOLS
        .iter()
        .map(|sym| SymbolRow {
            name: sym.name.to_string(),
            forwards_to: sym.forwards_to.to_string(),
            prototype: sym.prototype.to_string(),
            convention: sym.convention.as_str().to_string(),
        })
        .collect()
}

/// Render the exported-symbol table as markdown.
#[must_use]
pub fn symbols_markdown(rows: &[SymbolRow]) -> String {
    let mut out = String::new();
    out.push_str("| Symbol | Forwards to | Convention | Prototype |\n");
    out.push_str("|--------|-------------|------------|-----------|\n");
    for row in rows {
        out.push_str(&format!(
            "| `{}` | `{}` | {} | `{}` |\n",
            row.name, row.forwards_to, row.convention, row.prototype
        ));
    }
    out
}

/// A conformance report for one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// `arch-os-env` of the build running the harness.
    pub target: String,
    /// Whether variadic `fcntl64` callers are sound on this target.
    pub variadic_slot_uniform: bool,
    pub symbols: Vec<SymbolRow>,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        timestamp: impl Into<String>,
        summary: VerificationSummary,
    ) -> Self {
        Self {
            title: title.into(),
            timestamp: timestamp.into(),
            target: host_target(),
            variadic_slot_uniform: variadic_slot_is_uniform(),
            symbols: symbol_rows(),
            summary,
        }
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Target: {}\n", self.target));
        out.push_str(&format!(
            "- Variadic slot uniform: {}\n",
            if self.variadic_slot_uniform { "yes" } else { "NO" }
        ));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        if !self.variadic_slot_uniform {
            out.push_str(
                "> `fcntl64` reads its optional argument as a fixed `long`. This target passes \
                 variadic arguments differently, so C callers of `fcntl64` hit undefined behavior.\n\n",
            );
        }

        out.push_str("## Symbols\n\n");
        out.push_str(&symbols_markdown(&self.symbols));
        out.push('\n');

        out.push_str("## Cases\n\n");
        out.push_str("| Family | Symbol | Case | Contract | Shim | Host | Status |\n");
        out.push_str("|--------|--------|------|----------|------|------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} | `{}` | `{}` | {} |\n",
                r.family, r.function, r.case_name, r.contract, r.actual, r.reference, status
            ));
        }

        let failures: Vec<_> = self.summary.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n\n");
            for r in failures {
                out.push_str(&format!(
                    "- `{}/{}`: {}\n",
                    r.family,
                    r.case_name,
                    r.diff.as_deref().unwrap_or("no detail")
                ));
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

fn host_target() -> String {
    format!(
        "{}-{}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS,
        if cfg!(target_env = "musl") {
            "musl"
        } else if cfg!(target_env = "gnu") {
            "gnu"
        } else {
            "other"
        }
    )
}
