//! CLI entrypoint for the lfs64shim conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conformance tooling for lfs64shim.
#[derive(Debug, Parser)]
#[command(name = "lfs64shim-harness")]
#[command(about = "Checks that fcntl64/posix_fallocate64 behave exactly like the host calls")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the built-in fixture sets as JSON files.
    Capture {
        /// Output directory for fixture JSON files.
        #[arg(long)]
        output: PathBuf,
    },
    /// Run every fixture set in a directory against the shim.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown); JSON is written alongside.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the exported symbol table.
    Symbols {
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Capture { output } => {
            eprintln!("Writing built-in fixtures to {}", output.display());
            std::fs::create_dir_all(&output)?;
            for set in lfs64shim_harness::fixtures::builtin_sets() {
                let path = output.join(set.file_name());
                std::fs::write(&path, set.to_json()?)?;
                eprintln!("  {} ({} cases)", path.display(), set.cases.len());
            }
        }
        Command::Verify { fixture, report } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let mut fixture_sets = Vec::new();
            for entry in std::fs::read_dir(&fixture)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }
                match lfs64shim_harness::FixtureSet::from_file(&path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => {
                        eprintln!("Skipping {}: {}", path.display(), err);
                    }
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }
            fixture_sets.sort_by(|a, b| a.family.cmp(&b.family));

            let runner = lfs64shim_harness::TestRunner::new("fixture-verify");
            let mut results = Vec::new();
            for set in &fixture_sets {
                results.extend(runner.run(set));
            }

            let summary = lfs64shim_harness::verify::VerificationSummary::from_results(results);
            let report_doc = lfs64shim_harness::ConformanceReport::new(
                "lfs64shim Conformance Report",
                format!("{:?}", std::time::SystemTime::now()),
                summary,
            );

            for failure in report_doc.summary.failures() {
                eprintln!(
                    "FAIL {}/{}: {}",
                    failure.family,
                    failure.case_name,
                    failure.diff.as_deref().unwrap_or("no detail")
                );
            }
            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            if !report_doc.variadic_slot_uniform {
                eprintln!(
                    "warning: {} passes variadics in different slots; C callers of fcntl64 are unsound here",
                    report_doc.target
                );
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::Symbols { json } => {
            let rows = lfs64shim_harness::report::symbol_rows();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", lfs64shim_harness::report::symbols_markdown(&rows));
            }
        }
    }

    Ok(())
}
