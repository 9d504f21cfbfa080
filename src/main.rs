// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Load the redirect table (before any scanning starts)
// 3. Run the markdown link checker over the docs
// 4. Drop "missing file" diagnostics that a redirect explains
// 5. Print what is left and exit with a proper code
//    (0 = clean, 1 = broken links remain, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;    // src/checker/ - markdown link checking
mod cli;        // src/cli.rs - command-line parsing
mod filter;     // src/filter.rs - redirect-aware diagnostic filtering
mod linkpath;   // src/linkpath.rs - link path resolving/normalizing
mod logging;    // src/logging.rs - tracing subscriber setup
mod redirects;  // src/redirects/ - redirect table and indexes
mod report;     // src/report.rs - human/JSON output

use checker::{discover_markdown_files, LinkChecker, LocalLinkChecker};
use clap::Parser; // Parser trait enables the parse() method
use cli::{Cli, Commands};
use filter::{filter_diagnostics, ValidationResult};
use redirects::{RedirectIndex, RedirectTable};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If the run failed, print the whole error chain and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links (or --report-only)
//   Ok(1) = broken links remain after redirect suppression
//   Err   = the run failed (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            root,
            redirects,
            exclude,
            json,
            report_only,
        } => {
            let redirects = cli::redirects_path(&root, redirects.as_deref());
            handle_check(&root, &redirects, &exclude, json, report_only).await
        }
        Commands::Redirects { file, json } => handle_redirects(&file, json),
    }
}

// Handles the 'check' subcommand
async fn handle_check(
    root: &Path,
    redirects: &Path,
    exclude: &[String],
    json: bool,
    report_only: bool,
) -> Result<i32> {
    let started = Instant::now();

    // The table is read once, up front, and only read from afterwards
    let table = RedirectTable::load(redirects)?;
    let index = RedirectIndex::new(&table);
    info!(
        path = %redirects.display(),
        redirects = table.len(),
        file_redirects = index.file_keys().count(),
        wildcard_redirects = index.wildcard_keys().count(),
        "loaded redirect table"
    );
    if index.is_empty() && !table.is_empty() {
        warn!("no file or wildcard redirects, nothing will be suppressed");
    }

    let files = discover_markdown_files(root, exclude)
        .with_context(|| format!("failed to list markdown files in {}", root.display()))?;
    info!(root = %root.display(), files = files.len(), "scanning markdown files");

    let checker = LocalLinkChecker::new(root);
    let result = validate(&checker, &files, &index).await?;

    report::print_results(&result, started.elapsed(), json)?;

    Ok(exit_code(&result, report_only))
}

// Runs the checker once and filters its output through the redirect index
//
// A checker failure is returned as-is: there is no partial report.
async fn validate<C: LinkChecker>(
    checker: &C,
    files: &[PathBuf],
    index: &RedirectIndex,
) -> Result<ValidationResult> {
    let reports = checker
        .check(files)
        .await
        .context("link check failed")?;

    Ok(filter_diagnostics(reports, index))
}

// Broken links fail the run unless --report-only was given
fn exit_code(result: &ValidationResult, report_only: bool) -> i32 {
    if result.is_clean() || report_only {
        0
    } else {
        1
    }
}

// Handles the 'redirects' subcommand
fn handle_redirects(file: &Path, json: bool) -> Result<i32> {
    let (table, malformed) = RedirectTable::read(file)?;

    if table.is_empty() && malformed.is_empty() && !json {
        println!("⚠️  No redirects found in {}", file.display());
        return Ok(0);
    }

    report::print_redirects(&table, &malformed, json)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Diagnostic, FileReport, MISSING_FILE, MISSING_HEADING};
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    // Returns fixed reports, or fails, without touching the file system
    struct FakeChecker {
        reports: Option<Vec<FileReport>>,
    }

    impl LinkChecker for FakeChecker {
        async fn check(&self, _files: &[PathBuf]) -> Result<Vec<FileReport>> {
            self.reports
                .clone()
                .ok_or_else(|| anyhow!("checker crashed"))
        }
    }

    fn missing(file: &str, target: &str) -> Diagnostic {
        Diagnostic {
            file: file.to_string(),
            line: 1,
            column: 1,
            rule_id: MISSING_FILE.to_string(),
            reason: format!("Link to unknown file: `{}`", target),
        }
    }

    #[tokio::test]
    async fn test_validate_filters_through_redirects() {
        let (table, _) = RedirectTable::parse("/old-page.html /new-page\n/legacy/* /modern/\n");
        let index = RedirectIndex::new(&table);
        let checker = FakeChecker {
            reports: Some(vec![FileReport {
                path: "a.md".to_string(),
                diagnostics: vec![
                    missing("a.md", "./old-page.html"),
                    missing("a.md", "./legacy/foo/bar"),
                    missing("a.md", "./truly-missing"),
                ],
            }]),
        };

        let result = validate(&checker, &[], &index).await.unwrap();

        assert_eq!(result.suppressed, 2);
        assert_eq!(
            result.files[0].diagnostics,
            vec![missing("a.md", "./truly-missing")]
        );
        assert_eq!(exit_code(&result, false), 1);
        assert_eq!(exit_code(&result, true), 0);
    }

    #[tokio::test]
    async fn test_checker_failure_is_fatal() {
        let checker = FakeChecker { reports: None };
        let result = validate(&checker, &[], &RedirectIndex::default()).await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("link check failed"));
        assert!(message.contains("checker crashed"));
    }

    #[tokio::test]
    async fn test_clean_run_exits_zero() {
        let checker = FakeChecker {
            reports: Some(vec![FileReport {
                path: "a.md".to_string(),
                diagnostics: vec![],
            }]),
        };

        let result = validate(&checker, &[], &RedirectIndex::default()).await.unwrap();
        assert!(result.is_clean());
        assert_eq!(exit_code(&result, false), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_with_local_checker() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("a.md"),
            "# A\n\n[old](./old-page.md) [legacy](./legacy/intro.md) \
             [gone](./gone.md) [h](#missing)\n",
        )
        .unwrap();
        std::fs::write(
            root.join("_redirects"),
            "/old-page.html /new-page\n/legacy/* /modern/\n",
        )
        .unwrap();

        let table = RedirectTable::load(&cli::redirects_path(root, None)).unwrap();
        let index = RedirectIndex::new(&table);
        let files = discover_markdown_files(root, &[]).unwrap();

        let result = validate(&LocalLinkChecker::new(root), &files, &index).await.unwrap();

        let remaining: Vec<(&str, &str)> = result.files[0]
            .diagnostics
            .iter()
            .map(|d| (d.rule_id.as_str(), d.reason.as_str()))
            .collect();
        assert_eq!(
            remaining,
            vec![
                (MISSING_FILE, "Link to unknown file: `./gone.md`"),
                (MISSING_HEADING, "Link to unknown heading: `missing`"),
            ]
        );
        assert_eq!(result.suppressed, 2);
    }
}
