// src/filter.rs
// =============================================================================
// This module removes "missing file" diagnostics that a redirect explains.
//
// For each diagnostic:
// - rule is not "missing-file"            -> keep it
// - no `backtick` path in the reason      -> keep it (never guess)
// - path is covered by a redirect         -> drop it
// - otherwise                             -> keep it
//
// Files keep their original order, even when all of their diagnostics
// were dropped.
// =============================================================================

use crate::checker::{Diagnostic, FileReport};
use crate::redirects::RedirectIndex;
use serde::Serialize;
use tracing::debug;

// What is left after redirect suppression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// One report per scanned file, in scan order
    pub files: Vec<FileReport>,
    /// How many diagnostics were explained by a redirect
    pub suppressed: usize,
}

impl ValidationResult {
    pub fn remaining(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.remaining() == 0
    }
}

// Filters the checker output through the redirect index
//
// Parameters:
//   reports: per-file diagnostics from the link checker
//   index: file and wildcard redirects
//
// Returns: the diagnostics no redirect explains, plus a suppressed count
pub fn filter_diagnostics(reports: Vec<FileReport>, index: &RedirectIndex) -> ValidationResult {
    let mut result = ValidationResult::default();

    for report in reports {
        let before = report.diagnostics.len();
        let diagnostics: Vec<Diagnostic> = report
            .diagnostics
            .into_iter()
            .filter(|diagnostic| !is_explained(diagnostic, &report.path, index))
            .collect();

        result.suppressed += before - diagnostics.len();
        result.files.push(FileReport {
            path: report.path,
            diagnostics,
        });
    }

    debug!(
        suppressed = result.suppressed,
        remaining = result.remaining(),
        "filtered diagnostics"
    );

    result
}

// True when the diagnostic is a missing file that a redirect covers
fn is_explained(diagnostic: &Diagnostic, file: &str, index: &RedirectIndex) -> bool {
    if !diagnostic.is_missing_file() {
        return false;
    }

    match backtick_path(&diagnostic.reason) {
        Some(target) => index.is_covered(file, target),
        None => {
            debug!(file, reason = %diagnostic.reason, "no path in reason, keeping diagnostic");
            false
        }
    }
}

// Extracts the first `backtick-delimited` token from a reason string
//
// Example: "Link to unknown file: `./a.md`" -> Some("./a.md")
pub fn backtick_path(reason: &str) -> Option<&str> {
    let (_, rest) = reason.split_once('`')?;
    let (token, _) = rest.split_once('`')?;
    (!token.is_empty()).then_some(token)
}
