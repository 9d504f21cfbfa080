// src/checker/mod.rs
// =============================================================================
// This module contains the markdown link checking logic.
//
// Submodules:
// - markdown: Extracts links and heading anchors from markdown text
// - scan: Finds markdown files and checks every local link in them
//
// This file (mod.rs) is the module root. Besides re-exporting the public API,
// it defines the shape of a diagnostic and the LinkChecker trait, so the
// redirect filter never needs to know which checker produced the results.
// =============================================================================

mod markdown;
mod scan;

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

pub use scan::{discover_markdown_files, LocalLinkChecker};

/// Rule id for a link whose target file does not exist
pub const MISSING_FILE: &str = "missing-file";

/// Rule id for a link whose #fragment matches no heading
pub const MISSING_HEADING: &str = "missing-heading";

// One finding for one documentation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Root-relative path of the file, always with '/' separators
    pub file: String,
    pub line: usize,
    pub column: usize,
    /// Which rule fired (MISSING_FILE, MISSING_HEADING, ...)
    pub rule_id: String,
    /// Human-readable message; the offending path is wrapped in backticks
    pub reason: String,
}

impl Diagnostic {
    pub fn is_missing_file(&self) -> bool {
        self.rule_id == MISSING_FILE
    }
}

// All diagnostics for one scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Root-relative path of the file
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

// Anything that can check a set of markdown files and report diagnostics
//
// The checker runs silently: it never prints, it only returns reports.
// It must return one FileReport per input file, in input order.
pub trait LinkChecker {
    async fn check(&self, files: &[PathBuf]) -> Result<Vec<FileReport>>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait here?
//    - The redirect filter only cares about the diagnostics, not who made them
//    - Tests can plug in a fake checker that returns fixed diagnostics
//
// 2. What is `async fn` in a trait?
//    - Since Rust 1.75 traits can declare async methods directly
//    - Each implementation returns its own future type
// -----------------------------------------------------------------------------
