// src/redirects/table.rs
// =============================================================================
// This module loads the redirect table from a `_redirects` text file.
//
// File format (one redirect per line):
//   /old-page.html   /new-page        301
//   /legacy/*        /modern/
//   # comments and blank lines are ignored
//
// Only the first two whitespace-separated tokens matter. Anything after
// them (like an HTTP status code) is ignored.
//
// Rust concepts:
// - Enums with data: ParsedLine is either a valid entry or a malformed line
// - HashMap: For finding duplicate old paths quickly
// - thiserror: For a typed error that callers can match on
// =============================================================================

use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// One `<oldPath> <newPath>` pair from the redirect file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectEntry {
    /// The path that used to exist (may end in `*`)
    pub old_path: String,
    /// Where the old path is sent now
    pub new_path: String,
    /// 1-based line number in the source file
    pub line: usize,
}

// The result of parsing a single non-blank, non-comment line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Entry(RedirectEntry),
    /// The line had fewer than two tokens
    Malformed { line: usize, raw: String },
}

/// Errors that can happen while loading the redirect file
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("failed to read redirect file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The full set of redirects, in file order.
///
/// Built once per run and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectTable {
    entries: Vec<RedirectEntry>,
}

impl RedirectTable {
    /// Reads and parses the redirect file at `path`.
    ///
    /// A missing file is not an error: it simply means no redirects are
    /// configured, so an empty table is returned. Malformed lines are
    /// dropped with a warning.
    pub fn load(path: &Path) -> Result<Self, RedirectError> {
        let (table, malformed) = Self::read(path)?;

        for bad in &malformed {
            if let ParsedLine::Malformed { line, raw } = bad {
                warn!(
                    path = %path.display(),
                    line,
                    "dropping redirect line without a destination: {raw}"
                );
            }
        }

        Ok(table)
    }

    /// Like `load`, but hands the malformed lines back instead of logging them
    pub fn read(path: &Path) -> Result<(Self, Vec<ParsedLine>), RedirectError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no redirect file, using an empty table");
                Ok((Self::default(), Vec::new()))
            }
            Err(source) => Err(RedirectError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses redirect text into a table.
    ///
    /// Returns the table plus every malformed line that was dropped, so the
    /// caller decides how loudly to complain about them.
    pub fn parse(text: &str) -> (Self, Vec<ParsedLine>) {
        let mut table = Self::default();
        let mut malformed = Vec::new();

        // Remembers where each old path lives in `entries`
        let mut positions: HashMap<String, usize> = HashMap::new();

        for line in parse_lines(text) {
            match line {
                ParsedLine::Entry(entry) => {
                    if let Some(&index) = positions.get(&entry.old_path) {
                        // Later duplicates win, but keep the first position
                        table.entries[index] = entry;
                    } else {
                        positions.insert(entry.old_path.clone(), table.entries.len());
                        table.entries.push(entry);
                    }
                }
                bad @ ParsedLine::Malformed { .. } => malformed.push(bad),
            }
        }

        (table, malformed)
    }

    pub fn entries(&self) -> &[RedirectEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Turns the raw text into one ParsedLine per meaningful line
//
// Skips:
//   - empty (or whitespace-only) lines
//   - lines whose first non-whitespace character is '#'
fn parse_lines(text: &str) -> Vec<ParsedLine> {
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }

            let line = index + 1;
            let mut tokens = trimmed.split_whitespace();

            // trimmed is non-empty, so there is always a first token
            let old_path = tokens.next().unwrap_or_default();

            Some(match tokens.next() {
                Some(new_path) => ParsedLine::Entry(RedirectEntry {
                    old_path: old_path.to_string(),
                    new_path: new_path.to_string(),
                    line,
                }),
                None => ParsedLine::Malformed {
                    line,
                    raw: trimmed.to_string(),
                },
            })
        })
        .collect()
}
