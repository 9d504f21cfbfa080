// src/checker/scan.rs
// =============================================================================
// This module finds markdown files and checks every local link in them.
//
// How it works:
// 1. Glob "**/*.md" under the docs root, skipping excluded directories
// 2. Read and parse all files (concurrently, but keeping their order)
// 3. For every local link:
//    - the file part must exist on disk        -> otherwise "missing-file"
//    - the #fragment must match a heading      -> otherwise "missing-heading"
//
// Heading checks only happen for markdown files that were scanned, because
// we need their parsed outline to know which anchors exist.
//
// Rust concepts:
// - Streams: `buffered` runs several reads at once but yields in order
// - HashMap: Lookup of scanned documents by their root-relative path
// - Traits: LocalLinkChecker implements the LinkChecker trait
// =============================================================================

use super::markdown::{extract_markdown_outline, MarkdownLink, MarkdownOutline};
use super::{Diagnostic, FileReport, LinkChecker, MISSING_FILE, MISSING_HEADING};
use crate::linkpath::{percent_decode, resolve, strip_suffixes};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

// How many files we read at the same time
const READ_CONCURRENCY: usize = 16;

// Finds every markdown file under `root`
//
// Parameters:
//   root: the docs root directory
//   excludes: directory names to skip anywhere in the tree (e.g. "node_modules")
//
// Returns: sorted list of markdown file paths
pub fn discover_markdown_files(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*.md",
        glob::Pattern::escape(&root.to_string_lossy())
    );

    let mut files = Vec::new();
    let entries = glob::glob(&pattern).with_context(|| format!("invalid glob pattern {pattern}"))?;

    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                // Unreadable directories are skipped, not fatal
                warn!("skipping unreadable path: {e}");
                continue;
            }
        };

        if is_excluded(root, &path, excludes) {
            continue;
        }

        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered markdown files");
    Ok(files)
}

// True when any directory between root and path is in the exclude list
fn is_excluded(root: &Path, path: &Path, excludes: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => excludes.iter().any(|e| name == e.as_str()),
        _ => false,
    })
}

// Turns "<root>/guide/basics.md" into "guide/basics.md"
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// A markdown file that has been read and parsed
#[derive(Debug)]
struct ScannedDocument {
    path: PathBuf,
    relative: String,
    outline: MarkdownOutline,
}

/// Checks local links against the file system under one docs root
#[derive(Debug, Clone)]
pub struct LocalLinkChecker {
    root: PathBuf,
}

impl LocalLinkChecker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_document(&self, path: &Path) -> Result<ScannedDocument> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        let outline = extract_markdown_outline(&text);
        debug!(file = %path.display(), links = outline.links.len(), "parsed document");

        Ok(ScannedDocument {
            path: path.to_path_buf(),
            relative: relative_path(&self.root, path),
            outline,
        })
    }

    async fn check_document(
        &self,
        document: &ScannedDocument,
        outlines: &HashMap<String, &MarkdownOutline>,
    ) -> FileReport {
        let mut diagnostics = Vec::new();
        let base = document.path.parent().unwrap_or(self.root.as_path());

        for link in &document.outline.links {
            let path = strip_suffixes(&link.target);
            let fragment = link
                .target
                .split_once('#')
                .map(|(_, fragment)| fragment)
                .filter(|fragment| !fragment.is_empty());

            // "my%20page.md" lives on disk as "my page.md"
            let decoded = percent_decode(path);

            if !path.is_empty() {
                let on_disk = match decoded.strip_prefix('/') {
                    Some(from_root) => self.root.join(from_root),
                    None => base.join(&*decoded),
                };

                let exists = match tokio::fs::try_exists(&on_disk).await {
                    Ok(exists) => exists,
                    Err(e) => {
                        // Could not tell (permissions, I/O), so report it as missing
                        warn!(
                            file = %document.relative,
                            target = %link.target,
                            "cannot check {}: {e}",
                            on_disk.display()
                        );
                        false
                    }
                };

                if !exists {
                    diagnostics.push(diagnostic(
                        document,
                        link,
                        MISSING_FILE,
                        format!("Link to unknown file: `{}`", path),
                    ));
                    continue;
                }
            }

            let Some(fragment) = fragment else {
                continue;
            };

            // Bare "#anchor" points into the document itself
            let linked = if path.is_empty() {
                Some(&document.outline)
            } else {
                resolve(&document.relative, &decoded).and_then(|key| outlines.get(&key).copied())
            };

            if let Some(outline) = linked {
                if !outline.has_anchor(fragment) {
                    let reason = if path.is_empty() {
                        format!("Link to unknown heading: `{}`", fragment)
                    } else {
                        format!("Link to unknown heading in `{}`: `{}`", path, fragment)
                    };
                    diagnostics.push(diagnostic(document, link, MISSING_HEADING, reason));
                }
            }
        }

        FileReport {
            path: document.relative.clone(),
            diagnostics,
        }
    }
}

impl LinkChecker for LocalLinkChecker {
    async fn check(&self, files: &[PathBuf]) -> Result<Vec<FileReport>> {
        // Read everything first: heading checks may look into other files
        let documents: Vec<ScannedDocument> = stream::iter(files)
            .map(|path| self.read_document(path))
            .buffered(READ_CONCURRENCY)
            .try_collect()
            .await?;

        let outlines: HashMap<String, &MarkdownOutline> = documents
            .iter()
            .map(|document| (format!("/{}", document.relative), &document.outline))
            .collect();

        let mut reports = Vec::with_capacity(documents.len());
        for document in &documents {
            reports.push(self.check_document(document, &outlines).await);
        }

        Ok(reports)
    }
}

fn diagnostic(
    document: &ScannedDocument,
    link: &MarkdownLink,
    rule_id: &str,
    reason: String,
) -> Diagnostic {
    Diagnostic {
        file: document.relative.clone(),
        line: link.line,
        column: link.column,
        rule_id: rule_id.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    // Builds a docs tree from (relative path, contents) pairs
    fn docs(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, contents).unwrap();
        }
        dir
    }

    fn rules(report: &FileReport) -> Vec<(&str, &str)> {
        report
            .diagnostics
            .iter()
            .map(|d| (d.rule_id.as_str(), d.reason.as_str()))
            .collect()
    }

    #[test]
    fn test_discover_skips_excluded_directories() {
        let dir = docs(&[
            ("index.md", ""),
            ("guide/basics.md", ""),
            ("node_modules/pkg/readme.md", ""),
            ("notes.txt", ""),
        ]);

        let files = discover_markdown_files(dir.path(), &["node_modules".to_string()]).unwrap();
        let relative: Vec<String> = files.iter().map(|f| relative_path(dir.path(), f)).collect();

        assert_eq!(relative, vec!["guide/basics.md", "index.md"]);
    }

    #[tokio::test]
    async fn test_reports_missing_files_in_order() {
        let dir = docs(&[
            ("a.md", "[ok](./b.md)\n\n[gone](./gone.md)\n"),
            ("b.md", "![img](/images/missing.png) [up](a.md)"),
        ]);
        let files = discover_markdown_files(dir.path(), &[]).unwrap();

        let reports = LocalLinkChecker::new(dir.path()).check(&files).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].path, "a.md");
        assert_eq!(
            reports[0].diagnostics,
            vec![Diagnostic {
                file: "a.md".to_string(),
                line: 3,
                column: 1,
                rule_id: MISSING_FILE.to_string(),
                reason: "Link to unknown file: `./gone.md`".to_string(),
            }]
        );
        assert_eq!(
            rules(&reports[1]),
            vec![(MISSING_FILE, "Link to unknown file: `/images/missing.png`")]
        );
    }

    #[tokio::test]
    async fn test_reports_missing_headings() {
        let dir = docs(&[
            (
                "a.md",
                "# Top\n\n[self](#top) [bad](#nope) \
                 [other](guide/b.md#setup) [x](guide/b.md#nada)\n",
            ),
            ("guide/b.md", "## Setup\n"),
        ]);
        let files = discover_markdown_files(dir.path(), &[]).unwrap();

        let reports = LocalLinkChecker::new(dir.path()).check(&files).await.unwrap();

        assert_eq!(
            rules(&reports[0]),
            vec![
                (MISSING_HEADING, "Link to unknown heading: `nope`"),
                (MISSING_HEADING, "Link to unknown heading in `guide/b.md`: `nada`"),
            ]
        );
        assert!(reports[1].diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_directory_links_and_urls_are_fine() {
        let dir = docs(&[
            ("a.md", "[dir](./guide/) [web](https://example.com/missing.md)"),
            ("guide/index.md", ""),
        ]);
        let files = discover_markdown_files(dir.path(), &[]).unwrap();

        let reports = LocalLinkChecker::new(dir.path()).check(&files).await.unwrap();
        assert!(reports.iter().all(|r| r.diagnostics.is_empty()));
    }

    #[tokio::test]
    async fn test_percent_encoded_links_are_decoded() {
        let dir = docs(&[
            (
                "a.md",
                "[x](./my%20page.md) [y](<./my page.md>) \
                 [h](./my%20page.md#caf%C3%A9) [z](./no%20such.md)",
            ),
            ("my page.md", "# Café\n"),
        ]);
        let files = discover_markdown_files(dir.path(), &[]).unwrap();

        let reports = LocalLinkChecker::new(dir.path()).check(&files).await.unwrap();

        assert_eq!(
            rules(&reports[0]),
            vec![(MISSING_FILE, "Link to unknown file: `./no%20such.md`")]
        );
    }

    #[tokio::test]
    async fn test_failed_existence_check_is_reported() {
        // A file used as a directory makes the lookup fail with ENOTDIR
        let dir = docs(&[("a.md", "[x](./a.md/child.md)")]);
        let files = discover_markdown_files(dir.path(), &[]).unwrap();

        let reports = LocalLinkChecker::new(dir.path()).check(&files).await.unwrap();

        assert_eq!(
            rules(&reports[0]),
            vec![(MISSING_FILE, "Link to unknown file: `./a.md/child.md`")]
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_the_check() {
        let dir = docs(&[("a.md", "")]);
        let files = vec![dir.path().join("a.md"), dir.path().join("vanished.md")];

        let result = LocalLinkChecker::new(dir.path()).check(&files).await;
        assert!(result.is_err());
    }
}
