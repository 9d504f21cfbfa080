// src/redirects/index.rs
// =============================================================================
// This module builds lookup indexes from the redirect table and answers the
// question "is this link target covered by a redirect?".
//
// Two kinds of redirects can cover a link:
// - Wildcard redirects: "/legacy/*" covers everything under "/legacy/"
// - File redirects:     "/old-page.html" covers "/old-page.html",
//                       "/old-page.md", "/old-page", ...
//
// Plain redirects ("/old /new" with no extension or wildcard) are kept in the
// table but never consulted here.
//
// Both indexes are flat ordered lists of (key, entry) pairs. Redirect files
// hold tens to hundreds of lines, so a linear prefix scan is plenty.
// =============================================================================

use crate::linkpath::{
    normalize_extension, resolve, static_extension, strip_suffixes, NORMALIZATION_CHAR,
};
use serde::Serialize;
use super::table::{RedirectEntry, RedirectTable};
use tracing::{debug, trace};

// Marks a wildcard redirect when it ends the old path
const SPLAT: char = '*';

/// How a redirect entry takes part in matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedirectKind {
    /// Old path ends in a recognized static extension
    File { extension: String },
    /// Old path ends in `*`
    Wildcard,
    /// Neither: loaded, but never used to suppress diagnostics
    Plain,
}

impl RedirectKind {
    /// Classifies an old path. A trailing `*` wins over an extension; a `*`
    /// anywhere else is just part of the path.
    pub fn of(old_path: &str) -> Self {
        if old_path.ends_with(SPLAT) {
            RedirectKind::Wildcard
        } else if let Some(extension) = static_extension(old_path) {
            RedirectKind::File {
                extension: extension.to_string(),
            }
        } else {
            RedirectKind::Plain
        }
    }

    /// The index key for an old path of this kind, if it has one
    pub fn key(&self, old_path: &str) -> Option<String> {
        match self {
            RedirectKind::Wildcard => Some(old_path.trim_end_matches(SPLAT).to_string()),
            RedirectKind::File { .. } => Some(normalize_extension(old_path)),
            RedirectKind::Plain => None,
        }
    }
}

/// Prefix indexes over a redirect table
#[derive(Debug, Clone, Default)]
pub struct RedirectIndex {
    files: Vec<(String, RedirectEntry)>,
    wildcards: Vec<(String, RedirectEntry)>,
}

impl RedirectIndex {
    /// Partitions the table into file and wildcard indexes, keeping the
    /// table's order inside each index
    pub fn new(table: &RedirectTable) -> Self {
        let mut index = Self::default();

        for entry in table.entries() {
            let kind = RedirectKind::of(&entry.old_path);
            let Some(key) = kind.key(&entry.old_path) else {
                trace!(old_path = %entry.old_path, "plain redirect, not indexed");
                continue;
            };

            match kind {
                RedirectKind::Wildcard => index.wildcards.push((key, entry.clone())),
                RedirectKind::File { .. } => index.files.push((key, entry.clone())),
                RedirectKind::Plain => {}
            }
        }

        debug!(
            files = index.files.len(),
            wildcards = index.wildcards.len(),
            "built redirect index"
        );

        index
    }

    pub fn file_keys(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(key, _)| key.as_str())
    }

    pub fn wildcard_keys(&self) -> impl Iterator<Item = &str> {
        self.wildcards.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.wildcards.is_empty()
    }

    /// Finds the redirect that covers a link target, if any.
    ///
    /// Parameters:
    ///   file: root-relative path of the document holding the link
    ///   target: the raw link target as written in the document
    ///
    /// The target is resolved against the document's directory, its
    /// extension is swapped for the normalization character, and then
    /// wildcard keys are tried before file keys. The first prefix match wins.
    pub fn covers(&self, file: &str, target: &str) -> Option<&RedirectEntry> {
        let path = strip_suffixes(target);
        let Some(resolved) = resolve(file, path) else {
            debug!(file, target, "target escapes the docs root");
            return None;
        };
        let normalized = normalize_extension(&resolved);

        let found = find_prefix(&self.wildcards, &normalized)
            .or_else(|| find_prefix(&self.files, &normalized));

        match found {
            Some(entry) => debug!(
                file,
                target,
                redirect = %entry.old_path,
                line = entry.line,
                "target covered by redirect"
            ),
            None => trace!(
                file,
                target,
                normalized = %normalized.trim_end_matches(NORMALIZATION_CHAR),
                "no redirect covers target"
            ),
        }

        found
    }

    pub fn is_covered(&self, file: &str, target: &str) -> bool {
        self.covers(file, target).is_some()
    }
}

// Returns the first entry whose key is a prefix of `normalized`
fn find_prefix<'a>(
    entries: &'a [(String, RedirectEntry)],
    normalized: &str,
) -> Option<&'a RedirectEntry> {
    entries
        .iter()
        .find(|(key, _)| normalized.starts_with(key.as_str()))
        .map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index(text: &str) -> RedirectIndex {
        let (table, _) = RedirectTable::parse(text);
        RedirectIndex::new(&table)
    }

    #[test]
    fn test_classify_entries() {
        assert_eq!(RedirectKind::of("/legacy/*"), RedirectKind::Wildcard);
        assert_eq!(RedirectKind::of("/docs.html*"), RedirectKind::Wildcard);
        // Only a trailing splat makes a wildcard
        assert_eq!(
            RedirectKind::of("/img/*.png"),
            RedirectKind::File {
                extension: "png".to_string()
            }
        );
        assert_eq!(
            RedirectKind::of("/old-page.html"),
            RedirectKind::File {
                extension: "html".to_string()
            }
        );
        assert_eq!(RedirectKind::of("/old-page"), RedirectKind::Plain);
        assert_eq!(RedirectKind::of("/notes.md"), RedirectKind::Plain);
    }

    #[test]
    fn test_index_keys() {
        let index = index("/a.html /x\n/b/* /y/\n/plain /z\n/logo.png /logo.svg\n");

        assert_eq!(index.file_keys().collect::<Vec<_>>(), vec!["/a\0", "/logo\0"]);
        assert_eq!(index.wildcard_keys().collect::<Vec<_>>(), vec!["/b/"]);
    }

    #[test]
    fn test_file_redirect_covers_any_extension() {
        let index = index("/old-page.html /new-page");

        assert!(index.is_covered("a.md", "./old-page.html"));
        assert!(index.is_covered("a.md", "./old-page.md"));
        assert!(index.is_covered("a.md", "./old-page"));
        assert!(index.is_covered("a.md", "./old-page.md#section"));
        assert!(!index.is_covered("a.md", "./old-pages.md"));
        assert!(!index.is_covered("guide/a.md", "./old-page.md"));
        assert!(index.is_covered("guide/a.md", "../old-page.md"));
    }

    #[test]
    fn test_wildcard_redirect_covers_any_suffix() {
        let index = index("/legacy/* /modern/");

        assert!(index.is_covered("a.md", "./legacy/foo/bar"));
        assert!(index.is_covered("a.md", "/legacy/x.md"));
        assert!(index.is_covered("deep/er/a.md", "/legacy/"));
        assert!(!index.is_covered("a.md", "./legacyish/foo"));
    }

    #[test]
    fn test_plain_redirect_never_covers() {
        let index = index("/old /new\n/old/path /new/path\n");

        assert!(index.is_empty());
        assert!(!index.is_covered("a.md", "./old"));
        assert!(!index.is_covered("a.md", "./old/path"));
    }

    #[test]
    fn test_inner_splat_is_literal() {
        let index = index("/img/*.png /images/\n");

        assert_eq!(index.wildcard_keys().count(), 0);
        assert_eq!(index.file_keys().collect::<Vec<_>>(), vec!["/img/*\0"]);
        assert!(!index.is_covered("a.md", "./img/logo.png"));
    }

    #[test]
    fn test_wildcard_checked_before_file() {
        let index = index("/api.html /x\n/api* /y\n");

        let entry = index.covers("a.md", "./api.md").unwrap();
        assert_eq!(entry.old_path, "/api*");
    }

    #[test]
    fn test_target_above_root_is_not_covered() {
        let index = index("/* /everything/");
        assert!(!index.is_covered("a.md", "../outside.md"));
        assert!(index.is_covered("a.md", "./inside.md"));
    }
}
