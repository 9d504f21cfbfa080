// src/checker/markdown.rs
// =============================================================================
// This module extracts local links and headings from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Can report the byte range of every event (we turn that into line:column)
//
// Rust concepts:
// - Iterators: For processing sequences of items
// - Pattern matching: To identify link, image and heading events
// - Filtering: To skip links that point outside the docs (URLs, emails)
// =============================================================================

use crate::linkpath::percent_decode;
use pulldown_cmark::{Event, LinkType, Parser, Tag};
use std::collections::HashMap;
use url::Url;

// A link found in a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    /// The destination exactly as written (may include #fragment)
    pub target: String,
    /// 1-based line of the link
    pub line: usize,
    /// 1-based column of the link
    pub column: usize,
}

// Everything the checker needs to know about one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownOutline {
    pub links: Vec<MarkdownLink>,
    /// Heading anchors ("getting-started", "faq-1", ...)
    pub anchors: Vec<String>,
}

impl MarkdownOutline {
    /// Fragments are compared decoded and lowercased ("#caf%C3%A9" finds "café")
    pub fn has_anchor(&self, anchor: &str) -> bool {
        let anchor = percent_decode(anchor).to_lowercase();
        self.anchors.iter().any(|a| *a == anchor)
    }
}

// Extracts all local links and heading anchors from Markdown text
//
// Parameters:
//   markdown: the markdown text to parse (borrowed as &str)
//
// Example input:
//   "# Intro\nSee [basics](./basics.md) and [Rust](https://www.rust-lang.org)"
//
// Example output:
//   links: [./basics.md at 2:5], anchors: ["intro"]
pub fn extract_markdown_outline(markdown: &str) -> MarkdownOutline {
    let mut outline = MarkdownOutline::default();
    let lines = LineIndex::new(markdown);

    // Text of the heading we are currently inside, if any
    let mut current_heading: Option<String> = None;
    // How many times each slug was seen, for GitHub-style "-1" suffixes
    let mut seen_slugs: HashMap<String, usize> = HashMap::new();

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
            // and images have the same shape
            Event::Start(Tag::Link(link_type, dest_url, _title))
            | Event::Start(Tag::Image(link_type, dest_url, _title)) => {
                if is_local_link(link_type, &dest_url) {
                    let (line, column) = lines.position(range.start);
                    outline.links.push(MarkdownLink {
                        target: dest_url.to_string(),
                        line,
                        column,
                    });
                }
            }

            Event::Start(Tag::Heading(..)) => {
                current_heading = Some(String::new());
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current_heading.as_mut() {
                    heading.push_str(&text);
                }
            }

            Event::End(Tag::Heading(..)) => {
                if let Some(text) = current_heading.take() {
                    outline.anchors.push(unique_slug(&text, &mut seen_slugs));
                }
            }

            // We don't care about other events (paragraphs, lists, etc.)
            _ => {}
        }
    }

    outline
}

// Turns heading text into an anchor the way GitHub does
//
// Example: "Getting Started!" -> "getting-started"
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

// Slugifies and appends "-1", "-2", ... to repeated headings
fn unique_slug(text: &str, seen: &mut HashMap<String, usize>) -> String {
    let slug = slugify(text);
    let count = seen.entry(slug.clone()).or_insert(0);
    let unique = if *count == 0 {
        slug
    } else {
        format!("{}-{}", slug, count)
    };
    *count += 1;
    unique
}

// Helper function to check if a link points at something inside the docs
//
// We want to skip:
// - absolute URLs (http:, https:, mailto:, tel:, ...), which url::Url parses
// - email autolinks like <someone@example.com>
// - empty destinations
fn is_local_link(link_type: LinkType, url: &str) -> bool {
    if url.is_empty() || matches!(link_type, LinkType::Email) {
        return false;
    }
    Url::parse(url).is_err()
}

// Maps byte offsets to 1-based (line, column) positions
struct LineIndex<'a> {
    text: &'a str,
    // Byte offset where each line starts
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        // Number of line starts at or before offset = 1-based line number
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line - 1];
        let column = self.text[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is into_offset_iter()?
//    - The normal parser yields events only
//    - into_offset_iter() yields (event, byte_range) pairs
//    - The byte range tells us where in the text the event came from
//
// 2. Why count chars for the column?
//    - Rust strings are UTF-8, so one character can take several bytes
//    - Editors count characters, not bytes, so we do the same
//
// 3. What is partition_point?
//    - A binary search on a sorted slice
//    - Returns how many items satisfy the predicate
//    - Here: how many lines start before our offset
// -----------------------------------------------------------------------------
