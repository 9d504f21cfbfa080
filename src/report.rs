// src/report.rs
// =============================================================================
// This module prints results for humans (or as JSON for tools).
//
// Check report layout:
//
//   guide/basics.md
//     12:5   missing-file     Link to unknown file: `./gone.md`
//
//   📊 Summary:
//      📄 Files scanned: 42
//      ❌ Remaining: 1
//      🔀 Suppressed by redirects: 3
//   ⏱️  Finished in 87ms
// =============================================================================

use crate::filter::ValidationResult;
use crate::redirects::{ParsedLine, RedirectKind, RedirectTable};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

// Prints the check result either as a report or JSON
pub fn print_results(result: &ValidationResult, elapsed: Duration, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print!("{}", render_report(result, elapsed));
    }
    Ok(())
}

// Builds the human-readable report
pub fn render_report(result: &ValidationResult, elapsed: Duration) -> String {
    let mut out = String::new();

    for file in result.files.iter().filter(|f| !f.diagnostics.is_empty()) {
        let _ = writeln!(out, "{}", file.path);
        for diagnostic in &file.diagnostics {
            let position = format!("{}:{}", diagnostic.line, diagnostic.column);
            let _ = writeln!(
                out,
                "  {:<8} {:<16} {}",
                position, diagnostic.rule_id, diagnostic.reason
            );
        }
        out.push('\n');
    }

    if result.is_clean() {
        out.push_str("✅ No broken links found\n\n");
    }

    let _ = writeln!(out, "📊 Summary:");
    let _ = writeln!(out, "   📄 Files scanned: {}", result.files.len());
    let _ = writeln!(out, "   ❌ Remaining: {}", result.remaining());
    let _ = writeln!(out, "   🔀 Suppressed by redirects: {}", result.suppressed);
    let _ = writeln!(out, "⏱️  Finished in {}ms", elapsed.as_millis());

    out
}

// One row of the `redirects` listing
#[derive(Debug, Serialize)]
struct RedirectRow<'a> {
    line: usize,
    old_path: &'a str,
    new_path: &'a str,
    #[serde(flatten)]
    kind: RedirectKind,
    /// Index key with the normalization character shown as `$`
    key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RedirectListing<'a> {
    redirects: Vec<RedirectRow<'a>>,
    malformed: Vec<MalformedRow<'a>>,
}

#[derive(Debug, Serialize)]
struct MalformedRow<'a> {
    line: usize,
    raw: &'a str,
}

// Pairs every redirect with its classification and index key
fn build_listing<'a>(table: &'a RedirectTable, malformed: &'a [ParsedLine]) -> RedirectListing<'a> {
    RedirectListing {
        redirects: table
            .entries()
            .iter()
            .map(|entry| {
                let kind = RedirectKind::of(&entry.old_path);
                let key = kind.key(&entry.old_path).map(|k| k.replace('\0', "$"));
                RedirectRow {
                    line: entry.line,
                    old_path: &entry.old_path,
                    new_path: &entry.new_path,
                    kind,
                    key,
                }
            })
            .collect(),
        malformed: malformed
            .iter()
            .filter_map(|line| match line {
                ParsedLine::Malformed { line, raw } => Some(MalformedRow {
                    line: *line,
                    raw: raw.as_str(),
                }),
                ParsedLine::Entry(_) => None,
            })
            .collect(),
    }
}

// Prints every redirect with its classification and index key
pub fn print_redirects(table: &RedirectTable, malformed: &[ParsedLine], json: bool) -> Result<()> {
    let listing = build_listing(table, malformed);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_redirects(&listing));
    }
    Ok(())
}

fn render_redirects(listing: &RedirectListing<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<6} {:<10} {:<32} {:<32} {}",
        "LINE", "KIND", "FROM", "TO", "KEY"
    );
    let _ = writeln!(out, "{}", "=".repeat(100));

    for row in &listing.redirects {
        let kind = match &row.kind {
            RedirectKind::File { .. } => "file",
            RedirectKind::Wildcard => "wildcard",
            RedirectKind::Plain => "plain",
        };
        let _ = writeln!(
            out,
            "{:<6} {:<10} {:<32} {:<32} {}",
            row.line,
            kind,
            row.old_path,
            row.new_path,
            row.key.as_deref().unwrap_or("-")
        );
    }

    out.push('\n');
    for row in &listing.malformed {
        let _ = writeln!(out, "⚠️  line {} has no destination: {}", row.line, row.raw);
    }

    let plain = listing
        .redirects
        .iter()
        .filter(|r| r.kind == RedirectKind::Plain)
        .count();
    let _ = writeln!(out, "📋 Total: {}", listing.redirects.len());
    let _ = writeln!(out, "   🔍 Used for matching: {}", listing.redirects.len() - plain);
    let _ = writeln!(out, "   💤 Plain (never matched): {}", plain);

    out
}
