// src/redirects/mod.rs
// =============================================================================
// This module knows everything about the redirect table.
//
// Submodules:
// - table: Loads and parses the `_redirects` file
// - index: Splits redirects into file/wildcard indexes and matches targets
//
// The table is loaded once, before any scanning starts, and never changes.
// =============================================================================

mod index;
mod table;

pub use index::{RedirectIndex, RedirectKind};
pub use table::{ParsedLine, RedirectEntry, RedirectError, RedirectTable};
