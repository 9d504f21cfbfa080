// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Commands:
// - check:     scan the docs, drop diagnostics explained by redirects, report
// - redirects: show how each redirect line is classified and indexed
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// Name of the redirect file looked up in the docs root by default
pub const DEFAULT_REDIRECTS_FILE: &str = "_redirects";

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "redirect-guard",
    version,
    about = "Checks documentation links and ignores the ones a redirect already handles",
    long_about = "redirect-guard scans every markdown file of a documentation tree for links to \
                  files and headings that do not exist. Links to pages that were moved on purpose \
                  (listed in a _redirects file) are not reported."
)]
pub struct Cli {
    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check all markdown links under a docs directory
    ///
    /// Example: redirect-guard check docs --exclude drafts
    Check {
        /// Docs root directory (default: current directory)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Redirect file (default: <ROOT>/_redirects)
        #[arg(long)]
        redirects: Option<PathBuf>,

        /// Directory names to skip anywhere in the tree
        ///
        /// Can be given several times: --exclude node_modules --exclude drafts
        #[arg(long, default_values_t = [String::from("node_modules"), String::from(".git")])]
        exclude: Vec<String>,

        /// Output results in JSON format instead of a report
        #[arg(long)]
        json: bool,

        /// Always exit with 0, even when broken links remain
        #[arg(long)]
        report_only: bool,
    },

    /// List the redirect table and how each entry is used for matching
    Redirects {
        /// Redirect file to inspect
        #[arg(default_value = DEFAULT_REDIRECTS_FILE)]
        file: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

// Picks the redirect file: the explicit flag, or `_redirects` in the root
pub fn redirects_path(root: &Path, redirects: Option<&Path>) -> PathBuf {
    match redirects {
        Some(path) => path.to_path_buf(),
        None => root.join(DEFAULT_REDIRECTS_FILE),
    }
}
