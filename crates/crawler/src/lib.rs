//! # Tutor Crawler
//!
//! Repository acquisition for tutorial generation.
//!
//! ## Pipeline
//!
//! ```text
//! Local directory ──┐
//!                   ├──> Walk (.gitignore aware)
//! Git URL ──> clone ┘      ├─ include/exclude globs
//!                          ├─ size cap
//!                          └─> FileSet [(path, content), ...]
//! ```
//!
//! The crawler runs once, before the analysis pipeline starts; everything
//! downstream treats the resulting [`FileSet`] as a read-only snapshot.

mod error;
mod files;
mod git;
mod local;
mod tree;

pub use error::{CrawlerError, Result};
pub use files::{FileSet, RepoInfo, SourceFile};
pub use git::{crawl_git, parse_git_url, GitSource};
pub use local::{crawl_local, CrawlConfig};
pub use tree::{render_directory_tree, TreeLimits};
