use crate::error::{CrawlerError, Result};
use crate::files::{FileSet, SourceFile};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;

/// Filter configuration for a crawl.
///
/// Semantics follow the acquisition contract: an empty include list means
/// "include everything", exclude patterns always win, and files over
/// `max_file_size` are skipped (counted, never fatal).
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_file_size: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            max_file_size: 100_000,
        }
    }
}

impl CrawlConfig {
    fn include_set(&self) -> Result<Option<GlobSet>> {
        if self.include.is_empty() {
            return Ok(None);
        }
        Some(build_glob_set(&self.include)).transpose()
    }

    fn exclude_set(&self) -> Result<Option<GlobSet>> {
        if self.exclude.is_empty() {
            return Ok(None);
        }
        Some(build_glob_set(&self.exclude)).transpose()
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Crawl a local directory into a [`FileSet`].
///
/// The walk respects `.gitignore` and hidden-file conventions via the
/// `ignore` crate, then applies include/exclude globs against the
/// repository-relative path and the size cap per file. Binary or
/// non-UTF-8 files are skipped with a warning.
pub fn crawl_local(root: &Path, config: &CrawlConfig) -> Result<FileSet> {
    if !root.is_dir() {
        return Err(CrawlerError::InvalidPath(format!(
            "Directory does not exist: {}",
            root.display()
        )));
    }

    let include = config.include_set()?;
    let exclude = config.exclude_set()?;

    let mut files = Vec::new();
    let mut skipped_filtered = 0usize;
    let mut skipped_size = 0usize;

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let rel_path = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };

        if let Some(include) = &include {
            if !include.is_match(&rel_path) {
                skipped_filtered += 1;
                continue;
            }
        }
        if let Some(exclude) = &exclude {
            if exclude.is_match(&rel_path) {
                skipped_filtered += 1;
                continue;
            }
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
        if size > config.max_file_size {
            log::debug!("Skipping {rel_path}: {size} bytes over size cap");
            skipped_size += 1;
            continue;
        }

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => files.push(SourceFile {
                path: rel_path,
                content,
            }),
            Err(err) => {
                log::warn!("Skipping {rel_path}: {err}");
            }
        }
    }

    log::info!(
        "Crawled {}: {} files ({} filtered out, {} over size cap)",
        root.display(),
        files.len(),
        skipped_filtered,
        skipped_size
    );

    if files.is_empty() {
        return Err(CrawlerError::NoFiles(root.display().to_string()));
    }

    Ok(FileSet::new(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn crawl_collects_matching_files_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "src/main.rs", "fn main() {}");
        write(&dir, "src/lib.rs", "pub fn lib() {}");
        write(&dir, "notes.txt", "notes");

        let config = CrawlConfig {
            include: vec!["**/*.rs".to_string()],
            ..CrawlConfig::default()
        };
        let set = crawl_local(dir.path(), &config).unwrap();

        assert_eq!(set.paths(), vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn exclude_wins_over_include() {
        let dir = TempDir::new().unwrap();
        write(&dir, "src/main.rs", "fn main() {}");
        write(&dir, "tests/it.rs", "#[test] fn t() {}");

        let config = CrawlConfig {
            include: vec!["**/*.rs".to_string()],
            exclude: vec!["tests/**".to_string()],
            ..CrawlConfig::default()
        };
        let set = crawl_local(dir.path(), &config).unwrap();

        assert_eq!(set.paths(), vec!["src/main.rs"]);
    }

    #[test]
    fn size_cap_skips_large_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "small.rs", "fn a() {}");
        write(&dir, "big.rs", &"x".repeat(4096));

        let config = CrawlConfig {
            max_file_size: 64,
            ..CrawlConfig::default()
        };
        let set = crawl_local(dir.path(), &config).unwrap();

        assert_eq!(set.paths(), vec!["small.rs"]);
    }

    #[test]
    fn empty_result_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.py", "pass");

        let config = CrawlConfig {
            include: vec!["**/*.rs".to_string()],
            ..CrawlConfig::default()
        };
        let err = crawl_local(dir.path(), &config).unwrap_err();
        assert!(matches!(err, CrawlerError::NoFiles(_)));
    }

    #[test]
    fn missing_directory_is_invalid_path() {
        let err = crawl_local(Path::new("/nonexistent/xyz"), &CrawlConfig::default()).unwrap_err();
        assert!(matches!(err, CrawlerError::InvalidPath(_)));
    }
}
