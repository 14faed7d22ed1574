use crate::error::{CrawlerError, Result};
use crate::files::{FileSet, RepoInfo};
use crate::local::{crawl_local, CrawlConfig};
use tokio::process::Command;

/// Parsed git source: clone URL plus optional branch/subdirectory extracted
/// from GitHub-style `/tree/<branch>/<subdir>` suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub url: String,
    pub branch: Option<String>,
    pub subdirectory: Option<String>,
}

impl GitSource {
    /// Project name derived from the last path segment of the URL.
    #[must_use]
    pub fn project_name(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
        last.trim_end_matches(".git").to_string()
    }
}

/// Parse a repository URL.
///
/// Accepts plain clone URLs (`https://.../repo.git`, `git@host:owner/repo`)
/// and GitHub web URLs with a `/tree/<branch>[/<subdir>]` suffix; the suffix
/// is split off so the clone uses the bare repository URL.
pub fn parse_git_url(raw: &str) -> Result<GitSource> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CrawlerError::InvalidUrl("empty URL".to_string()));
    }

    if let Some(pos) = raw.find("/tree/") {
        let url = raw[..pos].trim_end_matches('/').to_string();
        let rest = &raw[pos + "/tree/".len()..];
        let rest = rest.trim_matches('/');
        if rest.is_empty() {
            return Err(CrawlerError::InvalidUrl(format!(
                "missing branch after /tree/ in {raw}"
            )));
        }
        let (branch, subdirectory) = match rest.split_once('/') {
            Some((branch, subdir)) => (branch.to_string(), Some(subdir.to_string())),
            None => (rest.to_string(), None),
        };
        return Ok(GitSource {
            url,
            branch: Some(branch),
            subdirectory,
        });
    }

    Ok(GitSource {
        url: raw.trim_end_matches('/').to_string(),
        branch: None,
        subdirectory: None,
    })
}

/// Clone a repository shallowly and crawl it.
///
/// The checkout lives in a temporary directory that is removed when this
/// function returns; commit metadata is captured best effort and never
/// fails the crawl.
pub async fn crawl_git(source: &GitSource, config: &CrawlConfig) -> Result<(FileSet, RepoInfo)> {
    let temp = tempfile::tempdir()?;
    let dest = temp.path().to_path_buf();

    log::info!("Cloning {} into {}", source.url, dest.display());

    let mut clone = Command::new("git");
    clone.arg("clone").arg("--depth").arg("1");
    if let Some(branch) = &source.branch {
        clone.arg("--branch").arg(branch);
    }
    clone.arg(&source.url).arg(&dest);

    let output = clone.output().await?;
    if !output.status.success() {
        return Err(CrawlerError::GitError {
            operation: "clone".to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let info = read_commit_info(&dest, &source.url).await;

    let crawl_root = match &source.subdirectory {
        Some(subdir) => {
            let candidate = dest.join(subdir);
            if candidate.is_dir() {
                candidate
            } else {
                log::warn!(
                    "Subdirectory '{subdir}' not found in {}, crawling entire repository",
                    source.url
                );
                dest.clone()
            }
        }
        None => dest.clone(),
    };

    let files = crawl_local(&crawl_root, config)?;
    Ok((files, info))
}

async fn read_commit_info(repo_dir: &std::path::Path, url: &str) -> RepoInfo {
    let mut info = RepoInfo {
        url: url.to_string(),
        ..RepoInfo::default()
    };

    // %x1f is an unambiguous field separator for free-text commit messages.
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .arg("log")
        .arg("-1")
        .arg("--format=%H%x1f%h%x1f%s%x1f%an%x1f%cI")
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let mut fields = stdout.trim().split('\u{1f}');
            info.commit_hash = fields.next().map(str::to_string);
            info.commit_short = fields.next().map(str::to_string);
            info.commit_message = fields.next().map(str::to_string);
            info.commit_author = fields.next().map(str::to_string);
            info.commit_date = fields.next().map(str::to_string);
        }
        Ok(output) => {
            log::warn!(
                "Could not read commit info: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Err(err) => {
            log::warn!("Could not read commit info: {err}");
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_clone_url() {
        let source = parse_git_url("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(source.url, "https://github.com/acme/widgets.git");
        assert_eq!(source.branch, None);
        assert_eq!(source.subdirectory, None);
        assert_eq!(source.project_name(), "widgets");
    }

    #[test]
    fn parses_tree_suffix_with_branch() {
        let source = parse_git_url("https://github.com/acme/widgets/tree/main").unwrap();
        assert_eq!(source.url, "https://github.com/acme/widgets");
        assert_eq!(source.branch.as_deref(), Some("main"));
        assert_eq!(source.subdirectory, None);
    }

    #[test]
    fn parses_tree_suffix_with_subdirectory() {
        let source =
            parse_git_url("https://github.com/acme/widgets/tree/dev/crates/core").unwrap();
        assert_eq!(source.url, "https://github.com/acme/widgets");
        assert_eq!(source.branch.as_deref(), Some("dev"));
        assert_eq!(source.subdirectory.as_deref(), Some("crates/core"));
        assert_eq!(source.project_name(), "widgets");
    }

    #[test]
    fn rejects_empty_and_dangling_urls() {
        assert!(parse_git_url("  ").is_err());
        assert!(parse_git_url("https://github.com/acme/widgets/tree/").is_err());
    }
}
