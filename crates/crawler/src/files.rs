use serde::{Deserialize, Serialize};

/// One crawled file: repository-relative path (forward slashes) plus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// Ordered, read-only snapshot of the crawled repository.
///
/// File identity downstream is the position in this list; the order is
/// stable (sorted by path) so repeated runs see identical indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    files: Vec<SourceFile>,
}

impl FileSet {
    #[must_use]
    pub fn new(mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SourceFile> {
        self.files.get(index)
    }

    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SourceFile)> {
        self.files.iter().enumerate()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Commit metadata captured from a cloned repository, best effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub url: String,
    pub commit_hash: Option<String>,
    pub commit_short: Option<String>,
    pub commit_message: Option<String>,
    pub commit_author: Option<String>,
    pub commit_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_set_sorts_by_path() {
        let set = FileSet::new(vec![
            SourceFile {
                path: "src/main.rs".to_string(),
                content: String::new(),
            },
            SourceFile {
                path: "README.md".to_string(),
                content: String::new(),
            },
        ]);

        assert_eq!(set.paths(), vec!["README.md", "src/main.rs"]);
        assert_eq!(set.get(0).unwrap().path, "README.md");
        assert!(set.get(2).is_none());
    }
}
