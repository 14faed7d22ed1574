use crate::error::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prompt-keyed response cache persisted as a JSON file.
///
/// Keys are sha256 digests of the prompt text so the file stays readable
/// regardless of prompt size. A corrupt or missing file starts an empty
/// cache; persistence failures are logged, never fatal.
#[derive(Debug)]
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

fn prompt_key(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ResponseCache {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!(
                        "Failed to parse cache {}: {err}; starting empty",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    #[must_use]
    pub fn get(&self, prompt: &str) -> Option<&str> {
        self.entries.get(&prompt_key(prompt)).map(String::as_str)
    }

    pub fn put(&mut self, prompt: &str, response: &str) {
        self.entries.insert(prompt_key(prompt), response.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to disk.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
