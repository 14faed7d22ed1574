use crate::order::ChapterOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tutor_analysis::AbstractionSet;

/// Stable chapter identity, computed before any prose exists so every
/// chapter can link to every other chapter by its final filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChapterRef {
    /// Abstraction index.
    pub index: usize,
    /// 1-based position in the chapter order.
    pub position: usize,
    pub slug: String,
    pub filename: String,
}

/// Derive a filesystem/URL-safe slug from an abstraction name: lowercase,
/// runs of characters outside `[a-z0-9]` collapsed to a single `_`,
/// trimmed. A name with no usable characters falls back to `"chapter"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "chapter".to_string()
    } else {
        slug.to_string()
    }
}

/// Map every abstraction index to its [`ResolvedChapterRef`].
///
/// Pure and deterministic: identical inputs yield identical output. The
/// position prefix makes filenames unique even when two abstractions
/// share a slug, because positions are unique by the order's permutation
/// invariant.
#[must_use]
pub fn resolve_refs(
    order: &ChapterOrder,
    set: &AbstractionSet,
) -> BTreeMap<usize, ResolvedChapterRef> {
    let mut refs = BTreeMap::new();
    for (offset, index) in order.iter().enumerate() {
        let position = offset + 1;
        let name = set.get(index).map(|a| a.name.as_str()).unwrap_or_default();
        let slug = slugify(name);
        let filename = format!("{position:02}_{slug}.md");
        refs.insert(
            index,
            ResolvedChapterRef {
                index,
                position,
                slug,
                filename,
            },
        );
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugify_collapses_runs_and_lowercases() {
        assert_eq!(slugify("Request Router"), "request_router");
        assert_eq!(slugify("HTTP -- Client!!"), "http_client");
        assert_eq!(slugify("  Cache  "), "cache");
    }

    #[test]
    fn slugify_non_ascii_collapses_to_separator() {
        assert_eq!(slugify("Café Layer"), "caf_layer");
    }

    #[test]
    fn slugify_symbol_only_falls_back() {
        assert_eq!(slugify("!!!"), "chapter");
        assert_eq!(slugify(""), "chapter");
    }
}
