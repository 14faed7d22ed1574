use crate::driver::Chapter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tutor_analysis::AbstractionSet;

/// One row of the tutorial index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub filename: String,
    pub name: String,
    pub summary: String,
}

/// The index document structure handed to the rendering/emission layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialIndex {
    pub project_summary: String,
    pub entries: Vec<IndexEntry>,
}

/// A chapter ready for file emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterFile {
    pub filename: String,
    pub body: String,
}

/// A markdown link in `chapter` pointing at a chapter filename that does
/// not exist in the assembled set. Reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub chapter: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledTutorial {
    pub index: TutorialIndex,
    pub chapters: Vec<ChapterFile>,
    pub broken_links: Vec<BrokenLink>,
}

static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(([^)#\s]+\.md)(?:#[^)]*)?\)").expect("markdown link regex"));

/// Assemble the final tutorial: ordered index entries plus the chapter
/// files, with a final broken-link check over every chapter body.
///
/// No reordering, no content mutation. The only logic is the consistency
/// check: every relative `.md` link inside a chapter must point at a
/// chapter present in the set.
#[must_use]
pub fn assemble(
    project_summary: &str,
    set: &AbstractionSet,
    chapters: &[Chapter],
) -> AssembledTutorial {
    let entries = chapters
        .iter()
        .map(|chapter| IndexEntry {
            filename: chapter.chapter_ref.filename.clone(),
            name: chapter.name.clone(),
            summary: set
                .get(chapter.chapter_ref.index)
                .map(|a| a.summary.clone())
                .unwrap_or_default(),
        })
        .collect();

    let files: Vec<ChapterFile> = chapters
        .iter()
        .map(|chapter| ChapterFile {
            filename: chapter.chapter_ref.filename.clone(),
            body: chapter.body.clone(),
        })
        .collect();

    let broken_links = check_links(&files);
    for link in &broken_links {
        log::warn!(
            "Broken link in {}: target '{}' is not an assembled chapter",
            link.chapter,
            link.target
        );
    }

    AssembledTutorial {
        index: TutorialIndex {
            project_summary: project_summary.to_string(),
            entries,
        },
        chapters: files,
        broken_links,
    }
}

fn check_links(files: &[ChapterFile]) -> Vec<BrokenLink> {
    let known: BTreeSet<&str> = files.iter().map(|f| f.filename.as_str()).collect();

    let mut broken = Vec::new();
    for file in files {
        for captures in MD_LINK.captures_iter(&file.body) {
            let raw_target = &captures[1];
            if raw_target.contains("://") {
                continue;
            }
            let target = raw_target.trim_start_matches("./");
            // Only same-directory chapter links participate in the
            // consistency check; paths into the wider repo are out of scope.
            if target.contains('/') {
                continue;
            }
            if !known.contains(target) {
                broken.push(BrokenLink {
                    chapter: file.filename.clone(),
                    target: target.to_string(),
                });
            }
        }
    }
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedChapterRef;
    use pretty_assertions::assert_eq;
    use tutor_analysis::Abstraction;

    fn make_chapter(index: usize, position: usize, name: &str, body: &str) -> Chapter {
        let slug = crate::resolve::slugify(name);
        Chapter {
            chapter_ref: ResolvedChapterRef {
                index,
                position,
                slug: slug.clone(),
                filename: format!("{position:02}_{slug}.md"),
            },
            name: name.to_string(),
            body: body.to_string(),
        }
    }

    fn make_set(names: &[&str]) -> AbstractionSet {
        AbstractionSet::new(
            names
                .iter()
                .map(|name| Abstraction {
                    name: (*name).to_string(),
                    summary: format!("{name} summary"),
                    file_indices: Vec::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn assembles_index_in_chapter_order() {
        let set = make_set(&["Router", "Cache"]);
        let chapters = vec![
            make_chapter(1, 1, "Cache", "# Cache\nSee [Router](02_router.md)."),
            make_chapter(0, 2, "Router", "# Router"),
        ];

        let assembled = assemble("A service.", &set, &chapters);

        assert_eq!(assembled.index.project_summary, "A service.");
        assert_eq!(assembled.index.entries.len(), 2);
        assert_eq!(assembled.index.entries[0].filename, "01_cache.md");
        assert_eq!(assembled.index.entries[0].summary, "Cache summary");
        assert_eq!(assembled.index.entries[1].filename, "02_router.md");
        assert!(assembled.broken_links.is_empty());
    }

    #[test]
    fn reports_broken_links_without_dropping_them() {
        let set = make_set(&["Router"]);
        let chapters = vec![make_chapter(
            0,
            1,
            "Router",
            "# Router\nSee [Ghost](02_ghost.md) and [site](https://example.com/x.md).",
        )];

        let assembled = assemble("A service.", &set, &chapters);

        assert_eq!(
            assembled.broken_links,
            vec![BrokenLink {
                chapter: "01_router.md".to_string(),
                target: "02_ghost.md".to_string(),
            }]
        );
        // The chapter body itself is untouched.
        assert!(assembled.chapters[0].body.contains("02_ghost.md"));
    }

    #[test]
    fn empty_input_assembles_empty_tutorial() {
        let assembled = assemble("", &make_set(&[]), &[]);
        assert!(assembled.index.entries.is_empty());
        assert!(assembled.chapters.is_empty());
        assert!(assembled.broken_links.is_empty());
    }
}
