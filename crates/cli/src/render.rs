use tutor_analysis::{AbstractionSet, RelationshipGraph};
use tutor_crawler::RepoInfo;
use tutor_pipeline::TutorialIndex;

/// Appended to every emitted file.
pub const FOOTER: &str = "\n\n---\n\nGenerated by repo-tutor";

const MAX_EDGE_LABEL: usize = 30;

/// Render the relationship graph as a Mermaid `flowchart TD`.
///
/// Node labels use the abstraction names; edge labels are quoted, stripped
/// of characters Mermaid would mis-parse, and truncated.
pub fn mermaid_diagram(set: &AbstractionSet, graph: &RelationshipGraph) -> String {
    let mut lines = vec!["flowchart TD".to_string()];

    for (index, abstraction) in set.iter() {
        let label = abstraction.name.replace('"', "");
        lines.push(format!("    A{index}[\"{label}\"]"));
    }

    for edge in &graph.edges {
        if set.get(edge.from).is_none() || set.get(edge.to).is_none() {
            continue;
        }
        let mut label = edge.label.replace('"', "").replace('\n', " ");
        if label.chars().count() > MAX_EDGE_LABEL {
            label = label.chars().take(MAX_EDGE_LABEL - 3).collect::<String>() + "...";
        }
        lines.push(format!("    A{} -- \"{label}\" --> A{}", edge.from, edge.to));
    }

    lines.join("\n")
}

/// Generation metadata shown at the top of the index document.
pub struct IndexMetadata {
    pub generated_at: String,
    pub repo: Option<RepoInfo>,
}

impl IndexMetadata {
    pub fn now(repo: Option<RepoInfo>) -> Self {
        Self {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            repo,
        }
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("**Generated:** {}", self.generated_at)];
        if let Some(repo) = &self.repo {
            if !repo.url.is_empty() {
                lines.push(format!("**Repository:** {}", repo.url));
            }
            if let Some(short) = &repo.commit_short {
                let mut commit = short.clone();
                if let Some(message) = &repo.commit_message {
                    let message: String = message.chars().take(60).collect();
                    commit = format!("{commit} - {message}");
                }
                lines.push(format!("**Commit:** {commit}"));
            }
            if let Some(author) = &repo.commit_author {
                lines.push(format!("**Author:** {author}"));
            }
        }
        lines
    }
}

/// Render the index document: summary, metadata, source layout, the
/// relationship diagram, and the linked chapter listing.
pub fn render_index(
    project_name: &str,
    index: &TutorialIndex,
    diagram: &str,
    source_tree: &str,
    metadata: &IndexMetadata,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Tutorial: {project_name}\n\n"));

    if !index.project_summary.is_empty() {
        out.push_str(&format!("{}\n\n", index.project_summary));
    }

    for line in metadata.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');

    if !source_tree.is_empty() {
        out.push_str("## Source Layout\n\n```\n");
        out.push_str(source_tree);
        out.push_str("\n```\n\n");
    }

    out.push_str("## Component Relationships\n\n```mermaid\n");
    out.push_str(diagram);
    out.push_str("\n```\n\n## Chapters\n\n");

    for (i, entry) in index.entries.iter().enumerate() {
        let summary = first_line(&entry.summary);
        if summary.is_empty() {
            out.push_str(&format!("{}. [{}]({})\n", i + 1, entry.name, entry.filename));
        } else {
            out.push_str(&format!(
                "{}. [{}]({}) - {}\n",
                i + 1,
                entry.name,
                entry.filename,
                summary
            ));
        }
    }

    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tutor_analysis::{Abstraction, RelationshipEdge};
    use tutor_pipeline::IndexEntry;

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
    fn mermaid_nodes_and_edges() {
        let set = make_set(&["Router", "Cache"]);
        let graph = RelationshipGraph {
            project_summary: String::new(),
            edges: vec![RelationshipEdge {
                from: 1,
                to: 0,
                label: "reads \"hot\" entries".to_string(),
            }],
        };

        let diagram = mermaid_diagram(&set, &graph);
        assert!(diagram.starts_with("flowchart TD"));
        assert!(diagram.contains("A0[\"Router\"]"));
        assert!(diagram.contains("A1[\"Cache\"]"));
        // Quotes are stripped from edge labels.
        assert!(diagram.contains("A1 -- \"reads hot entries\" --> A0"));
    }

    #[test]
    fn mermaid_truncates_long_labels() {
        let set = make_set(&["A", "B"]);
        let graph = RelationshipGraph {
            project_summary: String::new(),
            edges: vec![RelationshipEdge {
                from: 0,
                to: 1,
                label: "x".repeat(50),
            }],
        };

        let diagram = mermaid_diagram(&set, &graph);
        let expected = format!("\"{}...\"", "x".repeat(MAX_EDGE_LABEL - 3));
        assert!(diagram.contains(&expected));
    }

    #[test]
    fn index_lists_chapters_in_order() {
        let index = TutorialIndex {
            project_summary: "A service.".to_string(),
            entries: vec![
                IndexEntry {
                    filename: "01_router.md".to_string(),
                    name: "Router".to_string(),
                    summary: "Routes requests.\nMore detail.".to_string(),
                },
                IndexEntry {
                    filename: "02_cache.md".to_string(),
                    name: "Cache".to_string(),
                    summary: String::new(),
                },
            ],
        };
        let metadata = IndexMetadata {
            generated_at: "2026-01-01 00:00:00".to_string(),
            repo: None,
        };

        let rendered = render_index("widgets", &index, "flowchart TD", "", &metadata);
        assert!(rendered.starts_with("# Tutorial: widgets"));
        assert!(rendered.contains("**Generated:** 2026-01-01 00:00:00"));
        assert!(rendered.contains("1. [Router](01_router.md) - Routes requests."));
        assert!(rendered.contains("2. [Cache](02_cache.md)\n"));
        assert_eq!(rendered.matches("```mermaid").count(), 1);
    }
}
