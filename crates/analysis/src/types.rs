use serde::{Deserialize, Serialize};

/// One identified abstraction. Its identity is its position in the
/// [`AbstractionSet`]; `file_indices` reference the crawled [`FileSet`]
/// (`tutor_crawler::FileSet`) and are only used to quote real source in
/// generated chapters, never for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abstraction {
    pub name: String,
    pub summary: String,
    pub file_indices: Vec<usize>,
}

/// Immutable batch of abstractions produced by the identification step.
/// Indices are assigned once (list position) and never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractionSet {
    abstractions: Vec<Abstraction>,
}

impl AbstractionSet {
    #[must_use]
    pub fn new(abstractions: Vec<Abstraction>) -> Self {
        Self { abstractions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abstractions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abstractions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Abstraction> {
        self.abstractions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Abstraction)> {
        self.abstractions.iter().enumerate()
    }

    #[must_use]
    pub fn abstractions(&self) -> &[Abstraction] {
        &self.abstractions
    }
}

/// Directed, labeled relationship hint between two abstraction indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: usize,
    pub to: usize,
    pub label: String,
}

/// Relationship analysis output: a short project summary plus the edge
/// list. Edge order is preserved for deterministic downstream behavior,
/// though ordering correctness never depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipGraph {
    pub project_summary: String,
    pub edges: Vec<RelationshipEdge>,
}

/// Parse an index entry from a model response. Accepts a bare integer or
/// the `N # Name` comment form the prompts ask for.
pub fn parse_index_entry(value: &serde_yaml::Value) -> Option<usize> {
    match value {
        serde_yaml::Value::Number(n) => n.as_u64().map(|n| n as usize),
        serde_yaml::Value::String(s) => {
            let head = s.split('#').next()?.trim();
            head.parse().ok()
        }
        _ => None,
    }
}
