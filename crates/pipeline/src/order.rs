use crate::error::{PipelineError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeSet;
use tutor_analysis::{AbstractionSet, RelationshipGraph};

/// The linear teaching order: a permutation of `0..N` abstraction indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterOrder(Vec<usize>);

impl ChapterOrder {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// Compute the chapter order for `set` given the relationship hints in
/// `graph`.
///
/// The abstraction most referenced by others is considered foundational
/// and taught first: each round selects the unplaced abstraction with the
/// most incoming edges whose source is itself still unplaced, breaking
/// ties by lowest original index. Because every round places exactly one
/// abstraction regardless of graph shape, cycles and disconnected
/// components can never block progress.
///
/// Degradation rules: self-edges are ignored, edges referencing an index
/// outside `0..N` are dropped with a warning, and duplicate `(from, to)`
/// pairs count once. The returned order is re-checked as a permutation;
/// a failure there is an internal invariant violation and aborts.
pub fn order_chapters(set: &AbstractionSet, graph: &RelationshipGraph) -> Result<ChapterOrder> {
    let n = set.len();
    if n == 0 {
        return Ok(ChapterOrder(Vec::new()));
    }

    let mut hints: DiGraph<usize, ()> = DiGraph::with_capacity(n, graph.edges.len());
    for index in 0..n {
        hints.add_node(index);
    }

    let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
    for edge in &graph.edges {
        if edge.from >= n || edge.to >= n {
            log::warn!(
                "Dropping relationship edge {} -> {} ('{}'): index out of range (N = {n})",
                edge.from,
                edge.to,
                edge.label
            );
            continue;
        }
        if edge.from == edge.to {
            log::debug!("Ignoring self-edge on abstraction {}", edge.from);
            continue;
        }
        if seen.insert((edge.from, edge.to)) {
            hints.add_edge(NodeIndex::new(edge.from), NodeIndex::new(edge.to), ());
        }
    }

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for _ in 0..n {
        let mut best: Option<(usize, usize)> = None;
        for candidate in 0..n {
            if placed[candidate] {
                continue;
            }
            let score = hints
                .edges_directed(NodeIndex::new(candidate), Direction::Incoming)
                .filter(|edge| !placed[edge.source().index()])
                .count();
            // Strict comparison on an ascending scan keeps the lowest
            // index on ties.
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }
        let Some((_, next)) = best else {
            return Err(PipelineError::InvariantViolation(
                "no unplaced abstraction found before the order was complete".to_string(),
            ));
        };
        placed[next] = true;
        order.push(next);
    }

    verify_permutation(&order, n)?;
    Ok(ChapterOrder(order))
}

fn verify_permutation(order: &[usize], n: usize) -> Result<()> {
    if order.len() != n {
        return Err(PipelineError::InvariantViolation(format!(
            "chapter order has length {} for {n} abstractions",
            order.len()
        )));
    }
    let mut seen = vec![false; n];
    for &index in order {
        if index >= n || seen[index] {
            return Err(PipelineError::InvariantViolation(format!(
                "chapter order is not a permutation: index {index} invalid or repeated"
            )));
        }
        seen[index] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_analysis::{Abstraction, RelationshipEdge};

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

    fn make_edge(from: usize, to: usize) -> RelationshipEdge {
        RelationshipEdge {
            from,
            to,
            label: "uses".to_string(),
        }
    }

    #[test]
    fn empty_set_yields_empty_order() {
        let order = order_chapters(&make_set(&[]), &RelationshipGraph::default()).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn no_edges_yields_index_order() {
        let order = order_chapters(&make_set(&["A", "B", "C"]), &RelationshipGraph::default())
            .unwrap();
        assert_eq!(order.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn duplicate_edges_count_once() {
        // Two copies of 0 -> 2 must not push C above B: both score 1.
        let graph = RelationshipGraph {
            project_summary: String::new(),
            edges: vec![make_edge(0, 2), make_edge(0, 2), make_edge(2, 1)],
        };
        let order = order_chapters(&make_set(&["A", "B", "C"]), &graph).unwrap();
        // Scores: A=0, B=1 (from C), C=1 (from A, deduped). Tie at 1 -> B.
        assert_eq!(order.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn self_edges_are_ignored() {
        let graph = RelationshipGraph {
            project_summary: String::new(),
            edges: vec![make_edge(1, 1)],
        };
        let order = order_chapters(&make_set(&["A", "B"]), &graph).unwrap();
        assert_eq!(order.as_slice(), &[0, 1]);
    }
}
