//! Partial updates merged into the store's state.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{Color, EdgeId, ElementId, Graph, NodeId, ProblemInstance};
use crate::state::{Markers, SearchRange, VisualState};

/// One partial update. Patches that do not fit the current instance shape
/// (e.g. a node color on an array) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    /// Replace the compared/swapped index sets.
    Highlight {
        comparing: Vec<usize>,
        swapping: Vec<usize>,
    },
    /// Clear compared/swapped indices.
    ClearHighlights,
    /// Swap two array elements, located by identity.
    SwapElements { a: ElementId, b: ElementId },
    /// Reorder the array to the given identity order. Unknown ids are
    /// ignored and missing ones keep their relative order at the end.
    Reorder { order: Vec<ElementId> },
    /// Add indices to the sorted set.
    MarkSorted { indices: Vec<usize> },
    /// Replace the sorted set.
    SetSorted { indices: Vec<usize> },
    /// Mark every index of the array as sorted.
    MarkAllSorted,
    /// Binary search window.
    SearchRange(Option<SearchRange>),
    /// Search hit (or clear it).
    Found(Option<usize>),
    /// Search exhausted.
    NotFound,
    Target(Option<i64>),
    NodeColor { node: NodeId, color: Color },
    EdgeColor { edge: EdgeId, color: Color },
    /// Recolor every node and edge.
    ResetColors { node: Color, edge: Color },
    /// Replace the whole graph (tree layout projections).
    ReplaceGraph(Graph),
    Cell { row: usize, col: usize, value: i64 },
    /// Active DP cell and the cells it depends on.
    FocusCells {
        active: Option<(usize, usize)>,
        dependencies: Vec<(usize, usize)>,
    },
    Describe(Option<String>),
    CodeLine(Option<u32>),
}

impl Patch {
    pub fn compare(a: usize, b: usize) -> Self {
        Patch::Highlight {
            comparing: vec![a, b],
            swapping: Vec::new(),
        }
    }

    pub fn swapping(a: usize, b: usize) -> Self {
        Patch::Highlight {
            comparing: Vec::new(),
            swapping: vec![a, b],
        }
    }

    pub fn probe(index: usize) -> Self {
        Patch::Highlight {
            comparing: vec![index],
            swapping: Vec::new(),
        }
    }

    pub fn describe(text: impl Into<String>) -> Self {
        Patch::Describe(Some(text.into()))
    }

    /// Merge this patch into `state`.
    pub fn apply(&self, state: &mut VisualState) {
        let markers = &mut state.markers;
        match self {
            Patch::Highlight {
                comparing,
                swapping,
            } => {
                markers.comparing = comparing.clone();
                markers.swapping = swapping.clone();
            }
            Patch::ClearHighlights => {
                markers.comparing.clear();
                markers.swapping.clear();
            }
            Patch::SwapElements { a, b } => {
                if let ProblemInstance::Array(items) = &mut state.instance {
                    let ia = items.iter().position(|e| e.id == *a);
                    let ib = items.iter().position(|e| e.id == *b);
                    match (ia, ib) {
                        (Some(ia), Some(ib)) => items.swap(ia, ib),
                        _ => trace!(?a, ?b, "swap of unknown element ignored"),
                    }
                }
            }
            Patch::Reorder { order } => {
                if let ProblemInstance::Array(items) = &mut state.instance {
                    let mut remaining = std::mem::take(items);
                    for id in order {
                        if let Some(pos) = remaining.iter().position(|e| e.id == *id) {
                            items.push(remaining.remove(pos));
                        }
                    }
                    items.extend(remaining);
                }
            }
            Patch::MarkSorted { indices } => markers.sorted.extend(indices.iter().copied()),
            Patch::SetSorted { indices } => {
                markers.sorted = indices.iter().copied().collect();
            }
            Patch::MarkAllSorted => {
                markers.sorted = (0..state.instance.len()).collect();
            }
            Patch::SearchRange(range) => markers.search_range = *range,
            Patch::Found(index) => {
                markers.found = *index;
                if index.is_some() {
                    markers.not_found = false;
                }
            }
            Patch::NotFound => {
                markers.found = None;
                markers.not_found = true;
            }
            Patch::Target(target) => markers.target = *target,
            Patch::NodeColor { node, color } => {
                if let Some(n) = graph_mut(&mut state.instance).and_then(|g| g.node_mut(*node)) {
                    n.color = *color;
                }
            }
            Patch::EdgeColor { edge, color } => {
                if let Some(e) = graph_mut(&mut state.instance).and_then(|g| g.edge_mut(*edge)) {
                    e.color = *color;
                }
            }
            Patch::ResetColors { node, edge } => {
                if let Some(graph) = graph_mut(&mut state.instance) {
                    graph.nodes.iter_mut().for_each(|n| n.color = *node);
                    graph.edges.iter_mut().for_each(|e| e.color = *edge);
                }
            }
            Patch::ReplaceGraph(graph) => state.instance = ProblemInstance::Graph(graph.clone()),
            Patch::Cell { row, col, value } => {
                if let ProblemInstance::Table(table) = &mut state.instance {
                    if let Some(cell) = table.cells.get_mut(*row).and_then(|r| r.get_mut(*col)) {
                        *cell = Some(*value);
                    }
                }
            }
            Patch::FocusCells {
                active,
                dependencies,
            } => {
                markers.active_cell = *active;
                markers.dependency_cells = dependencies.clone();
            }
            Patch::Describe(text) => markers.description = text.clone(),
            Patch::CodeLine(line) => markers.code_line = *line,
        }
    }
}

fn graph_mut(instance: &mut ProblemInstance) -> Option<&mut Graph> {
    match instance {
        ProblemInstance::Graph(graph) => Some(graph),
        _ => None,
    }
}

/// Markers to start a fresh instance with.
pub(crate) fn initial_markers(target: Option<i64>, description: Option<String>) -> Markers {
    Markers {
        target,
        description,
        ..Markers::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DpTable, Edge, Element, Node, Position};

    fn array_state(values: &[i64]) -> VisualState {
        let mut state = VisualState::new(0, 50);
        state.instance = ProblemInstance::Array(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Element::new(i as u64, *v))
                .collect(),
        );
        state
    }

    fn values(state: &VisualState) -> Vec<i64> {
        state.instance.as_array().unwrap().iter().map(|e| e.value).collect()
    }

    #[test]
    fn swap_moves_identity() {
        let mut state = array_state(&[5, 3, 1]);
        Patch::SwapElements {
            a: ElementId(0),
            b: ElementId(2),
        }
        .apply(&mut state);
        assert_eq!(values(&state), vec![1, 3, 5]);
        assert_eq!(state.instance.as_array().unwrap()[0].id, ElementId(2));
    }

    #[test]
    fn reorder_keeps_unlisted_elements() {
        let mut state = array_state(&[5, 3, 1]);
        Patch::Reorder {
            order: vec![ElementId(2), ElementId(7), ElementId(1)],
        }
        .apply(&mut state);
        assert_eq!(values(&state), vec![1, 3, 5]);
    }

    #[test]
    fn mark_all_sorted_covers_every_index() {
        let mut state = array_state(&[1, 2, 3, 4]);
        Patch::MarkAllSorted.apply(&mut state);
        assert_eq!(state.markers.sorted.len(), 4);
    }

    #[test]
    fn shape_mismatch_is_ignored() {
        let mut state = array_state(&[1, 2]);
        let before = state.clone();
        Patch::NodeColor {
            node: NodeId(0),
            color: Color::Visited,
        }
        .apply(&mut state);
        Patch::Cell {
            row: 0,
            col: 0,
            value: 1,
        }
        .apply(&mut state);
        assert_eq!(state, before);
    }

    #[test]
    fn graph_patches() {
        let mut state = VisualState::new(0, 50);
        state.instance = ProblemInstance::Graph(Graph {
            nodes: vec![
                Node::new(NodeId(0), 1, Position::ORIGIN),
                Node::new(NodeId(1), 2, Position::ORIGIN),
            ],
            edges: vec![Edge::new(EdgeId(4), NodeId(0), NodeId(1))],
            root: None,
        });
        Patch::NodeColor {
            node: NodeId(1),
            color: Color::Found,
        }
        .apply(&mut state);
        Patch::EdgeColor {
            edge: EdgeId(4),
            color: Color::Path,
        }
        .apply(&mut state);
        let graph = state.instance.as_graph().unwrap();
        assert_eq!(graph.node(NodeId(1)).unwrap().color, Color::Found);
        assert_eq!(graph.edges[0].color, Color::Path);

        Patch::ResetColors {
            node: Color::Default,
            edge: Color::Idle,
        }
        .apply(&mut state);
        let graph = state.instance.as_graph().unwrap();
        assert!(graph.nodes.iter().all(|n| n.color == Color::Default));
        assert_eq!(graph.edges[0].color, Color::Idle);
    }

    #[test]
    fn cell_patch_fills_table() {
        let mut state = VisualState::new(0, 50);
        state.instance = ProblemInstance::Table(DpTable::fibonacci(3));
        Patch::Cell {
            row: 0,
            col: 2,
            value: 1,
        }
        .apply(&mut state);
        // Out of range cells are ignored.
        Patch::Cell {
            row: 4,
            col: 0,
            value: 1,
        }
        .apply(&mut state);
        assert_eq!(state.instance.as_table().unwrap().get(0, 2), Some(1));
    }

    #[test]
    fn not_found_clears_hit() {
        let mut state = array_state(&[1]);
        Patch::Found(Some(0)).apply(&mut state);
        Patch::NotFound.apply(&mut state);
        assert_eq!(state.markers.found, None);
        assert!(state.markers.not_found);
    }
}
