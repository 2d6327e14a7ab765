//! Traversal and shortest-path drivers over the graph instance.
//!
//! Graph drivers read the graph once at run start and publish progress as
//! node and edge color patches. The traversal starts at the first node.

mod bfs;
mod dfs;
mod dijkstra;

pub use bfs::Bfs;
pub use dfs::Dfs;
pub use dijkstra::Dijkstra;

use algoviz_engine::{Cancelled, Color, Graph, NodeId, Pace, Patch, Step, StepEmitter};

/// Clear colors left over from a previous run.
pub(crate) async fn reset_colors(emitter: &StepEmitter, log: String) -> Result<(), Cancelled> {
    emitter
        .emit(
            Step::new()
                .patch(Patch::ResetColors {
                    node: Color::Default,
                    edge: Color::Idle,
                })
                .patch(Patch::Found(None))
                .log(log)
                .pace(Pace::Half),
        )
        .await
}

/// Display value of a node.
pub(crate) fn label(graph: &Graph, node: NodeId) -> i64 {
    graph.node(node).map(|n| n.value).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use algoviz_engine::{Edge, EdgeId, Graph, Node, NodeId, Position};

    /// Build a graph from `(source, target, weight)` triples over `n` nodes
    /// valued by index.
    pub fn graph(n: u64, edges: &[(u64, u64, u32)]) -> Graph {
        Graph {
            nodes: (0..n)
                .map(|i| Node::new(NodeId(i), i as i64, Position::ORIGIN))
                .collect(),
            edges: edges
                .iter()
                .enumerate()
                .map(|(i, (s, t, w))| {
                    Edge::new(EdgeId(i as u64), NodeId(*s), NodeId(*t)).weighted(*w)
                })
                .collect(),
            root: None,
        }
    }
}
