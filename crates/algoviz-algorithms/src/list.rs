//! Singly and doubly linked lists: search and in-place reversal.
//!
//! A list is stored as a graph: `right` is the next pointer, `left` the
//! previous pointer of a doubly linked node, and `root` the head.

use std::collections::HashMap;

use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, Edge, EdgeId, Graph, Node, NodeId, Outcome, Pace, Patch,
    Position, RunInput, StatKind, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

const SPACING: f32 = 1.8;
/// Set on the id of every backward edge so it never collides with a
/// forward edge, whose id is its source node's id.
const BACK_EDGE: u64 = 1 << 32;

#[derive(Debug, Clone, PartialEq)]
struct ListNode {
    id: NodeId,
    value: i64,
    next: Option<usize>,
    prev: Option<usize>,
    color: Color,
    link: Color,
}

/// Working copy of a list. Slots keep their screen position while links
/// are rewired.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListModel {
    nodes: Vec<ListNode>,
    head: Option<usize>,
    doubly: bool,
}

impl ListModel {
    /// Straight list over `values`, head first.
    pub fn new(values: &[i64], doubly: bool) -> Self {
        let n = values.len();
        let nodes = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ListNode {
                id: NodeId(i as u64),
                value,
                next: (i + 1 < n).then_some(i + 1),
                prev: (doubly && i > 0).then(|| i - 1),
                color: Color::Default,
                link: Color::Idle,
            })
            .collect();
        Self {
            nodes,
            head: (n > 0).then_some(0),
            doubly,
        }
    }

    pub fn from_graph(graph: &Graph) -> Self {
        let index: HashMap<NodeId, usize> =
            graph.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let link = |id: Option<NodeId>| id.and_then(|id| index.get(&id).copied());
        let nodes: Vec<ListNode> = graph
            .nodes
            .iter()
            .map(|n| ListNode {
                id: n.id,
                value: n.value,
                next: link(n.right),
                prev: link(n.left),
                color: Color::Default,
                link: Color::Idle,
            })
            .collect();
        let doubly = nodes.iter().any(|n| n.prev.is_some());
        Self {
            nodes,
            head: link(graph.root),
            doubly,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Slots in link order from the head. Stops on a cycle.
    pub fn walk(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut current = self.head;
        while let Some(idx) = current {
            if order.len() == self.nodes.len() {
                break;
            }
            order.push(idx);
            current = self.nodes[idx].next;
        }
        order
    }

    fn reset_colors(&mut self) {
        for node in &mut self.nodes {
            node.color = Color::Default;
            node.link = Color::Idle;
        }
    }

    pub fn project(&self) -> Graph {
        let start = -((self.nodes.len().saturating_sub(1)) as f32 * SPACING) / 2.0;
        let id_of = |idx: Option<usize>| idx.map(|i| self.nodes[i].id);

        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| Node {
                color: n.color,
                right: id_of(n.next),
                left: if self.doubly { id_of(n.prev) } else { None },
                ..Node::new(n.id, n.value, Position::new(start + i as f32 * SPACING, 0.0, 0.0))
            })
            .collect();

        let mut edges = Vec::new();
        for n in &self.nodes {
            if let Some(next) = n.next {
                let mut edge = Edge::new(EdgeId(n.id.0), n.id, self.nodes[next].id);
                edge.color = n.link;
                edges.push(edge);
            }
            if let (true, Some(prev)) = (self.doubly, n.prev) {
                let mut edge = Edge::new(EdgeId(BACK_EDGE | n.id.0), n.id, self.nodes[prev].id);
                edge.color = Color::Muted;
                edges.push(edge);
            }
        }

        Graph {
            nodes,
            edges,
            root: id_of(self.head),
        }
    }
}

/// Flat projection of a fresh list.
pub(crate) fn build(values: &[i64], doubly: bool) -> Graph {
    ListModel::new(values, doubly).project()
}

/// Walks from the head until the target value is found.
#[derive(Debug, Clone, Copy)]
pub struct ListSearch {
    doubly: bool,
}

impl ListSearch {
    pub fn singly() -> Self {
        Self { doubly: false }
    }

    pub fn doubly() -> Self {
        Self { doubly: true }
    }
}

impl Driver for ListSearch {
    fn algorithm(&self) -> Algorithm {
        if self.doubly {
            Algorithm::Doubly
        } else {
            Algorithm::Singly
        }
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let list = input
                .instance
                .as_graph()
                .map(ListModel::from_graph)
                .unwrap_or_default();
            let Some(target) = input.target else {
                emitter
                    .emit(Step::new().log("No search target set.").pace(Pace::Instant))
                    .await?;
                return Ok(Outcome::Skipped);
            };

            emitter
                .emit(
                    Step::new()
                        .patch(Patch::ResetColors {
                            node: Color::Default,
                            edge: Color::Idle,
                        })
                        .patch(Patch::Target(Some(target)))
                        .patch(Patch::Found(None))
                        .patch(Patch::describe(format!("Searching for {target}")))
                        .log(format!("Searching for value {target}..."))
                        .pace(Pace::Half),
                )
                .await?;

            for (index, idx) in list.walk().into_iter().enumerate() {
                let node = &list.nodes[idx];
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::NodeColor {
                                node: node.id,
                                color: Color::Active,
                            })
                            .log(format!("Checking node {index}: value {}", node.value))
                            .stat(StatKind::Comparison),
                    )
                    .await?;

                if node.value == target {
                    emitter
                        .emit(
                            Step::new()
                                .patch(Patch::NodeColor {
                                    node: node.id,
                                    color: Color::Found,
                                })
                                .patch(Patch::Found(Some(index)))
                                .patch(Patch::describe(format!("Found {target}")))
                                .log(format!("Found {target} at index {index}!")),
                        )
                        .await?;
                    return Ok(Outcome::Found { index });
                }

                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::NodeColor {
                                node: node.id,
                                color: Color::Visited,
                            })
                            .pace(Pace::Half),
                    )
                    .await?;
            }

            emitter
                .emit(
                    Step::new()
                        .patch(Patch::NotFound)
                        .patch(Patch::describe(format!("{target} not found")))
                        .log(format!("{target} not found in the list.")),
                )
                .await?;
            Ok(Outcome::NotFound)
        }
        .boxed()
    }
}

/// Iterative in-place reversal with previous, current and next pointers.
#[derive(Debug, Default)]
pub struct ListReversal;

impl Driver for ListReversal {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Reversal
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let mut list = input
                .instance
                .as_graph()
                .map(ListModel::from_graph)
                .unwrap_or_default();
            list.reset_colors();
            emitter
                .emit(
                    Step::new()
                        .patch(Patch::ReplaceGraph(list.project()))
                        .patch(Patch::describe("Reversing list"))
                        .log("Starting Iterative Reversal...")
                        .pace(Pace::Half),
                )
                .await?;

            let mut prev: Option<usize> = None;
            let mut current = list.head;
            let mut remaining = list.len();
            while let Some(curr) = current {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;

                list.nodes[curr].color = Color::Active;
                if let Some(p) = prev {
                    list.nodes[p].color = Color::Sorted;
                }
                let value = list.nodes[curr].value;
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::ReplaceGraph(list.project()))
                            .log(format!("Processing Node {value}..."))
                            .pace(Pace::Scaled(1.5)),
                    )
                    .await?;

                let next = list.nodes[curr].next;
                list.nodes[curr].next = prev;
                list.nodes[curr].link = Color::Swapping;
                if list.doubly {
                    list.nodes[curr].prev = next;
                }
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::ReplaceGraph(list.project()))
                            .stat(StatKind::Operation),
                    )
                    .await?;

                list.nodes[curr].link = Color::Idle;
                if let Some(p) = prev {
                    list.nodes[p].color = Color::Default;
                }
                prev = Some(curr);
                current = next;
            }

            list.head = prev;
            list.reset_colors();
            if let Some(head) = prev {
                list.nodes[head].color = Color::Found;
            }
            emitter
                .emit(
                    Step::new()
                        .patch(Patch::ReplaceGraph(list.project()))
                        .patch(Patch::describe("Reversed"))
                        .log("Reversal Complete. Head is now the last node.")
                        .pace(Pace::Instant),
                )
                .await?;
            Ok(Outcome::Reversed {
                head: prev.map(|h| list.nodes[h].id),
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{log_lines, run};
    use algoviz_engine::{ProblemInstance, Scenario};

    fn values(graph: &Graph) -> Vec<i64> {
        let list = ListModel::from_graph(graph);
        list.walk().into_iter().map(|i| list.nodes[i].value).collect()
    }

    #[test]
    fn doubly_list_has_back_edges() {
        let graph = build(&[1, 2, 3], true);
        assert_eq!(graph.edges.len(), 4);
        assert_eq!(graph.node(NodeId(1)).unwrap().left, Some(NodeId(0)));
        assert_eq!(graph.nodes[0].position.x, -1.8);
        let singly = build(&[1, 2, 3], false);
        assert_eq!(singly.edges.len(), 2);
        assert!(singly.nodes.iter().all(|n| n.left.is_none()));
    }

    #[tokio::test]
    async fn search_finds_index_along_links() {
        let scenario =
            Scenario::new(ProblemInstance::Graph(build(&[8, 3, 6], false))).with_target(6);
        let (outcome, state) = run(&mut ListSearch::singly(), scenario).await;
        assert_eq!(outcome, Outcome::Found { index: 2 });
        assert_eq!(state.stats.comparisons, 3);
        assert_eq!(state.markers.found, Some(2));
    }

    #[tokio::test]
    async fn search_miss_is_not_found() {
        let scenario =
            Scenario::new(ProblemInstance::Graph(build(&[8, 3], true))).with_target(30);
        let (outcome, state) = run(&mut ListSearch::doubly(), scenario).await;
        assert_eq!(outcome, Outcome::NotFound);
        assert!(state.markers.not_found);
        assert!(log_lines(&state).contains(&"30 not found in the list.".to_string()));
    }

    #[tokio::test]
    async fn reversal_rewires_one_link_per_step() {
        let scenario = Scenario::new(ProblemInstance::Graph(build(&[1, 2, 3, 4], true)));
        let (outcome, state) = run(&mut ListReversal, scenario).await;
        assert_eq!(outcome, Outcome::Reversed { head: Some(NodeId(3)) });
        assert_eq!(state.stats.operations, 4);

        let graph = state.instance.as_graph().unwrap();
        assert_eq!(values(graph), vec![4, 3, 2, 1]);
        assert_eq!(graph.node(NodeId(0)).unwrap().left, Some(NodeId(1)));
        assert_eq!(
            log_lines(&state).last().unwrap(),
            "Reversal Complete. Head is now the last node."
        );
    }

    #[tokio::test]
    async fn empty_list_reverses_trivially() {
        let (outcome, _) = run(&mut ListReversal, Scenario::new(ProblemInstance::Empty)).await;
        assert_eq!(outcome, Outcome::Reversed { head: None });
    }
}
