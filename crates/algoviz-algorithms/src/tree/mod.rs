//! Binary search trees, AVL trees and traversals.
//!
//! The store only holds a flat node/edge projection. At run start a tree
//! driver rebuilds a live arena-backed tree from it, works on that tree,
//! and publishes a fresh projection with every step.

mod avl;
mod bst;
mod traversal;

pub use traversal::Traversal;

use std::collections::HashMap;

use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, Edge, EdgeId, Graph, Node, NodeId, Outcome, Pace, Patch,
    Position, RunInput, StatKind, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::controls::{Controls, TreeAction};

/// Horizontal half-spread of the root's children.
const LAYOUT_WIDTH: f32 = 8.0;
/// Vertical distance between levels.
const LEVEL_HEIGHT: f32 = 1.5;
/// Where a node waits before it is linked in.
const STAGING: Position = Position { x: 0.0, y: 2.0, z: 0.0 };

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TreeNode {
    pub id: NodeId,
    pub value: i64,
    pub height: u32,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub color: Color,
}

/// A link that can hold a subtree: the root or a child of an arena node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    Left(usize),
    Right(usize),
}

/// Arena-backed binary tree. Indices into `nodes` never move.
#[derive(Debug, Clone, Default)]
pub(crate) struct BinaryTree {
    nodes: Vec<TreeNode>,
    root: Option<usize>,
    next_id: u64,
    track_height: bool,
}

impl BinaryTree {
    pub fn new(track_height: bool) -> Self {
        Self {
            track_height,
            ..Self::default()
        }
    }

    /// Rebuild from a projection. Links to unknown ids are dropped.
    pub fn from_graph(graph: &Graph, track_height: bool) -> Self {
        let index: HashMap<NodeId, usize> =
            graph.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let link = |id: Option<NodeId>| id.and_then(|id| index.get(&id).copied());

        let nodes = graph
            .nodes
            .iter()
            .map(|n| TreeNode {
                id: n.id,
                value: n.value,
                height: n.height.unwrap_or(1),
                left: link(n.left),
                right: link(n.right),
                color: n.color,
            })
            .collect();

        let mut tree = Self {
            nodes,
            root: link(graph.root),
            next_id: graph.next_node_id().0,
            track_height,
        };
        if track_height {
            let budget = tree.nodes.len();
            tree.recompute_heights(tree.root, budget);
        }
        tree
    }

    /// Perfectly balanced tree over already sorted values.
    pub fn balanced(sorted: &[i64]) -> Self {
        let mut tree = Self::new(false);
        tree.root = tree.build_balanced(sorted);
        tree
    }

    fn build_balanced(&mut self, sorted: &[i64]) -> Option<usize> {
        if sorted.is_empty() {
            return None;
        }
        let mid = sorted.len() / 2;
        let idx = self.alloc(sorted[mid]);
        self.nodes[idx].color = Color::Default;
        let left = self.build_balanced(&sorted[..mid]);
        let right = self.build_balanced(&sorted[mid + 1..]);
        self.nodes[idx].left = left;
        self.nodes[idx].right = right;
        Some(idx)
    }

    fn recompute_heights(&mut self, node: Option<usize>, budget: usize) -> u32 {
        let Some(idx) = node else {
            return 0;
        };
        if budget == 0 {
            return 0;
        }
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        let height = 1 + self
            .recompute_heights(left, budget - 1)
            .max(self.recompute_heights(right, budget - 1));
        self.nodes[idx].height = height;
        height
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut TreeNode {
        &mut self.nodes[idx]
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.iter().map(|n| n.value)
    }

    pub fn value_of(&self, id: NodeId) -> Option<i64> {
        self.nodes.iter().find(|n| n.id == id).map(|n| n.value)
    }

    /// Add a detached node, shown at the staging position until linked.
    pub fn alloc(&mut self, value: i64) -> usize {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(TreeNode {
            id,
            value,
            height: 1,
            left: None,
            right: None,
            color: Color::Active,
        });
        self.nodes.len() - 1
    }

    /// Drop the most recently allocated node if nothing links to it.
    pub fn discard(&mut self, idx: usize) {
        let linked = self.root == Some(idx)
            || self
                .nodes
                .iter()
                .any(|n| n.left == Some(idx) || n.right == Some(idx));
        if idx + 1 == self.nodes.len() && !linked {
            self.nodes.pop();
            self.next_id -= 1;
        }
    }

    pub fn child(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::Root => self.root,
            Slot::Left(p) => self.nodes[p].left,
            Slot::Right(p) => self.nodes[p].right,
        }
    }

    pub fn set_child(&mut self, slot: Slot, child: Option<usize>) {
        match slot {
            Slot::Root => self.root = child,
            Slot::Left(p) => self.nodes[p].left = child,
            Slot::Right(p) => self.nodes[p].right = child,
        }
    }

    pub fn height(&self, node: Option<usize>) -> u32 {
        node.map_or(0, |idx| self.nodes[idx].height)
    }

    pub fn update_height(&mut self, idx: usize) {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        self.nodes[idx].height = 1 + self.height(left).max(self.height(right));
    }

    /// `height(left) - height(right)`.
    pub fn balance(&self, idx: usize) -> i64 {
        let node = &self.nodes[idx];
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    pub fn set_color(&mut self, idx: usize, color: Color) {
        self.nodes[idx].color = color;
    }

    pub fn reset_colors(&mut self) {
        for node in &mut self.nodes {
            node.color = Color::Default;
        }
    }

    /// Flat node/edge projection with a fresh layout. Each child's edge
    /// carries the child's id, so an edge keeps its identity across
    /// rotations as long as its child does.
    pub fn project(&self) -> Graph {
        let mut positions = vec![None; self.nodes.len()];
        self.layout(self.root, 0, 0.0, LAYOUT_WIDTH, &mut positions);

        let id_of = |idx: Option<usize>| idx.map(|i| self.nodes[i].id);
        let nodes = self
            .nodes
            .iter()
            .zip(&positions)
            .map(|(n, pos)| Node {
                id: n.id,
                value: n.value,
                position: pos.unwrap_or(STAGING),
                color: n.color,
                left: id_of(n.left),
                right: id_of(n.right),
                height: self.track_height.then_some(n.height),
            })
            .collect();

        let edges = self
            .nodes
            .iter()
            .flat_map(|parent| {
                [parent.left, parent.right]
                    .into_iter()
                    .flatten()
                    .map(move |child| (parent.id, child))
            })
            .map(|(parent, child)| {
                let child = self.nodes[child].id;
                Edge::new(EdgeId(child.0), parent, child)
            })
            .collect();

        Graph {
            nodes,
            edges,
            root: id_of(self.root),
        }
    }

    fn layout(
        &self,
        node: Option<usize>,
        level: usize,
        x: f32,
        width: f32,
        positions: &mut [Option<Position>],
    ) {
        let Some(idx) = node else {
            return;
        };
        if level > self.nodes.len() || positions[idx].is_some() {
            return;
        }
        positions[idx] = Some(Position::new(x, -(level as f32) * LEVEL_HEIGHT, 0.0));
        let next = width / 2.0;
        self.layout(self.nodes[idx].left, level + 1, x - next, next, positions);
        self.layout(self.nodes[idx].right, level + 1, x + next, next, positions);
    }

    /// True if every node's subtrees differ in height by at most one.
    #[cfg(test)]
    pub fn is_balanced(&self) -> bool {
        fn check(tree: &BinaryTree, node: Option<usize>) -> Option<u32> {
            let Some(idx) = node else {
                return Some(0);
            };
            let l = check(tree, tree.nodes[idx].left)?;
            let r = check(tree, tree.nodes[idx].right)?;
            (l.abs_diff(r) <= 1).then_some(1 + l.max(r))
        }
        check(self, self.root).is_some()
    }

    #[cfg(test)]
    pub fn in_order(&self) -> Vec<i64> {
        fn walk(tree: &BinaryTree, node: Option<usize>, out: &mut Vec<i64>) {
            if let Some(idx) = node {
                walk(tree, tree.nodes[idx].left, out);
                out.push(tree.nodes[idx].value);
                walk(tree, tree.nodes[idx].right, out);
            }
        }
        let mut out = Vec::new();
        walk(self, self.root, &mut out);
        out
    }
}

/// Emit `step` together with the tree's current projection. Silent
/// emitters skip the projection.
pub(crate) async fn publish(
    tree: &BinaryTree,
    emitter: &StepEmitter,
    step: Step,
) -> Result<(), Cancelled> {
    if emitter.is_silent() {
        return Ok(());
    }
    emitter.emit(step.patch(Patch::ReplaceGraph(tree.project()))).await
}

/// Search shared by both tree kinds.
pub(crate) async fn search(
    tree: &mut BinaryTree,
    value: i64,
    emitter: &StepEmitter,
) -> Result<Option<usize>, Cancelled> {
    let mut current = tree.root();
    while let Some(idx) = current {
        let here = tree.node(idx).value;
        tree.set_color(idx, Color::Comparing);
        publish(
            tree,
            emitter,
            Step::new()
                .log(format!("Checking node {here}..."))
                .stat(StatKind::Comparison),
        )
        .await?;

        if here == value {
            tree.set_color(idx, Color::Found);
            publish(
                tree,
                emitter,
                Step::new()
                    .patch(Patch::describe(format!("Found {value}")))
                    .log(format!("Found {value}!"))
                    .pace(Pace::Scaled(2.0)),
            )
            .await?;
            return Ok(Some(idx));
        }

        tree.set_color(idx, Color::Default);
        let (next, log) = if value < here {
            (tree.node(idx).left, format!("{value} < {here}, going Left"))
        } else {
            (tree.node(idx).right, format!("{value} > {here}, going Right"))
        };
        publish(tree, emitter, Step::new().log(log).pace(Pace::Half)).await?;
        current = next;
    }

    publish(
        tree,
        emitter,
        Step::new()
            .patch(Patch::NotFound)
            .patch(Patch::describe(format!("{value} not found")))
            .log(format!("Value {value} not found in tree.")),
    )
    .await?;
    Ok(None)
}

/// Which insertion a [`TreeDriver`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balancing {
    /// Plain BST: duplicates go right.
    None,
    /// AVL: rebalanced after every insert, duplicates rejected.
    Avl,
}

impl Balancing {
    async fn insert(
        self,
        tree: &mut BinaryTree,
        value: i64,
        emitter: &StepEmitter,
    ) -> Result<Option<usize>, Cancelled> {
        match self {
            Balancing::None => bst::insert(tree, value, emitter).await,
            Balancing::Avl => avl::insert(tree, value, emitter).await,
        }
    }
}

/// Build a tree by inserting `values` silently, the same way a run would.
pub(crate) fn build(balancing: Balancing, values: &[i64]) -> Graph {
    let mut tree = BinaryTree::new(balancing == Balancing::Avl);
    let silent = StepEmitter::silent();
    for &value in values {
        let inserted = futures::executor::block_on(balancing.insert(&mut tree, value, &silent));
        if let Err(Cancelled) = inserted {
            debug!(value, built = tree.len(), "silent tree build stopped early");
            break;
        }
    }
    tree.project()
}

/// BST or AVL driver. Each play performs one queued [`TreeAction`], or a
/// random demo action when none is queued.
pub struct TreeDriver {
    balancing: Balancing,
    controls: Controls,
    rng: StdRng,
}

impl TreeDriver {
    pub fn new(balancing: Balancing, controls: Controls, seed: u64) -> Self {
        Self {
            balancing,
            controls,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Insert while the tree is small, then mostly search (and mostly for
    /// values that exist).
    fn demo_action(&mut self, tree: &BinaryTree) -> TreeAction {
        let fresh = self.rng.gen_range(10..100);
        if tree.len() < 5 {
            return TreeAction::Insert(fresh);
        }
        if !self.rng.gen_bool(0.6) {
            return TreeAction::Insert(fresh);
        }
        let existing: Vec<i64> = tree.values().collect();
        if self.rng.gen_bool(0.7) && !existing.is_empty() {
            TreeAction::Search(existing[self.rng.gen_range(0..existing.len())])
        } else {
            TreeAction::Search(fresh)
        }
    }
}

impl Driver for TreeDriver {
    fn algorithm(&self) -> Algorithm {
        match self.balancing {
            Balancing::None => Algorithm::Bst,
            Balancing::Avl => Algorithm::Avl,
        }
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let track_height = self.balancing == Balancing::Avl;
            let mut tree = input
                .instance
                .as_graph()
                .map(|g| BinaryTree::from_graph(g, track_height))
                .unwrap_or_else(|| BinaryTree::new(track_height));
            tree.reset_colors();
            publish(&tree, &emitter, Step::new().patch(Patch::Found(None)).pace(Pace::Half)).await?;

            let queued = self.controls.next_tree_action();
            let action = match queued {
                Some(action) => action,
                None => self.demo_action(&tree),
            };
            debug!(?action, queued = queued.is_some(), nodes = tree.len(), "tree action");

            let outcome = match action {
                TreeAction::Insert(value) => {
                    publish(
                        &tree,
                        &emitter,
                        Step::new()
                            .patch(Patch::Target(Some(value)))
                            .patch(Patch::describe(format!("Inserting {value}")))
                            .log(format!("Inserting {value}...")),
                    )
                    .await?;
                    match self.balancing.insert(&mut tree, value, &emitter).await? {
                        Some(idx) => {
                            publish(
                                &tree,
                                &emitter,
                                Step::new()
                                    .patch(Patch::describe(format!("Inserted {value}")))
                                    .log(format!("Insertion of {value} complete.")),
                            )
                            .await?;
                            Outcome::Inserted {
                                node: tree.node(idx).id,
                            }
                        }
                        None => Outcome::Skipped,
                    }
                }
                TreeAction::Search(value) => {
                    publish(
                        &tree,
                        &emitter,
                        Step::new()
                            .patch(Patch::Target(Some(value)))
                            .patch(Patch::describe(format!("Searching for {value}")))
                            .log(format!("Searching for value: {value}")),
                    )
                    .await?;
                    match search(&mut tree, value, &emitter).await? {
                        Some(idx) => Outcome::TreeFound {
                            node: tree.node(idx).id,
                        },
                        None => Outcome::NotFound,
                    }
                }
            };

            if let Some(action) = queued {
                self.controls.complete_tree_action(action);
            }
            Ok(outcome)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run;
    use algoviz_engine::{ProblemInstance, Scenario};

    #[test]
    fn projection_round_trips() {
        let graph = build(Balancing::None, &[50, 30, 70, 20, 40]);
        let tree = BinaryTree::from_graph(&graph, false);
        assert_eq!(tree.in_order(), vec![20, 30, 40, 50, 70]);
        assert_eq!(tree.project(), graph);
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn silent_build_inserts_every_value() {
        let graph = build(Balancing::Avl, &[1, 2, 3, 4, 5]);
        let tree = BinaryTree::from_graph(&graph, true);
        assert_eq!(tree.in_order(), vec![1, 2, 3, 4, 5]);
        assert!(tree.is_balanced());
        assert_eq!(tree.node(tree.root().unwrap()).value, 2);
    }

    #[test]
    fn layout_halves_width_per_level() {
        let graph = BinaryTree::balanced(&[1, 2, 3, 4, 5, 6, 7]).project();
        let pos = |v: i64| graph.nodes.iter().find(|n| n.value == v).unwrap().position;
        assert_eq!(pos(4), Position::new(0.0, 0.0, 0.0));
        assert_eq!(pos(2), Position::new(-4.0, -1.5, 0.0));
        assert_eq!(pos(7), Position::new(6.0, -3.0, 0.0));
    }

    #[test]
    fn detached_nodes_wait_at_staging() {
        let mut tree = BinaryTree::balanced(&[1, 2, 3]);
        let idx = tree.alloc(9);
        let graph = tree.project();
        assert_eq!(graph.nodes[idx].position, STAGING);
        assert_eq!(graph.edges.len(), 2);
        tree.discard(idx);
        assert_eq!(tree.len(), 3);
    }

    #[tokio::test]
    async fn queued_action_runs_before_demo() {
        let controls = Controls::new();
        controls.queue_tree_action(TreeAction::Search(40));
        let mut driver = TreeDriver::new(Balancing::None, controls.clone(), 1);
        let graph = build(Balancing::None, &[50, 30, 70, 20, 40]);
        let (outcome, state) =
            run(&mut driver, Scenario::new(ProblemInstance::Graph(graph))).await;
        assert!(matches!(outcome, Outcome::TreeFound { .. }));
        assert_eq!(state.markers.target, Some(40));
        assert_eq!(state.stats.comparisons, 3);
        assert_eq!(controls.pending_tree_actions(), 0);
    }

    #[tokio::test]
    async fn small_tree_demo_inserts() {
        let mut driver = TreeDriver::new(Balancing::Avl, Controls::new(), 9);
        let (outcome, state) = run(&mut driver, Scenario::new(ProblemInstance::Empty)).await;
        assert!(matches!(outcome, Outcome::Inserted { .. }));
        assert_eq!(state.instance.as_graph().unwrap().nodes.len(), 1);
    }

    #[tokio::test]
    async fn search_miss_reports_not_found() {
        let controls = Controls::new();
        controls.queue_tree_action(TreeAction::Search(99));
        let mut driver = TreeDriver::new(Balancing::Avl, controls, 1);
        let graph = build(Balancing::Avl, &[10, 20, 30]);
        let (outcome, state) =
            run(&mut driver, Scenario::new(ProblemInstance::Graph(graph))).await;
        assert_eq!(outcome, Outcome::NotFound);
        assert!(state.markers.not_found);
    }
}
