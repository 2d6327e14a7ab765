use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, NodeId, Outcome, Pace, Patch, RunInput, StatKind, Step,
    StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{publish, BinaryTree};
use crate::controls::{Controls, TraversalOrder};

/// Depth-first walk of the tree in the order currently set on [`Controls`].
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    controls: Controls,
}

impl Traversal {
    pub fn new(controls: Controls) -> Self {
        Self { controls }
    }
}

impl Driver for Traversal {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Traversals
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let order = self.controls.traversal_order();
            let mut tree = input
                .instance
                .as_graph()
                .map(|g| BinaryTree::from_graph(g, false))
                .unwrap_or_default();
            tree.reset_colors();
            publish(
                &tree,
                &emitter,
                Step::new()
                    .patch(Patch::describe(format!("{} Traversal", order.name())))
                    .log(format!("Starting {} Traversal", order.name()))
                    .pace(Pace::Half),
            )
            .await?;

            let mut visited = Vec::with_capacity(tree.len());
            let root = tree.root();
            visit(&mut tree, root, order, &emitter, &mut visited).await?;

            let sequence: Vec<String> = visited
                .iter()
                .filter_map(|id| tree.value_of(*id))
                .map(|v| v.to_string())
                .collect();
            publish(
                &tree,
                &emitter,
                Step::new()
                    .patch(Patch::describe(sequence.join(" -> ")))
                    .log("Traversal Complete.")
                    .pace(Pace::Instant),
            )
            .await?;
            Ok(Outcome::Traversed { order: visited })
        }
        .boxed()
    }
}

fn visit<'a>(
    tree: &'a mut BinaryTree,
    node: Option<usize>,
    order: TraversalOrder,
    emitter: &'a StepEmitter,
    visited: &'a mut Vec<NodeId>,
) -> BoxFuture<'a, Result<(), Cancelled>> {
    async move {
        let Some(idx) = node else {
            return Ok(());
        };
        let (left, right) = (tree.node(idx).left, tree.node(idx).right);

        if order == TraversalOrder::PreOrder {
            emit_visit(tree, idx, emitter, visited).await?;
        }
        visit(tree, left, order, emitter, visited).await?;
        if order == TraversalOrder::InOrder {
            emit_visit(tree, idx, emitter, visited).await?;
        }
        visit(tree, right, order, emitter, visited).await?;
        if order == TraversalOrder::PostOrder {
            emit_visit(tree, idx, emitter, visited).await?;
        }
        Ok(())
    }
    .boxed()
}

async fn emit_visit(
    tree: &mut BinaryTree,
    idx: usize,
    emitter: &StepEmitter,
    visited: &mut Vec<NodeId>,
) -> Result<(), Cancelled> {
    let value = tree.node(idx).value;
    tree.set_color(idx, Color::Active);
    publish(
        tree,
        emitter,
        Step::new()
            .log(format!("Visiting {value}"))
            .stat(StatKind::Operation),
    )
    .await?;
    visited.push(tree.node(idx).id);
    tree.set_color(idx, Color::Visited);
    publish(tree, emitter, Step::new().pace(Pace::Half)).await
}
