use std::collections::HashSet;

use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, EdgeId, Graph, NodeId, Outcome, Pace, Patch, RunInput,
    StatKind, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{label, reset_colors};

/// Recursive depth-first search from the first node.
#[derive(Debug, Default)]
pub struct Dfs;

impl Driver for Dfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dfs
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let graph = input.instance.as_graph().cloned().unwrap_or_default();
            let Some(start) = graph.nodes.first().map(|n| n.id) else {
                emitter.emit(Step::new().log("Graph is empty.").pace(Pace::Instant)).await?;
                return Ok(Outcome::Traversed { order: Vec::new() });
            };

            reset_colors(
                &emitter,
                format!("Starting Depth-First Search from node {}...", label(&graph, start)),
            )
            .await?;

            let mut walk = Walk {
                graph: &graph,
                emitter: &emitter,
                visited: HashSet::new(),
                order: Vec::with_capacity(graph.nodes.len()),
            };
            visit(&mut walk, start).await?;
            let order = walk.order;

            emitter.emit(Step::new().log("DFS Traversal Complete!")).await?;
            Ok(Outcome::Traversed { order })
        }
        .boxed()
    }
}

/// Traversal context threaded through the recursion.
struct Walk<'g> {
    graph: &'g Graph,
    emitter: &'g StepEmitter,
    visited: HashSet<NodeId>,
    order: Vec<NodeId>,
}

fn visit<'a, 'g>(walk: &'a mut Walk<'g>, node: NodeId) -> BoxFuture<'a, Result<(), Cancelled>> {
    async move {
        walk.visited.insert(node);
        walk.emitter
            .emit(
                Step::new()
                    .patch(Patch::NodeColor {
                        node,
                        color: Color::Active,
                    })
                    .log(format!("Visiting node {}", label(walk.graph, node)))
                    .stat(StatKind::Operation),
            )
            .await?;
        walk.order.push(node);
        walk.emitter
            .emit(
                Step::new()
                    .patch(Patch::NodeColor {
                        node,
                        color: Color::Visited,
                    })
                    .pace(Pace::Half),
            )
            .await?;

        let neighbors: Vec<(EdgeId, NodeId)> = walk
            .graph
            .neighbors(node)
            .into_iter()
            .map(|(edge, next)| (edge.id, next))
            .collect();
        for (edge, next) in neighbors {
            if walk.visited.contains(&next) {
                continue;
            }
            walk.emitter
                .emit(
                    Step::new()
                        .patch(Patch::EdgeColor {
                            edge,
                            color: Color::Visited,
                        })
                        .pace(Pace::Scaled(0.3)),
                )
                .await?;
            visit(walk, next).await?;
        }
        Ok(())
    }
    .boxed()
}
