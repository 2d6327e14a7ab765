use std::collections::{HashSet, VecDeque};

use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, Outcome, Pace, Patch, RunInput, StatKind, Step,
    StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{label, reset_colors};

/// Breadth-first search from the first node.
#[derive(Debug, Default)]
pub struct Bfs;

impl Driver for Bfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
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
                format!("Starting Breadth-First Search from node {}...", label(&graph, start)),
            )
            .await?;

            let mut visited = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            let mut order = Vec::with_capacity(graph.nodes.len());

            while let Some(current) = queue.pop_front() {
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::NodeColor {
                                node: current,
                                color: Color::Active,
                            })
                            .log(format!("Visiting node {}", label(&graph, current)))
                            .stat(StatKind::Operation),
                    )
                    .await?;
                order.push(current);
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::NodeColor {
                                node: current,
                                color: Color::Visited,
                            })
                            .pace(Pace::Half),
                    )
                    .await?;

                for (edge, next) in graph.neighbors(current) {
                    if !visited.insert(next) {
                        continue;
                    }
                    emitter
                        .emit(
                            Step::new()
                                .patch(Patch::EdgeColor {
                                    edge: edge.id,
                                    color: Color::Visited,
                                })
                                .patch(Patch::NodeColor {
                                    node: next,
                                    color: Color::Queued,
                                })
                                .log(format!("Enqueued node {}", label(&graph, next)))
                                .pace(Pace::Scaled(0.3)),
                        )
                        .await?;
                    queue.push_back(next);
                }
            }

            emitter.emit(Step::new().log("BFS Traversal Complete!")).await?;
            Ok(Outcome::Traversed { order })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::graph;
    use crate::testing::run;
    use algoviz_engine::{NodeId, ProblemInstance, Scenario};

    #[tokio::test]
    async fn visits_level_by_level() {
        // 0 - 1 - 3
        //  \
        //   2 - 4
        let g = graph(5, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 4, 1)]);
        let (outcome, state) = run(&mut Bfs, Scenario::new(ProblemInstance::Graph(g))).await;
        let expected: Vec<NodeId> = [0, 1, 2, 3, 4].into_iter().map(NodeId).collect();
        assert_eq!(outcome, Outcome::Traversed { order: expected });
        let graph = state.instance.as_graph().unwrap();
        assert!(graph.nodes.iter().all(|n| n.color == Color::Visited));
        assert_eq!(state.stats.operations, 5);
    }

    #[tokio::test]
    async fn empty_graph_completes() {
        let (outcome, _) = run(&mut Bfs, Scenario::new(ProblemInstance::Empty)).await;
        assert_eq!(outcome, Outcome::Traversed { order: vec![] });
    }
}
