use std::collections::HashMap;

use algoviz_engine::{
    Algorithm, Cancelled, Color, Driver, EdgeId, NodeId, Outcome, Pace, Patch, RunInput,
    StatKind, Step, StepEmitter,
};
use futures::future::{BoxFuture, FutureExt};

use super::{label, reset_colors};

/// Dijkstra's shortest path from the first node to the last one.
///
/// The frontier is scanned linearly for its closest node. Edges without a
/// weight count as 1.
#[derive(Debug, Default)]
pub struct Dijkstra;

impl Driver for Dijkstra {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dijkstra
    }

    fn run<'a>(
        &'a mut self,
        input: RunInput,
        emitter: StepEmitter,
    ) -> BoxFuture<'a, Result<Outcome, Cancelled>> {
        async move {
            let graph = input.instance.as_graph().cloned().unwrap_or_default();
            let (Some(start), Some(end)) = (
                graph.nodes.first().map(|n| n.id),
                graph.nodes.last().map(|n| n.id),
            ) else {
                emitter.emit(Step::new().log("Graph is empty.").pace(Pace::Instant)).await?;
                return Ok(Outcome::ShortestPath {
                    distance: None,
                    path: Vec::new(),
                });
            };

            reset_colors(
                &emitter,
                format!(
                    "Finding shortest path from node {} to node {}...",
                    label(&graph, start),
                    label(&graph, end)
                ),
            )
            .await?;
            emitter
                .emit(
                    Step::new()
                        .patch(Patch::NodeColor {
                            node: start,
                            color: Color::Start,
                        })
                        .patch(Patch::NodeColor {
                            node: end,
                            color: Color::End,
                        })
                        .patch(Patch::describe("Dijkstra: Finding Shortest Path")),
                )
                .await?;

            let mut distance: HashMap<NodeId, u64> = HashMap::from([(start, 0)]);
            let mut previous: HashMap<NodeId, (NodeId, EdgeId)> = HashMap::new();
            let mut frontier: Vec<NodeId> = graph.nodes.iter().map(|n| n.id).collect();

            loop {
                // Closest reachable node; ties go to the earliest in node order.
                let mut closest: Option<(usize, u64)> = None;
                for (slot, node) in frontier.iter().enumerate() {
                    if let Some(&d) = distance.get(node) {
                        if closest.map_or(true, |(_, best)| d < best) {
                            closest = Some((slot, d));
                        }
                    }
                }
                let Some((slot, dist)) = closest else {
                    break;
                };
                let current = frontier.remove(slot);
                let endpoint = current == start || current == end;

                let mut step = Step::new()
                    .log(format!(
                        "Exploring node {} (distance: {dist})",
                        label(&graph, current)
                    ))
                    .stat(StatKind::Operation);
                if !endpoint {
                    step = step.patch(Patch::NodeColor {
                        node: current,
                        color: Color::Active,
                    });
                }
                emitter.emit(step).await?;

                for (edge, next) in graph.neighbors(current) {
                    if !frontier.contains(&next) {
                        continue;
                    }
                    let candidate = dist + u64::from(edge.weight.unwrap_or(1));
                    emitter
                        .emit(
                            Step::new()
                                .patch(Patch::EdgeColor {
                                    edge: edge.id,
                                    color: Color::Considering,
                                })
                                .stat(StatKind::Comparison)
                                .pace(Pace::Half),
                        )
                        .await?;

                    let better = distance.get(&next).map_or(true, |&known| candidate < known);
                    if better {
                        distance.insert(next, candidate);
                        previous.insert(next, (current, edge.id));
                        emitter
                            .emit(
                                Step::new()
                                    .patch(Patch::EdgeColor {
                                        edge: edge.id,
                                        color: Color::Visited,
                                    })
                                    .log(format!(
                                        "Updated distance to node {}: {candidate}",
                                        label(&graph, next)
                                    ))
                                    .pace(Pace::Half),
                            )
                            .await?;
                    } else {
                        emitter
                            .emit(
                                Step::new()
                                    .patch(Patch::EdgeColor {
                                        edge: edge.id,
                                        color: Color::Idle,
                                    })
                                    .pace(Pace::Half),
                            )
                            .await?;
                    }
                }

                if !endpoint {
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
                }
            }

            let Some(&total) = distance.get(&end) else {
                emitter
                    .emit(
                        Step::new()
                            .patch(Patch::describe("No path found"))
                            .log(format!("Node {} is unreachable.", label(&graph, end))),
                    )
                    .await?;
                return Ok(Outcome::ShortestPath {
                    distance: None,
                    path: Vec::new(),
                });
            };

            // Walk back from the end; every hop was recorded with its edge.
            let mut hops = Vec::new();
            let mut at = end;
            while let Some(&(from, edge)) = previous.get(&at) {
                hops.push((from, edge, at));
                at = from;
            }
            hops.reverse();

            let mut path = vec![start];
            for (_, edge, to) in &hops {
                let mut step = Step::new()
                    .patch(Patch::EdgeColor {
                        edge: *edge,
                        color: Color::Path,
                    })
                    .pace(Pace::Half);
                if *to != end {
                    step = step.patch(Patch::NodeColor {
                        node: *to,
                        color: Color::Path,
                    });
                }
                emitter.emit(step).await?;
                path.push(*to);
            }

            let route: Vec<String> = path.iter().map(|n| label(&graph, *n).to_string()).collect();
            emitter
                .emit(
                    Step::new()
                        .patch(Patch::describe(format!("Shortest distance: {total}")))
                        .log(format!(
                            "Shortest distance: {total}. Path: {}",
                            route.join(" -> ")
                        )),
                )
                .await?;

            Ok(Outcome::ShortestPath {
                distance: Some(total),
                path,
            })
        }
        .boxed()
    }
}
