//! Seeded random problem instances, one shape per algorithm.

use std::f32::consts::TAU;

use algoviz_engine::{
    Algorithm, DpTable, Edge, EdgeId, Element, Graph, Item, Node, NodeId, Position,
    ProblemInstance, Scenario,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::list;
use crate::tree::{self, Balancing, BinaryTree};

const ARRAY_LEN: usize = 10;
const CIRCLE_RADIUS: f32 = 3.0;
/// Extra edges may only join nodes this close (squared distance).
const MAX_EXTRA_EDGE_DIST_SQ: f32 = 16.0;
const EXTRA_EDGE_ATTEMPTS: usize = 50;
const KNAPSACK_CAPACITY: usize = 6;

/// Produces fresh scenarios. Two generators with the same seed produce the
/// same sequence of scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    rng: StdRng,
}

impl ScenarioGenerator {
    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Seed for a driver's own randomness.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    pub fn scenario(&mut self, algorithm: Algorithm) -> Scenario {
        use Algorithm::*;
        let scenario = match algorithm {
            BubbleSort | QuickSort | MergeSort | InsertionSort | SelectionSort | HeapSort => {
                Scenario::new(ProblemInstance::Array(self.array()))
            }
            LinearSearch => self.search(0.8),
            BinarySearch => self.search(0.9),
            Bst => {
                let values = self.values(8, 10..100);
                Scenario::new(ProblemInstance::Graph(tree::build(Balancing::None, &values)))
            }
            Avl => {
                let n = self.rng.gen_range(5..=7);
                let values = self.values(n, 10..100);
                Scenario::new(ProblemInstance::Graph(tree::build(Balancing::Avl, &values)))
            }
            Traversals => {
                let mut values = self.distinct(7, 10..100);
                values.sort_unstable();
                Scenario::new(ProblemInstance::Graph(BinaryTree::balanced(&values).project()))
            }
            Bfs | Dfs => {
                let n = self.rng.gen_range(8..=12);
                Scenario::new(ProblemInstance::Graph(self.graph(n, false)))
            }
            Dijkstra => {
                let n = self.rng.gen_range(6..=10);
                Scenario::new(ProblemInstance::Graph(self.graph(n, true)))
                    .with_description("Shortest path from the first node to the last")
            }
            Singly | Doubly => {
                let n = self.rng.gen_range(5..=7);
                let values = self.values(n, 0..50);
                let target = self.target(&values, 0.8, 50..70);
                Scenario::new(ProblemInstance::Graph(list::build(&values, algorithm == Doubly)))
                    .with_target(target)
            }
            Reversal => {
                let n = self.rng.gen_range(4..=6);
                let values = self.values(n, 0..50);
                Scenario::new(ProblemInstance::Graph(list::build(&values, false)))
            }
            Fibonacci => {
                let n = self.rng.gen_range(8..=13);
                Scenario::new(ProblemInstance::Table(DpTable::fibonacci(n)))
                    .with_description(format!("Compute Fibonacci({n})"))
            }
            Knapsack => {
                let count = self.rng.gen_range(3..=4);
                let items: Vec<Item> = (0..count)
                    .map(|_| Item {
                        weight: self.rng.gen_range(1..=4),
                        value: self.rng.gen_range(2..=9),
                    })
                    .collect();
                Scenario::new(ProblemInstance::Table(DpTable::knapsack(
                    KNAPSACK_CAPACITY,
                    items,
                )))
            }
        };
        debug!(%algorithm, size = scenario.instance.len(), "scenario generated");
        scenario
    }

    fn values(&mut self, n: usize, range: std::ops::Range<i64>) -> Vec<i64> {
        (0..n).map(|_| self.rng.gen_range(range.clone())).collect()
    }

    fn distinct(&mut self, n: usize, range: std::ops::Range<i64>) -> Vec<i64> {
        let mut pool: Vec<i64> = range.collect();
        pool.shuffle(&mut self.rng);
        pool.truncate(n);
        pool
    }

    fn array(&mut self) -> Vec<Element> {
        (0..ARRAY_LEN)
            .map(|i| Element::new(i as u64, self.rng.gen_range(3..=18)))
            .collect()
    }

    /// Array scenario whose target exists with probability `hit`.
    fn search(&mut self, hit: f64) -> Scenario {
        let array = self.array();
        let values: Vec<i64> = array.iter().map(|e| e.value).collect();
        let target = self.target(&values, hit, 20..40);
        Scenario::new(ProblemInstance::Array(array)).with_target(target)
    }

    /// An existing value with probability `hit`, otherwise one drawn from
    /// `miss`, which must not overlap the values.
    fn target(&mut self, values: &[i64], hit: f64, miss: std::ops::Range<i64>) -> i64 {
        match values.choose(&mut self.rng) {
            Some(&value) if self.rng.gen_bool(hit) => value,
            _ => self.rng.gen_range(miss),
        }
    }

    /// Connected graph on a circle: a random spanning tree plus short
    /// extra edges.
    fn graph(&mut self, n: usize, weighted: bool) -> Graph {
        let nodes: Vec<Node> = (0..n)
            .map(|i| {
                let angle = i as f32 / n as f32 * TAU;
                let position =
                    Position::new(CIRCLE_RADIUS * angle.cos(), CIRCLE_RADIUS * angle.sin(), 0.0);
                Node::new(NodeId(i as u64), i as i64, position)
            })
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for i in 1..n {
            let parent = order[self.rng.gen_range(0..i)];
            pairs.push((parent, order[i]));
        }

        let wanted = n / 2;
        let mut extra = 0;
        for _ in 0..EXTRA_EDGE_ATTEMPTS {
            if extra >= wanted || n < 2 {
                break;
            }
            let a = self.rng.gen_range(0..n);
            let b = self.rng.gen_range(0..n);
            let exists = pairs
                .iter()
                .any(|&(s, t)| (s, t) == (a, b) || (s, t) == (b, a));
            if a == b || exists {
                continue;
            }
            let (pa, pb) = (nodes[a].position, nodes[b].position);
            let dist_sq = (pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2);
            if dist_sq <= MAX_EXTRA_EDGE_DIST_SQ {
                pairs.push((a, b));
                extra += 1;
            }
        }

        let edges = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (s, t))| {
                let edge = Edge::new(EdgeId(i as u64), nodes[s].id, nodes[t].id);
                if weighted {
                    edge.weighted(self.rng.gen_range(1..=9))
                } else {
                    edge
                }
            })
            .collect();

        Graph {
            nodes,
            edges,
            root: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn connected(graph: &Graph) -> bool {
        let Some(first) = graph.nodes.first() else {
            return true;
        };
        let mut seen = HashSet::from([first.id]);
        let mut stack = vec![first.id];
        while let Some(node) = stack.pop() {
            for (_, next) in graph.neighbors(node) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.len() == graph.nodes.len()
    }

    #[test]
    fn same_seed_same_scenarios() {
        let mut a = ScenarioGenerator::new(Some(7));
        let mut b = ScenarioGenerator::new(Some(7));
        for algorithm in Algorithm::ALL {
            assert_eq!(a.scenario(algorithm), b.scenario(algorithm), "{algorithm}");
        }
    }

    #[test]
    fn arrays_stay_in_range() {
        let mut generator = ScenarioGenerator::new(Some(1));
        let scenario = generator.scenario(Algorithm::QuickSort);
        let array = scenario.instance.as_array().unwrap();
        assert_eq!(array.len(), 10);
        assert!(array.iter().all(|e| (3..=18).contains(&e.value)));
    }

    #[test]
    fn search_misses_cannot_occur() {
        let mut generator = ScenarioGenerator::new(Some(3));
        for _ in 0..50 {
            let scenario = generator.scenario(Algorithm::LinearSearch);
            let target = scenario.target.unwrap();
            let present = scenario.instance.as_array().unwrap().iter().any(|e| e.value == target);
            assert!(present || (20..40).contains(&target));
        }
    }

    #[test]
    fn graphs_are_connected() {
        let mut generator = ScenarioGenerator::new(Some(11));
        for _ in 0..20 {
            for algorithm in [Algorithm::Bfs, Algorithm::Dijkstra] {
                let scenario = generator.scenario(algorithm);
                let graph = scenario.instance.as_graph().unwrap();
                assert!(connected(graph));
                let weighted = graph.edges.iter().all(|e| e.weight.is_some());
                assert_eq!(weighted, algorithm == Algorithm::Dijkstra);
            }
        }
    }

    #[test]
    fn traversal_tree_is_full() {
        let mut generator = ScenarioGenerator::new(Some(5));
        let scenario = generator.scenario(Algorithm::Traversals);
        let graph = scenario.instance.as_graph().unwrap();
        assert_eq!(graph.nodes.len(), 7);
        assert_eq!(graph.edges.len(), 6);
        assert!(graph.root.is_some());
    }

    #[test]
    fn knapsack_has_fixed_capacity() {
        let mut generator = ScenarioGenerator::new(Some(2));
        let scenario = generator.scenario(Algorithm::Knapsack);
        let table = scenario.instance.as_table().unwrap();
        assert_eq!(table.cells[0].len(), 7);
        assert!((4..=5).contains(&table.cells.len()));
    }
}
