use algoviz_engine::{Algorithm, Driver};

use crate::controls::Controls;
use crate::dp::{Fibonacci, Knapsack};
use crate::graph::{Bfs, Dfs, Dijkstra};
use crate::list::{ListReversal, ListSearch};
use crate::searching::{BinarySearch, LinearSearch};
use crate::sorting::{BubbleSort, HeapSort, InsertionSort, MergeSort, QuickSort, SelectionSort};
use crate::tree::{Balancing, Traversal, TreeDriver};

/// The driver for `algorithm`. Tree drivers read queued actions and the
/// traversal order from `controls`; `seed` feeds the tree demo policy.
pub fn driver_for(algorithm: Algorithm, controls: &Controls, seed: u64) -> Box<dyn Driver> {
    match algorithm {
        Algorithm::BubbleSort => Box::new(BubbleSort),
        Algorithm::QuickSort => Box::new(QuickSort),
        Algorithm::MergeSort => Box::new(MergeSort),
        Algorithm::InsertionSort => Box::new(InsertionSort),
        Algorithm::SelectionSort => Box::new(SelectionSort),
        Algorithm::HeapSort => Box::new(HeapSort),
        Algorithm::LinearSearch => Box::new(LinearSearch),
        Algorithm::BinarySearch => Box::new(BinarySearch),
        Algorithm::Bst => Box::new(TreeDriver::new(Balancing::None, controls.clone(), seed)),
        Algorithm::Avl => Box::new(TreeDriver::new(Balancing::Avl, controls.clone(), seed)),
        Algorithm::Traversals => Box::new(Traversal::new(controls.clone())),
        Algorithm::Bfs => Box::new(Bfs),
        Algorithm::Dfs => Box::new(Dfs),
        Algorithm::Dijkstra => Box::new(Dijkstra),
        Algorithm::Singly => Box::new(ListSearch::singly()),
        Algorithm::Doubly => Box::new(ListSearch::doubly()),
        Algorithm::Reversal => Box::new(ListReversal),
        Algorithm::Fibonacci => Box::new(Fibonacci),
        Algorithm::Knapsack => Box::new(Knapsack),
    }
}
