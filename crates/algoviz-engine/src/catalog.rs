//! Catalog of the algorithms the engine can animate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Algorithm family, used to group the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Sorting,
    Searching,
    Trees,
    Graphs,
    LinkedLists,
    Dp,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Sorting => "Sorting Algorithms",
            Category::Searching => "Searching Algorithms",
            Category::Trees => "Tree Data Structures",
            Category::Graphs => "Graph Algorithms",
            Category::LinkedLists => "Linked Lists",
            Category::Dp => "Dynamic Programming",
        }
    }
}

/// Every algorithm with a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    BubbleSort,
    QuickSort,
    MergeSort,
    InsertionSort,
    SelectionSort,
    HeapSort,
    LinearSearch,
    BinarySearch,
    Bst,
    Avl,
    Traversals,
    Bfs,
    Dfs,
    Dijkstra,
    Singly,
    Doubly,
    Reversal,
    Fibonacci,
    Knapsack,
}

impl Algorithm {
    /// All algorithms in catalog order.
    pub const ALL: [Algorithm; 19] = [
        Algorithm::BubbleSort,
        Algorithm::QuickSort,
        Algorithm::MergeSort,
        Algorithm::InsertionSort,
        Algorithm::SelectionSort,
        Algorithm::HeapSort,
        Algorithm::LinearSearch,
        Algorithm::BinarySearch,
        Algorithm::Bst,
        Algorithm::Avl,
        Algorithm::Traversals,
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Dijkstra,
        Algorithm::Singly,
        Algorithm::Doubly,
        Algorithm::Reversal,
        Algorithm::Fibonacci,
        Algorithm::Knapsack,
    ];

    /// Stable identifier used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "bubble-sort",
            Algorithm::QuickSort => "quick-sort",
            Algorithm::MergeSort => "merge-sort",
            Algorithm::InsertionSort => "insertion-sort",
            Algorithm::SelectionSort => "selection-sort",
            Algorithm::HeapSort => "heap-sort",
            Algorithm::LinearSearch => "linear-search",
            Algorithm::BinarySearch => "binary-search",
            Algorithm::Bst => "bst",
            Algorithm::Avl => "avl",
            Algorithm::Traversals => "traversals",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::Singly => "singly",
            Algorithm::Doubly => "doubly",
            Algorithm::Reversal => "reversal",
            Algorithm::Fibonacci => "fibonacci",
            Algorithm::Knapsack => "knapsack",
        }
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "Bubble Sort",
            Algorithm::QuickSort => "Quick Sort",
            Algorithm::MergeSort => "Merge Sort",
            Algorithm::InsertionSort => "Insertion Sort",
            Algorithm::SelectionSort => "Selection Sort",
            Algorithm::HeapSort => "Heap Sort",
            Algorithm::LinearSearch => "Linear Search",
            Algorithm::BinarySearch => "Binary Search",
            Algorithm::Bst => "Binary Search Tree",
            Algorithm::Avl => "AVL Tree",
            Algorithm::Traversals => "Tree Traversals",
            Algorithm::Bfs => "Breadth-First Search",
            Algorithm::Dfs => "Depth-First Search",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::Singly => "Singly Linked List",
            Algorithm::Doubly => "Doubly Linked List",
            Algorithm::Reversal => "List Reversal",
            Algorithm::Fibonacci => "Fibonacci",
            Algorithm::Knapsack => "0/1 Knapsack",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Algorithm::BubbleSort
            | Algorithm::QuickSort
            | Algorithm::MergeSort
            | Algorithm::InsertionSort
            | Algorithm::SelectionSort
            | Algorithm::HeapSort => Category::Sorting,
            Algorithm::LinearSearch | Algorithm::BinarySearch => Category::Searching,
            Algorithm::Bst | Algorithm::Avl | Algorithm::Traversals => Category::Trees,
            Algorithm::Bfs | Algorithm::Dfs | Algorithm::Dijkstra => Category::Graphs,
            Algorithm::Singly | Algorithm::Doubly | Algorithm::Reversal => Category::LinkedLists,
            Algorithm::Fibonacci | Algorithm::Knapsack => Category::Dp,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.id() == s)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// Catalog entry for sending to the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Algorithm,
    pub name: String,
    pub category: Category,
    pub category_name: String,
}

impl From<Algorithm> for CatalogEntry {
    fn from(algorithm: Algorithm) -> Self {
        Self {
            id: algorithm,
            name: algorithm.name().to_string(),
            category: algorithm.category(),
            category_name: algorithm.category().name().to_string(),
        }
    }
}
