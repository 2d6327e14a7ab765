//! Observable state: playback, statistics, log, progress markers and the
//! snapshot handed to the presentation layer.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LOG_CAPACITY;
use crate::model::{NodeId, ProblemInstance};

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No driver is executing (never started, finished or reset).
    #[default]
    Idle,
    /// A driver is executing.
    Running,
    /// A driver is suspended at its next step boundary.
    Paused,
}

/// Named speed presets offered to the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    /// 0.25x speed
    Quarter,
    /// 0.5x speed
    Half,
    /// Normal speed (1x)
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
    /// 10x speed
    TenX,
    /// No delay between steps
    Maximum,
}

impl PlaybackSpeed {
    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Quarter => 0.25,
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::TenX => 10.0,
            PlaybackSpeed::Maximum => f64::INFINITY,
        }
    }

    /// Milliseconds per base step at this speed.
    pub fn ms_per_step(&self, base_ms: u64) -> u64 {
        match self {
            PlaybackSpeed::Maximum => 0,
            speed => (base_ms as f64 / speed.multiplier()) as u64,
        }
    }
}

/// Counter kinds a step may bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Comparison,
    Swap,
    Operation,
}

/// Monotonic run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub comparisons: u64,
    pub swaps: u64,
    pub operations: u64,
}

impl Statistics {
    /// Increment one counter. Comparisons and swaps are also operations.
    pub fn bump(&mut self, kind: StatKind) {
        match kind {
            StatKind::Comparison => self.comparisons += 1,
            StatKind::Swap => self.swaps += 1,
            StatKind::Operation => {}
        }
        self.operations += 1;
    }
}

/// Bounded, most-recent-first log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Prepend a line, evicting the oldest beyond capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push_front(line.into());
        self.entries.truncate(self.capacity);
    }

    /// Lines, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Binary search window `[low, mid, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

/// Progress markers an algorithm leaves on the instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Markers {
    pub comparing: Vec<usize>,
    pub swapping: Vec<usize>,
    pub sorted: BTreeSet<usize>,
    pub search_range: Option<SearchRange>,
    pub target: Option<i64>,
    pub found: Option<usize>,
    pub not_found: bool,
    pub active_cell: Option<(usize, usize)>,
    pub dependency_cells: Vec<(usize, usize)>,
    pub description: Option<String>,
    pub code_line: Option<u32>,
}

/// How a driver run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Array sorted in place.
    Sorted,
    /// Search hit at an array/list index.
    Found { index: usize },
    /// Search exhausted without a hit.
    NotFound,
    /// Nodes in visitation order.
    Traversed { order: Vec<NodeId> },
    /// Dijkstra result. `distance` is `None` when the end is unreachable.
    ShortestPath { distance: Option<u64>, path: Vec<NodeId> },
    /// A value was inserted into a tree.
    Inserted { node: NodeId },
    /// A tree search hit.
    TreeFound { node: NodeId },
    /// List reversed; `head` is the former tail.
    Reversed { head: Option<NodeId> },
    /// DP table filled; `value` is the answer cell.
    Table { value: Option<i64> },
    /// Nothing to do for this instance shape.
    Skipped,
}

/// A consistent snapshot of everything the presentation layer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    /// Bumped on every instance replacement; runs are tied to one generation.
    pub generation: u64,
    pub instance: ProblemInstance,
    pub markers: Markers,
    pub playback: PlaybackState,
    pub stats: Statistics,
    pub log: EventLog,
    pub speed_ms: u64,
    pub outcome: Option<Outcome>,
}

impl VisualState {
    pub fn new(speed_ms: u64, log_capacity: usize) -> Self {
        Self {
            generation: 0,
            instance: ProblemInstance::Empty,
            markers: Markers::default(),
            playback: PlaybackState::Idle,
            stats: Statistics::default(),
            log: EventLog::with_capacity(log_capacity),
            speed_ms,
            outcome: None,
        }
    }
}
