use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::db::BuildingId;
use crate::graph::GraphSnapshot;

/// Result of a successful shortest-path search: the ordered building sequence
/// (start and goal inclusive) and the sum of edge weights along it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFound {
    pub steps: Vec<BuildingId>,
    pub total_distance: f64,
}

/// Run Dijkstra's algorithm over the snapshot and return the minimum-weight
/// path between `start` and `goal`.
///
/// Returns `None` when no path exists, including when either endpoint is
/// absent from the snapshot; callers map that to their own unreachable
/// representation. `start == goal` short-circuits to a single-building path
/// of weight zero without consulting any edges. The search is read-only over
/// the snapshot, so concurrent queries against a shared snapshot are safe.
///
/// Equal-cost frontier entries are ordered by building identifier; this
/// tie-break is stable but carries no meaning, and paths between tied
/// alternatives may differ across releases even though their total weight
/// cannot.
pub fn shortest_path(
    graph: &GraphSnapshot,
    start: BuildingId,
    goal: BuildingId,
) -> Option<PathFound> {
    if start == goal {
        return Some(PathFound {
            steps: vec![start],
            total_distance: 0.0,
        });
    }
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }

    let mut distances: HashMap<BuildingId, f64> = HashMap::new();
    let mut parents: HashMap<BuildingId, Option<BuildingId>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let Some(&settled) = distances.get(&entry.node) else {
            continue;
        };
        if entry.cost.0 > settled {
            // Stale queue entry; the node was reached more cheaply already.
            continue;
        }

        if entry.node == goal {
            return Some(PathFound {
                steps: reconstruct_path(&parents, start, goal),
                total_distance: settled,
            });
        }

        for (next, weight) in graph.neighbours(entry.node) {
            let next_cost = settled + weight;
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, Some(entry.node));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

fn reconstruct_path(
    parents: &HashMap<BuildingId, Option<BuildingId>>,
    start: BuildingId,
    goal: BuildingId,
) -> Vec<BuildingId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: BuildingId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: BuildingId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
