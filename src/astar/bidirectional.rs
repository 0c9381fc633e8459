// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use log::debug;

use crate::{AStarGraph, Cancellable, Edge, PathResult, RoutingResult, Weight};

/// Number of node expansions between polls of the cancellation flag.
const CANCELLED_POLL_PERIOD: usize = 128;

/// A settled or queued vertex, owned by exactly one search direction.
/// Parent links are arena indices, so path reconstruction never touches
/// the vertex maps.
struct SearchNode<V, W> {
    vertex: V,
    /// Accumulated cost with the balanced potential applied; this is the
    /// priority queue key.
    reduced_cost: W,
    /// Accumulated cost without the potential, reported to the caller.
    real_cost: W,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem<W> {
    score: W,
    index: usize,
}

impl<W: Weight> PartialEq for QueueItem<W> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<W: Weight> Eq for QueueItem<W> {}

impl<W: Weight> PartialOrd for QueueItem<W> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<W: Weight> Ord for QueueItem<W> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        match other.score.partial_cmp(&self.score) {
            Some(std::cmp::Ordering::Equal) | None => self.index.cmp(&other.index),
            Some(ordering) => ordering,
        }
    }
}

/// Best confirmed meeting of the two searches so far.
struct MeetingCandidate<W> {
    reduced_total: W,
    real_total: W,
    forward_index: usize,
    backward_index: usize,
}

/// Frontier of one search direction: an arena of search nodes, the index
/// of the best known node per vertex, and the open queue.
struct Frontier<V, W> {
    forward: bool,
    origin: V,
    goal: V,
    nodes: Vec<SearchNode<V, W>>,
    best: HashMap<V, usize>,
    queue: BinaryHeap<QueueItem<W>>,
}

impl<V: Copy + Eq + Hash, W: Weight> Frontier<V, W> {
    fn new(forward: bool, origin: V, goal: V) -> Self {
        let mut frontier = Self {
            forward,
            origin,
            goal,
            nodes: Vec::new(),
            best: HashMap::new(),
            queue: BinaryHeap::new(),
        };
        frontier.nodes.push(SearchNode {
            vertex: origin,
            reduced_cost: W::ZERO,
            real_cost: W::ZERO,
            parent: None,
        });
        frontier.best.insert(origin, 0);
        frontier.queue.push(QueueItem {
            score: W::ZERO,
            index: 0,
        });
        frontier
    }

    /// Balanced heuristic of this direction. Opposite directions use exactly
    /// opposite potentials, which keeps reduced edge weights consistent and
    /// the meeting-based stopping rule sound.
    fn potential<G>(&self, graph: &G, vertex: &V) -> W
    where
        G: AStarGraph<Vertex = V, Weight = W>,
    {
        let to_goal = graph.heuristic_cost_estimate(vertex, &self.goal);
        let to_origin = graph.heuristic_cost_estimate(vertex, &self.origin);
        (to_goal - to_origin).half()
    }

    fn adjacent<G>(&self, graph: &G, vertex: &V) -> Vec<Edge<V, W>>
    where
        G: AStarGraph<Vertex = V, Weight = W>,
    {
        if self.forward {
            graph.outgoing_edges(vertex)
        } else {
            graph.ingoing_edges(vertex)
        }
    }

    fn best_cost(&self, vertex: &V) -> W {
        self.best
            .get(vertex)
            .map(|&index| self.nodes[index].reduced_cost)
            .unwrap_or(W::INFINITY)
    }

    fn top_score(&self) -> W {
        self.queue
            .peek()
            .map(|item| item.score)
            .unwrap_or(W::INFINITY)
    }

    /// Walks the parent links from `index` back to this direction's origin.
    fn reconstruct(&self, mut index: usize) -> Vec<V> {
        let mut path = vec![self.nodes[index].vertex];
        while let Some(parent) = self.nodes[index].parent {
            path.push(self.nodes[parent].vertex);
            index = parent;
        }
        path
    }
}

/// Finds the cheapest path between two vertices by running two simultaneous
/// searches, forward from `source` and backward from `target`, which meet
/// in the middle.
///
/// The search runs synchronously on the calling thread; a concurrent actor
/// may abort it through `cancellable`, which is polled at a bounded step
/// interval. Concluding that no path exists requires exhausting every
/// vertex reachable from either endpoint, so callers wanting a wall-clock
/// bound must arrange for cancellation themselves.
pub fn find_path_bidirectional<G: AStarGraph>(
    graph: &G,
    source: G::Vertex,
    target: G::Vertex,
    cancellable: &Cancellable,
) -> PathResult<G::Vertex, G::Weight> {
    find_path_bidirectional_with_visitor(graph, source, target, cancellable, |_| {})
}

/// Same as [find_path_bidirectional], with `visitor` invoked for every
/// settled vertex, in settlement order, alternating between the two
/// directions. Callers use this for partial progress reporting.
pub fn find_path_bidirectional_with_visitor<G, F>(
    graph: &G,
    source: G::Vertex,
    target: G::Vertex,
    cancellable: &Cancellable,
    mut visitor: F,
) -> PathResult<G::Vertex, G::Weight>
where
    G: AStarGraph,
    F: FnMut(&G::Vertex),
{
    debug!("searching for a path from {:?} to {:?}", source, target);

    if source == target {
        return PathResult::Found(RoutingResult {
            path: vec![source],
            weight: G::Weight::ZERO,
        });
    }

    let mut forward = Frontier::new(true, source, target);
    let mut backward = Frontier::new(false, target, source);
    let mut candidate: Option<MeetingCandidate<G::Weight>> = None;
    let mut steps: usize = 0;

    while !forward.queue.is_empty() && !backward.queue.is_empty() {
        if steps % CANCELLED_POLL_PERIOD == 0 && cancellable.is_cancelled() {
            debug!("search cancelled after {} steps", steps);
            return PathResult::Cancelled;
        }
        steps += 1;

        // Expand from whichever frontier is behind, to balance the work
        // between the two directions.
        let (cur, nxt) = if forward.queue.len() <= backward.queue.len() {
            (&mut forward, &mut backward)
        } else {
            (&mut backward, &mut forward)
        };

        // Once the best confirmed meeting can no longer be beaten by the
        // unexpanded parts of either frontier, it is optimal.
        if let Some(ref meeting) = candidate {
            if cur.top_score() + nxt.top_score() >= meeting.reduced_total - G::Weight::EPSILON {
                break;
            }
        }

        let item = match cur.queue.pop() {
            Some(item) => item,
            None => break,
        };

        // Contrary to the wikipedia definition, we might keep multiple items
        // in the queue for the same vertex; entries superseded by a cheaper
        // one are dropped here.
        if cur.best.get(&cur.nodes[item.index].vertex) != Some(&item.index) {
            continue;
        }

        let vertex = cur.nodes[item.index].vertex;
        let (item_reduced, item_real) = {
            let node = &cur.nodes[item.index];
            (node.reduced_cost, node.real_cost)
        };
        visitor(&vertex);

        let vertex_potential = cur.potential(graph, &vertex);
        for Edge { to, weight } in cur.adjacent(graph, &vertex) {
            let reduced_weight = weight + cur.potential(graph, &to) - vertex_potential;
            debug_assert!(
                reduced_weight >= G::Weight::ZERO - G::Weight::EPSILON,
                "inconsistent heuristic: negative reduced weight {:?}",
                reduced_weight,
            );

            let reduced = item_reduced + reduced_weight;
            if reduced >= cur.best_cost(&to) - G::Weight::EPSILON {
                continue;
            }

            let real = item_real + weight;
            let index = cur.nodes.len();
            cur.nodes.push(SearchNode {
                vertex: to,
                reduced_cost: reduced,
                real_cost: real,
                parent: Some(item.index),
            });
            cur.best.insert(to, index);
            cur.queue.push(QueueItem {
                score: reduced,
                index,
            });

            // A vertex known to both searches is a meeting candidate.
            if let Some(&other) = nxt.best.get(&to) {
                let reduced_total = reduced + nxt.nodes[other].reduced_cost;
                let improves = match candidate {
                    Some(ref meeting) => reduced_total < meeting.reduced_total,
                    None => true,
                };
                if improves {
                    let (forward_index, backward_index) = if cur.forward {
                        (index, other)
                    } else {
                        (other, index)
                    };
                    candidate = Some(MeetingCandidate {
                        reduced_total,
                        real_total: real + nxt.nodes[other].real_cost,
                        forward_index,
                        backward_index,
                    });
                }
            }
        }
    }

    match candidate {
        Some(meeting) => {
            let mut path = forward.reconstruct(meeting.forward_index);
            path.reverse();
            path.extend(backward.reconstruct(meeting.backward_index).into_iter().skip(1));
            debug!(
                "found a path with {} vertices and weight {:?}",
                path.len(),
                meeting.real_total,
            );
            PathResult::Found(RoutingResult {
                path,
                weight: meeting.real_total,
            })
        }
        None => {
            debug!("no path from {:?} to {:?}", source, target);
            PathResult::NoPath
        }
    }
}
