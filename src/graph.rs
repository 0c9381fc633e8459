// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Sub};

/// Scalar edge cost used by the search algorithms. Implemented for
/// [f32] and [f64].
pub trait Weight:
    Copy + Debug + PartialOrd + Add<Output = Self> + Sub<Output = Self> + 'static
{
    const ZERO: Self;
    const INFINITY: Self;

    /// Tolerance used when comparing accumulated costs.
    const EPSILON: Self;

    fn half(self) -> Self;
}

impl Weight for f32 {
    const ZERO: Self = 0.0;
    const INFINITY: Self = f32::INFINITY;
    const EPSILON: Self = 1e-6;

    fn half(self) -> Self {
        self * 0.5
    }
}

impl Weight for f64 {
    const ZERO: Self = 0.0;
    const INFINITY: Self = f64::INFINITY;
    const EPSILON: Self = 1e-6;

    fn half(self) -> Self {
        self * 0.5
    }
}

/// Represents an outgoing (one-way) connection to a specific vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<V, W> {
    pub to: V,
    pub weight: W,
}

/// A weighted directed graph traversable in both directions,
/// with an admissible heuristic guiding the search.
///
/// Implementations must be pure: repeated queries over an unchanged graph
/// return the same answers, and no query mutates shared state.
pub trait AStarGraph {
    type Vertex: Copy + Eq + Hash + Debug;
    type Weight: Weight;

    /// Returns all edges leaving `vertex`. Every [Edge::to] is the head of
    /// the corresponding physical connection.
    fn outgoing_edges(&self, vertex: &Self::Vertex) -> Vec<Edge<Self::Vertex, Self::Weight>>;

    /// Returns all edges entering `vertex`, with [Edge::to] set to the
    /// **tail** of the corresponding physical connection, so that the
    /// backward search can walk edges in reverse.
    ///
    /// The two adjacency queries must agree: an edge reported here must
    /// appear among the tail's [outgoing_edges](AStarGraph::outgoing_edges)
    /// with the same weight.
    fn ingoing_edges(&self, vertex: &Self::Vertex) -> Vec<Edge<Self::Vertex, Self::Weight>>;

    /// Estimates the cost of travelling from `from` to `to`.
    ///
    /// The estimate must never overestimate the true cost, in either
    /// direction; otherwise the search silently loses its optimality
    /// guarantee.
    fn heuristic_cost_estimate(&self, from: &Self::Vertex, to: &Self::Vertex) -> Self::Weight;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_constants() {
        assert_eq!(<f64 as Weight>::ZERO + 1.0, 1.0);
        assert!(f64::INFINITY > 1e300);
        assert_eq!(4.0f64.half(), 2.0);
        assert_eq!(3.0f32.half(), 1.5);
    }
}
