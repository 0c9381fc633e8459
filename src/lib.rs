// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routing core for offline navigation.
//!
//! Wayfind computes shortest-time paths over an abstract road graph with a
//! bidirectional A* search, and tracks a moving position's projection onto
//! the computed route. The graph is supplied through the [AStarGraph] trait;
//! [TimeGraph] adapts a physical road network (speed limits, one-way edges,
//! altitude) into time-weighted edges, and [FollowedPolyline] keeps a
//! monotonic cursor on the resulting route while noisy position fixes
//! arrive.
//!
//! # Example
//!
//! ```
//! use wayfind::{find_path_bidirectional, AStarGraph, Cancellable, Edge, PathResult};
//!
//! /// Five vertices in a row, connected both ways with unit weights.
//! struct Corridor;
//!
//! impl AStarGraph for Corridor {
//!     type Vertex = u32;
//!     type Weight = f64;
//!
//!     fn outgoing_edges(&self, &vertex: &u32) -> Vec<Edge<u32, f64>> {
//!         if vertex < 4 { vec![Edge { to: vertex + 1, weight: 1.0 }] } else { vec![] }
//!     }
//!
//!     fn ingoing_edges(&self, &vertex: &u32) -> Vec<Edge<u32, f64>> {
//!         if vertex > 0 { vec![Edge { to: vertex - 1, weight: 1.0 }] } else { vec![] }
//!     }
//!
//!     fn heuristic_cost_estimate(&self, &a: &u32, &b: &u32) -> f64 {
//!         a.abs_diff(b) as f64
//!     }
//! }
//!
//! match find_path_bidirectional(&Corridor, 0, 4, &Cancellable::new()) {
//!     PathResult::Found(found) => {
//!         assert_eq!(found.path, vec![0, 1, 2, 3, 4]);
//!         assert_eq!(found.weight, 4.0);
//!     }
//!     _ => panic!("corridor is connected"),
//! }
//! ```

mod astar;
mod followed_polyline;
mod graph;
mod road_graph;
mod route;

pub use astar::{
    find_path_bidirectional, find_path_bidirectional_with_visitor, Cancellable, PathResult,
    RoutingResult,
};
pub use followed_polyline::{Cursor, FollowedPolyline, UpdatedProjectionInfo};
pub use graph::{AStarGraph, Edge, Weight};
pub use road_graph::{kmph_to_mps, time_between_s, RoadEdge, RoadNetwork, SpeedContext, TimeGraph};
pub use route::{Route, RouteError};

use geo::Point;

/// Represents a vertex of a physical road network: a planar position
/// (`x` is longitude, `y` is latitude) with an optional altitude in meters.
///
/// A missing altitude marks a junction whose elevation is unknown; such
/// junctions must not take part in travel-time computations
/// (see [time_between_s]).
///
/// Equality and hashing compare the raw coordinate bits, so junctions with
/// non-finite coordinates are disallowed.
#[derive(Debug, Clone, Copy)]
pub struct Junction {
    pub point: Point<f64>,
    pub altitude: Option<f64>,
}

impl Junction {
    pub fn new(point: Point<f64>, altitude: f64) -> Self {
        Self {
            point,
            altitude: Some(altitude),
        }
    }

    pub fn without_altitude(point: Point<f64>) -> Self {
        Self {
            point,
            altitude: None,
        }
    }
}

impl PartialEq for Junction {
    fn eq(&self, other: &Self) -> bool {
        self.point.x().to_bits() == other.point.x().to_bits()
            && self.point.y().to_bits() == other.point.y().to_bits()
            && match (self.altitude, other.altitude) {
                (Some(a), Some(b)) => a.to_bits() == b.to_bits(),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for Junction {}

impl std::hash::Hash for Junction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.point.x().to_bits());
        state.write_u64(self.point.y().to_bits());
        match self.altitude {
            Some(altitude) => state.write_u64(altitude.to_bits()),
            None => state.write_u8(0),
        }
    }
}
