// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use geo::{Distance, Haversine};

use crate::{AStarGraph, Edge, Junction};

/// Converts a speed in km/h to m/s.
pub fn kmph_to_mps(speed_kmph: f64) -> f64 {
    speed_kmph * 1000.0 / 3600.0
}

/// Travel time between two junctions at a constant speed, in seconds.
///
/// The travelled distance is the 3D length of the segment: the great-circle
/// distance between the planar positions combined with the altitude delta.
/// Both junctions must have a known altitude; release builds fall back to
/// a zero delta, yielding a finite but slightly optimistic time.
pub fn time_between_s(from: &Junction, to: &Junction, speed_mps: f64) -> f64 {
    debug_assert!(speed_mps > 0.0, "speed must be positive: {}", speed_mps);
    debug_assert!(
        from.altitude.is_some() && to.altitude.is_some(),
        "travel time requires altitudes on both junctions",
    );

    let distance_m = Haversine.distance(from.point, to.point);
    let altitude_delta_m = match (from.altitude, to.altitude) {
        (Some(from_altitude), Some(to_altitude)) => to_altitude - from_altitude,
        _ => 0.0,
    };
    (distance_m * distance_m + altitude_delta_m * altitude_delta_m).sqrt() / speed_mps
}

/// Direction and surroundings of a speed limit lookup. Speed limits may
/// differ between the two travel directions of the same physical road, and
/// between city and rural stretches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedContext {
    pub forward: bool,
    pub in_city: bool,
}

impl Default for SpeedContext {
    fn default() -> Self {
        Self {
            forward: true,
            in_city: false,
        }
    }
}

/// A directed physical road segment between two junctions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadEdge {
    pub from: Junction,
    pub to: Junction,
}

/// The map-data collaborator: a physical road network queried for adjacent
/// segments and speed limits. One-way restrictions are expressed by simply
/// not reporting the forbidden direction.
pub trait RoadNetwork {
    /// All segments starting at `junction`.
    fn outgoing_edges(&self, junction: &Junction) -> Vec<RoadEdge>;

    /// All segments ending at `junction`.
    fn ingoing_edges(&self, junction: &Junction) -> Vec<RoadEdge>;

    /// The fastest speed attainable anywhere in the network, in km/h.
    /// Must be greater than zero and never below any
    /// [speed_kmph](RoadNetwork::speed_kmph) answer.
    fn max_speed_kmph(&self) -> f64;

    /// Speed limit of `edge` under the given context, in km/h.
    fn speed_kmph(&self, edge: &RoadEdge, context: &SpeedContext) -> f64;
}

/// Adapts a [RoadNetwork] into an [AStarGraph] whose edge weights are
/// travel times in seconds.
///
/// The heuristic divides the straight 3D distance by the network's maximum
/// speed; no segment can be traversed faster, so the estimate never
/// overestimates the remaining travel time.
pub struct TimeGraph<'a, N: RoadNetwork> {
    network: &'a N,
    max_speed_mps: f64,
}

impl<'a, N: RoadNetwork> TimeGraph<'a, N> {
    pub fn new(network: &'a N) -> Self {
        Self {
            network,
            max_speed_mps: kmph_to_mps(network.max_speed_kmph()),
        }
    }

    fn edge_time_s(&self, edge: &RoadEdge) -> f64 {
        let speed_kmph = self.network.speed_kmph(edge, &SpeedContext::default());
        time_between_s(&edge.from, &edge.to, kmph_to_mps(speed_kmph))
    }
}

impl<N: RoadNetwork> AStarGraph for TimeGraph<'_, N> {
    type Vertex = Junction;
    type Weight = f64;

    fn outgoing_edges(&self, vertex: &Junction) -> Vec<Edge<Junction, f64>> {
        self.network
            .outgoing_edges(vertex)
            .iter()
            .map(|edge| {
                debug_assert_eq!(edge.from, *vertex);
                Edge {
                    to: edge.to,
                    weight: self.edge_time_s(edge),
                }
            })
            .collect()
    }

    fn ingoing_edges(&self, vertex: &Junction) -> Vec<Edge<Junction, f64>> {
        self.network
            .ingoing_edges(vertex)
            .iter()
            .map(|edge| {
                debug_assert_eq!(edge.to, *vertex);
                Edge {
                    to: edge.from,
                    weight: self.edge_time_s(edge),
                }
            })
            .collect()
    }

    fn heuristic_cost_estimate(&self, from: &Junction, to: &Junction) -> f64 {
        time_between_s(from, to, self.max_speed_mps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_path_bidirectional, Cancellable};
    use approx::assert_relative_eq;
    use geo::Point;

    /// Road network backed by a plain segment list, with speeds in km/h.
    struct SegmentNetwork {
        segments: Vec<(Junction, Junction, f64)>,
        max_kmph: f64,
    }

    impl RoadNetwork for SegmentNetwork {
        fn outgoing_edges(&self, junction: &Junction) -> Vec<RoadEdge> {
            self.segments
                .iter()
                .filter(|(from, _, _)| from == junction)
                .map(|&(from, to, _)| RoadEdge { from, to })
                .collect()
        }

        fn ingoing_edges(&self, junction: &Junction) -> Vec<RoadEdge> {
            self.segments
                .iter()
                .filter(|(_, to, _)| to == junction)
                .map(|&(from, to, _)| RoadEdge { from, to })
                .collect()
        }

        fn max_speed_kmph(&self) -> f64 {
            self.max_kmph
        }

        fn speed_kmph(&self, edge: &RoadEdge, _: &SpeedContext) -> f64 {
            self.segments
                .iter()
                .find(|(from, to, _)| *from == edge.from && *to == edge.to)
                .map(|&(_, _, speed)| speed)
                .unwrap_or(self.max_kmph)
        }
    }

    fn junction(lon: f64, altitude: f64) -> Junction {
        Junction::new(Point::new(lon, 0.0), altitude)
    }

    #[test]
    fn kmph_to_mps_conversion() {
        assert_eq!(kmph_to_mps(36.0), 10.0);
        assert_eq!(kmph_to_mps(0.0), 0.0);
    }

    #[test]
    fn travel_time_on_flat_ground() {
        // 0.001 degrees of longitude on the equator is about 111.2 m.
        let t = time_between_s(&junction(0.0, 0.0), &junction(0.001, 0.0), 10.0);
        assert_relative_eq!(t, 11.1195, max_relative = 1e-3);
    }

    #[test]
    fn travel_time_accounts_for_altitude() {
        let flat = time_between_s(&junction(0.0, 0.0), &junction(0.001, 0.0), 10.0);
        let climbing = time_between_s(&junction(0.0, 0.0), &junction(0.001, 100.0), 10.0);
        assert!(climbing > flat);
        // sqrt(111.195^2 + 100^2) m at 10 m/s.
        assert_relative_eq!(climbing, 14.955, max_relative = 1e-3);
    }

    #[test]
    fn adjacency_queries_agree() {
        let a = junction(0.0, 0.0);
        let b = junction(0.001, 0.0);
        let network = SegmentNetwork {
            segments: vec![(a, b, 36.0)],
            max_kmph: 90.0,
        };
        let graph = TimeGraph::new(&network);

        let outgoing = graph.outgoing_edges(&a);
        let ingoing = graph.ingoing_edges(&b);
        assert_eq!(outgoing.len(), 1);
        assert_eq!(ingoing.len(), 1);
        assert_eq!(outgoing[0].to, b);
        assert_eq!(ingoing[0].to, a);
        assert_eq!(outgoing[0].weight, ingoing[0].weight);
        assert_relative_eq!(outgoing[0].weight, 11.1195, max_relative = 1e-3);

        // The reverse direction was never declared.
        assert!(graph.outgoing_edges(&b).is_empty());
        assert!(graph.ingoing_edges(&a).is_empty());
    }

    #[test]
    fn heuristic_is_admissible() {
        let a = junction(0.0, 0.0);
        let b = junction(0.001, 30.0);
        let c = junction(0.002, 0.0);
        let network = SegmentNetwork {
            segments: vec![(a, b, 30.0), (b, c, 60.0)],
            max_kmph: 90.0,
        };
        let graph = TimeGraph::new(&network);

        for (from, to) in [(a, b), (b, c), (a, c)] {
            let found = find_path_bidirectional(&graph, from, to, &Cancellable::new())
                .found()
                .expect("chain is connected");
            let estimate = graph.heuristic_cost_estimate(&from, &to);
            assert!(
                estimate <= found.weight + 1e-9,
                "estimate {} must not exceed travel time {}",
                estimate,
                found.weight,
            );
        }
    }

    #[test]
    fn faster_detour_beats_slow_direct_road() {
        let a = junction(0.0, 0.0);
        let b = junction(0.001, 0.0);
        let d = junction(0.002, 0.0);
        let network = SegmentNetwork {
            segments: vec![(a, d, 20.0), (a, b, 90.0), (b, d, 90.0)],
            max_kmph: 90.0,
        };
        let graph = TimeGraph::new(&network);

        let found = find_path_bidirectional(&graph, a, d, &Cancellable::new())
            .found()
            .expect("network is connected");
        assert_eq!(found.path, vec![a, b, d]);
        assert!(found.weight < 10.0);
    }

    #[test]
    fn search_result_feeds_the_progress_tracker() {
        use crate::Route;
        use geo::Rect;

        let a = junction(0.0, 0.0);
        let b = junction(0.001, 0.0);
        let d = junction(0.002, 0.0);
        let network = SegmentNetwork {
            segments: vec![(a, b, 90.0), (b, d, 90.0)],
            max_kmph: 90.0,
        };
        let graph = TimeGraph::new(&network);

        let found = find_path_bidirectional(&graph, a, d, &Cancellable::new())
            .found()
            .expect("network is connected");
        let mut poly = Route::from_junctions(&found.path)
            .expect("path points are distinct")
            .into_polyline();
        assert_eq!(poly.points().len(), 3);
        assert_relative_eq!(poly.total_distance_m(), 222.39, max_relative = 1e-3);

        let cursor = poly
            .update_projection(&Rect::new((0.0005, -0.0005), (0.0015, 0.0005)))
            .expect("position lies on the route");
        assert_eq!(cursor.index, 0);
        assert_relative_eq!(poly.distance_to_end_m(), 111.19, max_relative = 1e-3);

        let cursor = poly
            .update_projection(&Rect::new((0.001, -0.0005), (0.002, 0.0005)))
            .expect("position lies on the route");
        assert_eq!(cursor.index, 1);
    }

    #[test]
    fn junction_identity_is_by_coordinate() {
        use std::collections::HashMap;

        let a = junction(0.001, 5.0);
        let same = junction(0.001, 5.0);
        let elsewhere = junction(0.002, 5.0);
        let unknown_altitude = Junction::without_altitude(Point::new(0.001, 0.0));

        assert_eq!(a, same);
        assert_ne!(a, elsewhere);
        assert_ne!(a, unknown_altitude);

        let mut costs: HashMap<Junction, f64> = HashMap::new();
        costs.insert(a, 1.0);
        assert_eq!(costs.get(&same), Some(&1.0));
        assert_eq!(costs.get(&elsewhere), None);
    }
}
