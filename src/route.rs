// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use geo::Point;

use crate::{FollowedPolyline, Junction};

/// Error conditions rejected when constructing a [Route] or a
/// [FollowedPolyline].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// After collapsing consecutive duplicates, fewer than two points
    /// remain, so the route has no segment to follow.
    #[error("a route requires at least 2 distinct points, got {0}")]
    TooFewPoints(usize),

    /// A checkpoint index does not split the route into non-empty,
    /// ordered sub-routes.
    #[error("checkpoint index {0} does not lie strictly inside the route")]
    InvalidCheckpoint(usize),
}

/// An ordered sequence of points produced by a path search, immutable once
/// constructed, optionally divided into sub-routes by checkpoint indices
/// (waypoints the user must pass through in order).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Point<f64>>,
    checkpoints: Vec<usize>,
}

impl Route {
    pub fn new<I>(points: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        Self::with_checkpoints(points, Vec::new())
    }

    /// Builds a route passing through checkpoints at the given point
    /// indices. Checkpoints must be strictly increasing and lie strictly
    /// between the first and the last point.
    pub fn with_checkpoints<I>(points: I, checkpoints: Vec<usize>) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        let points = normalize_points(points);
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }

        let mut previous = 0;
        for &checkpoint in &checkpoints {
            if checkpoint <= previous || checkpoint >= points.len() - 1 {
                return Err(RouteError::InvalidCheckpoint(checkpoint));
            }
            previous = checkpoint;
        }

        Ok(Self {
            points,
            checkpoints,
        })
    }

    /// Builds a route from the vertex path reconstructed by the search,
    /// dropping altitudes.
    pub fn from_junctions(path: &[Junction]) -> Result<Self, RouteError> {
        Self::new(path.iter().map(|junction| junction.point))
    }

    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    pub fn checkpoints(&self) -> &[usize] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Wraps the route into a progress tracker. Matching is initially
    /// restricted to the first sub-route; as checkpoints are passed, the
    /// caller advances the bound with
    /// [FollowedPolyline::set_next_checkpoint_index].
    pub fn into_polyline(self) -> FollowedPolyline {
        let bound = self
            .checkpoints
            .first()
            .copied()
            .unwrap_or(self.points.len() - 1);
        let mut polyline = FollowedPolyline::from_points_unchecked(self.points);
        polyline.set_next_checkpoint_index(bound);
        polyline
    }
}

/// Collapses consecutive duplicate points, so that no zero-length segment
/// reaches the distance and projection caches.
pub(crate) fn normalize_points<I>(points: I) -> Vec<Point<f64>>
where
    I: IntoIterator<Item = Point<f64>>,
{
    let mut normalized: Vec<Point<f64>> = Vec::new();
    for point in points {
        if normalized.last() != Some(&point) {
            normalized.push(point);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point<f64> {
        Point::new(x, y)
    }

    #[test]
    fn rejects_degenerate_routes() {
        assert_eq!(Route::new([]), Err(RouteError::TooFewPoints(0)));
        assert_eq!(Route::new([p(1.0, 1.0)]), Err(RouteError::TooFewPoints(1)));
        assert_eq!(
            Route::new([p(1.0, 1.0), p(1.0, 1.0)]),
            Err(RouteError::TooFewPoints(1)),
        );
    }

    #[test]
    fn collapses_consecutive_duplicates() {
        let route = Route::new([p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(2.0, 0.0)])
            .expect("three distinct points remain");
        assert_eq!(route.points(), &[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);
    }

    #[test]
    fn validates_checkpoints() {
        let points = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];

        let route = Route::with_checkpoints(points, vec![1, 2]).expect("checkpoints are interior");
        assert_eq!(route.checkpoints(), &[1, 2]);

        assert_eq!(
            Route::with_checkpoints(points, vec![0]),
            Err(RouteError::InvalidCheckpoint(0)),
        );
        assert_eq!(
            Route::with_checkpoints(points, vec![3]),
            Err(RouteError::InvalidCheckpoint(3)),
        );
        assert_eq!(
            Route::with_checkpoints(points, vec![2, 2]),
            Err(RouteError::InvalidCheckpoint(2)),
        );
    }

    #[test]
    fn polyline_is_bounded_by_the_first_checkpoint() {
        let points = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];

        let unbounded = Route::new(points).expect("valid route").into_polyline();
        assert_eq!(unbounded.next_checkpoint_index(), 3);

        let bounded = Route::with_checkpoints(points, vec![2])
            .expect("valid route")
            .into_polyline();
        assert_eq!(bounded.next_checkpoint_index(), 2);
    }
}
