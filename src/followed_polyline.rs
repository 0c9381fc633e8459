// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use geo::{Closest, ClosestPoint, Distance, Haversine, Line, Point, Rect};

use crate::route::normalize_points;
use crate::RouteError;

/// A position on a [FollowedPolyline]: a point projected onto one of the
/// segments, plus that segment's index.
///
/// Cursors with `index == point count - 1` (the route's last point) are
/// only produced by [FollowedPolyline::end] and may be used in distance
/// queries; the tracked cursor always stays below the segment count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub point: Point<f64>,
    pub index: usize,
}

/// Outcome of [FollowedPolyline::update_matching_projection].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatedProjectionInfo {
    /// Whether a matching projection was found and the cursor moved to it.
    pub updated: bool,
    /// Whether a segment flagged as unmatching was strictly closer to the
    /// position than any matching segment. Callers use this to decide how
    /// much to trust the current match.
    pub closer_to_unmatching: bool,
}

/// Result of one matching-aware interval scan.
struct UpdatedProjection {
    cursor: Option<Cursor>,
    closer_to_unmatching: bool,
}

/// Tracks progress along a computed route.
///
/// Owns the route's points together with cumulative segment distances, a
/// closest-point helper per segment, and a cursor holding the latest
/// projection of the followed position. The cursor's segment index never
/// decreases, except when [update](FollowedPolyline::update) resets it.
///
/// Single-owner, single-writer: one navigation loop feeds position fixes
/// through the projection calls; concurrent use requires external
/// synchronization.
#[derive(Debug, Clone)]
pub struct FollowedPolyline {
    points: Vec<Point<f64>>,
    /// Distance from the route start to the end of each segment, in meters.
    seg_distance: Vec<f64>,
    seg_proj: Vec<Line<f64>>,
    current: Cursor,
    /// Matching is restricted to segments before this index (the active
    /// sub-route).
    next_checkpoint_index: usize,
    /// Sorted indices of segments unreliable for matching. Advisory: the
    /// segments stay part of the route and of all distance queries.
    unmatching_segment_indexes: Vec<usize>,
}

impl FollowedPolyline {
    /// Builds a tracker over the given points. Consecutive duplicate points
    /// are collapsed; at least two distinct points must remain.
    pub fn new<I>(points: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        let points = normalize_points(points);
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }
        Ok(Self::from_points_unchecked(points))
    }

    /// `points` must be normalized and hold at least two points.
    pub(crate) fn from_points_unchecked(points: Vec<Point<f64>>) -> Self {
        debug_assert!(points.len() >= 2);
        let segment_count = points.len() - 1;
        let mut polyline = Self {
            current: Cursor {
                point: points[0],
                index: 0,
            },
            points,
            seg_distance: Vec::new(),
            seg_proj: Vec::new(),
            next_checkpoint_index: segment_count,
            unmatching_segment_indexes: Vec::new(),
        };
        polyline.update();
        polyline
    }

    /// Recomputes the cached segment distances and projection helpers and
    /// resets the cursor to the route start. Checkpoint and unmatching
    /// state persist, with the checkpoint bound clamped to the segment
    /// count.
    pub fn update(&mut self) {
        let segment_count = self.points.len() - 1;

        self.seg_distance.clear();
        self.seg_distance.reserve(segment_count);
        self.seg_proj.clear();
        self.seg_proj.reserve(segment_count);

        let mut distance = 0.0;
        for i in 0..segment_count {
            let p1 = self.points[i];
            let p2 = self.points[i + 1];

            distance += Haversine.distance(p1, p2);

            self.seg_distance.push(distance);
            self.seg_proj.push(Line::new(p1, p2));
        }

        self.current = Cursor {
            point: self.points[0],
            index: 0,
        };
        self.next_checkpoint_index = self.next_checkpoint_index.min(segment_count);
    }

    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.seg_proj.len()
    }

    pub fn current(&self) -> Cursor {
        self.current
    }

    pub fn next_checkpoint_index(&self) -> usize {
        self.next_checkpoint_index
    }

    /// Restricts matching to segments before `index`. Callers advance this
    /// bound as the followed position passes checkpoints.
    pub fn set_next_checkpoint_index(&mut self, index: usize) {
        self.next_checkpoint_index = index.min(self.seg_proj.len());
    }

    /// Flags segments as unreliable projection targets. `indexes` must be
    /// sorted in ascending order.
    pub fn set_unmatching_segment_indexes(&mut self, indexes: Vec<usize>) {
        debug_assert!(indexes.windows(2).all(|pair| pair[0] <= pair[1]));
        self.unmatching_segment_indexes = indexes;
    }

    pub fn begin(&self) -> Cursor {
        Cursor {
            point: self.points[0],
            index: 0,
        }
    }

    pub fn end(&self) -> Cursor {
        Cursor {
            point: self.points[self.points.len() - 1],
            index: self.points.len() - 1,
        }
    }

    pub fn cursor_at(&self, index: usize) -> Cursor {
        Cursor {
            point: self.points[index],
            index,
        }
    }

    /// Distance along the route between two cursors, in meters.
    /// `from` must not lie behind `to`.
    pub fn distance_m(&self, from: &Cursor, to: &Cursor) -> f64 {
        debug_assert!(from.index <= to.index);
        debug_assert!(to.index < self.points.len());

        if from.index == to.index {
            return Haversine.distance(from.point, to.point);
        }

        Haversine.distance(from.point, self.points[from.index + 1])
            + self.seg_distance[to.index - 1]
            - self.seg_distance[from.index]
            + Haversine.distance(self.points[to.index], to.point)
    }

    pub fn total_distance_m(&self) -> f64 {
        self.seg_distance.last().copied().unwrap_or(0.0)
    }

    pub fn distance_from_start_m(&self) -> f64 {
        let before = match self.current.index {
            0 => 0.0,
            index => self.seg_distance[index - 1],
        };
        before + Haversine.distance(self.current.point, self.points[self.current.index])
    }

    pub fn distance_to_end_m(&self) -> f64 {
        self.total_distance_m() - self.distance_from_start_m()
    }

    /// Distance between the cursor's projected point and the start point of
    /// the cursor's segment, in meters.
    pub fn dist_from_current_to_segment_start_m(&self) -> f64 {
        Haversine.distance(self.points[self.current.index], self.current.point)
    }

    /// Projects the center of `pos_rect` onto the route and advances the
    /// cursor to the result.
    ///
    /// Only projections inside `pos_rect` qualify. The two segments at the
    /// cursor are tried first; if neither yields an in-region projection,
    /// the rest of the active sub-route is scanned. Returns [None], with
    /// the cursor unchanged, when no segment projects into the region.
    pub fn update_projection(&mut self, pos_rect: &Rect<f64>) -> Option<Cursor> {
        debug_assert!(self.current.index < self.points.len() - 1);

        let position = Point::from(pos_rect.center());
        let result = self.best_projection(pos_rect, |cursor: &Cursor| {
            Haversine.distance(cursor.point, position)
        });

        if let Some(cursor) = result {
            self.current = cursor;
        }
        result
    }

    /// Like [update_projection](FollowedPolyline::update_projection), but
    /// segments flagged via
    /// [set_unmatching_segment_indexes](FollowedPolyline::set_unmatching_segment_indexes)
    /// never win over a matching segment at smaller or equal distance, and
    /// the cursor never moves onto them: a strictly closer flagged segment
    /// is only reported through
    /// [closer_to_unmatching](UpdatedProjectionInfo::closer_to_unmatching).
    pub fn update_matching_projection(&mut self, pos_rect: &Rect<f64>) -> UpdatedProjectionInfo {
        debug_assert!(self.current.index < self.points.len() - 1);

        let result = self.best_matching_projection(pos_rect);

        if let Some(cursor) = result.cursor {
            self.current = cursor;
        }
        UpdatedProjectionInfo {
            updated: result.cursor.is_some(),
            closer_to_unmatching: result.closer_to_unmatching,
        }
    }

    /// Returns the first route point farther than `tolerance_m` from the
    /// cursor's projected point, or the route's last point. Skipping the
    /// closely spaced geometry vertices keeps the reported bearing target
    /// stable.
    pub fn current_direction_point(&self, tolerance_m: f64) -> Point<f64> {
        let last = self.points.len() - 1;
        let mut index = (self.current.index + 1).min(last);
        let mut point = self.points[index];

        while index < last && Haversine.distance(point, self.current.point) <= tolerance_m {
            index += 1;
            point = self.points[index];
        }
        point
    }

    fn best_projection<F>(&self, pos_rect: &Rect<f64>, dist_fn: F) -> Option<Cursor>
    where
        F: Fn(&Cursor) -> f64,
    {
        debug_assert_eq!(self.seg_proj.len() + 1, self.points.len());

        // Try the two segments at the cursor first. The window deliberately
        // ignores the checkpoint bound: right before an intermediate point
        // the best projection may sit just past it, in the next sub-route.
        let hopping_border = self.seg_proj.len().min(self.current.index + 2);
        let closest = self.closest_projection_in_interval(
            pos_rect,
            &dist_fn,
            self.current.index,
            hopping_border,
        );
        if closest.is_some() {
            return closest;
        }

        // Otherwise scan the remaining segments of the active sub-route.
        self.closest_projection_in_interval(
            pos_rect,
            &dist_fn,
            hopping_border,
            self.next_checkpoint_index.max(hopping_border),
        )
    }

    fn best_matching_projection(&self, pos_rect: &Rect<f64>) -> UpdatedProjection {
        debug_assert_eq!(self.seg_proj.len() + 1, self.points.len());

        // Same two-phase scan as best_projection, with a one segment longer
        // window. Observing a closer unmatching segment also concludes the
        // first phase.
        let hopping_border = self.seg_proj.len().min(self.current.index + 3);
        let result = self.closest_matching_projection_in_interval(
            pos_rect,
            self.current.index,
            hopping_border,
        );
        if result.cursor.is_some() || result.closer_to_unmatching {
            return result;
        }

        self.closest_matching_projection_in_interval(
            pos_rect,
            hopping_border,
            self.next_checkpoint_index.max(hopping_border),
        )
    }

    fn closest_projection_in_interval<F>(
        &self,
        pos_rect: &Rect<f64>,
        dist_fn: F,
        start_index: usize,
        end_index: usize,
    ) -> Option<Cursor>
    where
        F: Fn(&Cursor) -> f64,
    {
        debug_assert!(end_index <= self.seg_proj.len());

        let position = Point::from(pos_rect.center());
        let mut nearest = None;
        let mut min_dist = f64::INFINITY;

        for index in start_index..end_index {
            let point = closest_point_on(&self.seg_proj[index], position);
            if !contains_inclusive(pos_rect, point) {
                continue;
            }

            let candidate = Cursor { point, index };
            let distance = dist_fn(&candidate);
            if distance < min_dist {
                min_dist = distance;
                nearest = Some(candidate);
            }
        }
        nearest
    }

    fn closest_matching_projection_in_interval(
        &self,
        pos_rect: &Rect<f64>,
        start_index: usize,
        end_index: usize,
    ) -> UpdatedProjection {
        debug_assert!(end_index <= self.seg_proj.len());

        let position = Point::from(pos_rect.center());
        let mut nearest = None;
        let mut min_dist = f64::INFINITY;
        let mut min_dist_unmatching = f64::INFINITY;

        for index in start_index..end_index {
            let point = closest_point_on(&self.seg_proj[index], position);
            if !contains_inclusive(pos_rect, point) {
                continue;
            }

            let distance = Haversine.distance(point, position);
            if distance >= min_dist_unmatching && distance >= min_dist {
                continue;
            }

            if self.unmatching_segment_indexes.binary_search(&index).is_err() {
                if min_dist > distance {
                    min_dist = distance;
                    nearest = Some(Cursor { point, index });
                }
            } else if min_dist_unmatching > distance {
                min_dist_unmatching = distance;
            }
        }

        UpdatedProjection {
            cursor: nearest,
            closer_to_unmatching: min_dist_unmatching < min_dist,
        }
    }
}

fn closest_point_on(segment: &Line<f64>, position: Point<f64>) -> Point<f64> {
    match segment.closest_point(&position) {
        Closest::Intersection(point) | Closest::SinglePoint(point) => point,
        // Degenerate segments are collapsed at construction; should one
        // appear anyway, its start is as close as any of its points.
        Closest::Indeterminate => segment.start_point(),
    }
}

fn contains_inclusive(rect: &Rect<f64>, point: Point<f64>) -> bool {
    point.x() >= rect.min().x
        && point.x() <= rect.max().x
        && point.y() >= rect.min().y
        && point.y() <= rect.max().y
}
