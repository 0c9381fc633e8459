// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// A reconstructed path together with its total weight.
///
/// The path always contains at least one vertex; equal source and target
/// produce a single-vertex path with zero weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingResult<V, W> {
    pub path: Vec<V>,
    pub weight: W,
}

/// Outcome of a path search.
///
/// [NoPath](PathResult::NoPath) means the graph was searched exhaustively
/// and the target is unreachable, while [Cancelled](PathResult::Cancelled)
/// means the caller aborted the search. Callers must not conflate the two:
/// a cancelled search says nothing about reachability.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum PathResult<V, W> {
    Found(RoutingResult<V, W>),
    NoPath,
    Cancelled,
}

impl<V, W> PathResult<V, W> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Extracts the path and weight, discarding the failure reason.
    pub fn found(self) -> Option<RoutingResult<V, W>> {
        match self {
            Self::Found(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_extracts_the_result() {
        let result: PathResult<u32, f64> = PathResult::Found(RoutingResult {
            path: vec![1, 2],
            weight: 3.0,
        });
        assert!(result.is_found());
        assert_eq!(result.found().map(|r| r.weight), Some(3.0));

        assert!(PathResult::<u32, f64>::NoPath.found().is_none());
        assert!(!PathResult::<u32, f64>::Cancelled.is_found());
    }
}
