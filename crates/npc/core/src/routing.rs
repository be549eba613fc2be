//! Multi-floor route discovery over a building's stairs graph.
//!
//! The search runs backward: it starts from the stairs owned by the goal
//! region and expands through each region's own stairs until it reaches the
//! walker's region. With no start region the search instead stops at the
//! first region that has an exterior door, which gives the walker in the
//! origin region a way out of the building.
//!
//! Results are memoized per `(target, start)` pair for the lifetime of the
//! router. The graph is immutable after load, so entries are never
//! invalidated.

use std::collections::{HashMap, HashSet, VecDeque, hash_map::Entry};

use tracing::{debug, trace};

use crate::error::{ErrorSeverity, NpcError};
use crate::world::{BuildingGraph, RegionId, StairsId};

/// Sequence of stairs to walk, in reverse walking order.
///
/// The last element is always owned by the walker's region; take it, arrive
/// in the next region, and the new last element is owned by that region. An
/// empty route means the walker is already where it needs to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StairsRoute {
    steps: Vec<StairsId>,
    from: RegionId,
    to: RegionId,
}

impl StairsRoute {
    /// Stairs to take from the walker's current region.
    pub fn next_step(&self) -> Option<StairsId> {
        self.steps.last().copied()
    }

    pub fn steps(&self) -> &[StairsId] {
        &self.steps
    }

    /// Region the walker starts in.
    pub fn from(&self) -> RegionId {
        self.from
    }

    /// Region the walker arrives in after the last stairs.
    pub fn to(&self) -> RegionId {
        self.to
    }

    pub fn is_direct(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("region {0:?} is not part of the building graph")]
    UnknownRegion(RegionId),

    #[error("no stairs route from {start:?} to {target:?}")]
    Unreachable {
        target: RegionId,
        start: Option<RegionId>,
    },
}

impl NpcError for RouteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RouteError::UnknownRegion(_) => ErrorSeverity::Validation,
            RouteError::Unreachable { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RouteError::UnknownRegion(_) => "ROUTE_UNKNOWN_REGION",
            RouteError::Unreachable { .. } => "ROUTE_UNREACHABLE",
        }
    }
}

/// Cache statistics, mostly for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizing stairs route finder.
///
/// One router is shared by every brain of a simulation and passed down by
/// `&mut` during the logic tick.
#[derive(Debug, Default)]
pub struct StairsRouter {
    cache: HashMap<(RegionId, Option<RegionId>), Option<StairsRoute>>,
    hits: u64,
    misses: u64,
}

impl StairsRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the stairs route a walker in `start` takes to reach `target`.
    ///
    /// With `start == None`, `target` is the walker's own region and the
    /// route leads to the nearest region with an exterior door.
    pub fn find_route(
        &mut self,
        graph: &BuildingGraph,
        target: RegionId,
        start: Option<RegionId>,
    ) -> Result<&StairsRoute, RouteError> {
        let key = (target, start);
        let cached = match self.cache.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                // Unknown regions are a content error, not a graph property;
                // leave them out of the cache.
                if graph.region(target).is_none() {
                    return Err(RouteError::UnknownRegion(target));
                }
                if let Some(start) = start
                    && graph.region(start).is_none()
                {
                    return Err(RouteError::UnknownRegion(start));
                }
                self.misses += 1;
                let route = search(graph, target, start);
                debug!(
                    ?target,
                    ?start,
                    steps = route.as_ref().map(StairsRoute::len),
                    "stairs route computed"
                );
                entry.insert(route)
            }
        };
        cached
            .as_ref()
            .ok_or(RouteError::Unreachable { target, start })
    }

    pub fn stats(&self) -> RouteCacheStats {
        RouteCacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
        }
    }
}

/// Breadth-first search from `target` outward.
///
/// `parent[r] = (p, s)` records that stairs `s`, owned by `p`, leads into
/// `r`; a walker in `r` therefore reaches `p` through the counterpart of `s`.
fn search(graph: &BuildingGraph, target: RegionId, start: Option<RegionId>) -> Option<StairsRoute> {
    let reached = |region: RegionId| match start {
        Some(start) => region == start,
        None => graph.region(region).is_some_and(|r| r.has_exit()),
    };

    if reached(target) {
        return Some(StairsRoute {
            steps: Vec::new(),
            from: start.unwrap_or(target),
            to: target,
        });
    }

    let mut parent: HashMap<RegionId, (RegionId, StairsId)> = HashMap::new();
    let mut visited: HashSet<RegionId> = HashSet::from([target]);
    let mut queue: VecDeque<RegionId> = VecDeque::from([target]);

    while let Some(region) = queue.pop_front() {
        let Some(node) = graph.region(region) else {
            continue;
        };
        for &stairs in &node.stairs {
            let Some(next) = graph.destination_region(stairs) else {
                continue;
            };
            if !visited.insert(next) {
                continue;
            }
            trace!(?region, ?stairs, ?next, "expanding stairs");
            parent.insert(next, (region, stairs));
            if reached(next) {
                return Some(build_route(graph, &parent, target, next, start.is_some()));
            }
            queue.push_back(next);
        }
    }
    None
}

fn build_route(
    graph: &BuildingGraph,
    parent: &HashMap<RegionId, (RegionId, StairsId)>,
    target: RegionId,
    found: RegionId,
    toward_target: bool,
) -> StairsRoute {
    let mut chain = Vec::new();
    let mut cursor = found;
    while let Some(&(previous, stairs)) = parent.get(&cursor) {
        chain.push((cursor, stairs));
        cursor = previous;
    }

    if toward_target {
        // `found` is the walker's region: it walks the counterparts from
        // `found` back to `target`. Reverse so the first stairs is last.
        let mut steps: Vec<StairsId> = chain
            .iter()
            .filter_map(|&(_, stairs)| graph.counterpart(stairs).map(|s| s.id))
            .collect();
        steps.reverse();
        StairsRoute {
            steps,
            from: found,
            to: target,
        }
    } else {
        // `target` is the walker's region and `found` the exit region. The
        // recorded stairs already lead away from `target`, ending with the
        // one owned by `target`.
        StairsRoute {
            steps: chain.into_iter().map(|(_, stairs)| stairs).collect(),
            from: target,
            to: found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::world::{BuildingId, BuildingRegion, Door, DoorId, GraphData, Stairs};

    /// Three floors stacked in one building, ground floor has the exit.
    ///
    /// ```text
    /// r2  s3
    ///      |
    /// r1  s2  s1
    ///          |
    /// r0      s0   (exit d0)
    /// ```
    fn tower() -> BuildingGraph {
        BuildingGraph::new(GraphData {
            regions: vec![
                BuildingRegion::new(RegionId(0), BuildingId(0), 0).with_exit(DoorId(0)),
                BuildingRegion::new(RegionId(1), BuildingId(0), 1),
                BuildingRegion::new(RegionId(2), BuildingId(0), 2),
            ],
            stairs: vec![
                Stairs::new(StairsId(0), RegionId(0), Vec2::new(50.0, 0.0)).leading_to(StairsId(1)),
                Stairs::new(StairsId(1), RegionId(1), Vec2::new(50.0, 0.0)),
                Stairs::new(StairsId(2), RegionId(1), Vec2::new(-50.0, 0.0)).leading_to(StairsId(3)),
                Stairs::new(StairsId(3), RegionId(2), Vec2::new(-50.0, 0.0)),
            ],
            doors: vec![Door {
                id: DoorId(0),
                region: RegionId(0),
                inside: Vec2::new(0.0, 90.0),
                outside: Vec2::new(0.0, 110.0),
            }],
        })
        .expect("valid tower")
    }

    /// Walks a route the way a character would and returns visited regions.
    fn walk(graph: &BuildingGraph, route: &StairsRoute) -> Vec<RegionId> {
        let mut region = route.from();
        let mut visited = vec![region];
        for &stairs in route.steps().iter().rev() {
            assert_eq!(graph.stairs(stairs).unwrap().region, region);
            region = graph.destination_region(stairs).unwrap();
            visited.push(region);
        }
        visited
    }

    #[test]
    fn same_region_is_direct() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let route = router.find_route(&graph, RegionId(1), Some(RegionId(1))).unwrap();
        assert!(route.is_direct());
    }

    #[test]
    fn two_floors_up_ends_in_start_region() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let route = router
            .find_route(&graph, RegionId(2), Some(RegionId(0)))
            .unwrap()
            .clone();

        assert_eq!(route.steps(), &[StairsId(2), StairsId(0)]);
        let last = route.next_step().unwrap();
        assert_eq!(graph.stairs(last).unwrap().region, RegionId(0));
        assert_eq!(
            walk(&graph, &route),
            vec![RegionId(0), RegionId(1), RegionId(2)]
        );
    }

    #[test]
    fn descending_route_uses_counterparts() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let route = router
            .find_route(&graph, RegionId(0), Some(RegionId(2)))
            .unwrap()
            .clone();

        assert_eq!(route.steps(), &[StairsId(1), StairsId(3)]);
        assert_eq!(walk(&graph, &route).last(), Some(&RegionId(0)));
    }

    #[test]
    fn exit_mode_finds_nearest_exit_region() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let route = router.find_route(&graph, RegionId(2), None).unwrap().clone();

        assert_eq!(route.from(), RegionId(2));
        assert_eq!(route.to(), RegionId(0));
        assert_eq!(graph.stairs(route.next_step().unwrap()).unwrap().region, RegionId(2));
        assert_eq!(walk(&graph, &route).last(), Some(&RegionId(0)));

        let at_exit = router.find_route(&graph, RegionId(0), None).unwrap();
        assert!(at_exit.is_direct());
        assert_eq!(at_exit.to(), RegionId(0));
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let first = router
            .find_route(&graph, RegionId(2), Some(RegionId(0)))
            .unwrap()
            .clone();
        let second = router
            .find_route(&graph, RegionId(2), Some(RegionId(0)))
            .unwrap()
            .clone();

        assert_eq!(first, second);
        assert_eq!(
            router.stats(),
            RouteCacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn disconnected_buildings_are_unreachable_and_cached() {
        let graph = BuildingGraph::new(GraphData {
            regions: vec![
                BuildingRegion::new(RegionId(0), BuildingId(0), 0),
                BuildingRegion::new(RegionId(1), BuildingId(1), 0),
            ],
            ..GraphData::default()
        })
        .unwrap();
        let mut router = StairsRouter::new();

        for _ in 0..2 {
            assert_eq!(
                router.find_route(&graph, RegionId(1), Some(RegionId(0))),
                Err(RouteError::Unreachable {
                    target: RegionId(1),
                    start: Some(RegionId(0))
                })
            );
        }
        assert_eq!(router.stats().hits, 1);
        assert!(router.find_route(&graph, RegionId(0), None).is_err());
    }

    #[test]
    fn unknown_region_is_not_cached() {
        let graph = tower();
        let mut router = StairsRouter::new();
        let err = router
            .find_route(&graph, RegionId(7), Some(RegionId(0)))
            .unwrap_err();
        assert_eq!(err.error_code(), "ROUTE_UNKNOWN_REGION");
        assert_eq!(router.stats().entries, 0);
    }
}
