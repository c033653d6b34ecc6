//! A* route search over the waypoint graph.
//!
//! Used when no precomputed path exists for a (start waypoint, destination
//! POI) pair. Edge cost and heuristic are both planar Euclidean distance,
//! which keeps the heuristic admissible: a straight line underestimates any
//! real path through the graph.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::map::NavigationMap;

/// Result of a route search.
#[derive(Clone, Debug)]
pub struct Route {
    /// Waypoint ids from start to goal inclusive
    pub waypoints: Vec<i32>,
    /// Sum of edge lengths along the route (meters)
    pub cost: f32,
}

/// Node in the search frontier.
#[derive(Clone, Debug)]
struct SearchNode {
    waypoint_id: i32,
    f_score: f32,
    /// Insertion sequence for deterministic tie-breaking
    seq: u64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.waypoint_id == other.waypoint_id && self.seq == other.seq
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower f_score = higher priority);
        // equal f_scores resolve in insertion order
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest waypoint route from `start` to `goal`.
///
/// Returns `None` when either id is unknown or the two waypoints are
/// disconnected; search exhaustion is a normal "no route" outcome, not a
/// failure state.
pub fn find_route(map: &NavigationMap, start: i32, goal: i32) -> Option<Route> {
    let goal_pos = map.waypoint(goal)?.position;
    let start_wp = map.waypoint(start)?;

    if start == goal {
        return Some(Route {
            waypoints: vec![start],
            cost: 0.0,
        });
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<i32, i32> = HashMap::new();
    let mut g_scores: HashMap<i32, f32> = HashMap::new();
    let mut closed: HashMap<i32, bool> = HashMap::new();
    let mut seq: u64 = 0;

    g_scores.insert(start, 0.0);
    open_set.push(SearchNode {
        waypoint_id: start,
        f_score: start_wp.position.distance_2d(&goal_pos),
        seq,
    });

    let mut nodes_expanded = 0usize;

    while let Some(current) = open_set.pop() {
        let current_id = current.waypoint_id;

        if current_id == goal {
            debug!(
                "Route found: {} -> {} ({} nodes expanded)",
                start, goal, nodes_expanded
            );
            return Some(reconstruct(&came_from, g_scores[&goal], start, goal));
        }

        if closed.contains_key(&current_id) {
            continue;
        }
        closed.insert(current_id, true);
        nodes_expanded += 1;

        let current_wp = match map.waypoint(current_id) {
            Some(wp) => wp,
            None => continue,
        };
        let current_g = *g_scores.get(&current_id).unwrap_or(&f32::MAX);

        for &neighbor_id in &current_wp.neighbors {
            if closed.contains_key(&neighbor_id) {
                continue;
            }
            let neighbor = match map.waypoint(neighbor_id) {
                Some(wp) => wp,
                None => continue,
            };

            let tentative_g = current_g + current_wp.position.distance_2d(&neighbor.position);
            let existing_g = *g_scores.get(&neighbor_id).unwrap_or(&f32::MAX);

            if tentative_g < existing_g {
                g_scores.insert(neighbor_id, tentative_g);
                came_from.insert(neighbor_id, current_id);

                seq += 1;
                open_set.push(SearchNode {
                    waypoint_id: neighbor_id,
                    f_score: tentative_g + neighbor.position.distance_2d(&goal_pos),
                    seq,
                });
            }
        }
    }

    debug!("No route: {} and {} are disconnected", start, goal);
    None
}

/// Reconstruct the waypoint sequence from the parent map.
fn reconstruct(came_from: &HashMap<i32, i32>, cost: f32, start: i32, goal: i32) -> Route {
    let mut waypoints = vec![goal];
    let mut current = goal;

    while current != start {
        match came_from.get(&current) {
            Some(&parent) => {
                waypoints.push(parent);
                current = parent;
            }
            None => break,
        }
    }

    waypoints.reverse();
    Route { waypoints, cost }
}
