//! Navigation graph store.
//!
//! Immutable-after-load set of POIs, waypoints, and precomputed paths with
//! id-indexed lookup and nearest-waypoint search. Loaded once from map data
//! at startup or reload; the engine treats it as read-only for the lifetime
//! of a navigation session.

mod data;

pub use data::{MapBounds, MapData, Poi, PrecomputedPath, Waypoint};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::Position;
use crate::error::{NavError, Result};

/// Indexed navigation graph built from a [`MapData`] document.
#[derive(Clone, Debug, Default)]
pub struct NavigationMap {
    pois: HashMap<i32, Poi>,
    waypoints: HashMap<i32, Waypoint>,
    paths: HashMap<(i32, i32), PrecomputedPath>,
    bounds: Option<MapBounds>,
}

impl NavigationMap {
    /// Parse and index a JSON map document.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: MapData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Build the indexed store from an already-parsed document.
    ///
    /// Rejects documents with dangling waypoint references so the engine
    /// never has to handle a POI or edge pointing at a missing node.
    /// Zero precomputed paths is fine; the A* fallback covers it.
    pub fn from_data(data: MapData) -> Result<Self> {
        let mut waypoints = HashMap::with_capacity(data.waypoints.len());
        for wp in data.waypoints {
            waypoints.insert(wp.id, wp);
        }

        for wp in waypoints.values() {
            for neighbor in &wp.neighbors {
                if !waypoints.contains_key(neighbor) {
                    return Err(NavError::Malformed(format!(
                        "waypoint {} references unknown neighbor {}",
                        wp.id, neighbor
                    )));
                }
            }
        }

        let mut pois = HashMap::with_capacity(data.pois.len());
        for poi in data.pois {
            if !waypoints.contains_key(&poi.nearest_waypoint_id) {
                return Err(NavError::Malformed(format!(
                    "POI {} ({}) references unknown waypoint {}",
                    poi.id, poi.name, poi.nearest_waypoint_id
                )));
            }
            pois.insert(poi.id, poi);
        }

        let mut paths = HashMap::with_capacity(data.paths.len());
        for path in data.paths {
            if path.waypoint_path.is_empty() {
                warn!(
                    "Skipping empty precomputed path ({} -> POI {})",
                    path.from_waypoint_id, path.to_poi_id
                );
                continue;
            }
            paths.insert((path.from_waypoint_id, path.to_poi_id), path);
        }

        debug!(
            "Map loaded: {} POIs, {} waypoints, {} precomputed paths",
            pois.len(),
            waypoints.len(),
            paths.len()
        );

        Ok(Self {
            pois,
            waypoints,
            paths,
            bounds: data.bounds,
        })
    }

    /// Look up a POI by id.
    #[inline]
    pub fn poi(&self, id: i32) -> Option<&Poi> {
        self.pois.get(&id)
    }

    /// Look up a waypoint by id.
    #[inline]
    pub fn waypoint(&self, id: i32) -> Option<&Waypoint> {
        self.waypoints.get(&id)
    }

    /// Exact precomputed path lookup by (start waypoint, destination POI).
    ///
    /// A miss is not an error; the caller falls back to live A* search.
    #[inline]
    pub fn path(&self, from_waypoint: i32, to_poi: i32) -> Option<&PrecomputedPath> {
        self.paths.get(&(from_waypoint, to_poi))
    }

    /// Find the waypoint closest to a position by planar distance.
    ///
    /// Linear scan; returns `None` only for an empty graph.
    pub fn nearest_waypoint(&self, to: &Position) -> Option<&Waypoint> {
        self.waypoints.values().min_by(|a, b| {
            a.position
                .distance_2d_squared(to)
                .partial_cmp(&b.position.distance_2d_squared(to))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Number of waypoints in the graph.
    #[inline]
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Number of POIs in the map.
    #[inline]
    pub fn poi_count(&self) -> usize {
        self.pois.len()
    }

    /// Iterate over all POIs (destination listing for callers).
    pub fn pois(&self) -> impl Iterator<Item = &Poi> {
        self.pois.values()
    }

    /// Map bounds, if recorded by the mapping pipeline.
    #[inline]
    pub fn bounds(&self) -> Option<&MapBounds> {
        self.bounds.as_ref()
    }
}
