//! Map document schema.
//!
//! Mirrors the JSON produced by the mapping pipeline: POIs, waypoints,
//! precomputed paths, and optional map bounds. Field names are camelCase
//! on the wire.

use serde::{Deserialize, Serialize};

use crate::core::Position;

/// Top-level map document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Points of interest (navigable destinations)
    pub pois: Vec<Poi>,

    /// Waypoint graph nodes
    pub waypoints: Vec<Waypoint>,

    /// Precomputed waypoint-to-POI paths (may be empty)
    #[serde(default)]
    pub paths: Vec<PrecomputedPath>,

    /// Axis-aligned map bounds, if the mapping pipeline recorded them
    #[serde(default)]
    pub bounds: Option<MapBounds>,
}

/// Axis-aligned bounding box of the mapped area.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    /// Minimum corner
    pub min: Position,
    /// Maximum corner
    pub max: Position,
}

/// A navigable destination.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    /// Unique POI id
    pub id: i32,

    /// Human-readable name (spoken by downstream collaborators)
    pub name: String,

    /// Optional longer description
    #[serde(default)]
    pub description: String,

    /// Category tag ("room", "exit", "elevator", ...)
    #[serde(rename = "type", default)]
    pub poi_type: String,

    /// Position in the map frame
    pub position: Position,

    /// Position in the shared world frame, when available
    #[serde(default)]
    pub world_position: Option<Position>,

    /// Id of the waypoint closest to this POI
    pub nearest_waypoint_id: i32,

    /// Planar distance threshold for arrival detection (meters)
    pub arrival_radius: f32,
}

/// A node in the pedestrian navigation graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Unique waypoint id
    pub id: i32,

    /// Position in the map frame
    pub position: Position,

    /// Ids of directly connected waypoints
    #[serde(rename = "connectedWaypoints", default)]
    pub neighbors: Vec<i32>,
}

/// A cached route from a waypoint to a POI.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedPath {
    /// Starting waypoint id
    pub from_waypoint_id: i32,

    /// Destination POI id
    pub to_poi_id: i32,

    /// Ordered waypoint ids from start to the POI's nearest waypoint
    pub waypoint_path: Vec<i32>,

    /// Total route length including the final waypoint-to-POI leg (meters)
    pub total_distance: f32,
}
