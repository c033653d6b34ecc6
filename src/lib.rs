//! # DishaNav
//!
//! Indoor turn-by-turn pedestrian navigation engine over a hand-authored
//! waypoint graph.
//!
//! ## Overview
//!
//! DishaNav turns a stream of noisy, intermittent pose fixes from an
//! external localization source into spoken-style guidance:
//!
//! - **Map store** - POIs, waypoints, and precomputed paths indexed for lookup
//! - **Route planning** - Precomputed path cache with a live A* fallback
//! - **Heading estimation** - Circular-mean smoothing of movement bearings,
//!   with a device-orientation fallback when the user stops moving
//! - **Dead reckoning** - Short-horizon latency compensation from estimated
//!   planar velocity
//! - **Instruction pipeline** - Banded turn classification behind a
//!   hysteresis filter so guidance never flickers at band boundaries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use disha_nav::{NavConfig, NavigationEngine, NavigationMap, Orientation, Position};
//! use std::sync::Arc;
//!
//! let map = Arc::new(NavigationMap::from_json(&map_json)?);
//! let mut engine = NavigationEngine::new(map, NavConfig::default());
//! let events = engine.subscribe(16);
//!
//! engine.update_position(Position::new(1.0, 0.0, 2.0), Orientation::IDENTITY);
//! engine.start_navigation(poi_id);
//!
//! for event in events.try_iter() {
//!     println!("{:?}", event);
//! }
//! ```
//!
//! ## Coordinate System
//!
//! - X/Z: Horizontal plane (all planar math ignores Y)
//! - Y: Vertical
//! - Headings in degrees, CCW positive from +X, normalized to (-180, 180];
//!   positive turn angles read as "left"

#![warn(missing_docs)]

// Geometry primitives
pub mod core;

// Map document and indexed store
pub mod map;

// Route planning
pub mod planning;

// Engine configuration
pub mod config;

// Error types
pub mod error;

// Heading estimation
pub mod heading;

// Dead reckoning
pub mod predictor;

// Instruction classification and hysteresis
pub mod instruction;

// Published state and events
pub mod state;

// The navigation engine
pub mod engine;

pub use config::NavConfig;
pub use crate::core::{circular_mean_deg, normalize_deg, Orientation, Position};
pub use engine::{Fix, NavigationEngine};
pub use error::{NavError, Result};
pub use heading::HeadingEstimator;
pub use instruction::{classify, Instruction, InstructionFilter};
pub use map::{MapBounds, MapData, NavigationMap, Poi, PrecomputedPath, Waypoint};
pub use planning::{find_route, Route};
pub use predictor::DeadReckoner;
pub use state::{Destination, NavigationEvent, NavigationState, StateHandle};
