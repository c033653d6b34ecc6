//! Externally observable navigation state.
//!
//! The engine is the single writer; readers
//! get either a published copy-on-write snapshot behind an `RwLock` or
//! discrete events over a bounded channel. Neither path lets an observer
//! block the engine.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::instruction::Instruction;

/// Destination summary carried in the state snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    /// POI id
    pub id: i32,
    /// POI display name
    pub name: String,
}

/// Snapshot of the engine's externally observed fields.
///
/// Replaced wholesale after each mutation; observers never see a
/// half-updated session.
#[derive(Clone, Debug, Default)]
pub struct NavigationState {
    /// Whether a navigation session is active
    pub is_navigating: bool,
    /// Active destination, if any
    pub destination: Option<Destination>,
    /// Most recently emitted instruction
    pub current_instruction: Option<Instruction>,
    /// Remaining distance to the destination (meters)
    pub remaining_distance: f32,
    /// Index of the current target waypoint within the active path
    pub current_waypoint_index: usize,
    /// Number of waypoints in the active path
    pub total_waypoints: usize,
    /// Waypoint ids of the active path
    pub active_path: Vec<i32>,
}

/// Shareable read handle onto the published snapshot.
pub type StateHandle = Arc<RwLock<NavigationState>>;

/// Discrete event emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    /// A new instruction was announced (instruction changes only, plus the
    /// forced session events: started, recalculating, arrived)
    Instruction(Instruction),
}
