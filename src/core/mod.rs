//! Core spatial types for the navigation engine.
//!
//! All types use the fixed map coordinate frame:
//! - **X/Z**: horizontal plane in meters
//! - **Y**: vertical (ignored by all planar operations)
//! - Headings are in degrees, CCW positive from +X, normalized to (-180, 180]

mod angles;
mod orientation;
mod point;

pub use angles::{circular_mean_deg, normalize_deg};
pub use orientation::Orientation;
pub use point::Position;
