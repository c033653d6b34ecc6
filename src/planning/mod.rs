//! Route planning over the waypoint graph.

mod astar;

pub use astar::{find_route, Route};
