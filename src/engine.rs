//! Navigation engine state machine.
//!
//! Owns the active navigation session and turns the stream of noisy,
//! intermittent pose fixes into path progress, arrival/off-path decisions,
//! and a stable turn instruction. States: `Idle -> Navigating -> (Arrived
//! -> Idle)`, with `Navigating` able to re-enter itself via re-routing.
//!
//! Single-writer discipline: `start_navigation`, `stop_navigation`, and
//! `update_position` form a mutual-exclusion group (`&mut self`); observers
//! read the published snapshot or the event channel instead. No operation
//! here blocks or performs I/O. The deferred post-arrival teardown and the
//! first-instruction settle delay are wall-clock deadlines stored inside
//! the session, so superseding them with a new `start_navigation` or a
//! `stop_navigation` cancels them for free.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::NavConfig;
use crate::core::{normalize_deg, Orientation, Position};
use crate::heading::HeadingEstimator;
use crate::instruction::{Instruction, InstructionFilter};
use crate::map::{NavigationMap, Poi};
use crate::planning::find_route;
use crate::predictor::DeadReckoner;
use crate::state::{Destination, NavigationEvent, NavigationState, StateHandle};

/// Epsilon for the near-zero target distance guard (meters).
const MIN_TARGET_DISTANCE: f32 = 1e-3;

/// One externally supplied position + orientation sample.
#[derive(Clone, Copy, Debug)]
pub struct Fix {
    /// Position in the map frame
    pub position: Position,
    /// Device orientation
    pub orientation: Orientation,
    /// Time the fix was consumed
    pub timestamp: Instant,
}

/// Phase of an active session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionPhase {
    /// Actively guiding toward the destination
    Navigating,
    /// Arrival announced; teardown deferred so it can be perceived
    Arrived,
}

/// Mutable per-navigation state, owned exclusively by the engine.
#[derive(Clone, Debug)]
struct NavigationSession {
    /// Destination POI
    destination: Poi,
    /// Active waypoint path (replaced wholesale on re-route)
    path: Vec<i32>,
    /// Index of the current target waypoint; `0 <= index <= path.len()`
    current_index: usize,
    /// Remaining distance to the destination (meters)
    remaining_distance: f32,
    /// Instruction hysteresis state
    filter: InstructionFilter,
    /// Instructions are suppressed until this deadline (visual orientation settle)
    settle_until: Instant,
    /// Deferred teardown deadline, set on arrival
    arrival_deadline: Option<Instant>,
    /// Current phase
    phase: SessionPhase,
}

/// The navigation engine.
///
/// Constructed by the composition root with an injected map; no global
/// state. All mutation goes through `update_position`, `start_navigation`,
/// and `stop_navigation`.
pub struct NavigationEngine {
    map: Arc<NavigationMap>,
    config: NavConfig,
    heading: HeadingEstimator,
    reckoner: DeadReckoner,
    last_fix: Option<Fix>,
    session: Option<NavigationSession>,
    shared: StateHandle,
    events: Option<Sender<NavigationEvent>>,
}

impl NavigationEngine {
    /// Create an engine over a loaded navigation map.
    pub fn new(map: Arc<NavigationMap>, config: NavConfig) -> Self {
        let heading = HeadingEstimator::new(&config);
        let reckoner = DeadReckoner::new(&config);
        Self {
            map,
            config,
            heading,
            reckoner,
            last_fix: None,
            session: None,
            shared: Arc::new(RwLock::new(NavigationState::default())),
            events: None,
        }
    }

    /// Create a bounded event channel and return its receiving side.
    ///
    /// Replaces any previously installed sender. Sends never block; when
    /// the queue is full the event is dropped with a warning.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<NavigationEvent> {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        self.events = Some(tx);
        rx
    }

    /// Shareable read handle onto the published state snapshot.
    pub fn state_handle(&self) -> StateHandle {
        Arc::clone(&self.shared)
    }

    /// Copy of the current state snapshot.
    pub fn state(&self) -> NavigationState {
        self.shared.read().clone()
    }

    /// Whether a session is actively navigating.
    pub fn is_navigating(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.phase == SessionPhase::Navigating)
    }

    /// The most recent fix, if any.
    pub fn last_fix(&self) -> Option<&Fix> {
        self.last_fix.as_ref()
    }

    /// Start navigating toward a POI.
    ///
    /// Requires a prior position fix. Unknown destination, empty graph, or
    /// no resolvable route all log and no-op; nothing here is fatal.
    pub fn start_navigation(&mut self, poi_id: i32) {
        self.start_navigation_at(poi_id, Instant::now());
    }

    /// Timestamped variant of [`start_navigation`](Self::start_navigation),
    /// used by tests and replay tooling.
    pub fn start_navigation_at(&mut self, poi_id: i32, now: Instant) {
        let fix = match self.last_fix {
            Some(f) => f,
            None => {
                warn!("start_navigation: no position fix available");
                return;
            }
        };

        let poi = match self.map.poi(poi_id) {
            Some(p) => p.clone(),
            None => {
                warn!("start_navigation: unknown POI {}", poi_id);
                return;
            }
        };

        let nearest = match self.map.nearest_waypoint(&fix.position) {
            Some(wp) => wp.id,
            None => {
                warn!("start_navigation: waypoint graph is empty");
                return;
            }
        };

        let (path, total) = match resolve_route(&self.map, nearest, &poi) {
            Some(r) => r,
            None => {
                warn!(
                    "start_navigation: no route from waypoint {} to POI {} ({})",
                    nearest, poi.id, poi.name
                );
                return;
            }
        };

        // Fresh smoothing state, re-seeded with the current fix so the
        // next update produces a delta
        self.heading.reset();
        self.reckoner.reset();
        self.heading.observe(fix.position, fix.timestamp);
        self.reckoner.observe(fix.position, fix.timestamp);

        let mut filter = InstructionFilter::new();
        filter.force(Instruction::NavigationStarted);

        info!(
            "Navigation started: {} waypoints to {} ({:.1}m)",
            path.len(),
            poi.name,
            total
        );

        // Replacing the session also cancels any pending arrival teardown
        self.session = Some(NavigationSession {
            destination: poi,
            path,
            current_index: 0,
            remaining_distance: total,
            filter,
            settle_until: now + Duration::from_secs_f32(self.config.settle_delay_secs),
            arrival_deadline: None,
            phase: SessionPhase::Navigating,
        });

        self.publish();
        self.emit(Instruction::NavigationStarted);
    }

    /// Clear the session and return to idle. Idempotent; also invalidates
    /// any pending deadlines since they live inside the session.
    pub fn stop_navigation(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Navigation stopped ({})", session.destination.name);
        }
        *self.shared.write() = NavigationState::default();
    }

    /// Consume one pose fix from the external localization source.
    pub fn update_position(&mut self, position: Position, orientation: Orientation) {
        self.update_position_at(position, orientation, Instant::now());
    }

    /// Timestamped variant of [`update_position`](Self::update_position),
    /// used by tests and replay tooling.
    pub fn update_position_at(
        &mut self,
        position: Position,
        orientation: Orientation,
        now: Instant,
    ) {
        // Bookkeeping runs regardless of navigation state
        self.heading.observe(position, now);
        self.reckoner.observe(position, now);
        if self.heading.is_stale(now) {
            // No qualifying movement for a while: assume stationary
            self.reckoner.mark_stationary();
        }
        self.last_fix = Some(Fix {
            position,
            orientation,
            timestamp: now,
        });

        // Deferred post-arrival teardown
        if let Some(session) = &self.session {
            if session.phase == SessionPhase::Arrived {
                if session.arrival_deadline.is_some_and(|d| now >= d) {
                    debug!("Post-arrival teardown");
                    self.stop_navigation();
                }
                return;
            }
        }

        let map = Arc::clone(&self.map);
        let config = self.config.clone();
        let mut announce = None;

        {
            let session = match self.session.as_mut() {
                Some(s) => s,
                None => return,
            };

            let predicted = self.reckoner.predict(position);

            if predicted.distance_2d(&session.destination.position)
                <= session.destination.arrival_radius
            {
                info!("Arrived at {}", session.destination.name);
                session.filter.force(Instruction::DestinationReached);
                session.phase = SessionPhase::Arrived;
                session.arrival_deadline =
                    Some(now + Duration::from_secs_f32(config.arrival_teardown_secs));
                session.remaining_distance =
                    predicted.distance_2d(&session.destination.position);
                announce = Some(Instruction::DestinationReached);
            } else {
                advance_waypoints(&map, &config, session, predicted);
                session.remaining_distance = remaining_distance(&map, session, predicted);

                if is_off_path(&map, &config, session, predicted) {
                    let replacement = map
                        .nearest_waypoint(&predicted)
                        .map(|wp| wp.id)
                        .and_then(|wp| resolve_route(&map, wp, &session.destination));

                    match replacement {
                        Some((path, _total)) => {
                            warn!(
                                "Off path, rerouting to {} via {} waypoints",
                                session.destination.name,
                                path.len()
                            );
                            session.path = path;
                            session.current_index = 0;
                            session.remaining_distance =
                                remaining_distance(&map, session, predicted);
                            session.filter.force(Instruction::Recalculating);
                            announce = Some(Instruction::Recalculating);
                        }
                        None => {
                            // Degrade gracefully: keep the stale path
                            warn!("Off path but no replacement route found");
                        }
                    }
                }

                if announce.is_none() && now >= session.settle_until {
                    if let Some(target) = instruction_target(&map, &config, session, predicted) {
                        if predicted.distance_2d(&target) > MIN_TARGET_DISTANCE {
                            let bearing = predicted.bearing_to_deg(&target);
                            let heading = self.heading.heading_deg(now, &orientation);
                            let angle = normalize_deg(bearing - heading);

                            let (instruction, changed) = session
                                .filter
                                .evaluate(angle, config.hysteresis_threshold_deg);
                            if changed {
                                debug!(
                                    "Instruction: {:?} (angle {:.1} deg)",
                                    instruction, angle
                                );
                                announce = Some(instruction);
                            }
                        }
                    }
                }
            }
        }

        self.publish();
        if let Some(instruction) = announce {
            self.emit(instruction);
        }
    }

    /// Publish a copy-on-write snapshot of the externally observed fields.
    fn publish(&self) {
        let snapshot = match &self.session {
            Some(s) => NavigationState {
                is_navigating: s.phase == SessionPhase::Navigating,
                destination: Some(Destination {
                    id: s.destination.id,
                    name: s.destination.name.clone(),
                }),
                current_instruction: s.filter.last_emitted(),
                remaining_distance: s.remaining_distance,
                current_waypoint_index: s.current_index,
                total_waypoints: s.path.len(),
                active_path: s.path.clone(),
            },
            None => NavigationState::default(),
        };
        *self.shared.write() = snapshot;
    }

    /// Non-blocking event emission; a full queue drops the event.
    fn emit(&self, instruction: Instruction) {
        if let Some(tx) = &self.events {
            match tx.try_send(NavigationEvent::Instruction(instruction)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("Event queue full, dropping {:?}", instruction);
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!("Event receiver dropped");
                }
            }
        }
    }
}

/// Resolve a waypoint path to a POI: precomputed cache first, then live A*.
///
/// A synthesized route's total distance is the sum of edge lengths plus
/// the final waypoint-to-POI leg; it is session-local and never written
/// back into the store.
fn resolve_route(map: &NavigationMap, start_waypoint: i32, poi: &Poi) -> Option<(Vec<i32>, f32)> {
    if let Some(pre) = map.path(start_waypoint, poi.id) {
        debug!(
            "Using precomputed path {} -> POI {} ({} waypoints)",
            start_waypoint,
            poi.id,
            pre.waypoint_path.len()
        );
        return Some((pre.waypoint_path.clone(), pre.total_distance));
    }

    let route = find_route(map, start_waypoint, poi.nearest_waypoint_id)?;
    let last_id = *route.waypoints.last()?;
    let last_pos = map.waypoint(last_id)?.position;
    let total = route.cost + last_pos.distance_2d(&poi.position);
    Some((route.waypoints, total))
}

/// Advance the target waypoint index for the current predicted position.
///
/// The immediate target counts as passed when within reach distance; after
/// that, the perpendicular-plane test repeats in a loop so several
/// waypoints can be passed in one update when fixes are far apart. The
/// perpendicular-distance bound keeps a corner cut from skipping waypoints
/// on a different leg of the path.
fn advance_waypoints(
    map: &NavigationMap,
    config: &NavConfig,
    session: &mut NavigationSession,
    predicted: Position,
) {
    let path = &session.path;
    let mut index = session.current_index;

    if index < path.len() {
        if let Some(wp) = map.waypoint(path[index]) {
            if predicted.distance_2d(&wp.position) <= config.waypoint_reach_distance {
                index += 1;
            }
        }
    }

    while index + 1 < path.len() {
        let (wp, next) = match (map.waypoint(path[index]), map.waypoint(path[index + 1])) {
            (Some(a), Some(b)) => (a.position, b.position),
            _ => break,
        };

        let seg_x = next.x - wp.x;
        let seg_z = next.z - wp.z;
        let seg_len = (seg_x * seg_x + seg_z * seg_z).sqrt();
        if seg_len < MIN_TARGET_DISTANCE {
            // Degenerate segment, skip it
            index += 1;
            continue;
        }
        let dir_x = seg_x / seg_len;
        let dir_z = seg_z / seg_len;

        let rel_x = predicted.x - wp.x;
        let rel_z = predicted.z - wp.z;
        let along = rel_x * dir_x + rel_z * dir_z;
        let perpendicular = (rel_x * dir_z - rel_z * dir_x).abs();

        if along > 0.0 && perpendicular <= config.corner_cut_tolerance {
            index += 1;
        } else {
            break;
        }
    }

    if index != session.current_index {
        debug!(
            "Waypoint index advanced {} -> {} of {}",
            session.current_index,
            index,
            session.path.len()
        );
        session.current_index = index;
    }
}

/// Remaining distance: predicted position through the rest of the path,
/// plus the final waypoint-to-POI leg.
fn remaining_distance(
    map: &NavigationMap,
    session: &NavigationSession,
    predicted: Position,
) -> f32 {
    let index = session.current_index;
    if index >= session.path.len() {
        return predicted.distance_2d(&session.destination.position);
    }

    let mut total = 0.0;
    let mut prev = predicted;
    for id in &session.path[index..] {
        if let Some(wp) = map.waypoint(*id) {
            total += prev.distance_2d(&wp.position);
            prev = wp.position;
        }
    }
    total + prev.distance_2d(&session.destination.position)
}

/// Off-path when the predicted position has drifted too far from the
/// current target waypoint. Past the last waypoint the arrival radius
/// governs instead.
fn is_off_path(
    map: &NavigationMap,
    config: &NavConfig,
    session: &NavigationSession,
    predicted: Position,
) -> bool {
    if session.current_index >= session.path.len() {
        return false;
    }
    map.waypoint(session.path[session.current_index])
        .is_some_and(|wp| predicted.distance_2d(&wp.position) > config.max_off_path_distance)
}

/// Position the instruction should point at: the current waypoint, the
/// next one when the current is already within reach, or the POI itself
/// at path end.
fn instruction_target(
    map: &NavigationMap,
    config: &NavConfig,
    session: &NavigationSession,
    predicted: Position,
) -> Option<Position> {
    let path = &session.path;
    let index = session.current_index;

    if index >= path.len() {
        return Some(session.destination.position);
    }

    let wp = map.waypoint(path[index])?;
    if predicted.distance_2d(&wp.position) <= config.waypoint_reach_distance {
        let next = path.get(index + 1).and_then(|id| map.waypoint(*id));
        Some(
            next.map(|w| w.position)
                .unwrap_or(session.destination.position),
        )
    } else {
        Some(wp.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapData, Waypoint};

    fn corridor_map(arrival_radius: f32) -> Arc<NavigationMap> {
        let data = MapData {
            pois: vec![Poi {
                id: 1,
                name: "Reception".to_string(),
                description: String::new(),
                poi_type: "room".to_string(),
                position: Position::new(12.0, 0.0, 0.0),
                world_position: None,
                nearest_waypoint_id: 3,
                arrival_radius,
            }],
            waypoints: vec![
                Waypoint {
                    id: 1,
                    position: Position::new(0.0, 0.0, 0.0),
                    neighbors: vec![2],
                },
                Waypoint {
                    id: 2,
                    position: Position::new(5.0, 0.0, 0.0),
                    neighbors: vec![1, 3],
                },
                Waypoint {
                    id: 3,
                    position: Position::new(10.0, 0.0, 0.0),
                    neighbors: vec![2],
                },
            ],
            paths: vec![],
            bounds: None,
        };
        Arc::new(NavigationMap::from_data(data).unwrap())
    }

    fn engine(arrival_radius: f32) -> NavigationEngine {
        NavigationEngine::new(corridor_map(arrival_radius), NavConfig::default())
    }

    #[test]
    fn test_start_without_fix_is_silent_noop() {
        let mut engine = engine(1.0);
        engine.start_navigation(1);

        assert!(!engine.is_navigating());
        assert!(!engine.state().is_navigating);
    }

    #[test]
    fn test_start_with_unknown_poi_is_silent_noop() {
        let mut engine = engine(1.0);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(99, t0);

        assert!(!engine.is_navigating());
    }

    #[test]
    fn test_start_resolves_route_via_astar_fallback() {
        let mut engine = engine(1.0);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);

        assert!(engine.is_navigating());
        let state = engine.state();
        assert_eq!(state.active_path, vec![1, 2, 3]);
        assert_eq!(state.current_waypoint_index, 0);
        assert_eq!(state.current_instruction, Some(Instruction::NavigationStarted));
        // 10m of edges + 2m final leg
        assert!((state.remaining_distance - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut engine = engine(1.0);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);
        engine.stop_navigation();
        engine.stop_navigation();

        assert!(!engine.is_navigating());
        assert!(engine.state().active_path.is_empty());
    }

    #[test]
    fn test_settle_delay_suppresses_first_instruction() {
        let mut engine = engine(1.0);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);

        // Within the settle window: still announcing "started"
        engine.update_position_at(
            Position::new(0.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_millis(500),
        );
        assert_eq!(
            engine.state().current_instruction,
            Some(Instruction::NavigationStarted)
        );

        // Past the settle window: a directional instruction appears
        engine.update_position_at(
            Position::new(1.0, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(2),
        );
        assert_eq!(
            engine.state().current_instruction,
            Some(Instruction::MoveForward)
        );
    }

    #[test]
    fn test_arrival_inside_radius() {
        let mut engine = engine(1.5);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);

        // 1.4m from the POI (slow approach keeps the prediction offset tiny)
        engine.update_position_at(
            Position::new(10.6, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1000),
        );

        assert!(!engine.is_navigating());
        let state = engine.state();
        assert_eq!(
            state.current_instruction,
            Some(Instruction::DestinationReached)
        );
        assert!(!state.is_navigating);
    }

    #[test]
    fn test_no_arrival_outside_radius() {
        let mut engine = engine(1.5);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);

        // 1.6m from the POI
        engine.update_position_at(
            Position::new(10.4, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1000),
        );

        assert!(engine.is_navigating());
        assert_ne!(
            engine.state().current_instruction,
            Some(Instruction::DestinationReached)
        );
    }

    #[test]
    fn test_arrival_teardown_after_delay() {
        let mut engine = engine(1.5);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);
        engine.update_position_at(
            Position::new(11.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1000),
        );
        assert!(!engine.is_navigating());
        assert!(engine.state().destination.is_some());

        // Before the teardown deadline the session is still observable
        engine.update_position_at(
            Position::new(11.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1001),
        );
        assert!(engine.state().destination.is_some());

        // Past the deadline it is torn down
        engine.update_position_at(
            Position::new(11.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1005),
        );
        assert!(engine.state().destination.is_none());
    }

    #[test]
    fn test_new_start_supersedes_pending_teardown() {
        let mut engine = engine(1.5);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);
        engine.update_position_at(
            Position::new(11.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1000),
        );
        assert!(!engine.is_navigating());

        // Restart before the old teardown deadline
        engine.start_navigation_at(1, t0 + Duration::from_secs(1001));
        assert!(engine.is_navigating());

        // The old deadline passing must not kill the new session
        engine.update_position_at(
            Position::new(11.5, 0.0, 0.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1004),
        );
        assert!(engine.state().destination.is_some());
    }

    #[test]
    fn test_off_path_triggers_reroute() {
        let mut engine = engine(1.0);
        let t0 = Instant::now();

        engine.update_position_at(Position::ZERO, Orientation::IDENTITY, t0);
        engine.start_navigation_at(1, t0);

        // Drift 6m sideways near W2: target W1 is now >5m away, and the
        // nearest waypoint to the user is W2
        engine.update_position_at(
            Position::new(5.0, 0.0, 6.0),
            Orientation::IDENTITY,
            t0 + Duration::from_secs(1000),
        );

        let state = engine.state();
        assert_eq!(
            state.current_instruction,
            Some(Instruction::Recalculating)
        );
        assert_eq!(state.active_path.first(), Some(&2));
        assert_eq!(state.current_waypoint_index, 0);
        assert!(engine.is_navigating());
    }
}
