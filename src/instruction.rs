//! Turn instruction classification with hysteresis.
//!
//! The signed turn angle is `normalize_deg(bearing_to_target - heading)`;
//! positive angles are CCW (toward +Z) and read as "left". Hysteresis
//! suppresses flicker when the true angle sits near a classification
//! boundary under sensor noise: a newly classified instruction replaces the
//! previous one only after the absolute angle has moved far enough from the
//! angle recorded at the last change.

/// Upper bound of the "forward" band (degrees, absolute angle).
const FORWARD_BAND_DEG: f32 = 20.0;
/// Upper bound of the "slight turn" band.
const SLIGHT_BAND_DEG: f32 = 60.0;
/// Upper bound of the "turn" band; beyond it is "turn around".
const TURN_BAND_DEG: f32 = 150.0;

/// A discrete turn-by-turn instruction.
///
/// Each variant carries a stable description and icon key for downstream
/// speech and rendering collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Continue straight ahead
    MoveForward,
    /// Turn left (60-150 degrees)
    TurnLeft,
    /// Turn right (60-150 degrees)
    TurnRight,
    /// Bear slightly left (20-60 degrees)
    SlightLeft,
    /// Bear slightly right (20-60 degrees)
    SlightRight,
    /// Turn around (at least 150 degrees either side)
    TurnAround,
    /// Navigation session has started
    NavigationStarted,
    /// Path was lost, a new route is being computed
    Recalculating,
    /// Destination reached
    DestinationReached,
}

impl Instruction {
    /// Human-readable description for speech output.
    pub fn description(&self) -> &'static str {
        match self {
            Instruction::MoveForward => "Continue straight",
            Instruction::TurnLeft => "Turn left",
            Instruction::TurnRight => "Turn right",
            Instruction::SlightLeft => "Bear slightly left",
            Instruction::SlightRight => "Bear slightly right",
            Instruction::TurnAround => "Turn around",
            Instruction::NavigationStarted => "Navigation started",
            Instruction::Recalculating => "Recalculating route",
            Instruction::DestinationReached => "You have arrived",
        }
    }

    /// Stable icon key for rendering collaborators.
    pub fn icon_key(&self) -> &'static str {
        match self {
            Instruction::MoveForward => "arrow.up",
            Instruction::TurnLeft => "arrow.turn.up.left",
            Instruction::TurnRight => "arrow.turn.up.right",
            Instruction::SlightLeft => "arrow.up.left",
            Instruction::SlightRight => "arrow.up.right",
            Instruction::TurnAround => "arrow.uturn.down",
            Instruction::NavigationStarted => "location.fill",
            Instruction::Recalculating => "arrow.triangle.2.circlepath",
            Instruction::DestinationReached => "flag.checkered",
        }
    }
}

/// Classify a signed turn angle in (-180, 180] degrees.
pub fn classify(angle_deg: f32) -> Instruction {
    let magnitude = angle_deg.abs();
    let left = angle_deg > 0.0;

    if magnitude < FORWARD_BAND_DEG {
        Instruction::MoveForward
    } else if magnitude < SLIGHT_BAND_DEG {
        if left {
            Instruction::SlightLeft
        } else {
            Instruction::SlightRight
        }
    } else if magnitude < TURN_BAND_DEG {
        if left {
            Instruction::TurnLeft
        } else {
            Instruction::TurnRight
        }
    } else {
        Instruction::TurnAround
    }
}

/// Hysteresis filter over classified instructions.
#[derive(Clone, Debug, Default)]
pub struct InstructionFilter {
    /// Last emitted instruction
    last_emitted: Option<Instruction>,
    /// Absolute angle recorded at the last instruction change
    last_angle: Option<f32>,
}

impl InstructionFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a new turn angle.
    ///
    /// Returns the instruction to present and whether it changed from the
    /// previously emitted one. A differing classification is accepted only
    /// when the absolute angle has moved at least `threshold_deg` from the
    /// angle recorded at the last change; otherwise the previous
    /// instruction is retained.
    pub fn evaluate(&mut self, angle_deg: f32, threshold_deg: f32) -> (Instruction, bool) {
        let candidate = classify(angle_deg);

        let previous = match self.last_emitted {
            Some(prev) => prev,
            None => {
                self.last_emitted = Some(candidate);
                self.last_angle = Some(angle_deg.abs());
                return (candidate, true);
            }
        };

        if candidate == previous {
            return (previous, false);
        }

        let moved_enough = match self.last_angle {
            Some(reference) => (angle_deg.abs() - reference).abs() >= threshold_deg,
            None => true,
        };

        if moved_enough {
            self.last_emitted = Some(candidate);
            self.last_angle = Some(angle_deg.abs());
            (candidate, true)
        } else {
            (previous, false)
        }
    }

    /// Force an instruction through, bypassing hysteresis.
    ///
    /// Used for session events (started, recalculating, arrived). Clears
    /// the reference angle so the next directional instruction is always
    /// accepted.
    pub fn force(&mut self, instruction: Instruction) {
        self.last_emitted = Some(instruction);
        self.last_angle = None;
    }

    /// The most recently emitted instruction, if any.
    #[inline]
    pub fn last_emitted(&self) -> Option<Instruction> {
        self.last_emitted
    }

    /// Drop all hysteresis state (called on session start).
    pub fn reset(&mut self) {
        self.last_emitted = None;
        self.last_angle = None;
    }
}
