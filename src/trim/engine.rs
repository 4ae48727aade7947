//! Seam to the flight-dynamics engine used for trim smoke tests.

use crate::utils::Result;

/// Snapshot of the quantities the trim search reads back after stepping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineState {
    /// Vertical acceleration, ft/s^2 (body frame, positive down).
    pub wdot_fps2: f64,
    /// Pitch acceleration, rad/s^2.
    pub qdot_radps2: f64,
    pub alpha_rad: f64,
    pub pitch_rad: f64,
    /// Aerodynamic lift, N.
    pub lift_n: f64,
    /// Aerodynamic drag, N.
    pub drag_n: f64,
    pub airspeed_mps: f64,
}

impl EngineState {
    pub fn lift_to_drag(&self) -> f64 {
        if self.drag_n.abs() > 1e-3 {
            self.lift_n.abs() / self.drag_n.abs()
        } else {
            0.0
        }
    }
}

/// Control-input and time-step interface of a flight-dynamics engine.
///
/// The built-in [`super::LongitudinalModel`] implements this for pipeline
/// smoke tests; an external engine binding would implement it the same way.
/// Implementations are cloned per cost evaluation, so a fresh clone must
/// behave like a fresh engine.
pub trait FlightDynamics: Clone {
    /// Reinitialize at the target flight condition with controls at zero.
    fn reset(&mut self, airspeed_mps: f64, altitude_m: f64) -> Result<()>;

    /// Apply normalized control commands. Elevator is clamped to [-1, 1],
    /// throttle to [0, 1].
    fn set_controls(&mut self, elevator_norm: f64, throttle_norm: f64) -> Result<()>;

    /// Advance the simulation far enough for the commanded controls to take
    /// effect on the read-back accelerations.
    fn step(&mut self) -> Result<()>;

    fn state(&self) -> EngineState;
}
