//! Built-in three-degree-of-freedom longitudinal model.
//!
//! A point-mass pitch model assembled from an emitted IR, good enough to
//! exercise the trim search without an external engine binding. Speed, angle
//! of attack, and pitch rate are integrated; the read-back residuals are the
//! same vertical and pitch accelerations an external engine would report.

use crate::ir::AircraftIr;
use crate::trim::engine::{EngineState, FlightDynamics};
use crate::utils::{FdmError, Result, MPS_TO_FPS};
use crate::xml::AeroCoefficients;

const G: f64 = 9.80665;
const RHO_SEA_LEVEL: f64 = 1.225;
const DT: f64 = 0.01;
// Settling time per step() call, enough for pitch dynamics to damp out.
const SUBSTEPS: usize = 100;
const DEFAULT_MASS_KG: f64 = 0.2;
const DEFAULT_IYY_KGM2: f64 = 0.01;
const DEFAULT_ELEVATOR_MAX_RAD: f64 = 0.35;

#[derive(Debug, Clone)]
pub struct LongitudinalModel {
    // Airframe
    mass_kg: f64,
    iyy_kgm2: f64,
    wing_area_m2: f64,
    chord_m: f64,
    max_thrust_n: f64,
    elevator_max_rad: f64,
    coeffs: AeroCoefficients,

    // Flight state
    airspeed_mps: f64,
    alpha_rad: f64,
    pitch_rate_radps: f64,
    rho: f64,

    // Commands
    elevator_norm: f64,
    throttle_norm: f64,

    state: EngineState,
}

fn air_density(altitude_m: f64) -> f64 {
    // ISA troposphere density ratio
    RHO_SEA_LEVEL * (1.0 - 2.2557e-5 * altitude_m.max(0.0)).powf(4.2559)
}

impl LongitudinalModel {
    pub fn from_ir(ir: &AircraftIr) -> Result<Self> {
        let wing_area = ir
            .metrics
            .wing_area
            .as_ref()
            .map(|p| p.value)
            .ok_or_else(|| FdmError::Engine("missing wing area in IR".to_string()))?;
        let chord = ir
            .metrics
            .chord_avg
            .as_ref()
            .map(|p| p.value)
            .ok_or_else(|| FdmError::Engine("missing mean chord in IR".to_string()))?;
        if wing_area <= 0.0 || chord <= 0.0 {
            return Err(FdmError::Engine(
                "wing area and chord must be positive".to_string(),
            ));
        }

        let max_thrust = ir
            .propulsion
            .max_thrust
            .as_ref()
            .map(|p| p.value)
            .or_else(|| {
                ir.propulsion
                    .static_thrust_map
                    .iter()
                    .map(|p| p.thrust_n)
                    .fold(None, |acc: Option<f64>, t| {
                        Some(acc.map_or(t, |a| a.max(t)))
                    })
            })
            .unwrap_or(0.0);

        let mut coeffs = AeroCoefficients::resolve(ir);
        // A pitch model without elevator authority cannot trim.
        if coeffs.cm_de.is_none() {
            coeffs.cm_de = Some(-1.0);
        }

        Ok(LongitudinalModel {
            mass_kg: ir
                .mass_balance
                .empty_weight
                .as_ref()
                .map_or(DEFAULT_MASS_KG, |p| p.value),
            iyy_kgm2: ir
                .mass_balance
                .iyy
                .as_ref()
                .map_or(DEFAULT_IYY_KGM2, |p| p.value),
            wing_area_m2: wing_area,
            chord_m: chord,
            max_thrust_n: max_thrust,
            elevator_max_rad: ir
                .controls
                .elevator_max
                .as_ref()
                .map_or(DEFAULT_ELEVATOR_MAX_RAD, |p| p.value),
            coeffs,
            airspeed_mps: 0.0,
            alpha_rad: 0.0,
            pitch_rate_radps: 0.0,
            rho: RHO_SEA_LEVEL,
            elevator_norm: 0.0,
            throttle_norm: 0.0,
            state: EngineState::default(),
        })
    }

    pub fn elevator_max_rad(&self) -> f64 {
        self.elevator_max_rad
    }

    fn integrate(&mut self) {
        let mut state = EngineState::default();
        for _ in 0..SUBSTEPS {
            let u = self.airspeed_mps.max(0.1);
            let qbar = 0.5 * self.rho * u * u;
            let qs = qbar * self.wing_area_m2;

            let cl = self.coeffs.cl0 + self.coeffs.cl_alpha * self.alpha_rad;
            let cd = self.coeffs.cd0 + self.coeffs.k * cl * cl;
            let lift = qs * cl;
            let drag = qs * cd;
            let thrust = self.throttle_norm * self.max_thrust_n;
            let elevator_rad = self.elevator_norm * self.elevator_max_rad;

            // Pitch moment about CG
            let cm = self.coeffs.cm0
                + self.coeffs.cm_alpha * self.alpha_rad
                + self.coeffs.cmq * self.pitch_rate_radps * self.chord_m / (2.0 * u)
                + self.coeffs.cm_de.unwrap_or(0.0) * elevator_rad;
            let qdot = cm * qs * self.chord_m / self.iyy_kgm2;

            // Level flight, body axes: z positive down
            let wdot = (self.mass_kg * G - lift - thrust * self.alpha_rad.sin()) / self.mass_kg;
            let udot = (thrust * self.alpha_rad.cos() - drag) / self.mass_kg;

            self.pitch_rate_radps += qdot * DT;
            self.alpha_rad += self.pitch_rate_radps * DT;
            self.airspeed_mps += udot * DT;

            state = EngineState {
                wdot_fps2: wdot * MPS_TO_FPS,
                qdot_radps2: qdot,
                alpha_rad: self.alpha_rad,
                pitch_rad: self.alpha_rad,
                lift_n: lift,
                drag_n: drag,
                airspeed_mps: self.airspeed_mps,
            };
        }
        self.state = state;
    }
}

impl FlightDynamics for LongitudinalModel {
    fn reset(&mut self, airspeed_mps: f64, altitude_m: f64) -> Result<()> {
        if airspeed_mps <= 0.0 {
            return Err(FdmError::Engine(format!(
                "airspeed must be positive: {airspeed_mps} m/s"
            )));
        }
        if altitude_m < 0.0 {
            return Err(FdmError::Engine(format!(
                "altitude cannot be negative: {altitude_m} m"
            )));
        }
        self.airspeed_mps = airspeed_mps;
        self.alpha_rad = 0.0;
        self.pitch_rate_radps = 0.0;
        self.rho = air_density(altitude_m);
        self.elevator_norm = 0.0;
        self.throttle_norm = 0.0;
        self.state = EngineState {
            airspeed_mps,
            ..EngineState::default()
        };
        Ok(())
    }

    fn set_controls(&mut self, elevator_norm: f64, throttle_norm: f64) -> Result<()> {
        self.elevator_norm = elevator_norm.clamp(-1.0, 1.0);
        self.throttle_norm = throttle_norm.clamp(0.0, 1.0);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.integrate();
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.state
    }
}
