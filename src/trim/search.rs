//! Trim search orchestration.
//!
//! The two-unknown (throttle, elevator) residual problem is handed to a
//! Nelder-Mead solver; this module only supplies hand-picked initial guesses,
//! reads back residuals, and classifies the outcome.

use argmin::core::{CostFunction, Error, Executor};
use argmin::solver::neldermead::NelderMead;
use serde::Serialize;

use crate::trim::engine::FlightDynamics;
use crate::utils::{FdmError, Result};

// Convergence thresholds on the residual accelerations.
const WDOT_TOLERANCE_FPS2: f64 = 1.0;
const QDOT_TOLERANCE_RADPS2: f64 = 0.01;

// Realism thresholds for quality classification.
const ELEVATOR_REALISTIC_MAX_DEG: f64 = 25.0;
const THROTTLE_REALISTIC_MIN: f64 = 0.1;
const THROTTLE_REALISTIC_MAX: f64 = 0.9;
const ALPHA_REALISTIC_MAX_DEG: f64 = 15.0;
const LD_REALISTIC_MIN: f64 = 5.0;

const SOLVER_MAX_ITERS: u64 = 200;
const SOLVER_TARGET_COST: f64 = 1e-4;
const SOLVER_SD_TOLERANCE: f64 = 1e-8;

/// Weighted residual score used both as the solver objective and to rank
/// attempts from different initial guesses. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimScoring {
    pub wdot_weight: f64,
    pub qdot_weight: f64,
}

impl Default for TrimScoring {
    fn default() -> Self {
        TrimScoring {
            wdot_weight: 1.0,
            qdot_weight: 10.0,
        }
    }
}

impl TrimScoring {
    pub fn score(&self, wdot_fps2: f64, qdot_radps2: f64) -> f64 {
        self.wdot_weight * wdot_fps2.abs() + self.qdot_weight * qdot_radps2.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimTarget {
    pub airspeed_mps: f64,
    pub altitude_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimResult {
    pub airspeed_mps: f64,
    pub elevator_norm: f64,
    pub throttle_norm: f64,
    pub wdot_fps2: f64,
    pub qdot_radps2: f64,
    pub score: f64,
    pub converged: bool,
    pub alpha_rad: f64,
    pub pitch_rad: f64,
    pub lift_to_drag: f64,
    /// Which initial guess produced this result.
    pub guess: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrimQuality {
    Good,
    Acceptable,
    Poor,
}

impl std::fmt::Display for TrimQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrimQuality::Good => write!(f, "GOOD"),
            TrimQuality::Acceptable => write!(f, "ACCEPTABLE"),
            TrimQuality::Poor => write!(f, "POOR"),
        }
    }
}

/// Classify a trim result against fixed realism thresholds. Elevator travel
/// is taken as a fraction of a typical 20 degree throw.
pub fn assess_quality(result: &TrimResult, elevator_max_rad: f64) -> (TrimQuality, Vec<String>) {
    if !result.converged {
        return (
            TrimQuality::Poor,
            vec!["trim search did not converge".to_string()],
        );
    }

    let mut issues = Vec::new();
    let elevator_deg = (result.elevator_norm * elevator_max_rad).to_degrees();
    if elevator_deg.abs() > ELEVATOR_REALISTIC_MAX_DEG {
        issues.push(format!(
            "elevator {elevator_deg:.2} deg out of realistic range [-25, +25]"
        ));
    }
    if result.throttle_norm < THROTTLE_REALISTIC_MIN {
        issues.push(format!(
            "throttle {:.3} too low (< {THROTTLE_REALISTIC_MIN})",
            result.throttle_norm
        ));
    } else if result.throttle_norm > THROTTLE_REALISTIC_MAX {
        issues.push(format!(
            "throttle {:.3} saturated (> {THROTTLE_REALISTIC_MAX})",
            result.throttle_norm
        ));
    }
    let alpha_deg = result.alpha_rad.to_degrees();
    if alpha_deg < 0.0 {
        issues.push(format!("alpha {alpha_deg:.2} deg negative (unusual)"));
    } else if alpha_deg > ALPHA_REALISTIC_MAX_DEG {
        issues.push(format!(
            "alpha {alpha_deg:.2} deg too high (> {ALPHA_REALISTIC_MAX_DEG}, near stall)"
        ));
    }
    if result.lift_to_drag < LD_REALISTIC_MIN {
        issues.push(format!(
            "L/D {:.2} too low (< {LD_REALISTIC_MIN}, poor efficiency)",
            result.lift_to_drag
        ));
    }

    let quality = match issues.len() {
        0 => TrimQuality::Good,
        1 | 2 => TrimQuality::Acceptable,
        _ => TrimQuality::Poor,
    };
    (quality, issues)
}

/// Run the engine at one control setting and read back the residual state.
fn evaluate<E: FlightDynamics>(
    engine: &E,
    target: TrimTarget,
    throttle_norm: f64,
    elevator_norm: f64,
) -> Result<crate::trim::engine::EngineState> {
    let mut engine = engine.clone();
    engine.reset(target.airspeed_mps, target.altitude_m)?;
    engine.set_controls(elevator_norm.clamp(-1.0, 1.0), throttle_norm.clamp(0.0, 1.0))?;
    engine.step()?;
    Ok(engine.state())
}

#[derive(Clone)]
struct TrimCost<E: FlightDynamics> {
    engine: E,
    target: TrimTarget,
    scoring: TrimScoring,
}

impl<E: FlightDynamics> CostFunction for TrimCost<E> {
    type Param = Vec<f64>;
    type Output = f64;

    // Parameter order: [throttle_norm, elevator_norm]
    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let state = evaluate(&self.engine, self.target, param[0], param[1])
            .map_err(|e| Error::msg(e.to_string()))?;
        Ok(self.scoring.score(state.wdot_fps2, state.qdot_radps2))
    }
}

pub struct TrimSearch<E: FlightDynamics> {
    engine: E,
    scoring: TrimScoring,
}

const INITIAL_GUESSES: [(f64, &str); 4] = [
    (0.1, "very low thrust (10%)"),
    (0.2, "low thrust (20%)"),
    (0.3, "medium-low thrust (30%)"),
    (0.5, "medium thrust (50%)"),
];

impl<E: FlightDynamics> TrimSearch<E> {
    pub fn new(engine: E) -> Self {
        TrimSearch {
            engine,
            scoring: TrimScoring::default(),
        }
    }

    pub fn with_scoring(mut self, scoring: TrimScoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Try each initial guess in turn; accept the first converged solution,
    /// otherwise report the best-scoring attempt as unconverged.
    pub fn run(&self, target: TrimTarget) -> Result<TrimResult> {
        let mut best: Option<TrimResult> = None;

        for (throttle_guess, description) in INITIAL_GUESSES {
            log::debug!(
                "trim attempt at {} m/s from {description}",
                target.airspeed_mps
            );
            let solution = match self.solve_from(target, throttle_guess) {
                Ok(solution) => solution,
                Err(e) => {
                    log::warn!("trim attempt from {description} failed: {e}");
                    continue;
                }
            };

            let state = match evaluate(&self.engine, target, solution[0], solution[1]) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!("trim readback from {description} failed: {e}");
                    continue;
                }
            };
            let score = self.scoring.score(state.wdot_fps2, state.qdot_radps2);
            let converged = state.wdot_fps2.abs() < WDOT_TOLERANCE_FPS2
                && state.qdot_radps2.abs() < QDOT_TOLERANCE_RADPS2;

            let result = TrimResult {
                airspeed_mps: target.airspeed_mps,
                elevator_norm: solution[1].clamp(-1.0, 1.0),
                throttle_norm: solution[0].clamp(0.0, 1.0),
                wdot_fps2: state.wdot_fps2,
                qdot_radps2: state.qdot_radps2,
                score,
                converged,
                alpha_rad: state.alpha_rad,
                pitch_rad: state.pitch_rad,
                lift_to_drag: state.lift_to_drag(),
                guess: description.to_string(),
            };

            let better = best.as_ref().map_or(true, |b| result.score < b.score);
            if better {
                best = Some(result);
            }
            if best.as_ref().is_some_and(|b| b.converged) {
                break;
            }
        }

        best.ok_or_else(|| FdmError::Engine("all trim initial guesses failed".to_string()))
    }

    fn solve_from(&self, target: TrimTarget, throttle_guess: f64) -> Result<Vec<f64>> {
        let cost = TrimCost {
            engine: self.engine.clone(),
            target,
            scoring: self.scoring,
        };

        // Initial simplex around the guess, one vertex per unknown.
        let init = vec![throttle_guess, 0.0];
        let simplex = vec![
            init.clone(),
            vec![throttle_guess + 0.1, 0.0],
            vec![throttle_guess, 0.1],
        ];

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(SOLVER_SD_TOLERANCE)
            .map_err(solver_err)?;

        let result = Executor::new(cost, solver)
            .configure(|state| {
                state
                    .max_iters(SOLVER_MAX_ITERS)
                    .target_cost(SOLVER_TARGET_COST)
            })
            .run()
            .map_err(solver_err)?;

        result
            .state
            .best_param
            .clone()
            .ok_or_else(|| FdmError::Engine("solver returned no parameter".to_string()))
    }
}

fn solver_err(e: Error) -> FdmError {
    FdmError::Engine(e.to_string())
}

/// Trim across a speed envelope; one result per requested airspeed.
pub fn run_trim_multiple_speeds<E: FlightDynamics>(
    engine: &E,
    speeds_mps: &[f64],
    altitude_m: f64,
    scoring: TrimScoring,
) -> Result<Vec<TrimResult>> {
    let search = TrimSearch::new(engine.clone()).with_scoring(scoring);
    let mut results = Vec::with_capacity(speeds_mps.len());
    for &airspeed_mps in speeds_mps {
        let target = TrimTarget {
            airspeed_mps,
            altitude_m,
        };
        results.push(search.run(target)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::trim::engine::EngineState;

    // Analytic stand-in with a known trim point: wdot = a*(throttle - t0),
    // qdot = b*(elevator - e0).
    #[derive(Clone)]
    struct QuadraticPlant {
        t0: f64,
        e0: f64,
        state: EngineState,
    }

    impl QuadraticPlant {
        fn new(t0: f64, e0: f64) -> Self {
            QuadraticPlant {
                t0,
                e0,
                state: EngineState::default(),
            }
        }
    }

    impl FlightDynamics for QuadraticPlant {
        fn reset(&mut self, airspeed_mps: f64, _altitude_m: f64) -> crate::utils::Result<()> {
            self.state = EngineState {
                airspeed_mps,
                lift_n: 2.0,
                drag_n: 0.25,
                alpha_rad: 0.05,
                pitch_rad: 0.05,
                ..EngineState::default()
            };
            Ok(())
        }

        fn set_controls(
            &mut self,
            elevator_norm: f64,
            throttle_norm: f64,
        ) -> crate::utils::Result<()> {
            self.state.wdot_fps2 = 20.0 * (throttle_norm - self.t0);
            self.state.qdot_radps2 = 0.5 * (elevator_norm - self.e0);
            Ok(())
        }

        fn step(&mut self) -> crate::utils::Result<()> {
            Ok(())
        }

        fn state(&self) -> EngineState {
            self.state
        }
    }

    // Wraps the quadratic plant and fails one step. The search's own readback
    // clones its engine once, while the solver's cost evaluations run on a
    // second-generation clone, so arming the fault at clone depth 1 breaks
    // only the readback of the first guess.
    struct FlakyReadbackPlant {
        inner: QuadraticPlant,
        depth: u32,
        fault_armed: Arc<AtomicBool>,
    }

    impl Clone for FlakyReadbackPlant {
        fn clone(&self) -> Self {
            FlakyReadbackPlant {
                inner: self.inner.clone(),
                depth: self.depth + 1,
                fault_armed: Arc::clone(&self.fault_armed),
            }
        }
    }

    impl FlightDynamics for FlakyReadbackPlant {
        fn reset(&mut self, airspeed_mps: f64, altitude_m: f64) -> crate::utils::Result<()> {
            self.inner.reset(airspeed_mps, altitude_m)
        }

        fn set_controls(
            &mut self,
            elevator_norm: f64,
            throttle_norm: f64,
        ) -> crate::utils::Result<()> {
            self.inner.set_controls(elevator_norm, throttle_norm)
        }

        fn step(&mut self) -> crate::utils::Result<()> {
            if self.depth == 1 && self.fault_armed.swap(false, Ordering::SeqCst) {
                return Err(FdmError::Engine("state readback unavailable".to_string()));
            }
            self.inner.step()
        }

        fn state(&self) -> EngineState {
            self.inner.state()
        }
    }

    fn target() -> TrimTarget {
        TrimTarget {
            airspeed_mps: 15.0,
            altitude_m: 30.5,
        }
    }

    #[test]
    fn finds_known_trim_point() {
        let search = TrimSearch::new(QuadraticPlant::new(0.35, -0.12));
        let result = search.run(target()).unwrap();
        assert!(result.converged, "score {}", result.score);
        assert!((result.throttle_norm - 0.35).abs() < 0.05);
        assert!((result.elevator_norm - -0.12).abs() < 0.05);
    }

    #[test]
    fn first_converged_guess_wins() {
        // Trim point right next to the first guess.
        let search = TrimSearch::new(QuadraticPlant::new(0.12, 0.0));
        let result = search.run(target()).unwrap();
        assert!(result.converged);
        assert_eq!(result.guess, "very low thrust (10%)");
    }

    #[test]
    fn readback_failure_moves_on_to_the_next_guess() {
        let plant = FlakyReadbackPlant {
            inner: QuadraticPlant::new(0.35, -0.12),
            depth: 0,
            fault_armed: Arc::new(AtomicBool::new(true)),
        };
        let result = TrimSearch::new(plant).run(target()).unwrap();
        assert!(result.converged);
        // The first guess lost its readback; the second one carried through.
        assert_eq!(result.guess, "low thrust (20%)");
    }

    #[test]
    fn scoring_weights_are_configurable() {
        let scoring = TrimScoring {
            wdot_weight: 2.0,
            qdot_weight: 100.0,
        };
        assert_eq!(scoring.score(1.0, 0.01), 3.0);
        assert_eq!(TrimScoring::default().score(0.5, 0.02), 0.7);
    }

    #[test]
    fn quality_good_when_all_realistic() {
        let result = TrimResult {
            airspeed_mps: 15.0,
            elevator_norm: 0.1,
            throttle_norm: 0.3,
            wdot_fps2: 0.1,
            qdot_radps2: 0.001,
            score: 0.11,
            converged: true,
            alpha_rad: 0.05,
            pitch_rad: 0.05,
            lift_to_drag: 8.0,
            guess: "low thrust (20%)".to_string(),
        };
        let (quality, issues) = assess_quality(&result, 0.35);
        assert_eq!(quality, TrimQuality::Good);
        assert!(issues.is_empty());
    }

    #[test]
    fn quality_degrades_with_issues() {
        let mut result = TrimResult {
            airspeed_mps: 15.0,
            elevator_norm: 0.1,
            throttle_norm: 0.95, // saturated
            wdot_fps2: 0.1,
            qdot_radps2: 0.001,
            score: 0.11,
            converged: true,
            alpha_rad: -0.01, // negative alpha
            pitch_rad: 0.0,
            lift_to_drag: 8.0,
            guess: String::new(),
        };
        let (quality, issues) = assess_quality(&result, 0.35);
        assert_eq!(quality, TrimQuality::Acceptable);
        assert_eq!(issues.len(), 2);

        result.lift_to_drag = 2.0; // third issue
        let (quality, _) = assess_quality(&result, 0.35);
        assert_eq!(quality, TrimQuality::Poor);
    }

    #[test]
    fn unconverged_is_poor() {
        let result = TrimResult {
            airspeed_mps: 15.0,
            elevator_norm: 0.0,
            throttle_norm: 0.3,
            wdot_fps2: 5.0,
            qdot_radps2: 0.5,
            score: 10.0,
            converged: false,
            alpha_rad: 0.0,
            pitch_rad: 0.0,
            lift_to_drag: 8.0,
            guess: String::new(),
        };
        let (quality, issues) = assess_quality(&result, 0.35);
        assert_eq!(quality, TrimQuality::Poor);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn multi_speed_sweep_returns_one_result_per_speed() {
        let plant = QuadraticPlant::new(0.3, 0.05);
        let results =
            run_trim_multiple_speeds(&plant, &[10.0, 15.0, 20.0], 30.5, TrimScoring::default())
                .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].airspeed_mps, 15.0);
    }
}
