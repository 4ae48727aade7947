//! Trim smoke test against a freshly converted model.

mod common;

use fdmgen::config::Assumptions;
use fdmgen::pipeline::run_par_pipeline;
use fdmgen::ir::AircraftIr;
use fdmgen::trim::{
    assess_quality, run_trim_multiple_speeds, FlightDynamics, LongitudinalModel, TrimQuality,
    TrimScoring, TrimSearch, TrimTarget,
};

fn converted_ir() -> AircraftIr {
    let tmp = tempfile::tempdir().unwrap();
    let par = common::write_par(tmp.path(), "model.par");
    let artifacts =
        run_par_pipeline(&par, &tmp.path().join("out"), None, &Assumptions::standard()).unwrap();
    AircraftIr::read_json(&artifacts.ir_json).unwrap()
}

#[test]
fn converted_model_trims_in_cruise() {
    let ir = converted_ir();
    let model = LongitudinalModel::from_ir(&ir).unwrap();

    let search = TrimSearch::new(model.clone());
    let result = search
        .run(TrimTarget {
            airspeed_mps: 15.0,
            altitude_m: 30.5,
        })
        .unwrap();

    assert!(
        result.converged,
        "wdot {} qdot {} score {}",
        result.wdot_fps2, result.qdot_radps2, result.score
    );
    assert!(result.throttle_norm >= 0.0 && result.throttle_norm <= 1.0);
    assert!(result.elevator_norm.abs() <= 1.0);

    let (quality, issues) = assess_quality(&result, model.elevator_max_rad());
    assert_ne!(quality, TrimQuality::Poor, "issues: {issues:?}");
}

#[test]
fn sweep_covers_all_requested_speeds() {
    let ir = converted_ir();
    let model = LongitudinalModel::from_ir(&ir).unwrap();

    let results =
        run_trim_multiple_speeds(&model, &[12.0, 15.0, 18.0], 30.5, TrimScoring::default())
            .unwrap();
    assert_eq!(results.len(), 3);
    for result in &results {
        assert!(result.score.is_finite());
    }
}

#[test]
fn trim_result_replays_deterministically() {
    let ir = converted_ir();
    let model = LongitudinalModel::from_ir(&ir).unwrap();
    let search = TrimSearch::new(model.clone());

    let result = search
        .run(TrimTarget {
            airspeed_mps: 15.0,
            altitude_m: 30.5,
        })
        .unwrap();

    // Re-applying the solved controls must reproduce the reported residuals.
    let mut engine = model;
    engine.reset(15.0, 30.5).unwrap();
    engine
        .set_controls(result.elevator_norm, result.throttle_norm)
        .unwrap();
    engine.step().unwrap();
    let state = engine.state();
    assert!((state.wdot_fps2 - result.wdot_fps2).abs() < 1e-9);
    assert!((state.qdot_radps2 - result.qdot_radps2).abs() < 1e-9);
}
