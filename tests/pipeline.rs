//! End-to-end conversion tests: input file in, XML document out.

mod common;

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use fdmgen::config::Assumptions;
use fdmgen::ir::AircraftIr;
use fdmgen::pipeline::{run_par_pipeline, run_sheet_pipeline};
use fdmgen::utils::FdmError;

#[test]
fn par_pipeline_writes_all_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let par = common::write_par(tmp.path(), "model.par");
    let outdir = tmp.path().join("out");

    let artifacts =
        run_par_pipeline(&par, &outdir, None, &Assumptions::standard()).unwrap();

    assert_eq!(artifacts.xml, outdir.join("aircraft/model/model.xml"));
    assert!(artifacts.xml.exists());
    assert!(artifacts.ir_json.exists());
    for report in &artifacts.reports {
        assert!(report.exists(), "missing {}", report.display());
    }

    // The dumped IR must load back.
    let ir = AircraftIr::read_json(&artifacts.ir_json).unwrap();
    assert_eq!(ir.fileheader.name, "model");
    ir.validate().unwrap();
}

#[test]
fn par_pipeline_emits_required_sections() {
    let tmp = tempfile::tempdir().unwrap();
    let par = common::write_par(tmp.path(), "model.par");
    let outdir = tmp.path().join("out");

    let artifacts =
        run_par_pipeline(&par, &outdir, None, &Assumptions::standard()).unwrap();
    let xml = fs::read_to_string(&artifacts.xml).unwrap();

    for section in [
        "<fdm_config",
        "<fileheader>",
        "<metrics>",
        "<mass_balance>",
        "<propulsion>",
        "<flight_control",
        "<aerodynamics>",
        "<external_reactions>",
        "<output",
    ] {
        assert!(xml.contains(section), "missing {section}");
    }
    // Lateral axes are present because the derivation filled the coefficients.
    assert!(xml.contains("\"SIDE\""));
    assert!(xml.contains("\"ROLL\""));
    assert!(xml.contains("\"YAW\""));
    assert!(!xml.to_lowercase().contains("nan"));
    assert!(!xml.to_lowercase().contains("inf"));
}

#[test]
fn par_pipeline_respects_name_override() {
    let tmp = tempfile::tempdir().unwrap();
    let par = common::write_par(tmp.path(), "model.par");
    let outdir = tmp.path().join("out");

    let artifacts =
        run_par_pipeline(&par, &outdir, Some("Renamed"), &Assumptions::standard()).unwrap();
    assert_eq!(artifacts.xml, outdir.join("aircraft/Renamed/Renamed.xml"));
    let xml = fs::read_to_string(&artifacts.xml).unwrap();
    assert!(xml.contains("name=\"Renamed\""));
}

#[test]
fn missing_input_maps_to_exit_code_one() {
    let tmp = tempfile::tempdir().unwrap();
    let err = run_par_pipeline(
        Path::new("/no/such/model.par"),
        tmp.path(),
        None,
        &Assumptions::standard(),
    )
    .unwrap_err();
    assert!(matches!(err, FdmError::MissingFile(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn incomplete_par_maps_to_exit_code_two() {
    let tmp = tempfile::tempdir().unwrap();
    let par = tmp.path().join("thin.par");
    fs::write(&par, "0.9   16:span(m)  wingspan\n").unwrap();

    let err = run_par_pipeline(&par, tmp.path(), None, &Assumptions::standard()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unwritable_outdir_maps_to_exit_code_three() {
    let tmp = tempfile::tempdir().unwrap();
    let par = common::write_par(tmp.path(), "model.par");
    let blocker = tmp.path().join("out");
    fs::write(&blocker, "not a directory").unwrap();

    let err = run_par_pipeline(&par, &blocker, None, &Assumptions::standard()).unwrap_err();
    assert!(matches!(err, FdmError::Io(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn sheet_pipeline_converts_workbook() {
    let tmp = tempfile::tempdir().unwrap();
    let sheets = tmp.path().join("sheets");
    fs::create_dir_all(&sheets).unwrap();
    common::write_workbook(&sheets);
    let outdir = tmp.path().join("out");

    let artifacts = run_sheet_pipeline(&sheets, &outdir).unwrap();
    assert_eq!(artifacts.xml, outdir.join("aircraft/TestModel/TestModel.xml"));

    let xml = fs::read_to_string(&artifacts.xml).unwrap();
    assert!(xml.contains("name=\"TestModel\""));
    assert!(xml.contains("<output"));
    assert!(xml.contains("velocities/vt-fps"));
    // Unit conversion happened on the way in: 905 mm span emitted in FT.
    assert!(xml.contains("2.9692"));
    assert!(!xml.to_lowercase().contains("nan"));
}

#[test]
fn sheet_pipeline_rejects_blank_required_value() {
    let tmp = tempfile::tempdir().unwrap();
    let sheets = tmp.path().join("sheets");
    fs::create_dir_all(&sheets).unwrap();
    common::write_workbook(&sheets);
    fs::write(
        sheets.join("T_03_mass_balance.csv"),
        "VarName,Value,Unit,Required,Note\nmass/empty_weight,,g,YES,\n",
    )
    .unwrap();
    let outdir = tmp.path().join("out");

    let err = run_sheet_pipeline(&sheets, &outdir).unwrap_err();
    assert!(matches!(err, FdmError::MissingParameters(_)));
    assert_eq!(err.exit_code(), 2);
    // The blank weight must not silently fall back to a class default.
    assert!(!outdir.join("aircraft/TestModel/TestModel.xml").exists());
}

#[test]
fn sheet_pipeline_rejects_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let err = run_sheet_pipeline(&tmp.path().join("nowhere"), tmp.path()).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}
