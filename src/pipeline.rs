//! Conversion orchestration: parse, derive, dump, report, emit.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{self, Assumptions};
use crate::derivation::{derive, DerivedSet};
use crate::ir::AircraftIr;
use crate::parameters::Parameter;
use crate::parser::par::{parse_par_file, parse_report, ParAircraft};
use crate::parser::parse_workbook;
use crate::report;
use crate::utils::Result;
use crate::xml::write_fdm_config;

/// Paths of everything one conversion run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineArtifacts {
    pub output_dir: PathBuf,
    pub ir_json: PathBuf,
    pub xml: PathBuf,
    pub reports: Vec<PathBuf>,
}

/// Assemble the intermediate representation from parsed legacy data plus its
/// derived parameters. Values stay in SI; the emitter owns unit conversion.
pub fn build_ir(par: &ParAircraft, derived: &DerivedSet) -> AircraftIr {
    let mut ir = AircraftIr::default();

    ir.fileheader.name = par.aircraft_name.clone();
    ir.fileheader.description = format!("Converted from {}", par.source_file);
    ir.fileheader.source_file = Some(par.source_file.clone());

    ir.metrics.wing_area = Some(Parameter::canonical(derived.geometry.wing_area_m2, "M2"));
    ir.metrics.wing_span = par
        .geometry
        .wingspan_m
        .map(|v| Parameter::canonical(v, "M"));
    ir.metrics.chord_avg = par.geometry.chord_m.map(|v| Parameter::canonical(v, "M"));

    ir.mass_balance.empty_weight = par.mass.mass_kg.map(|v| Parameter::canonical(v, "KG"));
    ir.mass_balance.ixx = par.mass.ixx_kgm2.map(|v| Parameter::canonical(v, "KG*M2"));
    ir.mass_balance.iyy = par.mass.iyy_kgm2.map(|v| Parameter::canonical(v, "KG*M2"));
    ir.mass_balance.izz = par.mass.izz_kgm2.map(|v| Parameter::canonical(v, "KG*M2"));
    // CG sits at 40% of the tail arm behind the nose datum.
    ir.mass_balance.cg.x = par
        .geometry
        .tail_arm_m
        .map(|arm| Parameter::canonical(0.4 * arm, "M"));

    ir.propulsion.max_thrust = par
        .propulsion
        .max_thrust_n
        .map(|v| Parameter::canonical(v, "N"));

    let aero = &mut ir.aerodynamics;
    aero.cl_alpha = par
        .aerodynamics
        .clalpha_rad
        .map(|v| Parameter::canonical(v, "1/RAD"));
    aero.cd0 = par.aerodynamics.cf.map(|v| Parameter::canonical(v, ""));
    aero.cl_max = par.aerodynamics.cl_max.map(|v| Parameter::canonical(v, ""));
    let s = &derived.stability;
    aero.k = Some(Parameter::canonical(s.induced_drag_k.value, ""));
    aero.cm_alpha = Some(Parameter::canonical(s.cmalpha.value, "1/RAD"));
    aero.cmq = Some(Parameter::canonical(s.cmq.value, ""));
    aero.cm_de = Some(Parameter::canonical(s.cm_de.value, "1/RAD"));
    aero.cybeta = Some(Parameter::canonical(s.cybeta.value, "1/RAD"));
    aero.cnbeta = Some(Parameter::canonical(s.cnbeta.value, "1/RAD"));
    aero.clbeta = Some(Parameter::canonical(s.clbeta.value, "1/RAD"));
    aero.clp = Some(Parameter::canonical(s.clp.value, ""));
    aero.cnr = Some(Parameter::canonical(s.cnr.value, ""));

    ir.controls.elevator_max = par
        .control
        .elevator_max_rad
        .map(|v| Parameter::canonical(v, "RAD"));
    ir.controls.aileron_max = derived
        .effective_control("aileron_max_rad", par.control.aileron_max_rad)
        .map(|v| Parameter::canonical(v, "RAD"));
    ir.controls.rudder_max = derived
        .effective_control("rudder_max_rad", par.control.rudder_max_rad)
        .map(|v| Parameter::canonical(v, "RAD"));

    // Audit trail for the JSON dump.
    ir.derived
        .insert("Cmalpha".to_string(), s.cmalpha.clone());
    ir.derived.insert("Cmq".to_string(), s.cmq.clone());
    ir.derived.insert("Cm_de".to_string(), s.cm_de.clone());
    ir.derived.insert("Cybeta".to_string(), s.cybeta.clone());
    ir.derived.insert("Cnbeta".to_string(), s.cnbeta.clone());
    ir.derived.insert("Clbeta".to_string(), s.clbeta.clone());
    ir.derived.insert("Clp".to_string(), s.clp.clone());
    ir.derived.insert("Cnr".to_string(), s.cnr.clone());
    ir.derived
        .insert("K_induced".to_string(), s.induced_drag_k.clone());

    ir
}

/// JSBSim directory convention: `<outdir>/aircraft/<name>/<name>.xml`.
fn model_xml_path(outdir: &Path, name: &str) -> PathBuf {
    outdir.join("aircraft").join(name).join(format!("{name}.xml"))
}

fn write_xml(ir: &AircraftIr, outdir: &Path) -> Result<PathBuf> {
    let xml_path = model_xml_path(outdir, &ir.fileheader.name);
    if let Some(parent) = xml_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let document = write_fdm_config(ir)?;
    fs::write(&xml_path, document)?;
    Ok(xml_path)
}

fn log_flightgear_hint() {
    match config::flightgear_executable() {
        Some(path) => log::info!("FlightGear available at {}", path.display()),
        None => log::debug!("no FlightGear executable found, skipping visualization hint"),
    }
}

/// Run the legacy `.par` pipeline end to end.
pub fn run_par_pipeline(
    par_file: &Path,
    outdir: &Path,
    output_name: Option<&str>,
    assumptions: &Assumptions,
) -> Result<PipelineArtifacts> {
    log::info!("stage 1: parsing {}", par_file.display());
    let mut par = parse_par_file(par_file)?;
    if let Some(name) = output_name {
        par.aircraft_name = name.to_string();
    }

    let stage_dir = outdir.join(&par.aircraft_name);
    fs::create_dir_all(&stage_dir)?;
    fs::write(stage_dir.join("parse_report.txt"), parse_report(&par))?;

    log::info!("stage 2: calculating derivatives");
    let derived = derive(&par, assumptions)?;
    fs::write(
        stage_dir.join("derived_parameters.json"),
        serde_json::to_string_pretty(&derived)?,
    )?;
    fs::write(
        stage_dir.join("calculation_report.txt"),
        report::calculation_report(&par, &derived),
    )?;

    log::info!("stage 3: assembling intermediate representation");
    let ir = build_ir(&par, &derived);
    ir.validate()?;
    let ir_json = stage_dir.join("model_ir.json");
    ir.write_json(&ir_json)?;

    log::info!("stage 4: generating flight model XML");
    let xml = write_xml(&ir, outdir)?;
    fs::write(
        stage_dir.join("generation_report.txt"),
        report::generation_report(&par, &derived, &xml),
    )?;
    fs::write(
        stage_dir.join("CONVERSION_SUMMARY.txt"),
        report::conversion_summary(&par, &derived, &xml),
    )?;
    log::info!("conversion complete: {}", xml.display());
    log_flightgear_hint();

    Ok(PipelineArtifacts {
        reports: vec![
            stage_dir.join("parse_report.txt"),
            stage_dir.join("calculation_report.txt"),
            stage_dir.join("generation_report.txt"),
            stage_dir.join("CONVERSION_SUMMARY.txt"),
        ],
        output_dir: stage_dir,
        ir_json,
        xml,
    })
}

/// Run the sheet-workbook pipeline end to end.
pub fn run_sheet_pipeline(sheet_dir: &Path, outdir: &Path) -> Result<PipelineArtifacts> {
    log::info!("stage 1: reading workbook {}", sheet_dir.display());
    let ir = parse_workbook(sheet_dir)?;

    let stage_dir = outdir.join(&ir.fileheader.name);
    fs::create_dir_all(&stage_dir)?;

    log::info!("stage 2: dumping intermediate representation");
    let ir_json = stage_dir.join("model_ir.json");
    ir.write_json(&ir_json)?;

    log::info!("stage 3: generating flight model XML");
    let xml = write_xml(&ir, outdir)?;
    log::info!("conversion complete: {}", xml.display());
    log_flightgear_hint();

    Ok(PipelineArtifacts {
        reports: Vec::new(),
        output_dir: stage_dir,
        ir_json,
        xml,
    })
}
