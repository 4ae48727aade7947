//! JSBSim `fdm_config` document construction.
//!
//! A pure, order-preserving pass over the IR. Required schema sections are
//! always emitted; absent primaries fall back to class-typical defaults for a
//! small fixed-wing aircraft so the target engine never sees an incomplete
//! document.

use std::io::Cursor;

use chrono::Local;
use quick_xml::Writer;

use crate::ir::{AircraftIr, Contact, Point};
use crate::parameters::Parameter;
use crate::utils::{FdmError, Result, M_TO_FT, M_TO_IN, KG_TO_LBS, KGM2_TO_SLUGFT2, M2_TO_FT2, N_TO_LBF};
use crate::xml::{
    finish, num, write_decl, write_empty_tag, write_tag, write_tag_end, write_tag_start,
    write_tag_start_with_attrs, write_tag_with_attrs, ToXml, XmlWriter,
};

/// Class-typical aerodynamic defaults for a small fixed-wing aircraft.
#[derive(Debug, Clone, Copy)]
pub struct AeroDefaults {
    pub cl0: f64,
    pub cl_alpha: f64,
    pub cd0: f64,
    pub k: f64,
    pub cm0: f64,
    pub cm_alpha: f64,
    pub cmq: f64,
}

pub const AERO_DEFAULTS: AeroDefaults = AeroDefaults {
    cl0: 0.25,
    cl_alpha: 5.0,
    cd0: 0.028,
    k: 0.0796,
    cm0: 0.0,
    cm_alpha: -0.50,
    cmq: -12.0,
};

// Aerodynamic reference point, inches from the nose. Typical for a 200 g
// class airframe (about 300 mm).
const AERORP_X_IN: f64 = 12.12;
// Propeller sits ahead of the AERORP by this fraction of its x position.
const PROPELLER_TO_AERORP_RATIO: f64 = 0.0649;
const TANK_CAPACITY_LBS: f64 = 0.1;
const CONTROL_MAX_RAD_DEFAULT: f64 = 0.35;
const DEFAULT_EMPTY_WEIGHT_KG: f64 = 0.2;
const DEFAULT_INERTIA_KGM2: f64 = 0.01;
const DEFAULT_OUTPUT_RATE_HZ: f64 = 10.0;
// Fixed control-power coefficients, per the reference configuration.
const CL_DA: f64 = 0.15;
const CN_DR: f64 = -0.10;

/// Coefficient set after default resolution, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct AeroCoefficients {
    pub cl0: f64,
    pub cl_alpha: f64,
    pub cl_max: Option<f64>,
    pub cd0: f64,
    pub k: f64,
    pub cm0: f64,
    pub cm_alpha: f64,
    pub cmq: f64,
    pub cm_de: Option<f64>,
    pub cybeta: Option<f64>,
    pub cnbeta: Option<f64>,
    pub clbeta: Option<f64>,
    pub clp: Option<f64>,
    pub cnr: Option<f64>,
}

fn value_of(p: &Option<Parameter>) -> Option<f64> {
    p.as_ref().map(|p| p.value).filter(|v| v.is_finite())
}

impl AeroCoefficients {
    pub fn resolve(ir: &AircraftIr) -> Self {
        let a = &ir.aerodynamics;
        AeroCoefficients {
            cl0: value_of(&a.cl0).unwrap_or(AERO_DEFAULTS.cl0),
            cl_alpha: value_of(&a.cl_alpha).unwrap_or(AERO_DEFAULTS.cl_alpha),
            cl_max: value_of(&a.cl_max),
            cd0: value_of(&a.cd0).unwrap_or(AERO_DEFAULTS.cd0),
            k: value_of(&a.k).unwrap_or(AERO_DEFAULTS.k),
            cm0: value_of(&a.cm0).unwrap_or(AERO_DEFAULTS.cm0),
            cm_alpha: value_of(&a.cm_alpha).unwrap_or(AERO_DEFAULTS.cm_alpha),
            cmq: value_of(&a.cmq).unwrap_or(AERO_DEFAULTS.cmq),
            cm_de: value_of(&a.cm_de),
            cybeta: value_of(&a.cybeta),
            cnbeta: value_of(&a.cnbeta),
            clbeta: value_of(&a.clbeta),
            clp: value_of(&a.clp),
            cnr: value_of(&a.cnr),
        }
    }

    /// Plausibility screen. Positive Cmalpha means the configuration is
    /// longitudinally unstable and the engine will never trim, so it is a
    /// hard error; the range checks only warn.
    pub fn validate(&self) -> Result<()> {
        if !(3.0..=7.0).contains(&self.cl_alpha) {
            log::warn!("CLalpha={} outside plausible range 3.0-7.0", self.cl_alpha);
        }
        if !(0.02..=0.10).contains(&self.cd0) {
            log::warn!("CD0={} outside plausible range 0.02-0.10", self.cd0);
        }
        if self.cm_alpha >= 0.0 {
            return Err(FdmError::InvalidValue(format!(
                "Cmalpha={} must be negative (longitudinal stability)",
                self.cm_alpha
            )));
        }
        Ok(())
    }
}

/// Render the complete fdm_config document for one aircraft.
pub fn write_fdm_config(ir: &AircraftIr) -> Result<String> {
    let coeffs = AeroCoefficients::resolve(ir);
    coeffs.validate()?;

    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_decl(&mut w)?;

    write_tag_start_with_attrs(
        &mut w,
        "fdm_config",
        &[
            ("name", ir.fileheader.name.as_str()),
            ("version", ir.fileheader.version.as_str()),
            ("release", "BETA"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            (
                "xsi:noNamespaceSchemaLocation",
                "http://jsbsim.sourceforge.net/JSBSim.xsd",
            ),
        ],
    )?;

    write_fileheader(&mut w, ir)?;
    write_metrics(&mut w, ir)?;
    write_mass_balance(&mut w, ir)?;
    write_ground_reactions(&mut w, ir)?;
    write_propulsion(&mut w, ir)?;
    write_flight_control(&mut w, ir)?;
    write_aerodynamics(&mut w, &coeffs)?;
    write_external_reactions(&mut w, ir)?;
    write_output(&mut w, ir)?;

    write_tag_end(&mut w, "fdm_config")?;
    finish(w)
}

fn write_fileheader(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    write_tag_start(w, "fileheader")?;
    let description = if ir.fileheader.description.is_empty() {
        format!("{} flight dynamics model", ir.fileheader.name)
    } else {
        ir.fileheader.description.clone()
    };
    write_tag(w, "description", &description)?;
    write_tag(w, "author", "fdmgen")?;
    write_tag(
        w,
        "filecreationdate",
        &Local::now().format("%Y-%m-%d").to_string(),
    )?;
    write_tag(w, "version", &ir.fileheader.version)?;
    if let Some(source) = &ir.fileheader.source_file {
        write_tag_with_attrs(
            w,
            "reference",
            source,
            &[("refID", "source"), ("title", "Source Definition")],
        )?;
    }
    write_tag_end(w, "fileheader")
}

fn param_or(p: &Option<Parameter>, default: f64) -> f64 {
    value_of(p).unwrap_or(default)
}

fn write_location(w: &mut XmlWriter, name: &str, x_in: f64, y_in: f64, z_in: f64) -> Result<()> {
    write_tag_start_with_attrs(w, "location", &[("name", name), ("unit", "IN")])?;
    write_tag(w, "x", &num(x_in, 2))?;
    write_tag(w, "y", &num(y_in, 2))?;
    write_tag(w, "z", &num(z_in, 2))?;
    write_tag_end(w, "location")
}

fn point_in(point: &Point, default_x: f64) -> (f64, f64, f64) {
    (
        value_of(&point.x).map_or(default_x, |v| v * M_TO_IN),
        value_of(&point.y).map_or(0.0, |v| v * M_TO_IN),
        value_of(&point.z).map_or(0.0, |v| v * M_TO_IN),
    )
}

fn write_metrics(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    let m = &ir.metrics;
    write_tag_start(w, "metrics")?;
    write_tag_with_attrs(
        w,
        "wingarea",
        &num(param_or(&m.wing_area, 0.1) * M2_TO_FT2, 4),
        &[("unit", "FT2")],
    )?;
    write_tag_with_attrs(
        w,
        "wingspan",
        &num(param_or(&m.wing_span, 0.9) * M_TO_FT, 4),
        &[("unit", "FT")],
    )?;
    write_tag_with_attrs(
        w,
        "chord",
        &num(param_or(&m.chord_avg, 0.11) * M_TO_FT, 4),
        &[("unit", "FT")],
    )?;
    write_location(w, "AERORP", AERORP_X_IN, 0.0, 0.0)?;
    write_tag_end(w, "metrics")
}

fn write_mass_balance(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    let mb = &ir.mass_balance;
    write_tag_start(w, "mass_balance")?;
    // emptywt must precede the inertia tags
    write_tag_with_attrs(
        w,
        "emptywt",
        &num(param_or(&mb.empty_weight, DEFAULT_EMPTY_WEIGHT_KG) * KG_TO_LBS, 4),
        &[("unit", "LBS")],
    )?;
    for (tag, value) in [
        ("ixx", param_or(&mb.ixx, DEFAULT_INERTIA_KGM2)),
        ("iyy", param_or(&mb.iyy, DEFAULT_INERTIA_KGM2)),
        ("izz", param_or(&mb.izz, DEFAULT_INERTIA_KGM2)),
    ] {
        write_tag_with_attrs(
            w,
            tag,
            &num(value * KGM2_TO_SLUGFT2, 6),
            &[("unit", "SLUG*FT2")],
        )?;
    }
    for tag in ["ixy", "ixz", "iyz"] {
        write_tag_with_attrs(w, tag, "0.0", &[("unit", "SLUG*FT2")])?;
    }
    let (x, y, z) = point_in(&mb.cg, AERORP_X_IN);
    write_location(w, "CG", x, y, z)?;
    write_tag_end(w, "mass_balance")
}

impl ToXml for Contact {
    fn write_xml(&self, w: &mut XmlWriter) -> Result<()> {
        write_tag_start_with_attrs(
            w,
            "contact",
            &[("type", self.kind.as_str()), ("name", self.name.as_str())],
        )?;
        let (x, y, z) = point_in(&self.location, 0.0);
        write_tag_with_attrs(
            w,
            "location",
            &format!("{} {} {}", num(x, 2), num(y, 2), num(z, 2)),
            &[("unit", "IN")],
        )?;
        if let Some(k) = value_of(&self.spring_coeff) {
            write_tag_with_attrs(w, "spring_coeff", &num(k, 4), &[("unit", "LBS/FT")])?;
        }
        if let Some(c) = value_of(&self.damping_coeff) {
            write_tag_with_attrs(w, "damping_coeff", &num(c, 4), &[("unit", "LBS/FT/SEC")])?;
        }
        if let Some(mu) = value_of(&self.static_friction) {
            write_tag(w, "static_friction", &num(mu, 4))?;
        }
        if let Some(mu) = value_of(&self.dynamic_friction) {
            write_tag(w, "dynamic_friction", &num(mu, 4))?;
        }
        write_tag_end(w, "contact")
    }
}

fn write_ground_reactions(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    if ir.ground_reactions.is_empty() {
        return write_empty_tag(w, "ground_reactions");
    }
    write_tag_start(w, "ground_reactions")?;
    for contact in &ir.ground_reactions {
        contact.write_xml(w)?;
    }
    write_tag_end(w, "ground_reactions")
}

fn write_propulsion(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    write_tag_start(w, "propulsion")?;
    if ir.propulsion.has_engine() {
        let engine_file = ir.propulsion.engine_file.clone().unwrap_or_default();
        write_tag_start_with_attrs(w, "engine", &[("file", engine_file.as_str())])?;
        let (x, y, z) = point_in(&ir.propulsion.thruster_location, 0.0);
        let thruster_file = ir.propulsion.thruster_name.clone().unwrap_or_default();
        write_tag_start_with_attrs(w, "thruster", &[("file", thruster_file.as_str())])?;
        write_location(w, "THRUSTER", x, y, z)?;
        write_tag_end(w, "thruster")?;
        write_tag_end(w, "engine")?;
    }
    // The engine model expects a tank even for electric aircraft.
    let (cg_x, _, _) = point_in(&ir.mass_balance.cg, AERORP_X_IN);
    write_tag_start_with_attrs(w, "tank", &[("type", "FUEL")])?;
    write_location(w, "TANK", cg_x, 0.0, 0.0)?;
    write_tag_with_attrs(w, "capacity", &num(TANK_CAPACITY_LBS, 1), &[("unit", "LBS")])?;
    write_tag_with_attrs(w, "contents", &num(TANK_CAPACITY_LBS, 1), &[("unit", "LBS")])?;
    write_tag_end(w, "tank")?;
    write_tag_end(w, "propulsion")
}

fn control_max(p: &Option<Parameter>) -> f64 {
    value_of(p).unwrap_or(CONTROL_MAX_RAD_DEFAULT)
}

fn write_channel(
    w: &mut XmlWriter,
    channel: &str,
    surface: &str,
    surface_lower: &str,
    trim: &str,
    max_rad: f64,
) -> Result<()> {
    write_tag_start_with_attrs(w, "channel", &[("name", channel)])?;

    let summer_name = format!("{channel}_Trim_Sum");
    write_tag_start_with_attrs(w, "summer", &[("name", summer_name.as_str())])?;
    write_tag(w, "input", &format!("fcs/{surface_lower}-cmd-norm"))?;
    write_tag(w, "input", &format!("fcs/{trim}-trim-cmd-norm"))?;
    write_tag_start(w, "clipto")?;
    write_tag(w, "min", "-1")?;
    write_tag(w, "max", "1")?;
    write_tag_end(w, "clipto")?;
    write_tag(w, "output", &format!("fcs/{trim}-trim-sum"))?;
    write_tag_end(w, "summer")?;

    let control_name = format!("{surface}_Control");
    write_tag_start_with_attrs(w, "aerosurface_scale", &[("name", control_name.as_str())])?;
    write_tag(w, "input", &format!("fcs/{trim}-trim-sum"))?;
    write_tag_start(w, "range")?;
    write_tag(w, "min", &num(-max_rad, 4))?;
    write_tag(w, "max", &num(max_rad, 4))?;
    write_tag_end(w, "range")?;
    write_tag(w, "output", &format!("fcs/{surface_lower}-pos-rad"))?;
    write_tag_end(w, "aerosurface_scale")?;

    let norm_name = format!("{surface}_Normalized");
    write_tag_start_with_attrs(w, "aerosurface_scale", &[("name", norm_name.as_str())])?;
    write_tag(w, "input", &format!("fcs/{surface_lower}-pos-rad"))?;
    write_tag_start(w, "domain")?;
    write_tag(w, "min", &num(-max_rad, 4))?;
    write_tag(w, "max", &num(max_rad, 4))?;
    write_tag_end(w, "domain")?;
    write_tag_start(w, "range")?;
    write_tag(w, "min", "-1")?;
    write_tag(w, "max", "1")?;
    write_tag_end(w, "range")?;
    write_tag(w, "output", &format!("fcs/{surface_lower}-pos-norm"))?;
    write_tag_end(w, "aerosurface_scale")?;

    write_tag_end(w, "channel")
}

fn write_flight_control(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    let fcs_name = format!("FCS: {}", ir.fileheader.name);
    write_tag_start_with_attrs(w, "flight_control", &[("name", fcs_name.as_str())])?;
    write_channel(
        w,
        "Pitch",
        "Elevator",
        "elevator",
        "pitch",
        control_max(&ir.controls.elevator_max),
    )?;
    write_channel(
        w,
        "Roll",
        "Aileron",
        "aileron",
        "roll",
        control_max(&ir.controls.aileron_max),
    )?;
    write_channel(
        w,
        "Yaw",
        "Rudder",
        "rudder",
        "yaw",
        control_max(&ir.controls.rudder_max),
    )?;
    write_tag_end(w, "flight_control")
}

fn write_function_start(w: &mut XmlWriter, name: &str, description: &str) -> Result<()> {
    write_tag_start_with_attrs(w, "function", &[("name", name)])?;
    write_tag(w, "description", description)
}

/// qbar * S [* extra properties] * coefficient-expression
fn write_qs_product<F>(w: &mut XmlWriter, extra_props: &[&str], body: F) -> Result<()>
where
    F: FnOnce(&mut XmlWriter) -> Result<()>,
{
    write_tag_start(w, "product")?;
    write_tag(w, "property", "aero/qbar-psf")?;
    write_tag(w, "property", "metrics/Sw-sqft")?;
    for prop in extra_props {
        write_tag(w, "property", prop)?;
    }
    body(w)?;
    write_tag_end(w, "product")
}

fn write_aerodynamics(w: &mut XmlWriter, c: &AeroCoefficients) -> Result<()> {
    write_tag_start(w, "aerodynamics")?;

    write_tag_start_with_attrs(w, "axis", &[("name", "LIFT")])?;
    write_function_start(
        w,
        "aero/force/Lift_alpha",
        "Lift due to angle of attack (CL = CL0 + CLalpha * alpha)",
    )?;
    write_qs_product(w, &[], |w| {
        write_tag_start(w, "sum")?;
        write_tag(w, "value", &num(c.cl0, 4))?;
        write_tag_start(w, "product")?;
        write_tag(w, "value", &num(c.cl_alpha, 4))?;
        write_tag(w, "property", "aero/alpha-rad")?;
        write_tag_end(w, "product")?;
        write_tag_end(w, "sum")
    })?;
    write_tag_end(w, "function")?;
    write_tag_end(w, "axis")?;

    write_tag_start_with_attrs(w, "axis", &[("name", "DRAG")])?;
    write_function_start(
        w,
        "aero/force/Drag_basic",
        "Total drag (CD = CD0 + K*CL^2)",
    )?;
    write_qs_product(w, &[], |w| {
        write_tag_start(w, "sum")?;
        write_tag(w, "value", &num(c.cd0, 4))?;
        write_tag_start(w, "product")?;
        write_tag(w, "value", &num(c.k, 4))?;
        write_tag(w, "property", "aero/cl-squared")?;
        write_tag_end(w, "product")?;
        write_tag_end(w, "sum")
    })?;
    write_tag_end(w, "function")?;
    write_tag_end(w, "axis")?;

    if let Some(cybeta) = c.cybeta {
        write_tag_start_with_attrs(w, "axis", &[("name", "SIDE")])?;
        write_function_start(
            w,
            "aero/force/Side_beta",
            "Side force due to sideslip (Cybeta)",
        )?;
        write_qs_product(w, &[], |w| {
            write_tag(w, "value", &num(cybeta, 4))?;
            write_tag(w, "property", "aero/beta-rad")
        })?;
        write_tag_end(w, "function")?;
        write_tag_end(w, "axis")?;
    }

    write_tag_start_with_attrs(w, "axis", &[("name", "PITCH")])?;
    write_function_start(
        w,
        "aero/moment/Pitch_alpha",
        "Pitching moment due to angle of attack (Cm = Cm0 + Cmalpha * alpha)",
    )?;
    write_qs_product(w, &["metrics/cbarw-ft"], |w| {
        write_tag_start(w, "sum")?;
        write_tag(w, "value", &num(c.cm0, 4))?;
        write_tag_start(w, "product")?;
        write_tag(w, "value", &num(c.cm_alpha, 4))?;
        write_tag(w, "property", "aero/alpha-rad")?;
        write_tag_end(w, "product")?;
        write_tag_end(w, "sum")
    })?;
    write_tag_end(w, "function")?;

    write_function_start(
        w,
        "aero/moment/Pitch_rate",
        "Pitching moment due to pitch rate (Cmq)",
    )?;
    write_qs_product(w, &["metrics/cbarw-ft"], |w| {
        write_tag(w, "value", &num(c.cmq, 4))?;
        write_tag(w, "property", "aero/ci2vel")?;
        write_tag(w, "property", "velocities/q-rad_sec")
    })?;
    write_tag_end(w, "function")?;

    if let Some(cm_de) = c.cm_de {
        write_function_start(
            w,
            "aero/moment/Pitch_elevator",
            "Pitching moment due to elevator (Cm_de)",
        )?;
        write_qs_product(w, &["metrics/cbarw-ft"], |w| {
            write_tag(w, "value", &num(cm_de, 4))?;
            write_tag(w, "property", "fcs/elevator-pos-rad")
        })?;
        write_tag_end(w, "function")?;
    }
    write_tag_end(w, "axis")?;

    if c.clbeta.is_some() || c.clp.is_some() {
        write_tag_start_with_attrs(w, "axis", &[("name", "ROLL")])?;
        if let Some(clbeta) = c.clbeta {
            write_function_start(
                w,
                "aero/moment/Roll_beta",
                "Rolling moment due to sideslip (Clbeta)",
            )?;
            write_qs_product(w, &["metrics/bw-ft"], |w| {
                write_tag(w, "value", &num(clbeta, 4))?;
                write_tag(w, "property", "aero/beta-rad")
            })?;
            write_tag_end(w, "function")?;
        }
        if let Some(clp) = c.clp {
            write_function_start(w, "aero/moment/Roll_damp", "Roll damping (Clp)")?;
            write_qs_product(w, &["metrics/bw-ft"], |w| {
                write_tag(w, "value", &num(clp, 4))?;
                write_tag(w, "property", "aero/bi2vel")?;
                write_tag(w, "property", "velocities/p-rad_sec")
            })?;
            write_tag_end(w, "function")?;
        }
        write_function_start(w, "aero/moment/Roll_aileron", "Roll control power (Cl_da)")?;
        write_qs_product(w, &["metrics/bw-ft"], |w| {
            write_tag(w, "value", &num(CL_DA, 4))?;
            write_tag(w, "property", "fcs/aileron-pos-rad")
        })?;
        write_tag_end(w, "function")?;
        write_tag_end(w, "axis")?;
    }

    if c.cnbeta.is_some() || c.cnr.is_some() {
        write_tag_start_with_attrs(w, "axis", &[("name", "YAW")])?;
        if let Some(cnbeta) = c.cnbeta {
            write_function_start(
                w,
                "aero/moment/Yaw_beta",
                "Weathercock stability (Cnbeta)",
            )?;
            write_qs_product(w, &["metrics/bw-ft"], |w| {
                write_tag(w, "value", &num(cnbeta, 4))?;
                write_tag(w, "property", "aero/beta-rad")
            })?;
            write_tag_end(w, "function")?;
        }
        if let Some(cnr) = c.cnr {
            write_function_start(w, "aero/moment/Yaw_damp", "Yaw damping (Cnr)")?;
            write_qs_product(w, &["metrics/bw-ft"], |w| {
                write_tag(w, "value", &num(cnr, 4))?;
                write_tag(w, "property", "aero/bi2vel")?;
                write_tag(w, "property", "velocities/r-rad_sec")
            })?;
            write_tag_end(w, "function")?;
        }
        write_function_start(w, "aero/moment/Yaw_rudder", "Yaw control power (Cn_dr)")?;
        write_qs_product(w, &["metrics/bw-ft"], |w| {
            write_tag(w, "value", &num(CN_DR, 4))?;
            write_tag(w, "property", "fcs/rudder-pos-rad")
        })?;
        write_tag_end(w, "function")?;
        write_tag_end(w, "axis")?;
    }

    write_tag_end(w, "aerodynamics")
}

/// Throttle fraction to thrust in lbf, as `(throttle, lbf)` rows.
fn thrust_table(ir: &AircraftIr) -> Vec<(f64, f64)> {
    let map = &ir.propulsion.static_thrust_map;
    if !map.is_empty() {
        let max_rpm = map.iter().map(|p| p.rpm).fold(0.0, f64::max);
        if max_rpm > 0.0 {
            let mut rows: Vec<(f64, f64)> = map
                .iter()
                .map(|p| (p.rpm / max_rpm, p.thrust_n * N_TO_LBF))
                .collect();
            rows.sort_by(|a, b| a.0.total_cmp(&b.0));
            return rows;
        }
    }
    // Linear ramp from the rated maximum thrust.
    let max_lbf = value_of(&ir.propulsion.max_thrust).unwrap_or(0.0) * N_TO_LBF;
    (0..=10)
        .map(|i| {
            let t = f64::from(i) / 10.0;
            (t, max_lbf * t)
        })
        .collect()
}

fn write_external_reactions(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    write_tag_start(w, "external_reactions")?;
    write_tag_start_with_attrs(
        w,
        "force",
        &[("name", "propeller-thrust"), ("frame", "BODY")],
    )?;

    write_tag_start_with_attrs(w, "location", &[("unit", "IN")])?;
    write_tag(w, "x", &num(PROPELLER_TO_AERORP_RATIO * AERORP_X_IN, 2))?;
    write_tag(w, "y", "0.0")?;
    write_tag(w, "z", "0.0")?;
    write_tag_end(w, "location")?;

    write_tag_start(w, "direction")?;
    write_tag(w, "x", "1.0")?;
    write_tag(w, "y", "0.0")?;
    write_tag(w, "z", "0.0")?;
    write_tag_end(w, "direction")?;

    write_tag_start(w, "function")?;
    write_tag_start(w, "table")?;
    write_tag_with_attrs(
        w,
        "independentVar",
        "fcs/throttle-cmd-norm",
        &[("lookup", "row")],
    )?;
    let mut data = String::from("\n");
    for (throttle, lbf) in thrust_table(ir) {
        data.push_str(&format!("            {}   {}\n", num(throttle, 2), num(lbf, 4)));
    }
    data.push_str("          ");
    write_tag(w, "tableData", &data)?;
    write_tag_end(w, "table")?;
    write_tag_end(w, "function")?;

    write_tag_end(w, "force")?;
    write_tag_end(w, "external_reactions")
}

fn write_output(w: &mut XmlWriter, ir: &AircraftIr) -> Result<()> {
    let file = ir
        .output
        .file
        .clone()
        .unwrap_or_else(|| format!("{}_out.csv", ir.fileheader.name));
    let rate = num(ir.output.rate_hz.unwrap_or(DEFAULT_OUTPUT_RATE_HZ), 0);
    write_tag_start_with_attrs(
        w,
        "output",
        &[
            ("name", file.as_str()),
            ("type", "CSV"),
            ("rate", rate.as_str()),
        ],
    )?;
    let default_props = [
        "velocities/vt-fps",
        "aero/alpha-deg",
        "attitude/theta-deg",
        "fcs/elevator-pos-rad",
        "fcs/throttle-cmd-norm",
    ];
    if ir.output.properties.is_empty() {
        for prop in default_props {
            write_tag(w, "property", prop)?;
        }
    } else {
        for prop in &ir.output.properties {
            write_tag(w, "property", prop)?;
        }
    }
    write_tag_end(w, "output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ThrustPoint;

    fn minimal_ir() -> AircraftIr {
        let mut ir = AircraftIr::default();
        ir.fileheader.name = "testcraft".to_string();
        ir.metrics.wing_area = Some(Parameter::canonical(0.103, "M2"));
        ir.metrics.wing_span = Some(Parameter::canonical(0.905, "M"));
        ir.metrics.chord_avg = Some(Parameter::canonical(0.114, "M"));
        ir
    }

    #[test]
    fn required_sections_always_present() {
        let xml = write_fdm_config(&minimal_ir()).unwrap();
        for section in [
            "<metrics>",
            "<mass_balance>",
            "ground_reactions",
            "<propulsion>",
            "<flight_control",
            "<aerodynamics>",
            "<external_reactions>",
            "<output",
        ] {
            assert!(xml.contains(section), "missing {section}");
        }
    }

    #[test]
    fn no_nan_or_inf_text() {
        let mut ir = minimal_ir();
        ir.mass_balance.empty_weight = Some(Parameter::canonical(f64::NAN, "KG"));
        let xml = write_fdm_config(&ir).unwrap().to_lowercase();
        assert!(!xml.contains("nan"));
        assert!(!xml.contains("inf"));
    }

    #[test]
    fn defaults_fill_missing_aero() {
        let xml = write_fdm_config(&minimal_ir()).unwrap();
        // CLalpha default 5.0, Cmalpha default -0.50
        assert!(xml.contains("5.0000"));
        assert!(xml.contains("-0.5000"));
    }

    #[test]
    fn positive_cmalpha_is_rejected() {
        let mut ir = minimal_ir();
        ir.aerodynamics.cm_alpha = Some(Parameter::canonical(0.3, "/rad"));
        let err = write_fdm_config(&ir).unwrap_err();
        assert!(matches!(err, FdmError::InvalidValue(_)));
    }

    #[test]
    fn thrust_table_from_static_map() {
        let mut ir = minimal_ir();
        ir.propulsion.static_thrust_map = vec![
            ThrustPoint { rpm: 10000.0, thrust_n: 3.5 },
            ThrustPoint { rpm: 0.0, thrust_n: 0.0 },
            ThrustPoint { rpm: 5000.0, thrust_n: 1.2 },
        ];
        let rows = thrust_table(&ir);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].0 < rows[1].0 && rows[1].0 < rows[2].0);
        assert!((rows[2].1 - 3.5 * N_TO_LBF).abs() < 1e-9);
    }

    #[test]
    fn thrust_table_linear_ramp_fallback() {
        let mut ir = minimal_ir();
        ir.propulsion.max_thrust = Some(Parameter::canonical(3.5, "N"));
        let rows = thrust_table(&ir);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0], (0.0, 0.0));
        assert!((rows[10].1 - 3.5 * N_TO_LBF).abs() < 1e-9);
    }

    #[test]
    fn control_limits_set_surface_ranges() {
        let mut ir = minimal_ir();
        ir.controls.elevator_max = Some(Parameter::canonical(0.44, "RAD"));
        let xml = write_fdm_config(&ir).unwrap();
        assert!(xml.contains("-0.4400"));
        assert!(xml.contains("0.4400"));
    }
}
