//! CSV sheet-workbook parser.
//!
//! A workbook is a directory of CSV files named after the authoring-template
//! sheets (`T_01_fileheader.csv`, `T_02_metrics.csv`, ...), each with columns
//! `VarName,Value,Unit,Required,Note`. The first row matching a VarName wins;
//! absent sheets leave their IR section at defaults.

use std::path::Path;

use crate::ir::{
    AircraftIr, Contact, ControlLimits, FileHeader, Point, ThrustPoint,
};
use crate::parameters::Parameter;
use crate::utils::{FdmError, Result};

struct Row {
    varname: String,
    value: Option<String>,
    unit: Option<String>,
    required: bool,
}

struct Sheet {
    rows: Vec<Row>,
}

impl Sheet {
    fn load(dir: &Path, name: &str) -> Result<Option<Sheet>> {
        let path = dir.join(format!("{name}.csv"));
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)?;

        let headers = reader.headers().map_err(csv_err(name))?.clone();
        let col = |label: &str| {
            headers
                .iter()
                .position(|h| h.trim().starts_with(label))
        };
        let (Some(c_var), Some(c_val)) = (col("VarName"), col("Value")) else {
            return Err(FdmError::Malformed(format!(
                "{name}.csv is missing VarName/Value columns"
            )));
        };
        let c_unit = col("Unit");
        let c_req = col("Required");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err(name))?;
            let cell = |i: Option<usize>| {
                i.and_then(|i| record.get(i))
                    .map(|s| s.trim().replace('\n', " "))
                    .filter(|s| !s.is_empty())
            };
            let Some(varname) = cell(Some(c_var)) else {
                continue;
            };
            rows.push(Row {
                varname,
                value: cell(Some(c_val)),
                unit: cell(c_unit),
                required: cell(c_req).is_some_and(|r| r.eq_ignore_ascii_case("yes")),
            });
        }
        Ok(Some(Sheet { rows }))
    }

    fn first(&self, varname: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.varname == varname)
    }

    /// VarNames declared `Required=YES` whose Value cell is blank.
    fn missing_required(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|r| r.required && r.value.is_none())
            .map(|r| r.varname.as_str())
    }

    /// Numeric cell, run through unit conversion.
    fn param(&self, varname: &str) -> Result<Option<Parameter>> {
        let Some(row) = self.first(varname) else {
            return Ok(None);
        };
        let Some(value_text) = row.value.as_deref() else {
            return Ok(None);
        };
        let Ok(value) = value_text.parse::<f64>() else {
            if row.unit.is_some() {
                return Err(FdmError::InvalidValue(format!(
                    "{varname}: non-numeric cell {value_text:?}"
                )));
            }
            // Text cell without a unit belongs to `text()`.
            return Ok(None);
        };
        Parameter::from_cell(value, row.unit.as_deref(), row.required).map(Some)
    }

    /// Free-text cell (names, file references, property lists).
    fn text(&self, varname: &str) -> Option<String> {
        self.first(varname).and_then(|r| r.value.clone())
    }
}

fn csv_err(sheet: &str) -> impl Fn(csv::Error) -> FdmError + '_ {
    move |e| FdmError::Malformed(format!("{sheet}.csv: {e}"))
}

// A required row with no value must not fall through to the emission
// defaults, so every loaded sheet reports its blanks into one list.
fn load_sheet(dir: &Path, name: &str, missing: &mut Vec<String>) -> Result<Option<Sheet>> {
    let sheet = Sheet::load(dir, name)?;
    if let Some(sheet) = &sheet {
        missing.extend(sheet.missing_required().map(str::to_string));
    }
    Ok(sheet)
}

/// Parse a CSV workbook directory into the IR.
pub fn parse_workbook(dir: &Path) -> Result<AircraftIr> {
    if !dir.is_dir() {
        return Err(FdmError::MissingFile(dir.to_path_buf()));
    }

    let mut ir = AircraftIr::default();
    let mut missing: Vec<String> = Vec::new();

    if let Some(sheet) = load_sheet(dir, "T_01_fileheader", &mut missing)? {
        ir.fileheader = FileHeader {
            name: sheet
                .text("fileheader/name")
                .unwrap_or_else(|| FileHeader::default().name),
            version: sheet
                .text("fileheader/version")
                .unwrap_or_else(|| FileHeader::default().version),
            description: sheet.text("fileheader/description").unwrap_or_default(),
            source_file: Some(dir.display().to_string()),
        };
    }

    if let Some(sheet) = load_sheet(dir, "T_02_metrics", &mut missing)? {
        ir.metrics.wing_area = sheet.param("metrics/wing_area")?;
        ir.metrics.wing_span = sheet.param("metrics/wing_span")?;
        ir.metrics.chord_avg = sheet.param("metrics/chord_avg")?;
        ir.metrics.ref_point = Point {
            x: sheet.param("metrics/ref_point/x")?,
            y: sheet.param("metrics/ref_point/y")?,
            z: sheet.param("metrics/ref_point/z")?,
        };
    }

    if let Some(sheet) = load_sheet(dir, "T_03_mass_balance", &mut missing)? {
        ir.mass_balance.empty_weight = sheet.param("mass/empty_weight")?;
        ir.mass_balance.ixx = sheet.param("mass/I/ixx")?;
        ir.mass_balance.iyy = sheet.param("mass/I/iyy")?;
        ir.mass_balance.izz = sheet.param("mass/I/izz")?;
        ir.mass_balance.cg = Point {
            x: sheet.param("mass/CG/x")?,
            y: sheet.param("mass/CG/y")?,
            z: sheet.param("mass/CG/z")?,
        };
    }

    if let Some(sheet) = load_sheet(dir, "T_04_ground_reactions", &mut missing)? {
        let contact = Contact {
            kind: sheet.text("ground/type").unwrap_or_else(|| "BOGEY".to_string()),
            name: sheet.text("ground/name").unwrap_or_else(|| "GEAR".to_string()),
            location: Point {
                x: sheet.param("ground/x")?,
                y: sheet.param("ground/y")?,
                z: sheet.param("ground/z")?,
            },
            spring_coeff: sheet.param("ground/k_spring")?,
            damping_coeff: sheet.param("ground/c_damper")?,
            static_friction: sheet.param("ground/mu_static")?,
            dynamic_friction: sheet.param("ground/mu_kinetic")?,
        };
        ir.ground_reactions.push(contact);
    }

    if let Some(sheet) = load_sheet(dir, "T_05_propulsion", &mut missing)? {
        ir.propulsion.engine_type = sheet.text("prop/engine/type");
        ir.propulsion.engine_name = sheet.text("prop/engine/name");
        ir.propulsion.engine_file = sheet.text("prop/engine/file");
        ir.propulsion.thruster_type = sheet.text("prop/thruster/type");
        ir.propulsion.thruster_name = sheet.text("prop/thruster/name");
        ir.propulsion.thruster_location = Point {
            x: sheet.param("prop/thruster/x")?,
            y: sheet.param("prop/thruster/y")?,
            z: sheet.param("prop/thruster/z")?,
        };
        ir.propulsion.max_thrust = sheet.param("prop/max_thrust")?;
    }
    ir.propulsion.static_thrust_map = load_thrust_map(dir)?;

    if let Some(sheet) = load_sheet(dir, "T_06_aerodynamics", &mut missing)? {
        let aero = &mut ir.aerodynamics;
        aero.cl0 = sheet.param("aero/CL0")?;
        aero.cl_alpha = sheet.param("aero/CLalpha")?;
        aero.cl_max = sheet.param("aero/CLmax")?;
        aero.cd0 = sheet.param("aero/CD0")?;
        aero.k = sheet.param("aero/K")?;
        aero.cm0 = sheet.param("aero/Cm0")?;
        aero.cm_alpha = sheet.param("aero/Cmalpha")?;
        aero.cmq = sheet.param("aero/Cmq")?;
        aero.cm_de = sheet.param("aero/Cm_de")?;
        aero.cybeta = sheet.param("aero/Cybeta")?;
        aero.cnbeta = sheet.param("aero/Cnbeta")?;
        aero.clbeta = sheet.param("aero/Clbeta")?;
        aero.clp = sheet.param("aero/Clp")?;
        aero.cnr = sheet.param("aero/Cnr")?;

        ir.controls = ControlLimits {
            elevator_max: sheet.param("control/elevator_max")?,
            aileron_max: sheet.param("control/aileron_max")?,
            rudder_max: sheet.param("control/rudder_max")?,
        };
    }

    if let Some(sheet) = load_sheet(dir, "T_08_output", &mut missing)? {
        ir.output.file = sheet.text("output/file_name");
        ir.output.rate_hz = sheet
            .param("output/rate_hz")?
            .map(|p| p.value)
            .or_else(|| {
                sheet
                    .text("output/rate_hz")
                    .and_then(|t| t.parse::<f64>().ok())
            });
        if let Some(props) = sheet.text("output/properties") {
            ir.output.properties = props
                .split([';', ','])
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
    }

    if !missing.is_empty() {
        return Err(FdmError::MissingParameters(missing));
    }

    ir.validate()?;
    Ok(ir)
}

fn load_thrust_map(dir: &Path) -> Result<Vec<ThrustPoint>> {
    let path = dir.join("T_05a_prop_static_thrust_map.csv");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
    let headers = reader.headers().map_err(csv_err("T_05a_prop_static_thrust_map"))?.clone();
    let c_rpm = headers.iter().position(|h| h.trim() == "rpm");
    let c_thrust = headers.iter().position(|h| h.trim() == "thrust_N");
    let (Some(c_rpm), Some(c_thrust)) = (c_rpm, c_thrust) else {
        return Err(FdmError::Malformed(
            "T_05a_prop_static_thrust_map.csv is missing rpm/thrust_N columns".to_string(),
        ));
    };

    let mut map = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err("T_05a_prop_static_thrust_map"))?;
        let rpm = record.get(c_rpm).and_then(|s| s.trim().parse::<f64>().ok());
        let thrust = record.get(c_thrust).and_then(|s| s.trim().parse::<f64>().ok());
        if let (Some(rpm), Some(thrust_n)) = (rpm, thrust) {
            map.push(ThrustPoint { rpm, thrust_n });
        }
    }
    Ok(map)
}
