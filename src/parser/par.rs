//! FMS `.par` parameter-file parser.
//!
//! Each line follows the fixed pattern `value  N:name(unit)  description`
//! where `N` is the FMS line number. Line numbers, not names, decide what a
//! value means. All machine-read fields are plain ASCII; the description tail
//! is Shift-JIS free text we do not interpret.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::utils::{FdmError, Result};

/// Primary geometry, SI units as stored in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParGeometry {
    pub wingspan_m: Option<f64>,
    pub chord_m: Option<f64>,
    pub h_tail_area_m2: Option<f64>,
    pub v_tail_area_m2: Option<f64>,
    pub tail_arm_m: Option<f64>,
}

impl ParGeometry {
    pub fn count(&self) -> usize {
        [
            self.wingspan_m,
            self.chord_m,
            self.h_tail_area_m2,
            self.v_tail_area_m2,
            self.tail_arm_m,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParMass {
    pub mass_kg: Option<f64>,
    pub ixx_kgm2: Option<f64>,
    pub iyy_kgm2: Option<f64>,
    pub izz_kgm2: Option<f64>,
}

impl ParMass {
    pub fn count(&self) -> usize {
        [self.mass_kg, self.ixx_kgm2, self.iyy_kgm2, self.izz_kgm2]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParAero {
    pub clalpha_rad: Option<f64>,
    pub cf: Option<f64>,
    pub cdb: Option<f64>,
    pub cl_max: Option<f64>,
    pub cm: Option<f64>,
}

impl ParAero {
    pub fn count(&self) -> usize {
        [self.clalpha_rad, self.cf, self.cdb, self.cl_max, self.cm]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParControl {
    pub rudder_max_rad: Option<f64>,
    pub elevator_max_rad: Option<f64>,
    pub aileron_max_rad: Option<f64>,
}

impl ParControl {
    pub fn count(&self) -> usize {
        [
            self.rudder_max_rad,
            self.elevator_max_rad,
            self.aileron_max_rad,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParPropulsion {
    pub max_thrust_n: Option<f64>,
}

impl ParPropulsion {
    pub fn count(&self) -> usize {
        usize::from(self.max_thrust_n.is_some())
    }
}

/// Everything extracted from one `.par` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParAircraft {
    pub aircraft_name: String,
    pub source_file: String,
    pub parse_date: String,
    pub geometry: ParGeometry,
    pub mass: ParMass,
    pub aerodynamics: ParAero,
    pub control: ParControl,
    pub propulsion: ParPropulsion,
    pub raw_lines: Vec<String>,
}

/// Parse an FMS `.par` file.
///
/// Required: all five geometry values, all four mass values, and clalpha.
/// A file missing any of them is rejected with the full list of missing
/// names.
pub fn parse_par_file(path: &Path) -> Result<ParAircraft> {
    if !path.exists() {
        return Err(FdmError::MissingFile(path.to_path_buf()));
    }
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("par"));
    if !ext_ok {
        return Err(FdmError::Malformed(format!(
            "expected a .par file, got {}",
            path.display()
        )));
    }

    let bytes = fs::read(path)?;
    let text = decode_lossy(&bytes);

    let mut out = ParAircraft {
        aircraft_name: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("aircraft")
            .to_string(),
        source_file: path.display().to_string(),
        parse_date: Local::now().to_rfc3339(),
        ..ParAircraft::default()
    };

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        out.raw_lines.push(line.to_string());

        let Some((value, line_num)) = parse_line(line)? else {
            continue;
        };
        assign(&mut out, line_num, value);
    }

    let missing = missing_required(&out);
    if !missing.is_empty() {
        return Err(FdmError::MissingParameters(missing));
    }
    Ok(out)
}

/// Extract `(value, line_number)` from one line, or None when the line does
/// not follow the `value  N:name(unit)` pattern.
fn parse_line(line: &str) -> Result<Option<(f64, u32)>> {
    let mut tokens = line.split_whitespace();
    let (Some(value_tok), Some(field_tok)) = (tokens.next(), tokens.next()) else {
        return Ok(None);
    };

    let Some((num_part, rest)) = field_tok.split_once(':') else {
        return Ok(None);
    };
    if num_part.is_empty() || !num_part.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    // name(unit) with a non-empty parenthesized unit
    let Some(open) = rest.find('(') else {
        return Ok(None);
    };
    if !rest.ends_with(')') || open + 2 >= rest.len() {
        return Ok(None);
    }
    let name = &rest[..open];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Ok(None);
    }

    if !value_tok.is_ascii() || !field_tok.is_ascii() {
        return Err(FdmError::Malformed(format!(
            "non-ASCII bytes in structural field: {line}"
        )));
    }

    let line_num: u32 = num_part
        .parse()
        .map_err(|_| FdmError::Malformed(format!("bad line number in: {line}")))?;
    // Non-numeric values on mapped lines count as missing.
    let Ok(value) = value_tok.parse::<f64>() else {
        return Ok(None);
    };
    Ok(Some((value, line_num)))
}

fn assign(out: &mut ParAircraft, line_num: u32, value: f64) {
    match line_num {
        16 => out.geometry.wingspan_m = Some(value),
        17 => out.geometry.chord_m = Some(value),
        23 => out.geometry.h_tail_area_m2 = Some(value),
        24 => out.geometry.v_tail_area_m2 = Some(value),
        25 => out.geometry.tail_arm_m = Some(value),
        19 => out.mass.mass_kg = Some(value),
        20 => out.mass.ixx_kgm2 = Some(value),
        21 => out.mass.iyy_kgm2 = Some(value),
        22 => out.mass.izz_kgm2 = Some(value),
        8 => out.aerodynamics.clalpha_rad = Some(value),
        10 => out.aerodynamics.cf = Some(value),
        11 => out.aerodynamics.cdb = Some(value),
        12 => out.aerodynamics.cl_max = Some(value),
        14 => out.aerodynamics.cm = Some(value),
        3 => out.control.rudder_max_rad = Some(value),
        4 => out.control.elevator_max_rad = Some(value),
        5 => out.control.aileron_max_rad = Some(value),
        2 => out.propulsion.max_thrust_n = Some(value),
        _ => {}
    }
}

fn missing_required(out: &ParAircraft) -> Vec<String> {
    let mut missing = Vec::new();
    let geometry: [(&str, Option<f64>); 5] = [
        ("wingspan_m", out.geometry.wingspan_m),
        ("chord_m", out.geometry.chord_m),
        ("h_tail_area_m2", out.geometry.h_tail_area_m2),
        ("v_tail_area_m2", out.geometry.v_tail_area_m2),
        ("tail_arm_m", out.geometry.tail_arm_m),
    ];
    let mass: [(&str, Option<f64>); 4] = [
        ("mass_kg", out.mass.mass_kg),
        ("ixx_kgm2", out.mass.ixx_kgm2),
        ("iyy_kgm2", out.mass.iyy_kgm2),
        ("izz_kgm2", out.mass.izz_kgm2),
    ];
    for (name, v) in geometry {
        if v.is_none() {
            missing.push(format!("geometry.{name}"));
        }
    }
    for (name, v) in mass {
        if v.is_none() {
            missing.push(format!("mass.{name}"));
        }
    }
    if out.aerodynamics.clalpha_rad.is_none() {
        missing.push("aerodynamics.clalpha_rad".to_string());
    }
    missing
}

/// Decode Shift-JIS bytes tolerantly. Structural fields are ASCII by format;
/// multi-byte description text becomes replacement characters, which is fine
/// because it is never machine-read.
fn decode_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect()
}

/// Human-readable summary of one parse.
pub fn parse_report(data: &ParAircraft) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "FMS .par File Parse Report");
    let _ = writeln!(s, "{}", "=".repeat(50));
    let _ = writeln!(s);
    let _ = writeln!(s, "Source File: {}", data.source_file);
    let _ = writeln!(s, "Aircraft Name: {}", data.aircraft_name);
    let _ = writeln!(s, "Parse Date: {}", data.parse_date);
    let _ = writeln!(s);
    let _ = writeln!(s, "Extracted Parameters:");
    let _ = writeln!(s, "{}", "-".repeat(50));

    let sections: [(&str, Vec<(&str, Option<f64>)>); 5] = [
        (
            "GEOMETRY",
            vec![
                ("wingspan_m", data.geometry.wingspan_m),
                ("chord_m", data.geometry.chord_m),
                ("h_tail_area_m2", data.geometry.h_tail_area_m2),
                ("v_tail_area_m2", data.geometry.v_tail_area_m2),
                ("tail_arm_m", data.geometry.tail_arm_m),
            ],
        ),
        (
            "MASS",
            vec![
                ("mass_kg", data.mass.mass_kg),
                ("ixx_kgm2", data.mass.ixx_kgm2),
                ("iyy_kgm2", data.mass.iyy_kgm2),
                ("izz_kgm2", data.mass.izz_kgm2),
            ],
        ),
        (
            "AERODYNAMICS",
            vec![
                ("clalpha_rad", data.aerodynamics.clalpha_rad),
                ("cf", data.aerodynamics.cf),
                ("cdb", data.aerodynamics.cdb),
                ("cl_max", data.aerodynamics.cl_max),
                ("cm", data.aerodynamics.cm),
            ],
        ),
        (
            "CONTROL",
            vec![
                ("rudder_max_rad", data.control.rudder_max_rad),
                ("elevator_max_rad", data.control.elevator_max_rad),
                ("aileron_max_rad", data.control.aileron_max_rad),
            ],
        ),
        (
            "PROPULSION",
            vec![("max_thrust_n", data.propulsion.max_thrust_n)],
        ),
    ];

    for (title, params) in &sections {
        let present = params.iter().filter(|(_, v)| v.is_some()).count();
        let _ = writeln!(s, "{title}: {present} parameters");
    }
    for (title, params) in &sections {
        let _ = writeln!(s);
        let _ = writeln!(s, "{title}:");
        for (name, value) in params {
            if let Some(v) = value {
                let _ = writeln!(s, "  {name}: {v}");
            }
        }
    }
    s
}
