//! Intermediate representation of one aircraft.
//!
//! Explicit typed records per schema section, built once per conversion run,
//! dumped to JSON for inspection, then consumed by the XML emitter.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::parameters::{DerivedParameter, Parameter};
use crate::utils::{FdmError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_file: Option<String>,
}

impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            name: "MyAircraft".to_string(),
            version: "2.0".to_string(),
            description: String::new(),
            source_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Option<Parameter>,
    pub y: Option<Parameter>,
    pub z: Option<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub wing_area: Option<Parameter>,
    pub wing_span: Option<Parameter>,
    pub chord_avg: Option<Parameter>,
    #[serde(default)]
    pub ref_point: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassBalance {
    pub empty_weight: Option<Parameter>,
    pub ixx: Option<Parameter>,
    pub iyy: Option<Parameter>,
    pub izz: Option<Parameter>,
    #[serde(default)]
    pub cg: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub location: Point,
    pub spring_coeff: Option<Parameter>,
    pub damping_coeff: Option<Parameter>,
    pub static_friction: Option<Parameter>,
    pub dynamic_friction: Option<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrustPoint {
    pub rpm: f64,
    pub thrust_n: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Propulsion {
    pub engine_name: Option<String>,
    pub engine_type: Option<String>,
    pub engine_file: Option<String>,
    pub thruster_name: Option<String>,
    pub thruster_type: Option<String>,
    #[serde(default)]
    pub thruster_location: Point,
    /// Maximum static thrust, N. Drives the external-reactions table when no
    /// engine file is given.
    pub max_thrust: Option<Parameter>,
    #[serde(default)]
    pub static_thrust_map: Vec<ThrustPoint>,
}

impl Propulsion {
    pub fn has_engine(&self) -> bool {
        self.engine_file.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.engine_type.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Aerodynamic coefficients, primary and derived. All dimensionless or
/// per-radian; absent values fall back to class-typical defaults at emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aerodynamics {
    pub cl0: Option<Parameter>,
    pub cl_alpha: Option<Parameter>,
    pub cl_max: Option<Parameter>,
    pub cd0: Option<Parameter>,
    pub k: Option<Parameter>,
    pub cm0: Option<Parameter>,
    pub cm_alpha: Option<Parameter>,
    pub cmq: Option<Parameter>,
    pub cm_de: Option<Parameter>,
    pub cybeta: Option<Parameter>,
    pub cnbeta: Option<Parameter>,
    pub clbeta: Option<Parameter>,
    pub clp: Option<Parameter>,
    pub cnr: Option<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputBlock {
    pub file: Option<String>,
    pub rate_hz: Option<f64>,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Control-surface travel limits, rad.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    pub elevator_max: Option<Parameter>,
    pub aileron_max: Option<Parameter>,
    pub rudder_max: Option<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftIr {
    #[serde(default)]
    pub fileheader: FileHeader,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub mass_balance: MassBalance,
    #[serde(default)]
    pub ground_reactions: Vec<Contact>,
    #[serde(default)]
    pub propulsion: Propulsion,
    #[serde(default)]
    pub aerodynamics: Aerodynamics,
    #[serde(default)]
    pub controls: ControlLimits,
    #[serde(default)]
    pub output: OutputBlock,
    /// Derivation audit trail keyed by parameter name.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub derived: std::collections::BTreeMap<String, DerivedParameter>,
}

impl AircraftIr {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FdmError::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate construction invariants: every present value is finite, and
    /// every parameter flagged required actually carries a value.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        for (name, param) in self.named_parameters() {
            if let Some(p) = param {
                if !p.value.is_finite() {
                    return Err(FdmError::InvalidValue(format!(
                        "{name} is non-finite after conversion"
                    )));
                }
            } else {
                // Absent and never marked required: fine, defaults cover it.
                continue;
            }
        }
        for (name, param) in self.named_parameters() {
            if param.is_none() && self.required_names().contains(&name) {
                missing.push(name.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FdmError::MissingParameters(missing))
        }
    }

    fn required_names(&self) -> Vec<&'static str> {
        // The schema itself only hard-requires the metric trio; everything
        // else has documented defaults.
        vec!["metrics.wing_area", "metrics.wing_span", "metrics.chord_avg"]
    }

    fn named_parameters(&self) -> Vec<(&'static str, Option<&Parameter>)> {
        vec![
            ("metrics.wing_area", self.metrics.wing_area.as_ref()),
            ("metrics.wing_span", self.metrics.wing_span.as_ref()),
            ("metrics.chord_avg", self.metrics.chord_avg.as_ref()),
            ("mass_balance.empty_weight", self.mass_balance.empty_weight.as_ref()),
            ("mass_balance.ixx", self.mass_balance.ixx.as_ref()),
            ("mass_balance.iyy", self.mass_balance.iyy.as_ref()),
            ("mass_balance.izz", self.mass_balance.izz.as_ref()),
            ("propulsion.max_thrust", self.propulsion.max_thrust.as_ref()),
            ("aerodynamics.cl_alpha", self.aerodynamics.cl_alpha.as_ref()),
            ("aerodynamics.cd0", self.aerodynamics.cd0.as_ref()),
            ("aerodynamics.cm_alpha", self.aerodynamics.cm_alpha.as_ref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_ir() -> AircraftIr {
        let mut ir = AircraftIr::default();
        ir.metrics.wing_area = Some(Parameter::canonical(0.103, "M2"));
        ir.metrics.wing_span = Some(Parameter::canonical(0.905, "M"));
        ir.metrics.chord_avg = Some(Parameter::canonical(0.114, "M"));
        ir
    }

    #[test]
    fn minimal_ir_validates() {
        minimal_ir().validate().unwrap();
    }

    #[test]
    fn missing_metrics_are_reported_by_name() {
        let err = AircraftIr::default().validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("metrics.wing_area"));
        assert!(msg.contains("metrics.chord_avg"));
    }

    #[test]
    fn non_finite_value_fails_validation() {
        let mut ir = minimal_ir();
        ir.mass_balance.ixx = Some(Parameter::canonical(f64::NAN, "KG*M2"));
        assert!(ir.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let ir = minimal_ir();
        let json = ir.to_json().unwrap();
        let back: AircraftIr = serde_json::from_str(&json).unwrap();
        assert_eq!(ir, back);
    }
}
