//! Engineering-assumption configuration for the derivation stage.
//!
//! The assumptions are deliberately explicit: every derivation function takes
//! the struct as an argument instead of reading a process-global config.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::{FdmError, Result};

/// Environment variable overriding the FlightGear executable used for
/// visualization hints in reports.
pub const FLIGHTGEAR_ENV: &str = "FDMGEN_FLIGHTGEAR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailEfficiency {
    /// Horizontal tail efficiency factor (eta).
    pub horizontal_eta: f64,
    /// Vertical tail efficiency factor (eta_v).
    pub vertical_eta_v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Downwash {
    /// Downwash gradient d(epsilon)/d(alpha) at the horizontal tail.
    pub deps_dalpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSurfaces {
    /// Elevator effectiveness factor (tau).
    pub elevator_tau: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InducedDrag {
    pub oswald_efficiency: f64,
}

/// Typical deflections substituted when source data is unrealistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEstimates {
    pub aileron_max_rad: f64,
    pub rudder_max_rad: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub tail_efficiency: TailEfficiency,
    pub downwash: Downwash,
    pub control_surfaces: ControlSurfaces,
    pub induced_drag: InducedDrag,
    #[serde(default = "ControlEstimates::standard")]
    pub control_estimates: ControlEstimates,
}

impl ControlEstimates {
    /// Typical small fixed-wing deflection, 20 degrees.
    pub fn standard() -> Self {
        ControlEstimates {
            aileron_max_rad: 0.349,
            rudder_max_rad: 0.349,
        }
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            tail_efficiency: TailEfficiency {
                horizontal_eta: 0.9,
                vertical_eta_v: 0.95,
            },
            downwash: Downwash { deps_dalpha: 0.35 },
            control_surfaces: ControlSurfaces { elevator_tau: 0.5 },
            induced_drag: InducedDrag {
                oswald_efficiency: 0.8,
            },
            control_estimates: ControlEstimates::standard(),
        }
    }
}

impl Assumptions {
    /// The built-in assumption set, used when no YAML override is given.
    pub fn standard() -> Self {
        Assumptions::default()
    }

    /// Load assumptions from a YAML file and validate them.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FdmError::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let assumptions: Assumptions = serde_yaml::from_str(&text)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("tail_efficiency.horizontal_eta", self.tail_efficiency.horizontal_eta),
            ("tail_efficiency.vertical_eta_v", self.tail_efficiency.vertical_eta_v),
            ("downwash.deps_dalpha", self.downwash.deps_dalpha),
            ("control_surfaces.elevator_tau", self.control_surfaces.elevator_tau),
            ("induced_drag.oswald_efficiency", self.induced_drag.oswald_efficiency),
        ];
        for (name, value) in checks {
            if !(0.0..=1.0).contains(&value) {
                return Err(FdmError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        if self.control_estimates.aileron_max_rad <= 0.0
            || self.control_estimates.rudder_max_rad <= 0.0
        {
            return Err(FdmError::InvalidConfig(
                "control_estimates deflections must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Locate the FlightGear executable, honoring the environment override.
pub fn flightgear_executable() -> Option<PathBuf> {
    if let Ok(path) = env::var(FLIGHTGEAR_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }
    let candidates = [
        "/usr/bin/fgfs",
        "/usr/local/bin/fgfs",
        "/Applications/FlightGear.app/Contents/MacOS/fgfs",
    ];
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_assumptions_validate() {
        Assumptions::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_efficiency_is_rejected() {
        let mut a = Assumptions::default();
        a.tail_efficiency.horizontal_eta = 1.4;
        assert!(a.validate().is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let a = Assumptions::default();
        let text = serde_yaml::to_string(&a).unwrap();
        let back: Assumptions = serde_yaml::from_str(&text).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn missing_config_file_is_a_missing_file_error() {
        let err = Assumptions::from_yaml(Path::new("/nonexistent/assumptions.yaml")).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
