//! Derived aerodynamic and geometric quantities.
//!
//! Closed-form formulas (Roskam-style tail-volume methods) that turn the
//! primary `.par` inputs into the stability derivatives the emitted
//! configuration needs. Every output carries its formula, the assumptions it
//! leans on, an uncertainty estimate, and an evidence level.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::Assumptions;
use crate::parameters::{DerivedParameter, EvidenceLevel};
use crate::parser::par::ParAircraft;
use crate::utils::{
    FdmError, Result, KGM2_TO_SLUGFT2, KG_TO_LBS, M2_TO_FT2, M_TO_FT, N_TO_LBF,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedGeometry {
    pub wing_area_m2: f64,
    pub wing_area_ft2: f64,
    pub aspect_ratio: f64,
    pub tail_volume_h: f64,
    pub tail_volume_v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityDerivatives {
    pub cmalpha: DerivedParameter,
    pub cmq: DerivedParameter,
    pub cm_de: DerivedParameter,
    pub cybeta: DerivedParameter,
    pub cnbeta: DerivedParameter,
    pub clbeta: DerivedParameter,
    pub clp: DerivedParameter,
    pub cnr: DerivedParameter,
    pub induced_drag_k: DerivedParameter,
}

/// A control-surface value replaced because the source data was unrealistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEstimate {
    pub name: String,
    pub original_rad: f64,
    pub estimated_rad: f64,
    pub reason: String,
    pub evidence_level: EvidenceLevel,
}

/// Primary values converted to the imperial units the target schema expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImperialConversions {
    pub wingspan_ft: f64,
    pub chord_ft: f64,
    pub h_tail_area_ft2: f64,
    pub v_tail_area_ft2: f64,
    pub tail_arm_ft: f64,
    pub mass_lbs: f64,
    pub ixx_slugft2: f64,
    pub iyy_slugft2: f64,
    pub izz_slugft2: f64,
    pub max_thrust_lbf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSet {
    pub geometry: CalculatedGeometry,
    pub stability: StabilityDerivatives,
    pub control_estimates: Vec<ControlEstimate>,
    pub imperial: ImperialConversions,
}

// Aileron travel below this is treated as a data defect, not a design choice.
const AILERON_REALISTIC_MIN_RAD: f64 = 0.087; // 5 degrees

fn require(value: Option<f64>, name: &str) -> Result<f64> {
    value.ok_or_else(|| FdmError::MissingParameters(vec![name.to_string()]))
}

fn nonzero(value: f64, name: &str) -> Result<f64> {
    if value == 0.0 {
        Err(FdmError::InvalidValue(format!("{name} cannot be zero")))
    } else {
        Ok(value)
    }
}

/// Compute every derived quantity from one parsed aircraft.
pub fn derive(par: &ParAircraft, cfg: &Assumptions) -> Result<DerivedSet> {
    let span = nonzero(require(par.geometry.wingspan_m, "wingspan_m")?, "wingspan_m")?;
    let chord = nonzero(require(par.geometry.chord_m, "chord_m")?, "chord_m")?;
    let h_tail_area = require(par.geometry.h_tail_area_m2, "h_tail_area_m2")?;
    let v_tail_area = require(par.geometry.v_tail_area_m2, "v_tail_area_m2")?;
    let tail_arm = require(par.geometry.tail_arm_m, "tail_arm_m")?;
    let clalpha = nonzero(
        require(par.aerodynamics.clalpha_rad, "clalpha_rad")?,
        "clalpha_rad",
    )?;

    let mass = require(par.mass.mass_kg, "mass_kg")?;
    let ixx = require(par.mass.ixx_kgm2, "ixx_kgm2")?;
    let iyy = require(par.mass.iyy_kgm2, "iyy_kgm2")?;
    let izz = require(par.mass.izz_kgm2, "izz_kgm2")?;

    let max_thrust = par.propulsion.max_thrust_n.unwrap_or_else(|| {
        log::warn!("no max thrust in source data, external-reactions table will be zero");
        0.0
    });

    let eta = cfg.tail_efficiency.horizontal_eta;
    let eta_v = cfg.tail_efficiency.vertical_eta_v;
    let deps_dalpha = cfg.downwash.deps_dalpha;
    let tau = cfg.control_surfaces.elevator_tau;
    let oswald = nonzero(cfg.induced_drag.oswald_efficiency, "oswald_efficiency")?;

    // Rectangular-wing approximation
    let wing_area = span * chord;
    let aspect_ratio = span * span / wing_area;
    let v_h = (tail_arm * h_tail_area) / (chord * wing_area);
    let v_v = (tail_arm * v_tail_area) / (span * wing_area);

    let geometry = CalculatedGeometry {
        wing_area_m2: wing_area,
        wing_area_ft2: wing_area * M2_TO_FT2,
        aspect_ratio,
        tail_volume_h: v_h,
        tail_volume_v: v_v,
    };

    let stability = StabilityDerivatives {
        cmalpha: DerivedParameter::new(
            -eta * v_h * clalpha * (1.0 - deps_dalpha),
            "/rad",
            "-eta * V_H * CLalpha_tail * (1 - deps_dalpha)",
            25,
            EvidenceLevel::L3,
        )
        .with_assumption("eta", eta)
        .with_assumption("deps_dalpha", deps_dalpha),
        cmq: DerivedParameter::new(
            -2.0 * v_h * clalpha * (tail_arm / chord),
            "/rad/s",
            "-2 * V_H * CLalpha_tail * (tail_arm / chord)",
            20,
            EvidenceLevel::L3,
        ),
        cm_de: DerivedParameter::new(
            -eta * v_h * tau * clalpha,
            "/rad",
            "-eta * V_H * tau * CLalpha_tail",
            25,
            EvidenceLevel::L3,
        )
        .with_assumption("eta", eta)
        .with_assumption("tau", tau),
        cybeta: DerivedParameter::new(
            -clalpha * (v_tail_area / wing_area),
            "/rad",
            "-CLalpha_v * (Sv / S)",
            20,
            EvidenceLevel::L2,
        ),
        cnbeta: DerivedParameter::new(
            eta_v * v_v * clalpha,
            "/rad",
            "eta_v * V_v * CLalpha_v",
            30,
            EvidenceLevel::L3,
        )
        .with_assumption("eta_v", eta_v),
        clbeta: DerivedParameter::new(
            -0.025,
            "/rad",
            "conservative estimate for small dihedral",
            30,
            EvidenceLevel::L3,
        ),
        clp: DerivedParameter::new(
            -clalpha / 12.0,
            "/rad/s",
            "-CLalpha / 12",
            30,
            EvidenceLevel::L3,
        ),
        cnr: DerivedParameter::new(
            -2.0 * eta_v * v_v * (tail_arm / span),
            "/rad/s",
            "-2 * eta_v * V_v * (tail_arm / wingspan)",
            30,
            EvidenceLevel::L3,
        ),
        induced_drag_k: DerivedParameter::new(
            1.0 / (PI * oswald * aspect_ratio),
            "",
            "1 / (pi * e * AR)",
            20,
            EvidenceLevel::L3,
        )
        .with_assumption("oswald_efficiency", oswald),
    };

    let control_estimates = screen_controls(par, cfg);

    let imperial = ImperialConversions {
        wingspan_ft: span * M_TO_FT,
        chord_ft: chord * M_TO_FT,
        h_tail_area_ft2: h_tail_area * M2_TO_FT2,
        v_tail_area_ft2: v_tail_area * M2_TO_FT2,
        tail_arm_ft: tail_arm * M_TO_FT,
        mass_lbs: mass * KG_TO_LBS,
        ixx_slugft2: ixx * KGM2_TO_SLUGFT2,
        iyy_slugft2: iyy * KGM2_TO_SLUGFT2,
        izz_slugft2: izz * KGM2_TO_SLUGFT2,
        max_thrust_lbf: max_thrust * N_TO_LBF,
    };

    Ok(DerivedSet {
        geometry,
        stability,
        control_estimates,
        imperial,
    })
}

/// Replace physically implausible control travel with configured typical
/// values, recording the substitution as an L6 estimate.
fn screen_controls(par: &ParAircraft, cfg: &Assumptions) -> Vec<ControlEstimate> {
    let mut estimates = Vec::new();

    let aileron = par.control.aileron_max_rad.unwrap_or(0.0);
    if aileron < AILERON_REALISTIC_MIN_RAD {
        estimates.push(ControlEstimate {
            name: "aileron_max_rad".to_string(),
            original_rad: aileron,
            estimated_rad: cfg.control_estimates.aileron_max_rad,
            reason: format!(
                "original {:.4} rad ({:.2} deg) unrealistic, using typical value",
                aileron,
                aileron.to_degrees()
            ),
            evidence_level: EvidenceLevel::L6,
        });
    }

    let rudder = par.control.rudder_max_rad.unwrap_or(0.0);
    if rudder == 0.0 {
        estimates.push(ControlEstimate {
            name: "rudder_max_rad".to_string(),
            original_rad: rudder,
            estimated_rad: cfg.control_estimates.rudder_max_rad,
            reason: "missing rudder data (0 rad), using typical value".to_string(),
            evidence_level: EvidenceLevel::L6,
        });
    }

    estimates
}

impl DerivedSet {
    /// Effective control travel after screening: the estimate wins over the
    /// source value when one was recorded.
    pub fn effective_control(&self, name: &str, original: Option<f64>) -> Option<f64> {
        self.control_estimates
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.estimated_rad)
            .or(original)
    }
}
