//! Plaintext stage reports written alongside the generated artifacts.

use std::fmt::Write;
use std::path::Path;

use chrono::Local;

use crate::derivation::DerivedSet;
use crate::parameters::DerivedParameter;
use crate::parser::ParAircraft;

const RULE: &str = "----------------------------------------------------------------------";
const DOUBLE_RULE: &str =
    "======================================================================";

fn named_derivatives(derived: &DerivedSet) -> Vec<(&'static str, &DerivedParameter)> {
    let s = &derived.stability;
    vec![
        ("Cmalpha", &s.cmalpha),
        ("Cmq", &s.cmq),
        ("Cm_de", &s.cm_de),
        ("Cybeta", &s.cybeta),
        ("Cnbeta", &s.cnbeta),
        ("Clbeta", &s.clbeta),
        ("Clp", &s.clp),
        ("Cnr", &s.cnr),
        ("K_induced", &s.induced_drag_k),
    ]
}

/// Detailed derivation report: every calculated value with its formula,
/// assumptions, uncertainty and evidence level.
pub fn calculation_report(par: &ParAircraft, derived: &DerivedSet) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Derived Parameter Calculation Report");
    let _ = writeln!(s, "{DOUBLE_RULE}");
    let _ = writeln!(s);
    let _ = writeln!(s, "Aircraft: {}", par.aircraft_name);
    let _ = writeln!(s, "Source: {}", par.source_file);
    let _ = writeln!(s);

    let _ = writeln!(s, "CALCULATED GEOMETRY");
    let _ = writeln!(s, "{RULE}");
    let g = &derived.geometry;
    let _ = writeln!(s, "  wing_area_m2: {:.4}", g.wing_area_m2);
    let _ = writeln!(s, "  wing_area_ft2: {:.4}", g.wing_area_ft2);
    let _ = writeln!(s, "  aspect_ratio: {:.4}", g.aspect_ratio);
    let _ = writeln!(s, "  tail_volume_h: {:.4}", g.tail_volume_h);
    let _ = writeln!(s, "  tail_volume_v: {:.4}", g.tail_volume_v);

    let _ = writeln!(s);
    let _ = writeln!(s, "STABILITY DERIVATIVES");
    let _ = writeln!(s, "{RULE}");
    for (name, d) in named_derivatives(derived) {
        let _ = writeln!(s);
        let _ = writeln!(s, "{name}:");
        let _ = writeln!(s, "  Value: {:.4} {}", d.value, d.unit);
        let _ = writeln!(s, "  Formula: {}", d.formula);
        if !d.assumptions.is_empty() {
            let _ = write!(s, "  Assumptions:");
            for (key, value) in &d.assumptions {
                let _ = write!(s, " {key}={value}");
            }
            let _ = writeln!(s);
        }
        let _ = writeln!(s, "  Uncertainty: +/-{}%", d.uncertainty_percent);
        let _ = writeln!(s, "  Evidence Level: {}", d.evidence_level);
    }

    if !derived.control_estimates.is_empty() {
        let _ = writeln!(s);
        let _ = writeln!(s, "CONTROL SURFACE ESTIMATES (Data Quality Issues)");
        let _ = writeln!(s, "{RULE}");
        for est in &derived.control_estimates {
            let _ = writeln!(s);
            let _ = writeln!(s, "{}:", est.name);
            let _ = writeln!(s, "  Original: {:.4} rad", est.original_rad);
            let _ = writeln!(s, "  Estimated: {:.4} rad", est.estimated_rad);
            let _ = writeln!(s, "  Reason: {}", est.reason);
            let _ = writeln!(s, "  Evidence Level: {}", est.evidence_level);
        }
    }
    s
}

/// Report on the emitted document: which sections were written and where
/// the numbers came from.
pub fn generation_report(par: &ParAircraft, derived: &DerivedSet, xml_path: &Path) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Flight Model XML Generation Report");
    let _ = writeln!(s, "{DOUBLE_RULE}");
    let _ = writeln!(s);
    let _ = writeln!(s, "Aircraft: {}", par.aircraft_name);
    let _ = writeln!(s, "Output XML: {}", xml_path.display());
    let _ = writeln!(s, "Generation Date: {}", Local::now().to_rfc3339());
    let _ = writeln!(s);

    let _ = writeln!(s, "GENERATED SECTIONS");
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "  [x] fileheader");
    let _ = writeln!(s, "  [x] metrics");
    let _ = writeln!(s, "  [x] mass_balance");
    let _ = writeln!(s, "  [x] ground_reactions");
    let _ = writeln!(s, "  [x] propulsion");
    let _ = writeln!(s, "  [x] flight_control (3 channels: Pitch, Roll, Yaw)");
    let _ = writeln!(s, "  [x] aerodynamics (LIFT, DRAG, SIDE, PITCH, ROLL, YAW)");
    let _ = writeln!(s, "  [x] external_reactions (propeller thrust)");
    let _ = writeln!(s, "  [x] output");
    let _ = writeln!(s);

    let _ = writeln!(s, "EVIDENCE LEVELS SUMMARY");
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "  L1 (Direct): Geometry, Mass, Aerodynamics from .par");
    let _ = writeln!(s, "  L2 (Calculated): Wing area, Aspect ratio, Tail volumes");
    let _ = writeln!(s, "  L3 (Assumptions): Cmalpha, Cmq, Cm_de, Cnbeta, Clp, Cnr");
    if !derived.control_estimates.is_empty() {
        let _ = writeln!(s, "  L6 (Estimated): Control surface deflections");
    }
    s
}

/// Consolidated end-of-run summary: statistics, key derivatives and
/// suggested next steps.
pub fn conversion_summary(par: &ParAircraft, derived: &DerivedSet, xml_path: &Path) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Aircraft Conversion Summary");
    let _ = writeln!(s, "{DOUBLE_RULE}");
    let _ = writeln!(s);
    let _ = writeln!(s, "Aircraft: {}", par.aircraft_name);
    let _ = writeln!(s, "Source: {}", par.source_file);
    let _ = writeln!(s, "Output: {}", xml_path.display());
    let _ = writeln!(s);

    let _ = writeln!(s, "CONVERSION STATISTICS");
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "Parsed parameters:");
    let _ = writeln!(s, "  - Geometry: {} parameters", par.geometry.count());
    let _ = writeln!(s, "  - Mass: {} parameters", par.mass.count());
    let _ = writeln!(s, "  - Aerodynamics: {} parameters", par.aerodynamics.count());
    let _ = writeln!(s, "  - Control: {} parameters", par.control.count());
    let _ = writeln!(s, "  - Propulsion: {} parameters", par.propulsion.count());
    let _ = writeln!(s);
    let derivatives = named_derivatives(derived);
    let _ = writeln!(s, "Calculated parameters:");
    let _ = writeln!(s, "  - Geometry calculations: 5 parameters");
    let _ = writeln!(s, "  - Stability derivatives: {} parameters", derivatives.len());
    let _ = writeln!(s, "  - Unit conversions: 10 parameters");
    let _ = writeln!(
        s,
        "  - Control estimates: {} parameters",
        derived.control_estimates.len()
    );
    let _ = writeln!(s);

    let _ = writeln!(s, "KEY STABILITY DERIVATIVES");
    let _ = writeln!(s, "{RULE}");
    for (name, d) in &derivatives {
        let _ = writeln!(s, "{name}: {:.4} {}", d.value, d.unit);
        let _ = writeln!(s, "  Evidence Level: {}", d.evidence_level);
        let _ = writeln!(s, "  Uncertainty: +/-{}%", d.uncertainty_percent);
        let _ = writeln!(s, "  Formula: {}", d.formula);
        let _ = writeln!(s);
    }

    if !derived.control_estimates.is_empty() {
        let _ = writeln!(s, "CONTROL SURFACE ESTIMATES (Data Quality Issues)");
        let _ = writeln!(s, "{RULE}");
        for est in &derived.control_estimates {
            let _ = writeln!(s, "{}:", est.name);
            let _ = writeln!(s, "  Original: {:.4} rad", est.original_rad);
            let _ = writeln!(s, "  Estimated: {:.4} rad", est.estimated_rad);
            let _ = writeln!(s, "  Reason: {}", est.reason);
            let _ = writeln!(s, "  Evidence Level: {}", est.evidence_level);
            let _ = writeln!(s);
        }
    }

    let _ = writeln!(s, "NEXT STEPS");
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, "1. Load the XML in a JSBSim-compatible engine");
    let _ = writeln!(s, "2. Run a trim search to find the equilibrium state");
    let _ = writeln!(s, "3. Fly a basic simulation and check handling");
    let _ = writeln!(s, "4. Connect FlightGear for 3D visualization");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Assumptions;
    use crate::derivation::derive;
    use crate::parser::par::{ParAero, ParControl, ParGeometry, ParMass, ParPropulsion};
    use std::path::PathBuf;

    fn derived_sample() -> (ParAircraft, DerivedSet) {
        let par = ParAircraft {
            aircraft_name: "sample".to_string(),
            geometry: ParGeometry {
                wingspan_m: Some(0.905),
                chord_m: Some(0.114),
                h_tail_area_m2: Some(0.012),
                v_tail_area_m2: Some(0.008),
                tail_arm_m: Some(0.35),
            },
            mass: ParMass {
                mass_kg: Some(0.2),
                ixx_kgm2: Some(0.005),
                iyy_kgm2: Some(0.0094),
                izz_kgm2: Some(0.012),
            },
            aerodynamics: ParAero {
                clalpha_rad: Some(4.8),
                ..ParAero::default()
            },
            control: ParControl {
                rudder_max_rad: Some(0.35),
                elevator_max_rad: Some(0.35),
                aileron_max_rad: Some(0.30),
            },
            propulsion: ParPropulsion {
                max_thrust_n: Some(3.5),
            },
            ..ParAircraft::default()
        };
        let derived = derive(&par, &Assumptions::standard()).unwrap();
        (par, derived)
    }

    #[test]
    fn calculation_report_lists_all_derivatives() {
        let (par, derived) = derived_sample();
        let report = calculation_report(&par, &derived);
        for name in ["Cmalpha", "Cmq", "Cm_de", "Cnbeta", "Clp", "Cnr"] {
            assert!(report.contains(name), "missing {name}");
        }
        assert!(report.contains("Evidence Level: L3"));
    }

    #[test]
    fn generation_report_names_output() {
        let (par, derived) = derived_sample();
        let path = PathBuf::from("out/aircraft/Test/Test.xml");
        let report = generation_report(&par, &derived, &path);
        assert!(report.contains("Test.xml"));
        assert!(report.contains("fileheader"));
    }

    #[test]
    fn summary_reports_statistics() {
        let (par, derived) = derived_sample();
        let report = conversion_summary(&par, &derived, Path::new("x.xml"));
        assert!(report.contains("CONVERSION STATISTICS"));
        assert!(report.contains("NEXT STEPS"));
    }
}
