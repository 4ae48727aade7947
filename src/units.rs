//! User-friendly unit conversion.
//!
//! Aircraft templates are filled in with practical units (g, mm, g·mm²); the
//! target engine only accepts its own English/SI unit symbols (KG, M, KG*M2,
//! FT, ...). Every supported symbol maps to a (canonical unit, linear scale
//! factor) pair.

use log::warn;

use crate::utils::{FdmError, Result};

/// Outcome of converting a raw (value, unit) cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Known symbol, value scaled into the canonical unit.
    Converted { value: f64, unit: &'static str },
    /// No unit was given; the value passes through untouched.
    Unitless(f64),
    /// Unknown symbol. The value passes through with the uppercased input so
    /// that engine-native units (FT, LBS, ...) keep working, but the caller
    /// is told the unit was never verified against the table.
    Unverified { value: f64, unit: String },
}

impl Conversion {
    pub fn value(&self) -> f64 {
        match self {
            Conversion::Converted { value, .. } => *value,
            Conversion::Unitless(value) => *value,
            Conversion::Unverified { value, .. } => *value,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Conversion::Converted { unit, .. } => Some(unit),
            Conversion::Unitless(_) => None,
            Conversion::Unverified { unit, .. } => Some(unit),
        }
    }
}

/// Look up a normalized symbol in the conversion table.
pub fn lookup(symbol: &str) -> Option<(&'static str, f64)> {
    let entry = match symbol {
        // Length
        "mm" => ("M", 0.001),
        "cm" => ("M", 0.01),
        "m" => ("M", 1.0),
        "in" => ("IN", 1.0),
        "ft" => ("FT", 1.0),

        // Area
        "mm2" | "mm^2" => ("M2", 1e-6),
        "cm2" | "cm^2" => ("M2", 1e-4),
        "m2" | "m^2" => ("M2", 1.0),
        "ft2" | "ft^2" => ("FT2", 1.0),
        "in2" | "in^2" => ("IN2", 1.0),

        // Mass
        "g" => ("KG", 0.001),
        "kg" => ("KG", 1.0),
        "lb" | "lbs" => ("LBS", 1.0),

        // Moment of inertia
        "g*mm2" | "g*mm^2" | "gmm2" => ("KG*M2", 1e-9),
        "g*cm2" | "g*cm^2" | "gcm2" => ("KG*M2", 1e-7),
        "kg*m2" | "kg*m^2" | "kgm2" => ("KG*M2", 1.0),
        "slug*ft2" | "slug*ft^2" => ("SLUG*FT2", 1.0),

        // Angle
        "deg" => ("DEG", 1.0),
        "rad" => ("RAD", 1.0),

        // Compound spring/damper units
        "lbs/ft" => ("LBS/FT", 1.0),
        "lbs/ft/sec" => ("LBS/FT/SEC", 1.0),

        _ => return None,
    };
    Some(entry)
}

/// Normalize a raw unit string for table matching: lowercase, no spaces or
/// dots, `·`/`×` unified to `*`.
pub fn normalize(unit: &str) -> String {
    unit.trim()
        .to_lowercase()
        .replace([' ', '.'], "")
        .replace(['·', '×'], "*")
}

/// Convert a value from a user-supplied unit into the engine's unit system.
///
/// Unknown symbols pass through uppercased as [`Conversion::Unverified`];
/// the engine may still accept them if they are native symbols.
pub fn convert(value: f64, unit: Option<&str>) -> Result<Conversion> {
    if !value.is_finite() {
        return Err(FdmError::InvalidValue(format!(
            "cannot convert non-finite value {value}"
        )));
    }

    let raw = match unit {
        Some(u) if !u.trim().is_empty() => u,
        _ => return Ok(Conversion::Unitless(value)),
    };

    let key = normalize(raw);
    if key.is_empty() {
        return Ok(Conversion::Unitless(value));
    }

    match lookup(&key) {
        Some((canonical, factor)) => Ok(Conversion::Converted {
            value: value * factor,
            unit: canonical,
        }),
        None => {
            warn!("unknown unit '{raw}' - passing through as '{}'", raw.to_uppercase());
            Ok(Conversion::Unverified {
                value,
                unit: raw.trim().to_uppercase(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn converted(value: f64, unit: &str) -> (f64, String) {
        match convert(value, Some(unit)).unwrap() {
            Conversion::Converted { value, unit } => (value, unit.to_string()),
            other => panic!("expected Converted, got {other:?}"),
        }
    }

    #[test]
    fn practical_units_scale_into_engine_units() {
        assert_eq!(converted(200.0, "g"), (0.2, "KG".to_string()));
        assert_eq!(converted(905.0, "mm"), (0.905, "M".to_string()));
        let (v, u) = converted(103_000.0, "mm2");
        assert_relative_eq!(v, 0.103, epsilon = 1e-9);
        assert_eq!(u, "M2");
        let (v, u) = converted(9_410_000.0, "g*mm2");
        assert_relative_eq!(v, 0.00941, epsilon = 1e-12);
        assert_eq!(u, "KG*M2");
    }

    #[test]
    fn conversion_is_linear() {
        for unit in ["g", "mm", "cm2", "kg*m2", "ft"] {
            let base = convert(3.7, Some(unit)).unwrap().value();
            for k in [0.5, 2.0, 100.0] {
                let scaled = convert(k * 3.7, Some(unit)).unwrap().value();
                assert_relative_eq!(scaled, k * base, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn round_trip_through_inverse_factor() {
        for unit in ["mm", "g", "g*cm2", "cm"] {
            let (_, factor) = lookup(unit).unwrap();
            let v = 123.456;
            let converted = convert(v, Some(unit)).unwrap().value();
            assert_relative_eq!(converted / factor, v, epsilon = 1e-9);
        }
    }

    #[test]
    fn separator_variants_normalize() {
        assert_eq!(normalize(" G · Mm2 "), "g*mm2");
        assert_eq!(normalize("kg × m^2"), "kg*m^2");
        let (v, u) = converted(5_000_000.0, "g·mm2");
        assert_relative_eq!(v, 0.005, epsilon = 1e-12);
        assert_eq!(u, "KG*M2");
    }

    #[test]
    fn missing_unit_passes_through_unitless() {
        assert_eq!(convert(1.5, None).unwrap(), Conversion::Unitless(1.5));
        assert_eq!(convert(1.5, Some("  ")).unwrap(), Conversion::Unitless(1.5));
    }

    #[test]
    fn unknown_unit_is_unverified_uppercase() {
        match convert(2.0, Some("furlong")).unwrap() {
            Conversion::Unverified { value, unit } => {
                assert_eq!(value, 2.0);
                assert_eq!(unit, "FURLONG");
            }
            other => panic!("expected Unverified, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_value_is_an_error() {
        assert!(convert(f64::NAN, Some("g")).is_err());
        assert!(convert(f64::INFINITY, None).is_err());
    }
}
