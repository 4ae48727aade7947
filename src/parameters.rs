//! Parameter records carried through the conversion pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{self, Conversion};
use crate::utils::Result;

/// How directly a parameter was measured versus assumed.
///
/// L1 is a direct measurement from the source file; L2 a theoretical
/// calculation from L1 inputs; L3 a calculation using standard engineering
/// assumptions; L4/L5 inferred from comparable aircraft; L6 a provisional
/// estimate replacing unrealistic source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceLevel {
    L1,
    L2,
    L3,
    L4,
    L5,
    L6,
}

impl fmt::Display for EvidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvidenceLevel::L1 => "L1",
            EvidenceLevel::L2 => "L2",
            EvidenceLevel::L3 => "L3",
            EvidenceLevel::L4 => "L4",
            EvidenceLevel::L5 => "L5",
            EvidenceLevel::L6 => "L6",
        };
        f.write_str(s)
    }
}

/// A single primary value as read from one input cell, after unit
/// conversion. The original value and unit are kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_unit: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// False when the unit symbol was passed through unverified.
    #[serde(default = "default_true")]
    pub unit_verified: bool,
}

fn default_true() -> bool {
    true
}

impl Parameter {
    /// Build a parameter from a raw cell, converting the unit.
    pub fn from_cell(value: f64, unit: Option<&str>, required: bool) -> Result<Self> {
        let conversion = units::convert(value, unit)?;
        let unit_verified = !matches!(conversion, Conversion::Unverified { .. });
        Ok(Parameter {
            value: conversion.value(),
            unit: conversion.unit().map(str::to_string),
            original_value: Some(value),
            original_unit: unit.map(str::to_string),
            required,
            unit_verified,
        })
    }

    /// A parameter already in canonical units.
    pub fn canonical(value: f64, unit: &str) -> Self {
        Parameter {
            value,
            unit: Some(unit.to_string()),
            original_value: None,
            original_unit: None,
            required: false,
            unit_verified: true,
        }
    }
}

/// A quantity computed from primary inputs, tagged with the formula that
/// produced it and the assumptions it leans on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedParameter {
    pub value: f64,
    pub unit: String,
    pub formula: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assumptions: BTreeMap<String, f64>,
    pub uncertainty_percent: u8,
    pub evidence_level: EvidenceLevel,
}

impl DerivedParameter {
    pub fn new(
        value: f64,
        unit: &str,
        formula: &str,
        uncertainty_percent: u8,
        evidence_level: EvidenceLevel,
    ) -> Self {
        DerivedParameter {
            value,
            unit: unit.to_string(),
            formula: formula.to_string(),
            assumptions: BTreeMap::new(),
            uncertainty_percent,
            evidence_level,
        }
    }

    pub fn with_assumption(mut self, name: &str, value: f64) -> Self {
        self.assumptions.insert(name.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cell_converts_and_keeps_originals() {
        let p = Parameter::from_cell(200.0, Some("g"), true).unwrap();
        assert_eq!(p.value, 0.2);
        assert_eq!(p.unit.as_deref(), Some("KG"));
        assert_eq!(p.original_value, Some(200.0));
        assert_eq!(p.original_unit.as_deref(), Some("g"));
        assert!(p.required);
        assert!(p.unit_verified);
    }

    #[test]
    fn unverified_units_are_flagged() {
        let p = Parameter::from_cell(3.0, Some("PSF"), false).unwrap();
        assert_eq!(p.unit.as_deref(), Some("PSF"));
        assert!(!p.unit_verified);
    }

    #[test]
    fn evidence_level_orders_and_displays() {
        assert!(EvidenceLevel::L1 < EvidenceLevel::L6);
        assert_eq!(EvidenceLevel::L3.to_string(), "L3");
    }
}
