pub mod config;
pub mod derivation;
pub mod ir;
pub mod parameters;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod trim;
pub mod units;
pub mod utils;
pub mod xml;

pub use config::Assumptions;
pub use derivation::{derive, DerivedSet};
pub use ir::AircraftIr;
pub use parameters::{DerivedParameter, EvidenceLevel, Parameter};
pub use parser::{parse_par_file, parse_workbook, ParAircraft};
pub use pipeline::{build_ir, run_par_pipeline, run_sheet_pipeline, PipelineArtifacts};
pub use trim::{
    run_trim_multiple_speeds, FlightDynamics, LongitudinalModel, TrimQuality, TrimResult,
    TrimScoring, TrimSearch, TrimTarget,
};
pub use utils::{FdmError, Result};
pub use xml::write_fdm_config;
