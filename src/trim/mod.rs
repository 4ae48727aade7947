//! Trim search: finding the (elevator, throttle) pair that holds steady
//! level flight at a target airspeed and altitude.

pub mod engine;
pub mod model;
pub mod search;

pub use engine::{EngineState, FlightDynamics};
pub use model::LongitudinalModel;
pub use search::{
    assess_quality, run_trim_multiple_speeds, TrimQuality, TrimResult, TrimScoring, TrimSearch,
    TrimTarget,
};
