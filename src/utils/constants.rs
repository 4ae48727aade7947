//! Conversion constants for the English-unit system the target schema requires.

pub const M_TO_FT: f64 = 3.28084;
pub const M_TO_IN: f64 = 39.3701;
pub const M2_TO_FT2: f64 = 10.7639;
pub const KG_TO_LBS: f64 = 2.20462;
pub const KGM2_TO_SLUGFT2: f64 = 0.73756;
pub const N_TO_LBF: f64 = 0.224809;
pub const LBS_TO_N: f64 = 4.44822;
pub const MPS_TO_KTS: f64 = 1.94384;
pub const MPS_TO_FPS: f64 = 3.28084;
