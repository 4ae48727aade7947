//! Input parsers: legacy FMS `.par` files and CSV sheet workbooks.

pub mod par;
pub mod sheet;

pub use par::{parse_par_file, ParAircraft};
pub use sheet::parse_workbook;
