//! Marshalling constants and default preset factories.

use crate::spec::SpecMarshalOptions;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Name of the sheet every fresh workbook starts with.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";
/// Header override that drops a field from both header and data rows.
pub const C_HEADER_SKIP: &str = "-";

/// Default date-time layout (strftime syntax).
pub const C_TIME_FORMAT_LAYOUT_DEFAULT: &str = "%Y-%m-%d %H:%M:%S";
/// Default number of digits after the decimal point for float fields.
pub const N_FLOAT_PRECISION_DEFAULT: i32 = 2;
/// Default float format code (fixed-point).
pub const C_FLOAT_FMT_DEFAULT: char = 'f';

/// Build default marshal options.
pub fn derive_default_marshal_options() -> SpecMarshalOptions {
    SpecMarshalOptions::default()
}
