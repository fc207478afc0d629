//! `axiomkit_io_xlsx_orm` v1:
//! Typed records to XLSX sheets, one sheet per record type.
//!
//! Architecture:
//! - `conf`   : constants and default presets
//! - `spec`   : record descriptors, options, override directives, errors
//! - `util`   : coordinates, header derivation, value rendering
//! - `book`   : sheet container trait and in-memory workbook
//! - `writer` : marshalling engine and save entry points
pub mod book;
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use book::{SheetContainer, SpecBookSheet, XlsxBook, validate_sheet_name};
pub use conf::{
    C_HEADER_SKIP, C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, derive_default_marshal_options,
};
pub use spec::{
    EnumCellValue, EnumFieldValue, EnumFloatFmt, EnumMarshalOverride, EnumRecordShape,
    EnumValueCategory, Result, SheetRecord, SpecBoolValueStrs, SpecMarshalOptions,
    SpecRecordField, ToFieldValue, XlsxOrmError,
};
pub use util::{
    cell_name_to_coordinates, column_number_to_name, convert_field_value,
    coordinates_to_cell_name, derive_header_text, format_datetime, format_float,
    select_visible_fields, EnumFloatBits,
};
pub use writer::{
    XlsxRecordWriter, marshal_records, marshal_records_into, write_xlsx_save_as,
    write_xlsx_to_buffer,
};
