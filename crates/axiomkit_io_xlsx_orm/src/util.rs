//! Stateless helper utilities used by the marshalling kernel.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use crate::conf::{C_HEADER_SKIP, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, EnumFieldValue, EnumFloatFmt, EnumValueCategory, Result, SpecMarshalOptions,
    SpecRecordField, XlsxOrmError,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellCoordinates

/// Convert 1-based `(col, row)` into an `A1` cell name.
///
/// ```
/// use axiomkit_io_xlsx_orm::coordinates_to_cell_name;
///
/// assert_eq!(coordinates_to_cell_name(27, 1).unwrap(), "AA1");
/// ```
pub fn coordinates_to_cell_name(col: usize, row: usize) -> Result<String> {
    if row < 1 || row > N_NROWS_EXCEL_MAX {
        return Err(XlsxOrmError::CoordinateOutOfRange { col, row });
    }
    let c_col_name =
        column_number_to_name(col).map_err(|_| XlsxOrmError::CoordinateOutOfRange { col, row })?;
    Ok(format!("{c_col_name}{row}"))
}

/// Convert a 1-based column number to its letter sequence (`1 -> A`, `27 -> AA`).
pub fn column_number_to_name(col: usize) -> Result<String> {
    if col < 1 || col > N_NCOLS_EXCEL_MAX {
        return Err(XlsxOrmError::CoordinateOutOfRange { col, row: 1 });
    }
    let mut v_letters = Vec::with_capacity(3);
    let mut n_rest = col;
    while n_rest > 0 {
        v_letters.push(b'A' + ((n_rest - 1) % 26) as u8);
        n_rest = (n_rest - 1) / 26;
    }
    v_letters.reverse();
    Ok(v_letters.into_iter().map(char::from).collect())
}

/// Parse an `A1` cell name into 1-based `(col, row)`.
pub fn cell_name_to_coordinates(cell_name: &str) -> Result<(usize, usize)> {
    let n_idx_digits = cell_name
        .find(|chr: char| chr.is_ascii_digit())
        .ok_or_else(|| XlsxOrmError::InvalidCellName(cell_name.to_string()))?;
    let (c_letters, c_digits) = cell_name.split_at(n_idx_digits);

    if c_letters.is_empty()
        || !c_letters.chars().all(|chr| chr.is_ascii_alphabetic())
        || !c_digits.chars().all(|chr| chr.is_ascii_digit())
        || c_digits.starts_with('0')
    {
        return Err(XlsxOrmError::InvalidCellName(cell_name.to_string()));
    }

    let mut n_col = 0usize;
    for byte in c_letters.to_ascii_uppercase().bytes() {
        n_col = n_col
            .checked_mul(26)
            .and_then(|val| val.checked_add((byte - b'A') as usize + 1))
            .ok_or_else(|| XlsxOrmError::InvalidCellName(cell_name.to_string()))?;
    }
    let n_row = c_digits
        .parse::<usize>()
        .map_err(|_| XlsxOrmError::InvalidCellName(cell_name.to_string()))?;

    if n_col > N_NCOLS_EXCEL_MAX || n_row > N_NROWS_EXCEL_MAX {
        return Err(XlsxOrmError::CoordinateOutOfRange {
            col: n_col,
            row: n_row,
        });
    }
    Ok((n_col, n_row))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderDerivation

/// Resolve header text for one field; `None` means the field is skipped.
pub fn derive_header_text(field: &SpecRecordField) -> Option<&str> {
    match field.header.as_deref() {
        Some(C_HEADER_SKIP) => None,
        Some(header) if !header.is_empty() => Some(header),
        _ => Some(&field.name),
    }
}

/// Keep only non-skipped fields, paired with their header text.
pub fn select_visible_fields(fields: &[SpecRecordField]) -> Vec<(&str, &SpecRecordField)> {
    fields
        .iter()
        .filter_map(|field| derive_header_text(field).map(|header| (header, field)))
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FloatFormatting

/// Native width of a float value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFloatBits {
    /// `f32`.
    B32,
    /// `f64`.
    B64,
}

/// Format `x` with format code `fmt` and `precision` at width `bits`.
///
/// Negative `precision` selects the shortest text that round-trips at `bits`.
pub fn format_float(x: f64, fmt: EnumFloatFmt, precision: i32, bits: EnumFloatBits) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x.is_sign_positive() { "+Inf" } else { "-Inf" }.to_string();
    }

    let c_sign = if x.is_sign_negative() { "-" } else { "" };
    let n_abs = x.abs();
    let n_prec = usize::try_from(precision).ok();

    let c_body = match fmt {
        EnumFloatFmt::Fixed => match n_prec {
            Some(prec) => match bits {
                EnumFloatBits::B32 => format!("{:.*}", prec, n_abs as f32),
                EnumFloatBits::B64 => format!("{n_abs:.prec$}"),
            },
            None => match bits {
                EnumFloatBits::B32 => format!("{}", n_abs as f32),
                EnumFloatBits::B64 => format!("{n_abs}"),
            },
        },
        EnumFloatFmt::Exponent | EnumFloatFmt::ExponentUpper => {
            let (l_digits, n_dp) = derive_decimal_digits(n_abs, n_prec.map(|prec| prec + 1), bits);
            let n_prec_e = n_prec.unwrap_or_else(|| l_digits.len().saturating_sub(1));
            render_exponent(&l_digits, n_dp, n_prec_e, fmt == EnumFloatFmt::ExponentUpper)
        }
        EnumFloatFmt::General | EnumFloatFmt::GeneralUpper => {
            let n_prec_g = n_prec.map(|prec| usize::max(prec, 1));
            let (l_digits, n_dp) = derive_decimal_digits(n_abs, n_prec_g, bits);
            render_general(
                &l_digits,
                n_dp,
                n_prec_g,
                fmt == EnumFloatFmt::GeneralUpper,
            )
        }
        EnumFloatFmt::Binary => render_binary(n_abs, bits),
        EnumFloatFmt::Other(code) => return format!("%{code}"),
    };

    format!("{c_sign}{c_body}")
}

/// Decimal digits (trailing zeros trimmed) and decimal point position of `x >= 0`.
///
/// `n_digits` rounds to that many significant digits; `None` yields the shortest
/// digits that round-trip at `bits`.
fn derive_decimal_digits(x: f64, n_digits: Option<usize>, bits: EnumFloatBits) -> (Vec<u8>, i32) {
    let c_sci = match (n_digits, bits) {
        (Some(n), EnumFloatBits::B32) => format!("{:.*e}", n.saturating_sub(1), x as f32),
        (Some(n), EnumFloatBits::B64) => format!("{:.*e}", n.saturating_sub(1), x),
        (None, EnumFloatBits::B32) => format!("{:e}", x as f32),
        (None, EnumFloatBits::B64) => format!("{x:e}"),
    };

    let (c_mantissa, c_exp) = c_sci.split_once('e').unwrap_or((c_sci.as_str(), "0"));
    let n_exp: i32 = c_exp.parse().unwrap_or(0);
    let mut l_digits: Vec<u8> = c_mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|byte| byte - b'0')
        .collect();
    while l_digits.last() == Some(&0) {
        l_digits.pop();
    }
    if l_digits.is_empty() {
        return (l_digits, 0);
    }
    (l_digits, n_exp + 1)
}

fn render_exponent(digits: &[u8], dp: i32, prec: usize, if_upper: bool) -> String {
    let mut c_out = String::new();
    c_out.push(char::from(b'0' + digits.first().copied().unwrap_or(0)));
    if prec > 0 {
        c_out.push('.');
        for n_idx in 1..=prec {
            c_out.push(char::from(b'0' + digits.get(n_idx).copied().unwrap_or(0)));
        }
    }

    let n_exp = if digits.is_empty() { 0 } else { dp - 1 };
    c_out.push(if if_upper { 'E' } else { 'e' });
    c_out.push(if n_exp < 0 { '-' } else { '+' });
    let _ = write!(c_out, "{:02}", n_exp.unsigned_abs());
    c_out
}

fn render_fixed(digits: &[u8], dp: i32, prec: usize) -> String {
    let mut c_out = String::new();
    if dp > 0 {
        for n_idx in 0..dp as usize {
            c_out.push(char::from(b'0' + digits.get(n_idx).copied().unwrap_or(0)));
        }
    } else {
        c_out.push('0');
    }
    if prec > 0 {
        c_out.push('.');
        for n_idx in 1..=prec as i32 {
            let n_pos = dp + n_idx - 1;
            let n_digit = if n_pos >= 0 {
                digits.get(n_pos as usize).copied().unwrap_or(0)
            } else {
                0
            };
            c_out.push(char::from(b'0' + n_digit));
        }
    }
    c_out
}

fn render_general(digits: &[u8], dp: i32, prec: Option<usize>, if_upper: bool) -> String {
    let n_nd = digits.len();
    let n_exp = dp - 1;
    let n_eprec = match prec {
        None => 6,
        Some(prec) if prec > n_nd && n_nd as i32 >= dp => n_nd,
        Some(prec) => prec,
    };
    let n_prec = prec.unwrap_or(n_nd);

    if n_exp < -4 || n_exp >= n_eprec as i32 {
        let n_prec_e = usize::min(n_prec, n_nd).saturating_sub(1);
        return render_exponent(digits, dp, n_prec_e, if_upper);
    }

    let n_prec_f = if n_prec as i32 > dp { n_nd } else { n_prec };
    render_fixed(digits, dp, usize::try_from(n_prec_f as i32 - dp).unwrap_or(0))
}

fn render_binary(x: f64, bits: EnumFloatBits) -> String {
    let (n_mantissa, n_exp) = match bits {
        EnumFloatBits::B32 => {
            let n_bits = (x as f32).to_bits();
            let mut n_exp = ((n_bits >> 23) & 0xff) as i32;
            let mut n_mantissa = u64::from(n_bits & ((1 << 23) - 1));
            if n_exp == 0 {
                n_exp = 1;
            } else {
                n_mantissa |= 1 << 23;
            }
            (n_mantissa, n_exp - 127 - 23)
        }
        EnumFloatBits::B64 => {
            let n_bits = x.to_bits();
            let mut n_exp = ((n_bits >> 52) & 0x7ff) as i32;
            let mut n_mantissa = n_bits & ((1 << 52) - 1);
            if n_exp == 0 {
                n_exp = 1;
            } else {
                n_mantissa |= 1 << 52;
            }
            (n_mantissa, n_exp - 1023 - 52)
        }
    };
    format!("{n_mantissa}p{n_exp:+}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Render a date-time with a strftime `layout`.
pub fn format_datetime(value: &DateTime<FixedOffset>, layout: &str) -> Result<String> {
    let mut c_out = String::new();
    write!(c_out, "{}", value.format(layout)).map_err(|_| XlsxOrmError::InvalidTimeFormat {
        layout: layout.to_string(),
    })?;
    Ok(c_out)
}

/// Convert one field value into a cell value under `options`.
///
/// Optional values are unwrapped exactly once; a nested optional is rejected.
pub fn convert_field_value(
    field_name: &str,
    value: &EnumFieldValue,
    options: &SpecMarshalOptions,
) -> Result<EnumCellValue> {
    match value {
        EnumFieldValue::Optional(None) => Ok(EnumCellValue::String(options.null_value_str.clone())),
        EnumFieldValue::Optional(Some(value_inner)) => {
            convert_present_value(field_name, value_inner, options)
        }
        _ => convert_present_value(field_name, value, options),
    }
}

fn convert_present_value(
    field_name: &str,
    value: &EnumFieldValue,
    options: &SpecMarshalOptions,
) -> Result<EnumCellValue> {
    let value_cell = match value {
        EnumFieldValue::Int(val) => {
            if options.if_integer_as_string {
                EnumCellValue::String(val.to_string())
            } else {
                EnumCellValue::Integer(*val)
            }
        }
        EnumFieldValue::UInt(val) => {
            if options.if_integer_as_string {
                EnumCellValue::String(val.to_string())
            } else {
                EnumCellValue::Unsigned(*val)
            }
        }
        EnumFieldValue::String(val) => EnumCellValue::String(val.clone()),
        EnumFieldValue::Bool(val) => match &options.bool_value_strs {
            Some(strs) => EnumCellValue::String(if *val {
                strs.true_str.clone()
            } else {
                strs.false_str.clone()
            }),
            None => EnumCellValue::Boolean(*val),
        },
        EnumFieldValue::Float32(val) => EnumCellValue::String(format_float(
            f64::from(*val),
            options.float_fmt,
            options.float_precision,
            EnumFloatBits::B32,
        )),
        EnumFieldValue::Float64(val) => EnumCellValue::String(format_float(
            *val,
            options.float_fmt,
            options.float_precision,
            EnumFloatBits::B64,
        )),
        EnumFieldValue::DateTime(val) => {
            EnumCellValue::String(format_datetime(val, &options.time_format_layout)?)
        }
        EnumFieldValue::Optional(_) => {
            return Err(XlsxOrmError::UnsupportedFieldType {
                field: field_name.to_string(),
                category: EnumValueCategory::Optional,
                type_name: "Option<Option<_>>",
            });
        }
        EnumFieldValue::Unsupported {
            category,
            type_name,
        } => {
            return Err(XlsxOrmError::UnsupportedFieldType {
                field: field_name.to_string(),
                category: *category,
                type_name,
            });
        }
    };
    Ok(value_cell)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
