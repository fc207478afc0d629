//! Record, cell-value, option and error models shared by the marshalling kernel.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use thiserror::Error;

use crate::conf::{
    C_FLOAT_FMT_DEFAULT, C_TIME_FORMAT_LAYOUT_DEFAULT, N_FLOAT_PRECISION_DEFAULT,
    derive_default_marshal_options,
};

////////////////////////////////////////////////////////////////////////////////
// #region ValueCategories

/// Closed classification of a field's runtime value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValueCategory {
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Date-time instant.
    DateTime,
    /// Present-or-absent wrapper.
    Optional,
    /// Nested structured value.
    Struct,
    /// Associative container.
    Map,
    /// Growable ordered collection.
    Slice,
    /// Fixed-size array.
    Array,
    /// Function or closure.
    Func,
    /// Channel-like handle.
    Chan,
    /// Type-erased value.
    Any,
    /// Numeric type without a spreadsheet-safe representation (128-bit, complex).
    Unrepresentable,
}

impl EnumValueCategory {
    /// Diagnostic name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::DateTime => "datetime",
            Self::Optional => "optional",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Slice => "slice",
            Self::Array => "array",
            Self::Func => "func",
            Self::Chan => "chan",
            Self::Any => "any",
            Self::Unrepresentable => "unrepresentable",
        }
    }
}

impl fmt::Display for EnumValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldValues

/// Runtime value of one record field, tagged by category.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumFieldValue {
    /// Signed integer of any width up to 64 bits.
    Int(i64),
    /// Unsigned integer of any width up to 64 bits.
    UInt(u64),
    /// Text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// 32-bit float, formatted at its native width.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Date-time instant.
    DateTime(DateTime<FixedOffset>),
    /// Single-level optional; `None` renders as the configured null text.
    Optional(Option<Box<EnumFieldValue>>),
    /// Value outside the spreadsheet-safe surface.
    Unsupported {
        /// Category reported in diagnostics.
        category: EnumValueCategory,
        /// Rust type name of the offending value.
        type_name: &'static str,
    },
}

impl EnumFieldValue {
    /// Build an unsupported marker for type `T`.
    pub fn unsupported<T: ?Sized>(category: EnumValueCategory) -> Self {
        Self::Unsupported {
            category,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Category of this value.
    pub fn category(&self) -> EnumValueCategory {
        match self {
            Self::Int(_) => EnumValueCategory::Int,
            Self::UInt(_) => EnumValueCategory::UInt,
            Self::String(_) => EnumValueCategory::String,
            Self::Bool(_) => EnumValueCategory::Bool,
            Self::Float32(_) => EnumValueCategory::Float32,
            Self::Float64(_) => EnumValueCategory::Float64,
            Self::DateTime(_) => EnumValueCategory::DateTime,
            Self::Optional(_) => EnumValueCategory::Optional,
            Self::Unsupported { category, .. } => *category,
        }
    }
}

/// Conversion of a Rust value into an [`EnumFieldValue`].
pub trait ToFieldValue {
    /// Snapshot `self` as a tagged field value.
    fn to_field_value(&self) -> EnumFieldValue;
}

macro_rules! impl_to_field_value {
    ($variant:ident as $target:ty: $($t:ty),+) => {
        $(
            impl ToFieldValue for $t {
                fn to_field_value(&self) -> EnumFieldValue {
                    EnumFieldValue::$variant(*self as $target)
                }
            }
        )+
    };
}

impl_to_field_value!(Int as i64: i8, i16, i32, i64, isize);
impl_to_field_value!(UInt as u64: u8, u16, u32, u64, usize);

impl ToFieldValue for f32 {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::Float32(*self)
    }
}

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::Float64(*self)
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::Bool(*self)
    }
}

impl ToFieldValue for str {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::String(self.to_string())
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::String(self.clone())
    }
}

impl ToFieldValue for NaiveDateTime {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::DateTime(self.and_utc().fixed_offset())
    }
}

impl<Tz: TimeZone> ToFieldValue for DateTime<Tz> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::DateTime(self.fixed_offset())
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for &T {
    fn to_field_value(&self) -> EnumFieldValue {
        (**self).to_field_value()
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for Box<T> {
    fn to_field_value(&self) -> EnumFieldValue {
        (**self).to_field_value()
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::Optional(
            self.as_ref()
                .map(|value| Box::new(value.to_field_value())),
        )
    }
}

impl ToFieldValue for i128 {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Unrepresentable)
    }
}

impl ToFieldValue for u128 {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Unrepresentable)
    }
}

impl<T> ToFieldValue for Vec<T> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Slice)
    }
}

impl<T> ToFieldValue for [T] {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Slice)
    }
}

impl<T, const N: usize> ToFieldValue for [T; N] {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Array)
    }
}

impl<K, V, S> ToFieldValue for HashMap<K, V, S> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Map)
    }
}

impl<K, V> ToFieldValue for BTreeMap<K, V> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Map)
    }
}

impl<T, S> ToFieldValue for HashSet<T, S> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Map)
    }
}

impl<T> ToFieldValue for BTreeSet<T> {
    fn to_field_value(&self) -> EnumFieldValue {
        EnumFieldValue::unsupported::<Self>(EnumValueCategory::Map)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Records

/// One field descriptor: declared name, optional header override and value.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRecordField {
    /// Declared field name; header fallback.
    pub name: String,
    /// Explicit header text. `Some("-")` drops the field.
    pub header: Option<String>,
    /// Field value snapshot.
    pub value: EnumFieldValue,
}

impl SpecRecordField {
    /// Describe field `name` holding `value`.
    pub fn new<T: ToFieldValue + ?Sized>(name: impl Into<String>, value: &T) -> Self {
        Self {
            name: name.into(),
            header: None,
            value: value.to_field_value(),
        }
    }

    /// Attach an explicit header override.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// Introspectable layout of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRecordShape {
    /// Field-bearing record, fields in declared order.
    Fields(Vec<SpecRecordField>),
    /// Primitive value posing as a record; always rejected.
    Scalar(EnumValueCategory),
}

/// A value that renders as one spreadsheet row on a named sheet.
pub trait SheetRecord {
    /// Destination sheet name; must be non-empty.
    fn sheet_name(&self) -> &str;

    /// Field layout and values of this record.
    fn record_shape(&self) -> EnumRecordShape;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Spreadsheet-safe value accepted by a sheet container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCellValue {
    /// Text cell.
    String(String),
    /// Signed numeric cell.
    Integer(i64),
    /// Unsigned numeric cell.
    Unsigned(u64),
    /// Native boolean cell.
    Boolean(bool),
}

impl EnumCellValue {
    /// Borrow text content, if this is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(val) => Some(val),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MarshalOptions

/// Float-to-text format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumFloatFmt {
    /// `f`: fixed-point, `-ddd.dddd`.
    #[default]
    Fixed,
    /// `e`: `-d.dddde±dd`.
    Exponent,
    /// `E`: `-d.ddddE±dd`.
    ExponentUpper,
    /// `g`: `e` for large exponents, `f` otherwise.
    General,
    /// `G`: `E` for large exponents, `f` otherwise.
    GeneralUpper,
    /// `b`: binary exponent, `-ddddp±ddd`.
    Binary,
    /// Any other code, forwarded verbatim.
    Other(char),
}

impl From<char> for EnumFloatFmt {
    fn from(code: char) -> Self {
        match code {
            'f' => Self::Fixed,
            'e' => Self::Exponent,
            'E' => Self::ExponentUpper,
            'g' => Self::General,
            'G' => Self::GeneralUpper,
            'b' => Self::Binary,
            other => Self::Other(other),
        }
    }
}

impl EnumFloatFmt {
    /// Single-character code of this mode.
    pub fn code(&self) -> char {
        match self {
            Self::Fixed => 'f',
            Self::Exponent => 'e',
            Self::ExponentUpper => 'E',
            Self::General => 'g',
            Self::GeneralUpper => 'G',
            Self::Binary => 'b',
            Self::Other(code) => *code,
        }
    }
}

/// Replacement texts for boolean fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBoolValueStrs {
    /// Text written for `true`.
    pub true_str: String,
    /// Text written for `false`.
    pub false_str: String,
}

/// Run-wide marshalling options. Immutable once a run starts.
#[derive(Clone)]
pub struct SpecMarshalOptions {
    /// strftime layout for date-time fields.
    pub time_format_layout: String,
    /// Float precision; negative means shortest round-trip form.
    pub float_precision: i32,
    /// Float format code.
    pub float_fmt: EnumFloatFmt,
    /// Text written for absent optional fields.
    pub null_value_str: String,
    /// Boolean replacement texts; `None` keeps native booleans.
    pub bool_value_strs: Option<SpecBoolValueStrs>,
    /// Write integers as decimal text (avoids Excel scientific display).
    pub if_integer_as_string: bool,
    /// Suppress header rows for sheets that receive data.
    pub if_headless: bool,
    /// Prototypes whose sheets get a header row even without data.
    pub sheet_headers: Vec<Arc<dyn SheetRecord>>,
}

impl Default for SpecMarshalOptions {
    fn default() -> Self {
        Self {
            time_format_layout: C_TIME_FORMAT_LAYOUT_DEFAULT.to_string(),
            float_precision: N_FLOAT_PRECISION_DEFAULT,
            float_fmt: EnumFloatFmt::from(C_FLOAT_FMT_DEFAULT),
            null_value_str: String::new(),
            bool_value_strs: None,
            if_integer_as_string: false,
            if_headless: false,
            sheet_headers: Vec::new(),
        }
    }
}

impl fmt::Debug for SpecMarshalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l_sheet_headers: Vec<&str> = self
            .sheet_headers
            .iter()
            .map(|model| model.sheet_name())
            .collect();
        f.debug_struct("SpecMarshalOptions")
            .field("time_format_layout", &self.time_format_layout)
            .field("float_precision", &self.float_precision)
            .field("float_fmt", &self.float_fmt)
            .field("null_value_str", &self.null_value_str)
            .field("bool_value_strs", &self.bool_value_strs)
            .field("if_integer_as_string", &self.if_integer_as_string)
            .field("if_headless", &self.if_headless)
            .field("sheet_headers", &l_sheet_headers)
            .finish()
    }
}

/// One override directive applied over the defaults.
#[derive(Clone)]
pub enum EnumMarshalOverride {
    /// Set date-time layout.
    TimeFormatLayout(String),
    /// Set float precision.
    FloatPrecision(i32),
    /// Set float format code.
    FloatFmt(EnumFloatFmt),
    /// Set absent-value text.
    NullValue(String),
    /// Replace declared header prototypes.
    SheetHeaders(Vec<Arc<dyn SheetRecord>>),
    /// Render booleans as text.
    BoolValueAs {
        /// Text for `true`.
        true_str: String,
        /// Text for `false`.
        false_str: String,
    },
    /// Render integers as decimal text.
    IntegerAsString,
    /// Suppress header rows.
    Headless,
}

impl SpecMarshalOptions {
    /// Resolve options from defaults plus `overrides`, applied in order.
    pub fn from_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = EnumMarshalOverride>,
    {
        overrides
            .into_iter()
            .fold(derive_default_marshal_options(), Self::with_override)
    }

    /// Return new options with `directive` applied.
    pub fn with_override(self, directive: EnumMarshalOverride) -> Self {
        match directive {
            EnumMarshalOverride::TimeFormatLayout(layout) => Self {
                time_format_layout: layout,
                ..self
            },
            EnumMarshalOverride::FloatPrecision(precision) => Self {
                float_precision: precision,
                ..self
            },
            EnumMarshalOverride::FloatFmt(fmt) => Self {
                float_fmt: fmt,
                ..self
            },
            EnumMarshalOverride::NullValue(value) => Self {
                null_value_str: value,
                ..self
            },
            EnumMarshalOverride::SheetHeaders(models) => Self {
                sheet_headers: models,
                ..self
            },
            EnumMarshalOverride::BoolValueAs { true_str, false_str } => Self {
                bool_value_strs: Some(SpecBoolValueStrs {
                    true_str,
                    false_str,
                }),
                ..self
            },
            EnumMarshalOverride::IntegerAsString => Self {
                if_integer_as_string: true,
                ..self
            },
            EnumMarshalOverride::Headless => Self {
                if_headless: true,
                ..self
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Crate result alias.
pub type Result<T> = std::result::Result<T, XlsxOrmError>;

/// Terminal failures of a marshalling run or container operation.
#[derive(Debug, Error)]
pub enum XlsxOrmError {
    /// Record declares no destination sheet.
    #[error("record must have a non-empty sheet name")]
    EmptySheetName,

    /// Record slot holds no record.
    #[error("nil record append is not allowed")]
    NilRecord,

    /// Record is not a field-bearing value.
    #[error("record for sheet {sheet_name:?} must be a struct, got {category}")]
    UnsupportedRecordShape {
        sheet_name: String,
        category: EnumValueCategory,
    },

    /// Field value category is outside the conversion table.
    #[error("unsupported type {category} ({type_name}) in field {field:?}")]
    UnsupportedFieldType {
        field: String,
        category: EnumValueCategory,
        type_name: &'static str,
    },

    /// Column or row outside spreadsheet limits.
    #[error("cell coordinates [{col}, {row}] out of range")]
    CoordinateOutOfRange { col: usize, row: usize },

    /// Cell address is not in `A1` form.
    #[error("invalid cell name {0:?}")]
    InvalidCellName(String),

    /// Sheet name rejected by spreadsheet naming rules.
    #[error("invalid sheet name {name:?}: {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// Sheet handle does not refer to an existing sheet.
    #[error("sheet index {0} out of range")]
    SheetIndexOutOfRange(usize),

    /// Date-time layout cannot be rendered.
    #[error("invalid time format layout {layout:?}")]
    InvalidTimeFormat { layout: String },

    /// Output path is empty.
    #[error("file name can not be empty")]
    EmptyFileName,

    /// Workbook serialization failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
