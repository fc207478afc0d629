//! Marshalling engine that writes typed records into per-type sheets.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::book::{SheetContainer, XlsxBook};
use crate::spec::{
    EnumCellValue, EnumRecordShape, Result, SheetRecord, SpecMarshalOptions, SpecRecordField,
    XlsxOrmError,
};
use crate::util::{convert_field_value, coordinates_to_cell_name, select_visible_fields};

/// Per-sheet bookkeeping; header presence and data row count are tracked apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SpecSheetState {
    if_header_written: bool,
    n_rows_data: usize,
}

impl SpecSheetState {
    /// 1-based row of the next data record.
    fn row_next_data(&self) -> usize {
        1 + usize::from(self.if_header_written) + self.n_rows_data
    }
}

/// Stateful record writer bound to one sheet container for one run.
///
/// Records are appended in order; [`Self::finish`] writes header rows for
/// declared prototypes without data and drops the unused default sheet.
pub struct XlsxRecordWriter<C: SheetContainer> {
    container: C,
    options: SpecMarshalOptions,
    dict_sheet_states: BTreeMap<String, SpecSheetState>,
    n_records: usize,
}

impl<C: SheetContainer> XlsxRecordWriter<C> {
    /// Create writer over `container` with resolved `options`.
    pub fn new(container: C, options: SpecMarshalOptions) -> Self {
        Self {
            container,
            options,
            dict_sheet_states: BTreeMap::new(),
            n_records: 0,
        }
    }

    /// Append one record as the next data row of its sheet.
    ///
    /// All cell values are converted before the first write, so a failing record
    /// leaves the container untouched.
    pub fn append_record(&mut self, record: Option<&dyn SheetRecord>) -> Result<()> {
        let record = record.ok_or(XlsxOrmError::NilRecord)?;
        let sheet_name = record.sheet_name();
        if sheet_name.is_empty() {
            return Err(XlsxOrmError::EmptySheetName);
        }
        let l_fields = derive_record_fields(record)?;
        let l_visible = select_visible_fields(&l_fields);

        let state = self
            .dict_sheet_states
            .get(&derive_sheet_key(sheet_name))
            .copied()
            .unwrap_or_default();
        let if_write_header = !self.options.if_headless && !state.if_header_written;
        let n_row_data = if if_write_header {
            state.row_next_data() + 1
        } else {
            state.row_next_data()
        };

        let mut l_cells = Vec::with_capacity(l_visible.len());
        for (n_idx_col, (_, field)) in l_visible.iter().enumerate() {
            let cell_name = coordinates_to_cell_name(n_idx_col + 1, n_row_data)?;
            let value = convert_field_value(&field.name, &field.value, &self.options)?;
            l_cells.push((cell_name, value));
        }

        let n_idx_sheet = self.resolve_sheet(sheet_name)?;
        if if_write_header {
            let l_headers: Vec<&str> = l_visible.iter().map(|(header, _)| *header).collect();
            self.write_header(n_idx_sheet, sheet_name, &l_headers)?;
        }
        for (cell_name, value) in l_cells {
            self.container.set_cell_value(n_idx_sheet, &cell_name, value)?;
        }

        self.dict_sheet_states
            .entry(derive_sheet_key(sheet_name))
            .or_default()
            .n_rows_data += 1;
        self.n_records += 1;
        Ok(())
    }

    /// Append every record of `records` in order; stop at the first error.
    pub fn append_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<&'a dyn SheetRecord>>,
    {
        for record in records {
            self.append_record(record)?;
        }
        Ok(())
    }

    /// Complete the run and hand back the container.
    pub fn finish(mut self) -> Result<C> {
        self.write_declared_headers()?;
        self.drop_default_sheet()?;

        info!(
            n_records = self.n_records,
            n_sheets = self.dict_sheet_states.len(),
            "marshal run finished"
        );
        Ok(self.container)
    }

    fn resolve_sheet(&mut self, sheet_name: &str) -> Result<usize> {
        match self.container.sheet_index(sheet_name) {
            Some(n_idx) => Ok(n_idx),
            None => self.container.create_sheet(sheet_name),
        }
    }

    fn write_header(&mut self, n_idx_sheet: usize, sheet_name: &str, headers: &[&str]) -> Result<()> {
        let mut l_cells = Vec::with_capacity(headers.len());
        for (n_idx_col, header) in headers.iter().enumerate() {
            l_cells.push((coordinates_to_cell_name(n_idx_col + 1, 1)?, *header));
        }
        for (cell_name, header) in l_cells {
            self.container.set_cell_value(
                n_idx_sheet,
                &cell_name,
                EnumCellValue::String(header.to_string()),
            )?;
        }

        self.dict_sheet_states
            .entry(derive_sheet_key(sheet_name))
            .or_default()
            .if_header_written = true;
        debug!(sheet_name, n_cols = headers.len(), "wrote header row");
        Ok(())
    }

    fn write_declared_headers(&mut self) -> Result<()> {
        let l_models = self.options.sheet_headers.clone();
        for model in &l_models {
            let sheet_name = model.sheet_name();
            if sheet_name.is_empty() {
                return Err(XlsxOrmError::EmptySheetName);
            }
            let state = self
                .dict_sheet_states
                .get(&derive_sheet_key(sheet_name))
                .copied()
                .unwrap_or_default();
            if state.n_rows_data > 0 || state.if_header_written {
                continue;
            }

            let l_fields = derive_record_fields(model.as_ref())?;
            let l_headers: Vec<&str> = select_visible_fields(&l_fields)
                .into_iter()
                .map(|(header, _)| header)
                .collect();
            let n_idx_sheet = self.resolve_sheet(sheet_name)?;
            self.write_header(n_idx_sheet, sheet_name, &l_headers)?;
        }
        Ok(())
    }

    fn drop_default_sheet(&mut self) -> Result<()> {
        let c_default_key = derive_sheet_key(self.container.default_sheet_name());
        let if_default_used = self.dict_sheet_states.contains_key(&c_default_key)
            || self
                .options
                .sheet_headers
                .iter()
                .any(|model| derive_sheet_key(model.sheet_name()) == c_default_key);
        if if_default_used {
            debug!(sheet_name = %c_default_key, "default sheet kept");
            return Ok(());
        }

        let c_default_name = self.container.default_sheet_name().to_string();
        self.container.delete_sheet(&c_default_name)
    }
}

/// Marshal `records` into `container` under `options`.
pub fn marshal_records_into<'a, C, I>(
    container: C,
    records: I,
    options: &SpecMarshalOptions,
) -> Result<C>
where
    C: SheetContainer,
    I: IntoIterator<Item = Option<&'a dyn SheetRecord>>,
{
    let mut writer = XlsxRecordWriter::new(container, options.clone());
    writer.append_records(records)?;
    writer.finish()
}

/// Marshal `records` into a fresh in-memory workbook.
///
/// ```
/// use axiomkit_io_xlsx_orm::{
///     EnumCellValue, EnumRecordShape, SheetRecord, SpecMarshalOptions, SpecRecordField,
///     marshal_records,
/// };
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl SheetRecord for User {
///     fn sheet_name(&self) -> &str {
///         "users"
///     }
///
///     fn record_shape(&self) -> EnumRecordShape {
///         EnumRecordShape::Fields(vec![
///             SpecRecordField::new("id", &self.id),
///             SpecRecordField::new("name", &self.name).with_header("user name"),
///         ])
///     }
/// }
///
/// let user = User { id: 1, name: "Bar1".to_string() };
/// let book = marshal_records([Some(&user as &dyn SheetRecord)], &SpecMarshalOptions::default())?;
/// assert_eq!(book.sheet_names(), vec!["users"]);
/// assert_eq!(
///     book.cell_value("users", "B1"),
///     Some(&EnumCellValue::String("user name".to_string()))
/// );
/// assert_eq!(book.cell_value("users", "A2"), Some(&EnumCellValue::Integer(1)));
/// # Ok::<(), axiomkit_io_xlsx_orm::XlsxOrmError>(())
/// ```
pub fn marshal_records<'a, I>(records: I, options: &SpecMarshalOptions) -> Result<XlsxBook>
where
    I: IntoIterator<Item = Option<&'a dyn SheetRecord>>,
{
    marshal_records_into(XlsxBook::new(), records, options)
}

/// Marshal `records` and save the workbook to `path`.
pub fn write_xlsx_save_as<'a, P, I>(path: P, records: I, options: &SpecMarshalOptions) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Option<&'a dyn SheetRecord>>,
{
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(XlsxOrmError::EmptyFileName);
    }
    marshal_records(records, options)?.save(path)
}

/// Marshal `records` and return the workbook as XLSX bytes.
pub fn write_xlsx_to_buffer<'a, I>(records: I, options: &SpecMarshalOptions) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Option<&'a dyn SheetRecord>>,
{
    marshal_records(records, options)?.save_to_buffer()
}

fn derive_record_fields(record: &dyn SheetRecord) -> Result<Vec<SpecRecordField>> {
    match record.record_shape() {
        EnumRecordShape::Fields(l_fields) => Ok(l_fields),
        EnumRecordShape::Scalar(category) => Err(XlsxOrmError::UnsupportedRecordShape {
            sheet_name: record.sheet_name().to_string(),
            category,
        }),
    }
}

// Sheet names compare case-insensitively, like the container lookup.
fn derive_sheet_key(sheet_name: &str) -> String {
    sheet_name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::spec::{EnumFieldValue, EnumMarshalOverride, EnumValueCategory};

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("axiomkit_xlsx_orm_test_{n}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    struct User {
        id: i64,
        name: String,
        email: Option<String>,
        score: f64,
        active: bool,
        joined: NaiveDateTime,
    }

    impl SheetRecord for User {
        fn sheet_name(&self) -> &str {
            "users"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(vec![
                SpecRecordField::new("id", &self.id),
                SpecRecordField::new("name", &self.name).with_header("user name"),
                SpecRecordField::new("email", &self.email),
                SpecRecordField::new("score", &self.score),
                SpecRecordField::new("active", &self.active),
                SpecRecordField::new("joined", &self.joined),
            ])
        }
    }

    struct Order {
        id: u64,
        note: String,
        amount: f32,
    }

    impl SheetRecord for Order {
        fn sheet_name(&self) -> &str {
            "orders"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(vec![
                SpecRecordField::new("id", &self.id),
                SpecRecordField::new("note", &self.note).with_header("-"),
                SpecRecordField::new("amount", &self.amount),
            ])
        }
    }

    struct Named {
        sheet: String,
        value: i64,
    }

    impl SheetRecord for Named {
        fn sheet_name(&self) -> &str {
            &self.sheet
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(vec![SpecRecordField::new("value", &self.value)])
        }
    }

    struct Tagged {
        id: i64,
        tags: HashMap<String, String>,
    }

    impl SheetRecord for Tagged {
        fn sheet_name(&self) -> &str {
            "tagged"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(vec![
                SpecRecordField::new("id", &self.id),
                SpecRecordField::new("tags", &self.tags),
            ])
        }
    }

    struct Address;

    struct Customer {
        id: i64,
        _address: Address,
    }

    impl SheetRecord for Customer {
        fn sheet_name(&self) -> &str {
            "customers"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(vec![
                SpecRecordField::new("id", &self.id),
                SpecRecordField {
                    name: "address".to_string(),
                    header: None,
                    value: EnumFieldValue::unsupported::<Address>(EnumValueCategory::Struct),
                },
            ])
        }
    }

    struct Counter(i64);

    impl SheetRecord for Counter {
        fn sheet_name(&self) -> &str {
            "counter"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Scalar(EnumValueCategory::Int)
        }
    }

    struct Wide {
        l_values: Vec<i64>,
    }

    impl SheetRecord for Wide {
        fn sheet_name(&self) -> &str {
            "wide"
        }

        fn record_shape(&self) -> EnumRecordShape {
            EnumRecordShape::Fields(
                self.l_values
                    .iter()
                    .enumerate()
                    .map(|(n_idx, val)| SpecRecordField::new(format!("c{}", n_idx + 1), val))
                    .collect(),
            )
        }
    }

    fn make_user(id: i64, email: Option<&str>) -> User {
        User {
            id,
            name: format!("Bar{id}"),
            email: email.map(str::to_string),
            score: 1.1,
            active: id % 2 == 1,
            joined: NaiveDate::from_ymd_opt(2024, 1, 2)
                .expect("date")
                .and_hms_opt(3, 4, 5)
                .expect("time"),
        }
    }

    fn text(val: &str) -> EnumCellValue {
        EnumCellValue::String(val.to_string())
    }

    #[test]
    fn test_marshal_writes_header_and_rows_in_order() {
        let user_1 = make_user(1, Some("a@b.c"));
        let user_2 = make_user(2, None);
        let book = marshal_records(
            [Some(&user_1 as &dyn SheetRecord), Some(&user_2)],
            &SpecMarshalOptions::default(),
        )
        .expect("marshal");

        assert_eq!(book.sheet_names(), vec!["users"]);
        assert_eq!(book.n_rows("users"), Some(3));
        assert_eq!(book.cell_value("users", "A1"), Some(&text("id")));
        assert_eq!(book.cell_value("users", "B1"), Some(&text("user name")));
        assert_eq!(book.cell_value("users", "F1"), Some(&text("joined")));
        assert_eq!(book.cell_value("users", "A2"), Some(&EnumCellValue::Integer(1)));
        assert_eq!(book.cell_value("users", "B2"), Some(&text("Bar1")));
        assert_eq!(book.cell_value("users", "C2"), Some(&text("a@b.c")));
        assert_eq!(book.cell_value("users", "D2"), Some(&text("1.10")));
        assert_eq!(book.cell_value("users", "E2"), Some(&EnumCellValue::Boolean(true)));
        assert_eq!(book.cell_value("users", "F2"), Some(&text("2024-01-02 03:04:05")));
        assert_eq!(book.cell_value("users", "A3"), Some(&EnumCellValue::Integer(2)));
        assert_eq!(book.cell_value("users", "C3"), Some(&text("")));
        assert_eq!(book.cell_value("users", "E3"), Some(&EnumCellValue::Boolean(false)));
    }

    #[test]
    fn test_marshal_routes_records_to_sheets_in_first_seen_order() {
        let order = Order {
            id: 7,
            note: "hidden".to_string(),
            amount: 2.5,
        };
        let user = make_user(1, None);
        let book = marshal_records(
            [Some(&order as &dyn SheetRecord), Some(&user), Some(&order)],
            &SpecMarshalOptions::default(),
        )
        .expect("marshal");

        assert_eq!(book.sheet_names(), vec!["orders", "users"]);
        assert_eq!(book.n_rows("orders"), Some(3));
        assert_eq!(book.n_rows("users"), Some(2));
    }

    #[test]
    fn test_skipped_field_consumes_no_column() {
        let order = Order {
            id: 7,
            note: "hidden".to_string(),
            amount: 2.5,
        };
        let book = marshal_records([Some(&order as &dyn SheetRecord)], &SpecMarshalOptions::default())
            .expect("marshal");

        let sheet = book.sheet("orders").expect("sheet");
        assert_eq!(
            sheet.row_values(1),
            vec![Some(&text("id")), Some(&text("amount"))]
        );
        assert_eq!(
            sheet.row_values(2),
            vec![Some(&EnumCellValue::Unsigned(7)), Some(&text("2.50"))]
        );
        assert_eq!(book.cell_value("orders", "C2"), None);
    }

    #[test]
    fn test_headless_writes_data_from_first_row() {
        let options = SpecMarshalOptions::from_overrides([EnumMarshalOverride::Headless]);
        let user = make_user(1, None);
        let book = marshal_records([Some(&user as &dyn SheetRecord)], &options).expect("marshal");

        assert_eq!(book.n_rows("users"), Some(1));
        assert_eq!(book.cell_value("users", "A1"), Some(&EnumCellValue::Integer(1)));
    }

    #[test]
    fn test_overrides_change_cell_rendering() {
        let options = SpecMarshalOptions::from_overrides([
            EnumMarshalOverride::NullValue("-".to_string()),
            EnumMarshalOverride::BoolValueAs {
                true_str: "是".to_string(),
                false_str: "否".to_string(),
            },
            EnumMarshalOverride::IntegerAsString,
            EnumMarshalOverride::FloatPrecision(0),
            EnumMarshalOverride::TimeFormatLayout("%Y/%m/%d".to_string()),
        ]);
        let user_1 = make_user(1, None);
        let user_2 = make_user(2, None);
        let book = marshal_records([Some(&user_1 as &dyn SheetRecord), Some(&user_2)], &options)
            .expect("marshal");

        assert_eq!(book.cell_value("users", "A2"), Some(&text("1")));
        assert_eq!(book.cell_value("users", "C2"), Some(&text("-")));
        assert_eq!(book.cell_value("users", "D2"), Some(&text("1")));
        assert_eq!(book.cell_value("users", "E2"), Some(&text("是")));
        assert_eq!(book.cell_value("users", "E3"), Some(&text("否")));
        assert_eq!(book.cell_value("users", "F2"), Some(&text("2024/01/02")));
    }

    #[test]
    fn test_wide_record_reaches_double_letter_columns() {
        let wide = Wide {
            l_values: (1..=27).collect(),
        };
        let book = marshal_records([Some(&wide as &dyn SheetRecord)], &SpecMarshalOptions::default())
            .expect("marshal");

        assert_eq!(book.cell_value("wide", "AA1"), Some(&text("c27")));
        assert_eq!(book.cell_value("wide", "AA2"), Some(&EnumCellValue::Integer(27)));
    }

    #[test]
    fn test_empty_sheet_name_leaves_no_partial_writes() {
        let good = Named {
            sheet: "good".to_string(),
            value: 1,
        };
        let bad = Named {
            sheet: String::new(),
            value: 2,
        };
        let mut writer = XlsxRecordWriter::new(XlsxBook::new(), SpecMarshalOptions::default());
        writer.append_record(Some(&good)).expect("append good");
        let err = writer.append_record(Some(&bad)).expect_err("empty name");
        assert!(matches!(err, XlsxOrmError::EmptySheetName));

        let book = writer.finish().expect("finish");
        assert_eq!(book.sheet_names(), vec!["good"]);
        assert_eq!(book.n_rows("good"), Some(2));
    }

    #[test]
    fn test_unsupported_field_aborts_before_any_cell() {
        let tagged = Tagged {
            id: 1,
            tags: HashMap::new(),
        };
        let mut writer = XlsxRecordWriter::new(XlsxBook::new(), SpecMarshalOptions::default());
        let err = writer.append_record(Some(&tagged)).expect_err("map field");
        match &err {
            XlsxOrmError::UnsupportedFieldType {
                field, category, ..
            } => {
                assert_eq!(field, "tags");
                assert_eq!(category.as_str(), "map");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("map"));

        let book = writer.finish().expect("finish");
        assert!(book.sheet("tagged").is_none());
    }

    #[test]
    fn test_nested_struct_field_is_rejected() {
        let customer = Customer {
            id: 1,
            _address: Address,
        };
        let err = marshal_records(
            [Some(&customer as &dyn SheetRecord)],
            &SpecMarshalOptions::default(),
        )
        .expect_err("struct field");
        assert!(matches!(
            err,
            XlsxOrmError::UnsupportedFieldType {
                category: EnumValueCategory::Struct,
                ..
            }
        ));
    }

    #[test]
    fn test_scalar_and_missing_records_are_rejected() {
        let counter = Counter(3);
        let err = marshal_records(
            [Some(&counter as &dyn SheetRecord)],
            &SpecMarshalOptions::default(),
        )
        .expect_err("scalar record");
        assert!(matches!(
            err,
            XlsxOrmError::UnsupportedRecordShape {
                category: EnumValueCategory::Int,
                ..
            }
        ));
        assert_eq!(counter.0, 3);

        let err = marshal_records([None], &SpecMarshalOptions::default()).expect_err("nil record");
        assert!(matches!(err, XlsxOrmError::NilRecord));
    }

    #[test]
    fn test_declared_prototypes_get_header_only_sheets() {
        let prototype = Order {
            id: 0,
            note: String::new(),
            amount: 0.0,
        };
        let options = SpecMarshalOptions::from_overrides([
            EnumMarshalOverride::SheetHeaders(vec![
                Arc::new(prototype) as Arc<dyn SheetRecord>,
                Arc::new(make_user(0, None)) as Arc<dyn SheetRecord>,
            ]),
            EnumMarshalOverride::Headless,
        ]);
        let user = make_user(1, None);
        let book = marshal_records([Some(&user as &dyn SheetRecord)], &options).expect("marshal");

        assert_eq!(book.sheet_names(), vec!["users", "orders"]);
        assert_eq!(book.n_rows("orders"), Some(1));
        assert_eq!(book.cell_value("orders", "A1"), Some(&text("id")));
        assert_eq!(book.cell_value("orders", "B1"), Some(&text("amount")));
        assert_eq!(book.n_rows("users"), Some(1));
        assert_eq!(book.cell_value("users", "A1"), Some(&EnumCellValue::Integer(1)));
    }

    #[test]
    fn test_default_sheet_dropped_unless_used() {
        let book = marshal_records([], &SpecMarshalOptions::default()).expect("marshal");
        assert_eq!(book.sheet_names(), vec!["Sheet1"]);

        let user = make_user(1, None);
        let book = marshal_records([Some(&user as &dyn SheetRecord)], &SpecMarshalOptions::default())
            .expect("marshal");
        assert_eq!(book.sheet_names(), vec!["users"]);

        let named = Named {
            sheet: "SHEET1".to_string(),
            value: 5,
        };
        let book = marshal_records(
            [Some(&named as &dyn SheetRecord), Some(&user)],
            &SpecMarshalOptions::default(),
        )
        .expect("marshal");
        assert_eq!(book.sheet_names(), vec!["Sheet1", "users"]);
        assert_eq!(book.cell_value("Sheet1", "A2"), Some(&EnumCellValue::Integer(5)));
    }

    #[test]
    fn test_invalid_sheet_name_surfaces_container_error() {
        let named = Named {
            sheet: "a/b".to_string(),
            value: 1,
        };
        let err = marshal_records([Some(&named as &dyn SheetRecord)], &SpecMarshalOptions::default())
            .expect_err("invalid name");
        assert!(matches!(err, XlsxOrmError::InvalidSheetName { .. }));
    }

    #[test]
    fn test_write_xlsx_save_as_writes_zip_file() {
        let tmp = TestDir::new();
        let path = tmp.path().join("users.xlsx");
        let user = make_user(1, Some("a@b.c"));
        write_xlsx_save_as(
            &path,
            [Some(&user as &dyn SheetRecord)],
            &SpecMarshalOptions::default(),
        )
        .expect("save");

        let v_bytes = std::fs::read(&path).expect("read saved file");
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_xlsx_save_as_rejects_empty_path() {
        let err = write_xlsx_save_as("", [], &SpecMarshalOptions::default()).expect_err("empty path");
        assert!(matches!(err, XlsxOrmError::EmptyFileName));
    }

    #[test]
    fn test_write_xlsx_to_buffer_returns_zip_bytes() {
        let user = make_user(1, None);
        let v_bytes = write_xlsx_to_buffer(
            [Some(&user as &dyn SheetRecord)],
            &SpecMarshalOptions::default(),
        )
        .expect("buffer");
        assert!(v_bytes.starts_with(b"PK"));
    }
}
