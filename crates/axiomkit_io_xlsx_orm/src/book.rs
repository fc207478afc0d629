//! Sheet container contract and the in-memory workbook backing it.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::{debug, warn};

use crate::conf::{C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, Result, XlsxOrmError};
use crate::util::cell_name_to_coordinates;

/// Narrow sheet-container surface consumed by the marshalling engine.
pub trait SheetContainer {
    /// Name of the sheet present before any record is written.
    fn default_sheet_name(&self) -> &str;

    /// Index of sheet `name` (case-insensitive), or `None` if absent.
    fn sheet_index(&self, name: &str) -> Option<usize>;

    /// Return the index of sheet `name`, creating it when absent.
    fn create_sheet(&mut self, name: &str) -> Result<usize>;

    /// Store `value` at `cell_name` (`A1` form) on sheet `n_idx_sheet`.
    fn set_cell_value(
        &mut self,
        n_idx_sheet: usize,
        cell_name: &str,
        value: EnumCellValue,
    ) -> Result<()>;

    /// Remove sheet `name`.
    fn delete_sheet(&mut self, name: &str) -> Result<()>;
}

/// One named sheet with sparse cells keyed by 1-based `(row, col)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecBookSheet {
    /// Sheet name as created.
    pub name: String,
    /// Cell values by 1-based `(row, col)`.
    pub cells: BTreeMap<(usize, usize), EnumCellValue>,
}

impl SpecBookSheet {
    /// Highest populated 1-based row, or 0 for an empty sheet.
    pub fn n_rows(&self) -> usize {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    /// Values of one 1-based row, from column 1 to the last populated column.
    pub fn row_values(&self, row: usize) -> Vec<Option<&EnumCellValue>> {
        let n_col_last = self
            .cells
            .range((row, 0)..=(row, usize::MAX))
            .map(|((_, col), _)| *col)
            .max()
            .unwrap_or(0);
        (1..=n_col_last)
            .map(|col| self.cells.get(&(row, col)))
            .collect()
    }
}

/// In-memory workbook, serialized through `rust_xlsxwriter` on save.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxBook {
    l_sheets: Vec<SpecBookSheet>,
}

impl Default for XlsxBook {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxBook {
    /// Create a workbook holding one empty default sheet.
    pub fn new() -> Self {
        Self {
            l_sheets: vec![SpecBookSheet {
                name: C_SHEET_NAME_DEFAULT.to_string(),
                cells: BTreeMap::new(),
            }],
        }
    }

    /// Sheet names in creation order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.l_sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Borrow sheet `name` (case-insensitive).
    pub fn sheet(&self, name: &str) -> Option<&SpecBookSheet> {
        self.sheet_index(name).map(|n_idx| &self.l_sheets[n_idx])
    }

    /// Value at `cell_name` on sheet `sheet_name`.
    pub fn cell_value(&self, sheet_name: &str, cell_name: &str) -> Option<&EnumCellValue> {
        let (n_col, n_row) = cell_name_to_coordinates(cell_name).ok()?;
        self.sheet(sheet_name)?.cells.get(&(n_row, n_col))
    }

    /// Highest populated row of sheet `sheet_name`.
    pub fn n_rows(&self, sheet_name: &str) -> Option<usize> {
        self.sheet(sheet_name).map(SpecBookSheet::n_rows)
    }

    /// Serialize the workbook to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = self.derive_workbook()?;
        workbook.save(path)?;
        debug!(path = %path.display(), n_sheets = self.l_sheets.len(), "saved workbook");
        Ok(())
    }

    /// Serialize the workbook to an in-memory XLSX byte buffer.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        let mut workbook = self.derive_workbook()?;
        let v_bytes = workbook.save_to_buffer()?;
        debug!(n_bytes = v_bytes.len(), n_sheets = self.l_sheets.len(), "serialized workbook");
        Ok(v_bytes)
    }

    fn derive_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        for sheet in &self.l_sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for ((n_row, n_col), value) in &sheet.cells {
                write_cell(worksheet, *n_row, *n_col, value)?;
            }
        }
        Ok(workbook)
    }
}

impl SheetContainer for XlsxBook {
    fn default_sheet_name(&self) -> &str {
        C_SHEET_NAME_DEFAULT
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        let c_name_key = name.to_lowercase();
        self.l_sheets
            .iter()
            .position(|sheet| sheet.name.to_lowercase() == c_name_key)
    }

    fn create_sheet(&mut self, name: &str) -> Result<usize> {
        if let Some(n_idx) = self.sheet_index(name) {
            return Ok(n_idx);
        }
        validate_sheet_name(name)?;
        self.l_sheets.push(SpecBookSheet {
            name: name.to_string(),
            cells: BTreeMap::new(),
        });
        debug!(sheet_name = name, "created sheet");
        Ok(self.l_sheets.len() - 1)
    }

    fn set_cell_value(
        &mut self,
        n_idx_sheet: usize,
        cell_name: &str,
        value: EnumCellValue,
    ) -> Result<()> {
        let (n_col, n_row) = cell_name_to_coordinates(cell_name)?;
        let sheet = self
            .l_sheets
            .get_mut(n_idx_sheet)
            .ok_or(XlsxOrmError::SheetIndexOutOfRange(n_idx_sheet))?;
        sheet.cells.insert((n_row, n_col), value);
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<()> {
        let Some(n_idx) = self.sheet_index(name) else {
            debug!(sheet_name = name, "delete skipped: sheet not found");
            return Ok(());
        };
        if self.l_sheets.len() == 1 {
            warn!(sheet_name = name, "delete skipped: workbook needs at least one sheet");
            return Ok(());
        }
        self.l_sheets.remove(n_idx);
        debug!(sheet_name = name, "deleted sheet");
        Ok(())
    }
}

/// Validate `name` against Excel sheet naming rules.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reject = |reason: String| {
        Err(XlsxOrmError::InvalidSheetName {
            name: name.to_string(),
            reason,
        })
    };

    if name.trim().is_empty() {
        return reject("sheet name must not be blank".to_string());
    }
    if name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
        return reject(format!(
            "sheet name exceeds {N_LEN_EXCEL_SHEET_NAME_MAX} characters"
        ));
    }
    if let Some(c_illegal) = TUP_EXCEL_ILLEGAL.iter().find(|chr| name.contains(**chr)) {
        return reject(format!("sheet name contains illegal character {c_illegal:?}"));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return reject("sheet name must not start or end with an apostrophe".to_string());
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    n_row: usize,
    n_col: usize,
    value: &EnumCellValue,
) -> Result<()> {
    let n_row_idx = cast_row_num(n_row)?;
    let n_col_idx = cast_col_num(n_col)?;
    match value {
        EnumCellValue::String(val) => {
            worksheet.write_string(n_row_idx, n_col_idx, val)?;
        }
        EnumCellValue::Integer(val) => {
            worksheet.write_number(n_row_idx, n_col_idx, *val as f64)?;
        }
        EnumCellValue::Unsigned(val) => {
            worksheet.write_number(n_row_idx, n_col_idx, *val as f64)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean(n_row_idx, n_col_idx, *val)?;
        }
    }
    Ok(())
}

// 1-based coordinates in, 0-based rust_xlsxwriter indices out.
fn cast_row_num(row: usize) -> Result<u32> {
    row.checked_sub(1)
        .and_then(|val| u32::try_from(val).ok())
        .ok_or(XlsxOrmError::CoordinateOutOfRange { col: 1, row })
}

fn cast_col_num(col: usize) -> Result<u16> {
    col.checked_sub(1)
        .and_then(|val| u16::try_from(val).ok())
        .ok_or(XlsxOrmError::CoordinateOutOfRange { col, row: 1 })
}
