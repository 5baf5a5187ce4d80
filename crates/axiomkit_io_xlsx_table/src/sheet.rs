//! Cell-by-cell table writer.

use log::debug;

use crate::conf::C_TABLE_STYLE_DEFAULT;
use crate::error::Result;
use crate::file::TableFile;
use crate::plan::{SpecColumnPlan, build_plan, resolve_cell_style};
use crate::record::TableRecord;
use crate::sink::TableSink;
use crate::spec::{EnumCellValue, SpecSheetOptions, SpecTableRange};
use crate::util::{derive_table_name, parse_cell_name, validate_cell_bounds};

////////////////////////////////////////////////////////////////////////////////
// #region SheetBase

/// State shared by [`Sheet`] and [`crate::stream::StreamSheet`].
#[derive(Debug)]
pub(crate) struct SheetBase<R> {
    pub(crate) name: String,
    pub(crate) row_anchor: usize,
    pub(crate) col_anchor: usize,
    /// Next data row, relative to the anchor (row 0 holds the header).
    pub(crate) row_cursor: usize,
    pub(crate) plan: SpecColumnPlan<R>,
}

impl<R: TableRecord> SheetBase<R> {
    /// Build the plan, parse the anchor, then create the sheet.
    ///
    /// Nothing is written to the sink when the plan or the anchor is invalid.
    pub(crate) fn new<S: TableSink>(
        file: &mut TableFile<S>,
        name: &str,
        options: &SpecSheetOptions,
    ) -> Result<Self> {
        let plan = build_plan::<R>(file.rules(), file.registry().predicates())?;
        let (row_anchor, col_anchor) = parse_cell_name(&options.cell_anchor)?;
        file.sink_mut().add_sheet(name, options.if_active)?;
        debug!(
            "created sheet '{name}' at {}: width={}",
            options.cell_anchor, plan.width
        );

        Ok(Self {
            name: name.to_string(),
            row_anchor,
            col_anchor,
            row_cursor: 1,
            plan,
        })
    }
}

impl<R> SheetBase<R> {
    /// Absolute sheet position of a table-relative cell.
    pub(crate) fn derive_position(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        let row_abs = self.row_anchor.saturating_add(row);
        let col_abs = self.col_anchor.saturating_add(col);
        validate_cell_bounds(row_abs, col_abs)?;
        Ok((row_abs, col_abs))
    }

    pub(crate) fn write_header<S: TableSink>(&self, sink: &mut S) -> Result<()> {
        for (idx_col, header) in self.plan.headers.iter().enumerate() {
            let (row, col) = self.derive_position(0, idx_col)?;
            sink.set_cell_value(&self.name, row, col, &EnumCellValue::String(header.clone()))?;
        }
        Ok(())
    }

    /// Region from the anchor over the header and every written row.
    pub(crate) fn derive_table_range(&self, style_name: &str) -> Result<SpecTableRange> {
        let (row_first, col_first) = self.derive_position(0, 0)?;
        let (row_last, col_last) = self.derive_position(
            usize::max(self.row_cursor.saturating_sub(1), 1),
            usize::max(self.plan.width.saturating_sub(1), 1),
        )?;
        Ok(SpecTableRange {
            name: derive_table_name(&self.name),
            style_name: style_name.to_string(),
            row_first,
            col_first,
            row_last,
            col_last,
            headers: self.plan.headers.clone(),
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Sheet

/// Writes records of type `R` one cell at a time, styling each cell after
/// its value is written.
pub struct Sheet<'f, R, S: TableSink> {
    file: &'f mut TableFile<S>,
    base: SheetBase<R>,
}

impl<'f, R: TableRecord, S: TableSink> Sheet<'f, R, S> {
    /// Create sheet `name` in `file` with the table anchored at `options.cell_anchor`.
    pub fn new(file: &'f mut TableFile<S>, name: &str, options: &SpecSheetOptions) -> Result<Self> {
        let base = SheetBase::new(file, name, options)?;
        Ok(Self { file, base })
    }

    /// Write the header row at the anchor row.
    pub fn set_header(&mut self) -> Result<()> {
        self.base.write_header(self.file.sink_mut())
    }

    /// Write one record at the cursor row and advance the cursor.
    ///
    /// Each cell gets the style of the first matching rule of its column.
    /// On error the row is left partially written and the cursor stays put.
    pub fn set_row(&mut self, record: &R) -> Result<()> {
        let sink = self.file.sink_mut();
        let base = &self.base;

        for (idx_col, idx_field) in base.plan.field_indices().enumerate() {
            let field = record.field_value(idx_field);
            let (row, col) = base.derive_position(base.row_cursor, idx_col)?;
            sink.set_cell_value(&base.name, row, col, &field.value)?;

            if let Some(style_id) = resolve_cell_style(&base.plan.rules_list[idx_col], record, &field)?
            {
                sink.set_cell_style(&base.name, row, col, style_id)?;
            }
        }

        self.base.row_cursor += 1;
        Ok(())
    }

    /// Write records in order, stopping at the first error.
    pub fn set_rows<'a>(&mut self, records: impl IntoIterator<Item = &'a R>) -> Result<()> {
        for record in records {
            self.set_row(record)?;
        }
        Ok(())
    }

    /// Register a table over the header and the rows written so far.
    pub fn add_table(&mut self, style_name: &str) -> Result<()> {
        let table = self.base.derive_table_range(style_name)?;
        self.file.sink_mut().add_table(&self.base.name, &table)
    }

    /// [`Self::add_table`] with `TableStyleMedium6`.
    pub fn add_default_table(&mut self) -> Result<()> {
        self.add_table(C_TABLE_STYLE_DEFAULT)
    }
}

impl<R, S: TableSink> Sheet<'_, R, S> {
    pub fn name(&self) -> &str {
        &self.base.name
    }

    /// Column plan of this sheet.
    pub fn plan(&self) -> &SpecColumnPlan<R> {
        &self.base.plan
    }

    /// Next data row, relative to the anchor.
    pub fn row(&self) -> usize {
        self.base.row_cursor
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
