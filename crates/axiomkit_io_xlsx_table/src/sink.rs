//! Output sink interface and the in-memory sink.

use std::collections::BTreeMap;

use crate::error::{Result, TableError};
use crate::spec::{EnumCellValue, SpecCellStyle, SpecStyledCell, SpecTableRange};

/// Narrow interface the table engine writes through.
///
/// Coordinates are zero-based absolute sheet positions.
pub trait TableSink {
    /// Register a style descriptor once; cells refer to the returned handle.
    fn register_style(&mut self, style: &SpecCellStyle) -> Result<usize>;

    /// Create a sheet named `name`.
    fn add_sheet(&mut self, name: &str, if_active: bool) -> Result<()>;

    /// Write one cell value with the default style.
    fn set_cell_value(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &EnumCellValue,
    ) -> Result<()>;

    /// Apply a registered style to an already written cell.
    fn set_cell_style(&mut self, sheet: &str, row: usize, col: usize, style_id: usize)
    -> Result<()>;

    /// Write `cells` left to right starting at (`row`, `col`), styles included.
    fn set_row_batch(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        cells: &[SpecStyledCell],
    ) -> Result<()>;

    /// Register a table region.
    fn add_table(&mut self, sheet: &str, table: &SpecTableRange) -> Result<()>;
}

/// One cell held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMemoryCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Style handle; `None` is the default style.
    pub style_id: Option<usize>,
}

/// One sheet held by [`MemorySink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecMemorySheet {
    /// Sheet name.
    pub name: String,
    /// Cells by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecMemoryCell>,
    /// Registered tables.
    pub tables: Vec<SpecTableRange>,
    /// Number of batched row writes received.
    pub cnt_row_batches: usize,
}

impl SpecMemorySheet {
    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecMemoryCell> {
        self.cells.get(&(row, col))
    }

    /// Values of one row from `col_first` over `width` columns (missing cells as blank).
    pub fn row_values(&self, row: usize, col_first: usize, width: usize) -> Vec<EnumCellValue> {
        (col_first..col_first + width)
            .map(|col| {
                self.cell(row, col)
                    .map_or(EnumCellValue::None, |cell| cell.value.clone())
            })
            .collect()
    }

    /// Styles of one row from `col_first` over `width` columns.
    pub fn row_styles(&self, row: usize, col_first: usize, width: usize) -> Vec<Option<usize>> {
        (col_first..col_first + width)
            .map(|col| self.cell(row, col).and_then(|cell| cell.style_id))
            .collect()
    }
}

/// Sink keeping every sheet, cell and style in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    l_styles: Vec<SpecCellStyle>,
    l_sheets: Vec<SpecMemorySheet>,
    idx_sheet_active: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered style descriptor for `style_id`.
    pub fn style(&self, style_id: usize) -> Option<&SpecCellStyle> {
        self.l_styles.get(style_id)
    }

    pub fn styles(&self) -> &[SpecCellStyle] {
        &self.l_styles
    }

    /// Sheet named `name`.
    pub fn sheet(&self, name: &str) -> Option<&SpecMemorySheet> {
        self.l_sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheets(&self) -> &[SpecMemorySheet] {
        &self.l_sheets
    }

    /// Name of the active sheet.
    pub fn active_sheet(&self) -> Option<&str> {
        self.idx_sheet_active
            .and_then(|idx| self.l_sheets.get(idx))
            .map(|sheet| sheet.name.as_str())
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut SpecMemorySheet> {
        self.l_sheets
            .iter_mut()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| TableError::Sink(format!("unknown sheet: '{name}'")))
    }

    fn validate_style_id(&self, style_id: usize) -> Result<()> {
        if style_id < self.l_styles.len() {
            Ok(())
        } else {
            Err(TableError::Sink(format!("unknown style id: {style_id}")))
        }
    }
}

impl TableSink for MemorySink {
    fn register_style(&mut self, style: &SpecCellStyle) -> Result<usize> {
        self.l_styles.push(style.clone());
        Ok(self.l_styles.len() - 1)
    }

    fn add_sheet(&mut self, name: &str, if_active: bool) -> Result<()> {
        if self.sheet(name).is_some() {
            return Err(TableError::Sink(format!("sheet already exists: '{name}'")));
        }
        self.l_sheets.push(SpecMemorySheet {
            name: name.to_string(),
            ..Default::default()
        });
        if if_active {
            self.idx_sheet_active = Some(self.l_sheets.len() - 1);
        }
        Ok(())
    }

    fn set_cell_value(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &EnumCellValue,
    ) -> Result<()> {
        self.sheet_mut(sheet)?.cells.insert(
            (row, col),
            SpecMemoryCell {
                value: value.clone(),
                style_id: None,
            },
        );
        Ok(())
    }

    fn set_cell_style(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        style_id: usize,
    ) -> Result<()> {
        self.validate_style_id(style_id)?;
        self.sheet_mut(sheet)?
            .cells
            .entry((row, col))
            .or_insert(SpecMemoryCell {
                value: EnumCellValue::None,
                style_id: None,
            })
            .style_id = Some(style_id);
        Ok(())
    }

    fn set_row_batch(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        cells: &[SpecStyledCell],
    ) -> Result<()> {
        for style_id in cells.iter().filter_map(|cell| cell.style_id) {
            self.validate_style_id(style_id)?;
        }
        let memory_sheet = self.sheet_mut(sheet)?;
        for (n_offset, cell) in cells.iter().enumerate() {
            memory_sheet.cells.insert(
                (row, col + n_offset),
                SpecMemoryCell {
                    value: cell.value.clone(),
                    style_id: cell.style_id,
                },
            );
        }
        memory_sheet.cnt_row_batches += 1;
        Ok(())
    }

    fn add_table(&mut self, sheet: &str, table: &SpecTableRange) -> Result<()> {
        self.sheet_mut(sheet)?.tables.push(table.clone());
        Ok(())
    }
}
