//! Row-batched table writer.

use crate::conf::C_TABLE_STYLE_DEFAULT;
use crate::error::Result;
use crate::file::TableFile;
use crate::plan::{SpecColumnPlan, resolve_cell_style};
use crate::record::TableRecord;
use crate::sheet::SheetBase;
use crate::sink::TableSink;
use crate::spec::{SpecSheetOptions, SpecStyledCell};

/// Writes records of type `R` as one ordered batch per row.
///
/// Styles are resolved for the whole row before anything is sent to the
/// sink, so a predicate error leaves the row unwritten.
pub struct StreamSheet<'f, R, S: TableSink> {
    file: &'f mut TableFile<S>,
    base: SheetBase<R>,
}

impl<'f, R: TableRecord, S: TableSink> StreamSheet<'f, R, S> {
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
    pub fn set_row(&mut self, record: &R) -> Result<()> {
        let base = &self.base;
        let mut l_cells = Vec::with_capacity(base.plan.width);
        for (idx_col, idx_field) in base.plan.field_indices().enumerate() {
            let field = record.field_value(idx_field);
            let style_id = resolve_cell_style(&base.plan.rules_list[idx_col], record, &field)?;
            l_cells.push(SpecStyledCell {
                value: field.value,
                style_id,
            });
        }

        let (row, col) = base.derive_position(base.row_cursor, 0)?;
        base.derive_position(base.row_cursor, base.plan.width.saturating_sub(1))?;
        self.file
            .sink_mut()
            .set_row_batch(&base.name, row, col, &l_cells)?;

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

impl<R, S: TableSink> StreamSheet<'_, R, S> {
    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn plan(&self) -> &SpecColumnPlan<R> {
        &self.base.plan
    }

    /// Next data row, relative to the anchor.
    pub fn row(&self) -> usize {
        self.base.row_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{C_RULE_TAG_ERROR, C_RULE_TAG_WARN};
    use crate::error::TableError;
    use crate::registry::Registry;
    use crate::sheet::Sheet;
    use crate::sink::MemorySink;
    use crate::testing::{Person, derive_person_registry, derive_persons};

    #[test]
    fn test_stream_sheet_matches_cell_sheet_output() {
        let registry = derive_person_registry();
        let l_persons = derive_persons();

        let mut file_cell = TableFile::new(MemorySink::new(), &registry).expect("file");
        let mut sheet =
            Sheet::<Person, _>::new(&mut file_cell, "people", &SpecSheetOptions::default())
                .expect("sheet");
        sheet.set_header().expect("header");
        sheet.set_rows(&l_persons).expect("rows");

        let mut file_stream = TableFile::new(MemorySink::new(), &registry).expect("file");
        let mut stream =
            StreamSheet::<Person, _>::new(&mut file_stream, "people", &SpecSheetOptions::default())
                .expect("stream");
        stream.set_header().expect("header");
        stream.set_rows(&l_persons).expect("rows");
        assert_eq!(stream.row(), 4);

        let sheet_cell = file_cell.sink().sheet("people").expect("people");
        let sheet_stream = file_stream.sink().sheet("people").expect("people");
        for n_row in 0..4 {
            assert_eq!(
                sheet_cell.row_values(n_row, 0, 5),
                sheet_stream.row_values(n_row, 0, 5)
            );
            assert_eq!(
                sheet_cell.row_styles(n_row, 0, 5),
                sheet_stream.row_styles(n_row, 0, 5)
            );
        }
        assert_eq!(sheet_cell.cnt_row_batches, 0);
        assert_eq!(sheet_stream.cnt_row_batches, 3);
    }

    #[test]
    fn test_stream_sheet_styles_zero_id_and_old_age() {
        let registry = Registry::with_defaults();
        let mut file = TableFile::new(MemorySink::new(), &registry).expect("file");
        let n_warn = file.style_id(C_RULE_TAG_WARN).expect("warn");
        let n_error = file.style_id(C_RULE_TAG_ERROR).expect("error");

        let l_persons = derive_persons();
        let mut stream =
            StreamSheet::<Person, _>::new(&mut file, "s", &SpecSheetOptions::default())
                .expect("stream");
        stream.set_row(&l_persons[2]).expect("row");
        stream.add_default_table().expect("table");

        let memory_sheet = file.sink().sheet("s").expect("s");
        let l_styles = memory_sheet.row_styles(1, 0, 5);
        assert_eq!(l_styles[0], Some(n_error));
        assert_eq!(l_styles[2], Some(n_warn));
        assert_eq!(memory_sheet.tables[0].name, "sTable");
    }

    #[test]
    fn test_stream_sheet_error_writes_nothing_for_row() {
        let registry = Registry::with_defaults();
        registry.register_predicate("zero", |val: i64| val == 0);
        let mut file = TableFile::new(MemorySink::new(), &registry).expect("file");

        let l_persons = derive_persons();
        let mut stream =
            StreamSheet::<Person, _>::new(&mut file, "s", &SpecSheetOptions::default())
                .expect("stream");
        let err = stream.set_row(&l_persons[0]).expect_err("text field");
        assert!(matches!(
            err,
            TableError::InvalidPredicate { ref name, .. } if name == "zero"
        ));
        assert_eq!(stream.row(), 1);

        let memory_sheet = file.sink().sheet("s").expect("s");
        assert!(memory_sheet.cells.is_empty());
        assert_eq!(memory_sheet.cnt_row_batches, 0);
    }

    #[test]
    fn test_built_plan_survives_registry_changes() {
        let registry = Registry::with_defaults();
        let mut file = TableFile::new(MemorySink::new(), &registry).expect("file");

        let l_persons = derive_persons();
        let mut stream =
            StreamSheet::<Person, _>::new(&mut file, "s", &SpecSheetOptions::default())
                .expect("stream");
        registry.clear_predicates();
        stream.set_row(&l_persons[1]).expect("row");
        assert_eq!(stream.row(), 2);

        let err = StreamSheet::<Person, _>::new(&mut file, "t", &SpecSheetOptions::default())
            .err()
            .expect("unknown");
        assert_eq!(err, TableError::UnknownPredicate("zero".to_string()));
        assert!(file.sink().sheet("t").is_none());
    }
}
