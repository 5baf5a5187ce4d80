//! `axiomkit_io_xlsx_table` v1:
//! Metadata-driven record -> spreadsheet table writer.
//!
//! Record types describe their fields once (header tags, rule tags); rows are
//! written cell by cell and styled by the first matching rule predicate.
//!
//! Modules:
//! - `conf`      : constants and default presets
//! - `spec`      : specs/models/options
//! - `util`      : pure helper functions (tags, cell names, sheet names)
//! - `error`     : crate error type
//! - `record`    : record description trait and field conversions
//! - `predicate` : predicate shapes and name resolution
//! - `registry`  : rule and predicate registries
//! - `plan`      : column plan builder
//! - `sink`      : output sink interface and in-memory sink
//! - `xlsx`      : `rust_xlsxwriter` sink
//! - `file`      : output file context
//! - `sheet`     : cell-by-cell writer
//! - `stream`    : row-batched writer
pub mod conf;
pub mod error;
pub mod file;
pub mod plan;
pub mod predicate;
pub mod record;
pub mod registry;
pub mod sheet;
pub mod sink;
pub mod spec;
pub mod stream;
pub mod util;
pub mod xlsx;

#[cfg(test)]
mod testing;

pub use conf::{
    C_RULE_TAG_ERROR, C_RULE_TAG_WARN, C_TABLE_STYLE_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, derive_default_rules,
    derive_solid_fill_style,
};
pub use error::{Result, TableError};
pub use file::TableFile;
pub use plan::{SpecColumnPlan, SpecColumnRule, build_plan, count_by_rule};
pub use predicate::{
    EnumArgKind, EnumPredicateArity, EnumResolvedPredicate, FromFieldValue, IntoMethod,
    IntoPredicate, SpecMethod, SpecMethodTable, SpecPredicate,
};
pub use record::{FieldScalar, IntoFieldValue, TableRecord};
pub use registry::{PredicateRegistry, Registry, RuleRegistry, global};
pub use sheet::Sheet;
pub use sink::{MemorySink, SpecMemoryCell, SpecMemorySheet, TableSink};
pub use spec::{
    EnumCellValue, EnumFillPattern, EnumRecordShape, EnumValueKind, SpecCellStyle,
    SpecFieldMeta, SpecFieldValue, SpecFileRule, SpecRule, SpecSheetOptions, SpecStyledCell,
    SpecTableRange,
};
pub use stream::StreamSheet;
pub use util::{derive_cell_name, parse_cell_name, sanitize_sheet_name};
pub use xlsx::XlsxSink;
