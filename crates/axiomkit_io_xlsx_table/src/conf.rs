//! Table constants and default preset factories.

use crate::spec::{EnumFillPattern, SpecCellStyle, SpecRule};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Spreadsheet-specific header tag.
pub const C_TAG_EXCEL: &str = "excel";
/// Generic data header tag, consulted when [`C_TAG_EXCEL`] is absent.
pub const C_TAG_CSV: &str = "csv";
/// Header/predicate value meaning "exclude" / "no predicate".
pub const C_TAG_SKIP: &str = "-";
/// Separator between predicate names inside one rule tag.
pub const C_PRED_SEPARATOR: char = ',';

/// Built-in rule tag for warnings.
pub const C_RULE_TAG_WARN: &str = "warn";
/// Built-in rule tag for errors.
pub const C_RULE_TAG_ERROR: &str = "error";
/// Priority of the built-in `warn` rule.
pub const N_PRIORITY_WARN: i64 = 98;
/// Priority of the built-in `error` rule.
pub const N_PRIORITY_ERROR: i64 = 99;

/// Built-in predicate keys.
pub const C_PRED_ALWAYS: &str = "always";
pub const C_PRED_NEVER: &str = "never";
pub const C_PRED_ZERO: &str = "zero";
pub const C_PRED_NOT_ZERO: &str = "notZero";
pub const C_PRED_NIL: &str = "nil";
pub const C_PRED_NOT_NIL: &str = "notNil";

/// Default table style name used by `add_default_table`.
pub const C_TABLE_STYLE_DEFAULT: &str = "TableStyleMedium6";
/// Default top-left cell of a table.
pub const C_CELL_ANCHOR_DEFAULT: &str = "A1";

/// Build the default rule presets: light yellow `warn`, light red `error`.
pub fn derive_default_rules() -> Vec<SpecRule> {
    vec![
        SpecRule {
            priority: N_PRIORITY_WARN,
            tag: C_RULE_TAG_WARN.to_string(),
            style: derive_solid_fill_style("#ffffaa"),
        },
        SpecRule {
            priority: N_PRIORITY_ERROR,
            tag: C_RULE_TAG_ERROR.to_string(),
            style: derive_solid_fill_style("#ffaaaa"),
        },
    ]
}

/// Build a solid background fill style with the given `#RRGGBB` color.
pub fn derive_solid_fill_style(bg_color: &str) -> SpecCellStyle {
    SpecCellStyle {
        pattern: Some(EnumFillPattern::Solid),
        bg_color: Some(bg_color.to_string()),
        ..Default::default()
    }
}
