//! Shared table specification models.

use std::collections::BTreeMap;
use std::fmt;

use crate::conf::C_CELL_ANCHOR_DEFAULT;
use crate::util::parse_struct_tags;

////////////////////////////////////////////////////////////////////////////////
// #region CellStyleSpecification

/// Fill pattern of a conditional cell style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumFillPattern {
    /// No fill.
    None,
    /// Solid fill with the background color (default).
    #[default]
    Solid,
    /// 50% gray pattern.
    MediumGray,
    /// 75% gray pattern.
    DarkGray,
    /// 25% gray pattern.
    LightGray,
    /// 12.5% gray pattern.
    Gray125,
    /// 6.25% gray pattern.
    Gray0625,
}

/// Fill-only style descriptor attached to a rule.
///
/// Style descriptors are registered once per output file; cells refer to the
/// resulting handle, never to the descriptor itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellStyle {
    /// Fill pattern.
    pub pattern: Option<EnumFillPattern>,
    /// Background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Pattern foreground color (`#RRGGBB`).
    pub fg_color: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Concrete kind of a record field, after optional indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValueKind {
    /// Text value.
    Text,
    /// Signed integer value.
    Integer,
    /// Floating-point value.
    Float,
    /// Boolean value.
    Boolean,
}

impl EnumValueKind {
    /// Zero (default) value of this kind.
    pub fn zero_value(&self) -> EnumCellValue {
        match self {
            Self::Text => EnumCellValue::String(String::new()),
            Self::Integer => EnumCellValue::Integer(0),
            Self::Float => EnumCellValue::Number(0.0),
            Self::Boolean => EnumCellValue::Boolean(false),
        }
    }
}

impl fmt::Display for EnumValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// Normalized cell value emitted to a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Whether this value equals the default of its own kind. Blank counts as zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(val) => val.is_empty(),
            Self::Integer(val) => *val == 0,
            Self::Number(val) => *val == 0.0,
            Self::Boolean(val) => !*val,
        }
    }
}

/// Value of one record field, with at most one level of optionality.
///
/// `value` is [`EnumCellValue::None`] only when the field is optional and absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFieldValue {
    /// Kind of the concrete (dereferenced) value.
    pub kind: EnumValueKind,
    /// Whether the field is declared as `Option<T>`.
    pub if_optional: bool,
    /// Concrete value, or `None` when an optional field is absent.
    pub value: EnumCellValue,
}

impl SpecFieldValue {
    /// Optional field with no value.
    pub fn is_nil(&self) -> bool {
        self.if_optional && matches!(self.value, EnumCellValue::None)
    }

    /// Absent, or present and equal to the kind's default value.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Concrete value, or the kind's zero value when absent.
    pub fn value_or_zero(&self) -> EnumCellValue {
        match &self.value {
            EnumCellValue::None => self.kind.zero_value(),
            val => val.clone(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RecordSpecification

/// Declarative metadata of one record field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecFieldMeta {
    /// Declared field name (fallback header).
    pub name: String,
    /// Whether the field is externally visible. Private fields never map to columns.
    pub if_exported: bool,
    /// Tag name -> tag value.
    pub tags: BTreeMap<String, String>,
}

impl SpecFieldMeta {
    /// Exported field without tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_exported: true,
            tags: BTreeMap::new(),
        }
    }

    /// Private field; always skipped by the plan builder.
    pub fn private(name: impl Into<String>) -> Self {
        Self {
            if_exported: false,
            ..Self::new(name)
        }
    }

    /// Exported field with tags parsed from a struct-tag string:
    ///
    /// ```
    /// use axiomkit_io_xlsx_table::SpecFieldMeta;
    ///
    /// let meta = SpecFieldMeta::tagged("Age", r#"csv:"age" warn:"IsChild,IsOld""#);
    /// assert_eq!(meta.tag("warn"), "IsChild,IsOld");
    /// ```
    pub fn tagged(name: impl Into<String>, raw_tags: &str) -> Self {
        Self {
            tags: parse_struct_tags(raw_tags),
            ..Self::new(name)
        }
    }

    /// Add or replace one tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Tag value, or `""` when the tag is absent.
    pub fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Shape of a record type as seen by the plan builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRecordShape {
    /// Aggregate with named fields, in declaration order.
    Struct(Vec<SpecFieldMeta>),
    /// Non-aggregate type (carries its type name).
    Scalar(&'static str),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RuleSpecification

/// Registered styling rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRule {
    /// Evaluation rank; higher values are evaluated first.
    pub priority: i64,
    /// Field tag name holding predicate names for this rule.
    pub tag: String,
    /// Style applied when one of the predicates matches.
    pub style: SpecCellStyle,
}

/// Rule whose style has been registered with a concrete sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFileRule {
    /// See [`SpecRule::priority`].
    pub priority: i64,
    /// See [`SpecRule::tag`].
    pub tag: String,
    /// Sink style handle.
    pub style_id: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// One cell of a batched row write.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecStyledCell {
    /// Display value.
    pub value: EnumCellValue,
    /// Resolved style handle; `None` keeps the sink default.
    pub style_id: Option<usize>,
}

/// Table region registered on a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableRange {
    /// Table name.
    pub name: String,
    /// Table style name (e.g. `TableStyleMedium6`).
    pub style_name: String,
    /// Inclusive first row.
    pub row_first: usize,
    /// Inclusive first column.
    pub col_first: usize,
    /// Inclusive last row.
    pub row_last: usize,
    /// Inclusive last column.
    pub col_last: usize,
    /// Column headers, left to right.
    pub headers: Vec<String>,
}

/// Per-sheet creation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetOptions {
    /// Top-left cell of the table (`A1` notation).
    pub cell_anchor: String,
    /// Make the new sheet the active one.
    pub if_active: bool,
}

impl Default for SpecSheetOptions {
    fn default() -> Self {
        Self {
            cell_anchor: C_CELL_ANCHOR_DEFAULT.to_string(),
            if_active: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
