//! XLSX sink backed by `rust_xlsxwriter`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rust_xlsxwriter::{
    Format, FormatPattern, Table, TableColumn, TableStyle, Workbook, Worksheet,
};

use crate::conf::N_LEN_EXCEL_SHEET_NAME_MAX;

/// Sheet name Excel reserves for change tracking.
const C_SHEET_NAME_RESERVED: &str = "History";

const N_LEN_EXCEL_TABLE_NAME_MAX: usize = 255;
use crate::error::{Result, TableError};
use crate::sink::TableSink;
use crate::spec::{EnumCellValue, EnumFillPattern, SpecCellStyle, SpecStyledCell, SpecTableRange};
use crate::util::{sanitize_sheet_name, validate_cell_bounds};

/// Workbook sink.
///
/// The workbook is buffered in memory until [`Self::save`] is called. Sheet
/// and table names are sanitized and made unique ignoring case; callers keep
/// addressing sheets by the name they asked for.
pub struct XlsxSink {
    workbook: Workbook,
    l_formats: Vec<Format>,
    dict_sheet_names: BTreeMap<String, String>,
    set_sheet_names_existing: BTreeSet<String>,
    set_table_names_existing: BTreeSet<String>,
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxSink {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            l_formats: Vec::new(),
            dict_sheet_names: BTreeMap::new(),
            set_sheet_names_existing: BTreeSet::new(),
            set_table_names_existing: BTreeSet::new(),
        }
    }

    /// Workbook sheet name used for the requested `name`.
    pub fn sheet_name(&self, name: &str) -> Option<&str> {
        self.dict_sheet_names.get(name).map(String::as_str)
    }

    /// Number of registered styles.
    pub fn num_styles(&self) -> usize {
        self.l_formats.len()
    }

    /// Write the workbook to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Serialize the workbook into an in-memory XLSX buffer.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }
}

/// `name`, or `name__N` capped at `n_len_max` chars, unused in `set_existing`.
///
/// `set_existing` holds lowercase names; Excel compares sheet and table names
/// case-insensitively.
fn derive_unique_name(set_existing: &BTreeSet<String>, name: &str, n_len_max: usize) -> String {
    if !set_existing.contains(&name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name.chars().take(usize::max(1, n_len_max - 3)).collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(n_len_max)
            .collect();
        if !set_existing.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

impl TableSink for XlsxSink {
    fn register_style(&mut self, style: &SpecCellStyle) -> Result<usize> {
        self.l_formats.push(derive_rust_xlsx_format(style));
        Ok(self.l_formats.len() - 1)
    }

    fn add_sheet(&mut self, name: &str, if_active: bool) -> Result<()> {
        if self.dict_sheet_names.contains_key(name) {
            return Err(TableError::Sink(format!("sheet already exists: '{name}'")));
        }

        let sheet_name_unique = derive_unique_name(
            &self.set_sheet_names_existing,
            &sanitize_sheet_name(name, "_"),
            N_LEN_EXCEL_SHEET_NAME_MAX,
        );
        if sheet_name_unique.eq_ignore_ascii_case(C_SHEET_NAME_RESERVED) {
            return Err(TableError::Sink(format!(
                "reserved sheet name: '{sheet_name_unique}'"
            )));
        }

        // Validate before the sheet joins the workbook.
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet_name_unique)?;
        if if_active {
            worksheet.set_active(true);
        }
        self.workbook.push_worksheet(worksheet);

        self.set_sheet_names_existing
            .insert(sheet_name_unique.to_lowercase());
        self.dict_sheet_names
            .insert(name.to_string(), sheet_name_unique);
        Ok(())
    }

    fn set_cell_value(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &EnumCellValue,
    ) -> Result<()> {
        let worksheet = derive_worksheet(&mut self.workbook, &self.dict_sheet_names, sheet)?;
        write_cell_with_format(worksheet, row, col, value, None)
    }

    fn set_cell_style(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        style_id: usize,
    ) -> Result<()> {
        let format = derive_format(&self.l_formats, style_id)?;
        let worksheet = derive_worksheet(&mut self.workbook, &self.dict_sheet_names, sheet)?;
        worksheet.set_cell_format(cast_row_num(row)?, cast_col_num(col)?, format)?;
        Ok(())
    }

    fn set_row_batch(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        cells: &[SpecStyledCell],
    ) -> Result<()> {
        let worksheet = derive_worksheet(&mut self.workbook, &self.dict_sheet_names, sheet)?;
        for (n_offset, cell) in cells.iter().enumerate() {
            let format = match cell.style_id {
                Some(style_id) => Some(derive_format(&self.l_formats, style_id)?),
                None => None,
            };
            write_cell_with_format(worksheet, row, col + n_offset, &cell.value, format)?;
        }
        Ok(())
    }

    fn add_table(&mut self, sheet: &str, table: &SpecTableRange) -> Result<()> {
        let l_columns: Vec<TableColumn> = table
            .headers
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let table_name = derive_unique_name(
            &self.set_table_names_existing,
            &table.name,
            N_LEN_EXCEL_TABLE_NAME_MAX,
        );
        let table_xlsx = Table::new()
            .set_name(&table_name)
            .set_style(derive_table_style(&table.style_name)?)
            .set_columns(&l_columns);

        let worksheet = derive_worksheet(&mut self.workbook, &self.dict_sheet_names, sheet)?;
        worksheet.add_table(
            cast_row_num(table.row_first)?,
            cast_col_num(table.col_first)?,
            cast_row_num(table.row_last)?,
            cast_col_num(table.col_last)?,
            &table_xlsx,
        )?;
        self.set_table_names_existing
            .insert(table_name.to_lowercase());
        Ok(())
    }
}

fn derive_worksheet<'a>(
    workbook: &'a mut Workbook,
    dict_sheet_names: &BTreeMap<String, String>,
    sheet: &str,
) -> Result<&'a mut Worksheet> {
    let sheet_name = dict_sheet_names
        .get(sheet)
        .ok_or_else(|| TableError::Sink(format!("unknown sheet: '{sheet}'")))?;
    Ok(workbook.worksheet_from_name(sheet_name)?)
}

fn derive_format(l_formats: &[Format], style_id: usize) -> Result<&Format> {
    l_formats
        .get(style_id)
        .ok_or_else(|| TableError::Sink(format!("unknown style id: {style_id}")))
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: Option<&Format>,
) -> Result<()> {
    let row = cast_row_num(row_idx)?;
    let col = cast_col_num(col_idx)?;
    match (value, format) {
        (EnumCellValue::None, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (EnumCellValue::None, None) => {}
        (EnumCellValue::String(val), Some(format)) => {
            worksheet.write_string_with_format(row, col, val, format)?;
        }
        (EnumCellValue::String(val), None) => {
            worksheet.write_string(row, col, val)?;
        }
        (EnumCellValue::Integer(val), Some(format)) => {
            worksheet.write_number_with_format(row, col, *val as f64, format)?;
        }
        (EnumCellValue::Integer(val), None) => {
            worksheet.write_number(row, col, *val as f64)?;
        }
        (EnumCellValue::Number(val), Some(format)) => {
            worksheet.write_number_with_format(row, col, *val, format)?;
        }
        (EnumCellValue::Number(val), None) => {
            worksheet.write_number(row, col, *val)?;
        }
        (EnumCellValue::Boolean(val), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *val, format)?;
        }
        (EnumCellValue::Boolean(val), None) => {
            worksheet.write_boolean(row, col, *val)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellStyle) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.pattern {
        format = format.set_pattern(derive_format_pattern(val));
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.fg_color {
        format = format.set_foreground_color(val.as_str());
    }

    format
}

fn derive_format_pattern(pattern: EnumFillPattern) -> FormatPattern {
    match pattern {
        EnumFillPattern::None => FormatPattern::None,
        EnumFillPattern::Solid => FormatPattern::Solid,
        EnumFillPattern::MediumGray => FormatPattern::MediumGray,
        EnumFillPattern::DarkGray => FormatPattern::DarkGray,
        EnumFillPattern::LightGray => FormatPattern::LightGray,
        EnumFillPattern::Gray125 => FormatPattern::Gray125,
        EnumFillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}

const TUP_TABLE_STYLES_LIGHT: [TableStyle; 21] = [
    TableStyle::Light1,
    TableStyle::Light2,
    TableStyle::Light3,
    TableStyle::Light4,
    TableStyle::Light5,
    TableStyle::Light6,
    TableStyle::Light7,
    TableStyle::Light8,
    TableStyle::Light9,
    TableStyle::Light10,
    TableStyle::Light11,
    TableStyle::Light12,
    TableStyle::Light13,
    TableStyle::Light14,
    TableStyle::Light15,
    TableStyle::Light16,
    TableStyle::Light17,
    TableStyle::Light18,
    TableStyle::Light19,
    TableStyle::Light20,
    TableStyle::Light21,
];

const TUP_TABLE_STYLES_MEDIUM: [TableStyle; 28] = [
    TableStyle::Medium1,
    TableStyle::Medium2,
    TableStyle::Medium3,
    TableStyle::Medium4,
    TableStyle::Medium5,
    TableStyle::Medium6,
    TableStyle::Medium7,
    TableStyle::Medium8,
    TableStyle::Medium9,
    TableStyle::Medium10,
    TableStyle::Medium11,
    TableStyle::Medium12,
    TableStyle::Medium13,
    TableStyle::Medium14,
    TableStyle::Medium15,
    TableStyle::Medium16,
    TableStyle::Medium17,
    TableStyle::Medium18,
    TableStyle::Medium19,
    TableStyle::Medium20,
    TableStyle::Medium21,
    TableStyle::Medium22,
    TableStyle::Medium23,
    TableStyle::Medium24,
    TableStyle::Medium25,
    TableStyle::Medium26,
    TableStyle::Medium27,
    TableStyle::Medium28,
];

const TUP_TABLE_STYLES_DARK: [TableStyle; 11] = [
    TableStyle::Dark1,
    TableStyle::Dark2,
    TableStyle::Dark3,
    TableStyle::Dark4,
    TableStyle::Dark5,
    TableStyle::Dark6,
    TableStyle::Dark7,
    TableStyle::Dark8,
    TableStyle::Dark9,
    TableStyle::Dark10,
    TableStyle::Dark11,
];

/// Map an Excel table style name (`TableStyleMedium6`, `Light1`, `None`) to [`TableStyle`].
fn derive_table_style(style_name: &str) -> Result<TableStyle> {
    let c_name = style_name.trim();
    let c_name = c_name.strip_prefix("TableStyle").unwrap_or(c_name);
    if c_name.is_empty() || c_name.eq_ignore_ascii_case("none") {
        return Ok(TableStyle::None);
    }

    let l_groups: [(&str, &[TableStyle]); 3] = [
        ("Light", &TUP_TABLE_STYLES_LIGHT),
        ("Medium", &TUP_TABLE_STYLES_MEDIUM),
        ("Dark", &TUP_TABLE_STYLES_DARK),
    ];
    for (prefix, l_styles) in l_groups {
        if let Some(n_raw) = c_name.strip_prefix(prefix)
            && let Ok(n_idx) = n_raw.parse::<usize>()
            && (1..=l_styles.len()).contains(&n_idx)
        {
            return Ok(l_styles[n_idx - 1]);
        }
    }
    Err(TableError::Sink(format!("unknown table style: '{style_name}'")))
}

fn cast_row_num(value: usize) -> Result<u32> {
    validate_cell_bounds(value, 0)?;
    u32::try_from(value).map_err(|_| TableError::InvalidCell(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16> {
    validate_cell_bounds(0, value)?;
    u16::try_from(value)
        .map_err(|_| TableError::InvalidCell(format!("column index overflow: {value}")))
}
