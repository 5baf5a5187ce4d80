//! Stateless helper utilities shared by the plan builder, sheets and sinks.

use std::collections::BTreeMap;

use rust_xlsxwriter::utility::{column_name_to_number, row_col_to_cell};

use crate::conf::{
    C_PRED_SEPARATOR, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::error::{Result, TableError};

////////////////////////////////////////////////////////////////////////////////
// #region TagParsing

/// Parse a struct-tag string such as `csv:"name" excel:"氏名" warn:"a,b"`.
///
/// Parsing stops silently at the first malformed segment; pairs read before it
/// are kept. Duplicate keys keep their first value.
pub fn parse_struct_tags(raw_tags: &str) -> BTreeMap<String, String> {
    let mut dict_tags = BTreeMap::new();
    let l_chars: Vec<char> = raw_tags.chars().collect();
    let n_len = l_chars.len();
    let mut n_idx = 0usize;

    loop {
        while n_idx < n_len && l_chars[n_idx] == ' ' {
            n_idx += 1;
        }
        if n_idx >= n_len {
            break;
        }

        let n_key_start = n_idx;
        while n_idx < n_len
            && l_chars[n_idx] > ' '
            && l_chars[n_idx] != ':'
            && l_chars[n_idx] != '"'
            && l_chars[n_idx] != '\x7f'
        {
            n_idx += 1;
        }
        if n_idx == n_key_start
            || n_idx + 1 >= n_len
            || l_chars[n_idx] != ':'
            || l_chars[n_idx + 1] != '"'
        {
            break;
        }
        let key: String = l_chars[n_key_start..n_idx].iter().collect();
        n_idx += 2;

        let mut value = String::new();
        let mut if_closed = false;
        while n_idx < n_len {
            match l_chars[n_idx] {
                '"' => {
                    if_closed = true;
                    n_idx += 1;
                    break;
                }
                '\\' if n_idx + 1 < n_len => {
                    value.push(l_chars[n_idx + 1]);
                    n_idx += 2;
                }
                chr => {
                    value.push(chr);
                    n_idx += 1;
                }
            }
        }
        if !if_closed {
            break;
        }

        dict_tags.entry(key).or_insert(value);
    }

    dict_tags
}

/// Split a rule tag value into predicate names.
///
/// Surrounding whitespace is trimmed; empty entries are kept so callers can
/// treat them as explicit opt-outs.
pub fn split_predicate_keys(tag_value: &str) -> impl Iterator<Item = &str> {
    tag_value.split(C_PRED_SEPARATOR).map(str::trim)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellAddressing

/// Convert zero-based `(row, col)` to `A1` notation.
pub fn derive_cell_name(row: usize, col: usize) -> Result<String> {
    validate_cell_bounds(row, col)?;
    let n_row = u32::try_from(row)
        .map_err(|_| TableError::InvalidCell(format!("row index {row} out of range")))?;
    let n_col = u16::try_from(col)
        .map_err(|_| TableError::InvalidCell(format!("column index {col} out of range")))?;
    Ok(row_col_to_cell(n_row, n_col))
}

/// Parse `A1` notation (absolute `$` markers allowed) into zero-based `(row, col)`.
pub fn parse_cell_name(cell: &str) -> Result<(usize, usize)> {
    let c_cell: String = cell.trim().chars().filter(|chr| *chr != '$').collect();
    let n_letters = c_cell
        .chars()
        .take_while(|chr| chr.is_ascii_alphabetic())
        .count();
    let (c_col, c_row) = c_cell.split_at(n_letters);

    if c_col.is_empty() || c_row.is_empty() || !c_row.chars().all(|chr| chr.is_ascii_digit()) {
        return Err(TableError::InvalidCell(format!(
            "cannot parse cell name: '{cell}'"
        )));
    }
    // "XFD" is the last column; longer names cannot be valid.
    if c_col.len() > 3 {
        return Err(TableError::InvalidCell(format!("column overflow: '{cell}'")));
    }

    let n_row = c_row
        .parse::<usize>()
        .map_err(|_| TableError::InvalidCell(format!("row overflow: '{cell}'")))?;
    if n_row == 0 {
        return Err(TableError::InvalidCell(format!(
            "row number must be >= 1: '{cell}'"
        )));
    }

    let row = n_row - 1;
    let col = usize::from(column_name_to_number(&c_col.to_ascii_uppercase()));
    validate_cell_bounds(row, col)?;
    Ok((row, col))
}

/// Reject zero-based coordinates outside worksheet limits.
pub fn validate_cell_bounds(row: usize, col: usize) -> Result<()> {
    if row >= N_NROWS_EXCEL_MAX {
        return Err(TableError::InvalidCell(format!(
            "row index {row} exceeds worksheet limit {N_NROWS_EXCEL_MAX}"
        )));
    }
    if col >= N_NCOLS_EXCEL_MAX {
        return Err(TableError::InvalidCell(format!(
            "column index {col} exceeds worksheet limit {N_NCOLS_EXCEL_MAX}"
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace illegal sheet-name characters, trim, and cap length.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Derive a table name (`<sheet>Table`) restricted to identifier characters.
pub fn derive_table_name(sheet_name: &str) -> String {
    let mut c_name: String = sheet_name
        .chars()
        .map(|chr| if chr.is_alphanumeric() { chr } else { '_' })
        .collect();
    if c_name.chars().next().is_some_and(|chr| chr.is_ascii_digit()) {
        c_name.insert(0, '_');
    }
    format!("{c_name}Table")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
