//! Column plan builder.
//!
//! A plan is computed once per record type and rule snapshot: which fields
//! become columns, their headers, and the ordered predicate chain per column.

use std::fmt;

use log::{debug, trace};

use crate::conf::{C_TAG_CSV, C_TAG_EXCEL, C_TAG_SKIP};
use crate::error::{Result, TableError};
use crate::predicate::{EnumResolvedPredicate, resolve_predicate, verify_by_pred};
use crate::record::TableRecord;
use crate::registry::PredicateRegistry;
use crate::spec::{EnumRecordShape, SpecFieldMeta, SpecFieldValue, SpecFileRule};
use crate::util::split_predicate_keys;

/// One (predicate, style) pair of a column.
pub struct SpecColumnRule<R> {
    /// Predicate name as written in the field tag.
    pub pred_name: String,
    /// Resolved predicate.
    pub pred: EnumResolvedPredicate<R>,
    /// Style handle applied when the predicate matches.
    pub style_id: usize,
}

impl<R> Clone for SpecColumnRule<R> {
    fn clone(&self) -> Self {
        Self {
            pred_name: self.pred_name.clone(),
            pred: self.pred.clone(),
            style_id: self.style_id,
        }
    }
}

impl<R> fmt::Debug for SpecColumnRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecColumnRule")
            .field("pred_name", &self.pred_name)
            .field("pred", &self.pred)
            .field("style_id", &self.style_id)
            .finish()
    }
}

/// Immutable per-type column layout.
pub struct SpecColumnPlan<R> {
    /// Number of columns.
    pub width: usize,
    /// Number of declared fields.
    pub num_field: usize,
    /// Per-field skip flag (`len == num_field`).
    pub skip: Vec<bool>,
    /// Header per column (`len == width`).
    pub headers: Vec<String>,
    /// Predicate chain per column, in rule order (`len == width`).
    pub rules_list: Vec<Vec<SpecColumnRule<R>>>,
}

impl<R> SpecColumnPlan<R> {
    /// Declaration indices of the fields mapped to columns, in column order.
    pub fn field_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.skip
            .iter()
            .enumerate()
            .filter_map(|(idx_field, if_skip)| (!if_skip).then_some(idx_field))
    }

    /// Predicate names per column, in evaluation order.
    pub fn pred_names(&self) -> Vec<Vec<&str>> {
        self.rules_list
            .iter()
            .map(|rules| rules.iter().map(|rule| rule.pred_name.as_str()).collect())
            .collect()
    }
}

impl<R> Clone for SpecColumnPlan<R> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            num_field: self.num_field,
            skip: self.skip.clone(),
            headers: self.headers.clone(),
            rules_list: self.rules_list.clone(),
        }
    }
}

impl<R> fmt::Debug for SpecColumnPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecColumnPlan")
            .field("width", &self.width)
            .field("num_field", &self.num_field)
            .field("skip", &self.skip)
            .field("headers", &self.headers)
            .field("rules_list", &self.rules_list)
            .finish()
    }
}

/// Header of a field, or `None` when the field is excluded.
///
/// The `excel` tag wins over `csv`; with neither, the field name is used.
pub fn derive_field_header(field: &SpecFieldMeta) -> Option<String> {
    if !field.if_exported {
        return None;
    }

    let mut header = field.tag(C_TAG_EXCEL);
    if header.is_empty() {
        header = field.tag(C_TAG_CSV);
    }

    match header {
        "" => Some(field.name.clone()),
        C_TAG_SKIP => None,
        _ => Some(header.to_string()),
    }
}

fn derive_struct_fields<R: TableRecord>() -> Result<Vec<SpecFieldMeta>> {
    match R::shape() {
        EnumRecordShape::Struct(l_fields) => Ok(l_fields),
        EnumRecordShape::Scalar(type_name) => Err(TableError::NotStructType(type_name)),
    }
}

/// Build the column plan of `R` against file rules (already in evaluation order).
///
/// Every predicate name is resolved here; an unresolvable name fails the whole
/// build with [`TableError::UnknownPredicate`]. No predicate is invoked.
pub fn build_plan<R: TableRecord>(
    file_rules: &[SpecFileRule],
    predicates: &PredicateRegistry,
) -> Result<SpecColumnPlan<R>> {
    let l_fields = derive_struct_fields::<R>()?;
    let methods = R::methods();

    let num_field = l_fields.len();
    let mut skip = vec![false; num_field];
    let mut headers = Vec::with_capacity(num_field);
    let mut rules_list = Vec::with_capacity(num_field);

    for (idx_field, field) in l_fields.iter().enumerate() {
        let Some(header) = derive_field_header(field) else {
            skip[idx_field] = true;
            continue;
        };
        headers.push(header);

        let mut l_rules = Vec::new();
        for file_rule in file_rules {
            for key in split_predicate_keys(field.tag(&file_rule.tag)) {
                if let Some(pred) = resolve_predicate(&methods, predicates, key)? {
                    l_rules.push(SpecColumnRule {
                        pred_name: key.to_string(),
                        pred,
                        style_id: file_rule.style_id,
                    });
                }
            }
        }
        rules_list.push(l_rules);
    }

    let width = headers.len();
    debug!(
        "built column plan for {}: width={width} fields={num_field} rules={}",
        std::any::type_name::<R>(),
        rules_list.iter().map(Vec::len).sum::<usize>()
    );

    Ok(SpecColumnPlan {
        width,
        num_field,
        skip,
        headers,
        rules_list,
    })
}

/// Style of the first matching rule in `rules`, or `None`.
///
/// Evaluation stops at the first predicate returning `true`; errors abort.
pub fn resolve_cell_style<R>(
    rules: &[SpecColumnRule<R>],
    record: &R,
    field: &SpecFieldValue,
) -> Result<Option<usize>> {
    for rule in rules {
        if rule.pred.call(&rule.pred_name, record, field)? {
            trace!("predicate '{}' matched, style {}", rule.pred_name, rule.style_id);
            return Ok(Some(rule.style_id));
        }
    }
    Ok(None)
}

/// Count fields of `record` whose `tag` lists at least one predicate that holds.
///
/// Unlike plan building, every declared field is considered, exported or not.
pub fn count_by_rule<R: TableRecord>(
    record: &R,
    tag: &str,
    predicates: &PredicateRegistry,
) -> Result<usize> {
    let l_fields = derive_struct_fields::<R>()?;
    let methods = R::methods();

    let mut cnt = 0usize;
    for (idx_field, field) in l_fields.iter().enumerate() {
        let value = record.field_value(idx_field);
        for key in split_predicate_keys(field.tag(tag)) {
            if verify_by_pred(&methods, predicates, record, &value, key)? {
                cnt += 1;
                break;
            }
        }
    }
    Ok(cnt)
}
