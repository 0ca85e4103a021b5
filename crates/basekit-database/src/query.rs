//! Pure statement builders for the generic repository.
//!
//! Every function here returns a `sqlx::QueryBuilder` without touching
//! the database, which keeps the SQL-shaping logic unit-testable. Two
//! rules hold throughout:
//!
//! 1. Values enter statements only through `push_bind`.
//! 2. Field names enter SQL text only after passing the identifier
//!    whitelist in [`crate::fields`]. Filter maps silently drop invalid
//!    names (a bad filter narrows nothing); structural inputs such as
//!    sort fields, cursor fields, and update maps fail loudly instead.

use std::collections::BTreeMap;

use sqlx::{Postgres, QueryBuilder};

use basekit_core::error::{AppError, ErrorKind};
use basekit_core::result::AppResult;
use basekit_core::traits::{Record, RelationDef};
use basekit_core::types::{FieldValue, SortField, Specification};

use crate::fields::{is_valid_field, validate_aggregate_fn, validate_field};

/// Tracks whether the next condition needs `WHERE` or `AND`.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    has_condition: bool,
}

impl WhereClause {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push the appropriate connective before a condition.
    pub(crate) fn push(&mut self, qb: &mut QueryBuilder<'static, Postgres>) {
        if self.has_condition {
            qb.push(" AND ");
        } else {
            qb.push(" WHERE ");
            self.has_condition = true;
        }
    }
}

/// Bind a dynamic value as a statement parameter.
pub(crate) fn push_bind_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            qb.push_bind(Option::<i64>::None);
        }
        FieldValue::Bool(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Int(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Float(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Uuid(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Timestamp(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Text(v) => {
            qb.push_bind(v.clone());
        }
    }
}

/// Scope reads and mutations to live rows when the record is
/// soft-deletable.
pub(crate) fn push_soft_delete_scope<T: Record>(
    qb: &mut QueryBuilder<'static, Postgres>,
    clause: &mut WhereClause,
) {
    if let Some(marker) = T::soft_delete_column() {
        clause.push(qb);
        qb.push(marker);
        qb.push(" IS NULL");
    }
}

/// Push the shared filter pipeline: equality, range, set-membership, and
/// keyword conditions, in that order.
pub(crate) fn push_filters(
    qb: &mut QueryBuilder<'static, Postgres>,
    clause: &mut WhereClause,
    specs: &Specification,
) {
    for (field, value) in &specs.filters {
        if !is_valid_field(field) {
            continue;
        }
        clause.push(qb);
        qb.push(field.clone());
        if value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_bind_value(qb, value);
        }
    }

    for (field, range) in &specs.range_filters {
        if !is_valid_field(field) {
            continue;
        }
        if let Some(min) = &range.min {
            clause.push(qb);
            qb.push(field.clone());
            qb.push(" >= ");
            push_bind_value(qb, min);
        }
        if let Some(max) = &range.max {
            clause.push(qb);
            qb.push(field.clone());
            qb.push(" <= ");
            push_bind_value(qb, max);
        }
    }

    for (field, values) in &specs.in_filters {
        if !is_valid_field(field) {
            continue;
        }
        clause.push(qb);
        if values.is_empty() {
            // Membership in the empty set matches nothing.
            qb.push("FALSE");
            continue;
        }
        qb.push(field.clone());
        qb.push(" IN (");
        let mut separated = qb.separated(", ");
        for value in values {
            match value {
                FieldValue::Null => {
                    separated.push_bind(Option::<i64>::None);
                }
                FieldValue::Bool(v) => {
                    separated.push_bind(*v);
                }
                FieldValue::Int(v) => {
                    separated.push_bind(*v);
                }
                FieldValue::Float(v) => {
                    separated.push_bind(*v);
                }
                FieldValue::Uuid(v) => {
                    separated.push_bind(*v);
                }
                FieldValue::Timestamp(v) => {
                    separated.push_bind(*v);
                }
                FieldValue::Text(v) => {
                    separated.push_bind(v.clone());
                }
            }
        }
        qb.push(")");
    }

    if let Some(keyword) = &specs.keyword {
        let fields: Vec<&String> = specs
            .keyword_fields
            .iter()
            .filter(|f| is_valid_field(f))
            .collect();
        if !keyword.is_empty() && !fields.is_empty() {
            let pattern = format!("%{keyword}%");
            clause.push(qb);
            // Parenthesized so the OR group ANDs with the other filters.
            qb.push("(");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push((*field).clone());
                qb.push(" LIKE ");
                qb.push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}

/// Validate a sort expression and push its `ORDER BY` clause.
pub(crate) fn push_sort(
    qb: &mut QueryBuilder<'static, Postgres>,
    sort: &SortField,
) -> AppResult<()> {
    validate_field(&sort.field)?;
    qb.push(" ORDER BY ");
    qb.push(sort.field.clone());
    qb.push(" ");
    qb.push(sort.direction.as_sql());
    Ok(())
}

/// The projection list: validated `select_fields`, or `*` when no usable
/// projection was requested.
fn projection(specs: &Specification) -> String {
    let fields: Vec<&str> = specs
        .select_fields
        .iter()
        .filter(|f| is_valid_field(f))
        .map(String::as_str)
        .collect();
    if fields.is_empty() {
        "*".to_string()
    } else {
        fields.join(", ")
    }
}

/// Whether the specification carries a usable projection.
pub(crate) fn has_projection(specs: &Specification) -> bool {
    specs.select_fields.iter().any(|f| is_valid_field(f))
}

/// `SELECT ... FROM t WHERE ... ORDER BY ... LIMIT .. OFFSET ..` for the
/// offset strategy. A non-positive limit means no `LIMIT` clause.
///
/// Rows are selected through `row_to_json` over a subquery so both full
/// and projected reads decode uniformly via serde.
pub(crate) fn build_offset_query<T: Record>(
    specs: &Specification,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("SELECT row_to_json(sub) FROM (SELECT ");
    qb.push(projection(specs));
    qb.push(" FROM ");
    qb.push(T::table());

    let mut clause = WhereClause::new();
    push_soft_delete_scope::<T>(&mut qb, &mut clause);
    push_filters(&mut qb, &mut clause, specs);

    if let Some(sort) = &specs.sort {
        push_sort(&mut qb, sort)?;
    }

    if specs.limit > 0 {
        qb.push(" LIMIT ");
        qb.push_bind(specs.limit);
    }
    if specs.offset > 0 {
        qb.push(" OFFSET ");
        qb.push_bind(specs.offset);
    }

    qb.push(") sub");
    Ok(qb)
}

/// The keyset-strategy page query. Fetches `limit + 1` rows so the caller
/// can detect a following page without a count.
///
/// The cursor comparison also implies the sort: `<` walks descending,
/// `>` ascending, ordered by the cursor field itself. Ties on non-unique
/// cursor fields can skip rows at page boundaries, so callers should
/// cursor on a unique column.
pub(crate) fn build_keyset_query<T: Record>(
    specs: &Specification,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let cursor_field = specs
        .cursor_field
        .clone()
        .unwrap_or_else(|| T::id_column().to_string());
    validate_field(&cursor_field)?;

    let limit = if specs.limit > 0 { specs.limit } else { 20 };

    // A projected keyset page must still return the cursor field, or the
    // next cursor cannot be derived from the last row.
    let mut selected = projection(specs);
    if selected != "*" && !specs.select_fields.iter().any(|f| *f == cursor_field) {
        selected.push_str(", ");
        selected.push_str(&cursor_field);
    }

    let mut qb = QueryBuilder::new("SELECT row_to_json(sub) FROM (SELECT ");
    qb.push(selected);
    qb.push(" FROM ");
    qb.push(T::table());

    let mut clause = WhereClause::new();
    push_soft_delete_scope::<T>(&mut qb, &mut clause);
    push_filters(&mut qb, &mut clause, specs);

    if let Some(cursor_value) = &specs.cursor_value {
        clause.push(&mut qb);
        qb.push(cursor_field.clone());
        qb.push(" ");
        qb.push(specs.cursor_direction.as_operator());
        qb.push(" ");
        push_bind_value(&mut qb, cursor_value);
    }

    qb.push(" ORDER BY ");
    qb.push(cursor_field);
    qb.push(" ");
    qb.push(specs.cursor_direction.implied_order());
    qb.push(" LIMIT ");
    qb.push_bind(limit + 1);

    qb.push(") sub");
    Ok(qb)
}

/// `SELECT COUNT(*)` under the same conditions as the offset query.
pub(crate) fn build_count_query<T: Record>(
    specs: &Specification,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(T::table());

    let mut clause = WhereClause::new();
    push_soft_delete_scope::<T>(&mut qb, &mut clause);
    push_filters(&mut qb, &mut clause, specs);
    qb
}

/// The side-load fetch for one relation: every related row whose foreign
/// key is in `parent_ids`, as JSON rows.
pub(crate) fn build_relation_query(
    relation: &RelationDef,
    parent_ids: &[FieldValue],
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT row_to_json(sub) FROM (SELECT * FROM ");
    qb.push(relation.table);
    qb.push(" WHERE ");
    qb.push(relation.foreign_key);
    qb.push(" IN (");
    let mut separated = qb.separated(", ");
    for id in parent_ids {
        match id {
            FieldValue::Int(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Uuid(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Text(v) => {
                separated.push_bind(v.clone());
            }
            other => {
                separated.push_bind(other.to_string());
            }
        }
    }
    qb.push(")) sub");
    qb
}

/// `INSERT INTO t (cols) VALUES (..) RETURNING *` for one record.
pub(crate) fn build_insert<T: Record>(record: &T) -> QueryBuilder<'static, Postgres> {
    let values = record.values();

    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(T::table());
    qb.push(" (");
    for (i, (column, _)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    let mut separated = qb.separated(", ");
    for (_, value) in &values {
        match value {
            FieldValue::Null => {
                separated.push_bind(Option::<i64>::None);
            }
            FieldValue::Bool(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Int(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Float(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Uuid(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Timestamp(v) => {
                separated.push_bind(*v);
            }
            FieldValue::Text(v) => {
                separated.push_bind(v.clone());
            }
        }
    }
    qb.push(") RETURNING *");
    qb
}

/// Multi-row `INSERT` for one batch chunk. Column order follows the first
/// record; `Record::values` yields a fixed order so all rows line up.
pub(crate) fn build_insert_batch<T: Record>(records: &[T]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(T::table());
    qb.push(" (");

    let columns: Vec<&'static str> = records
        .first()
        .map(|r| r.values().into_iter().map(|(c, _)| c).collect())
        .unwrap_or_default();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") ");

    qb.push_values(records, |mut row, record| {
        for (_, value) in record.values() {
            match value {
                FieldValue::Null => {
                    row.push_bind(Option::<i64>::None);
                }
                FieldValue::Bool(v) => {
                    row.push_bind(v);
                }
                FieldValue::Int(v) => {
                    row.push_bind(v);
                }
                FieldValue::Float(v) => {
                    row.push_bind(v);
                }
                FieldValue::Uuid(v) => {
                    row.push_bind(v);
                }
                FieldValue::Timestamp(v) => {
                    row.push_bind(v);
                }
                FieldValue::Text(v) => {
                    row.push_bind(v);
                }
            }
        }
    });
    qb
}

/// `UPDATE t SET .. WHERE id = ..` from explicit column/value pairs.
/// Soft-deletable records only update live rows.
pub(crate) fn build_update_by_id<T: Record>(
    id: &FieldValue,
    pairs: &[(&str, FieldValue)],
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE ");
    qb.push(T::table());
    qb.push(" SET ");
    for (i, (column, value)) in pairs.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
        qb.push(" = ");
        push_bind_value(&mut qb, value);
    }
    qb.push(" WHERE ");
    qb.push(T::id_column());
    qb.push(" = ");
    push_bind_value(&mut qb, id);
    if let Some(marker) = T::soft_delete_column() {
        qb.push(" AND ");
        qb.push(marker);
        qb.push(" IS NULL");
    }
    qb
}

/// `UPDATE t SET .. WHERE <conditions>` for bulk field updates.
///
/// SET columns are validated strictly (an invalid target column is a
/// caller bug); condition fields follow the silent-drop rule, but a bulk
/// update with no surviving condition is refused rather than applied to
/// the whole table.
pub(crate) fn build_bulk_update<T: Record>(
    conditions: &BTreeMap<String, FieldValue>,
    fields: &BTreeMap<String, FieldValue>,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    if fields.is_empty() {
        return Err(AppError::new(
            ErrorKind::Validation,
            "Bulk update requires at least one field to set",
        ));
    }
    for column in fields.keys() {
        validate_field(column)?;
    }

    let valid_conditions: Vec<(&String, &FieldValue)> = conditions
        .iter()
        .filter(|(field, _)| is_valid_field(field))
        .collect();
    if valid_conditions.is_empty() {
        return Err(AppError::new(
            ErrorKind::Validation,
            "Bulk update requires at least one condition",
        ));
    }

    let mut qb = QueryBuilder::new("UPDATE ");
    qb.push(T::table());
    qb.push(" SET ");
    for (i, (column, value)) in fields.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column.clone());
        qb.push(" = ");
        push_bind_value(&mut qb, value);
    }

    let mut clause = WhereClause::new();
    push_soft_delete_scope::<T>(&mut qb, &mut clause);
    for (field, value) in valid_conditions {
        clause.push(&mut qb);
        qb.push(field.clone());
        if value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_bind_value(&mut qb, value);
        }
    }
    Ok(qb)
}

/// `INSERT .. ON CONFLICT (..) DO UPDATE SET col = EXCLUDED.col` upsert.
pub(crate) fn build_upsert<T: Record>(
    record: &T,
    conflict_columns: &[String],
    update_columns: &[String],
) -> AppResult<QueryBuilder<'static, Postgres>> {
    if conflict_columns.is_empty() {
        return Err(AppError::new(
            ErrorKind::Validation,
            "Upsert requires at least one conflict column",
        ));
    }
    for column in conflict_columns.iter().chain(update_columns) {
        validate_field(column)?;
    }

    let mut qb = build_insert_batch(std::slice::from_ref(record));
    qb.push(" ON CONFLICT (");
    for (i, column) in conflict_columns.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column.clone());
    }
    qb.push(")");

    if update_columns.is_empty() {
        qb.push(" DO NOTHING");
    } else {
        qb.push(" DO UPDATE SET ");
        for (i, column) in update_columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column.clone());
            qb.push(" = EXCLUDED.");
            qb.push(column.clone());
        }
    }
    qb.push(" RETURNING *");
    Ok(qb)
}

/// `SELECT COALESCE(FN(field), 0)::double precision` under the shared
/// filter pipeline. The cast keeps `SUM`/`AVG` over integer columns
/// decodable as `f64`.
pub(crate) fn build_aggregate<T: Record>(
    function: &str,
    field: &str,
    specs: &Specification,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let function = validate_aggregate_fn(function)?;
    validate_field(field)?;

    let mut qb = QueryBuilder::new("SELECT COALESCE(");
    qb.push(function);
    qb.push("(");
    qb.push(field.to_string());
    qb.push("), 0)::double precision FROM ");
    qb.push(T::table());

    let mut clause = WhereClause::new();
    push_soft_delete_scope::<T>(&mut qb, &mut clause);
    push_filters(&mut qb, &mut clause, specs);
    Ok(qb)
}
