//! The declarative query specification shared by every record type.
//!
//! A [`Specification`] is owned by the caller and read-only to the
//! repository: it names what to search, filter, project, sort, and how to
//! paginate. Filter maps are `BTreeMap`s so the generated SQL text is
//! deterministic for a given specification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::sorting::SortField;
use super::value::FieldValue;

/// Default page size when none is given.
const DEFAULT_LIMIT: i64 = 20;

/// Direction of the keyset cursor comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// `cursor_field < cursor_value` — pages walk descending order.
    Lt,
    /// `cursor_field > cursor_value` — pages walk ascending order.
    Gt,
}

impl Default for CursorDirection {
    fn default() -> Self {
        Self::Lt
    }
}

impl CursorDirection {
    /// The SQL comparison operator for this direction.
    pub fn as_operator(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }

    /// The sort keyword that keeps page order consistent with the cursor.
    pub fn implied_order(&self) -> &'static str {
        match self {
            Self::Lt => "DESC",
            Self::Gt => "ASC",
        }
    }
}

/// A pair of optional range bounds.
///
/// Absence of a bound means "no constraint on this side" — it is never
/// collapsed into a bound of zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Inclusive lower bound (`field >= min`), if any.
    pub min: Option<FieldValue>,
    /// Inclusive upper bound (`field <= max`), if any.
    pub max: Option<FieldValue>,
}

impl RangeFilter {
    /// Constrain both sides.
    pub fn between(min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    /// Constrain the lower side only.
    pub fn at_least(min: impl Into<FieldValue>) -> Self {
        Self {
            min: Some(min.into()),
            max: None,
        }
    }

    /// Constrain the upper side only.
    pub fn at_most(max: impl Into<FieldValue>) -> Self {
        Self {
            min: None,
            max: Some(max.into()),
        }
    }
}

/// Declarative search/filter/pagination request for one repository call.
///
/// At most one pagination mode is active at evaluation time: `use_keyset`
/// selects the strategy, and the offset fields are ignored under keyset
/// (and vice versa).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    /// Keyword to search for across `keyword_fields`.
    pub keyword: Option<String>,
    /// Fields searched with `LIKE '%keyword%'`.
    pub keyword_fields: Vec<String>,
    /// Relations to eager-load, each as one separate fetch.
    pub relations: Vec<String>,
    /// Equality filters: `field = value`, AND-combined.
    pub filters: BTreeMap<String, FieldValue>,
    /// Range filters: `field >= min AND field <= max`.
    pub range_filters: BTreeMap<String, RangeFilter>,
    /// Set-membership filters: `field IN (...)`.
    pub in_filters: BTreeMap<String, Vec<FieldValue>>,
    /// Projection: explicit field list, empty means all fields.
    pub select_fields: Vec<String>,
    /// Sort expression.
    pub sort: Option<SortField>,
    /// Page size; `<= 0` means unbounded (offset mode only).
    pub limit: i64,
    /// Rows to skip (offset mode only).
    pub offset: i64,
    /// Select the keyset strategy instead of offset.
    pub use_keyset: bool,
    /// Cursor field (keyset mode). Falls back to the record's identity
    /// field when unset.
    pub cursor_field: Option<String>,
    /// Cursor value of the last row of the previous page, if any.
    pub cursor_value: Option<FieldValue>,
    /// Cursor comparison direction.
    pub cursor_direction: CursorDirection,
}

impl Default for Specification {
    fn default() -> Self {
        Self {
            keyword: None,
            keyword_fields: Vec::new(),
            relations: Vec::new(),
            filters: BTreeMap::new(),
            range_filters: BTreeMap::new(),
            in_filters: BTreeMap::new(),
            select_fields: Vec::new(),
            sort: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
            use_keyset: false,
            cursor_field: None,
            cursor_value: None,
            cursor_direction: CursorDirection::default(),
        }
    }
}

impl Specification {
    /// Create a specification with safe defaults (offset mode, limit 20).
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for `keyword` across the given fields.
    pub fn keyword<I, S>(mut self, keyword: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword = Some(keyword.into());
        self.keyword_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Eager-load the named relation.
    pub fn relation(mut self, name: impl Into<String>) -> Self {
        self.relations.push(name.into());
        self
    }

    /// Add an equality filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Add a range filter.
    pub fn range(mut self, field: impl Into<String>, range: RangeFilter) -> Self {
        self.range_filters.insert(field.into(), range);
        self
    }

    /// Add a set-membership filter.
    pub fn within<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.in_filters
            .insert(field.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Project onto an explicit field list.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sort expression.
    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set limit and offset (offset strategy).
    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self.use_keyset = false;
        self
    }

    /// Switch to the keyset strategy on the given cursor field.
    pub fn keyset(mut self, cursor_field: impl Into<String>, direction: CursorDirection) -> Self {
        self.use_keyset = true;
        self.cursor_field = Some(cursor_field.into());
        self.cursor_direction = direction;
        self
    }

    /// Resume keyset iteration after the given cursor value.
    pub fn after(mut self, cursor_value: impl Into<FieldValue>) -> Self {
        self.cursor_value = Some(cursor_value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let specs = Specification::new();
        assert_eq!(specs.limit, 20);
        assert_eq!(specs.offset, 0);
        assert!(!specs.use_keyset);
        assert_eq!(specs.cursor_direction, CursorDirection::Lt);
        assert!(specs.filters.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let specs = Specification::new()
            .keyword("iphone", ["name", "title"])
            .filter("status", "active")
            .range("price", RangeFilter::between(100_i64, 500_i64))
            .within("category_id", [1_i64, 2, 3])
            .keyset("id", CursorDirection::Lt)
            .after(9991_i64);

        assert_eq!(specs.keyword.as_deref(), Some("iphone"));
        assert_eq!(specs.keyword_fields, vec!["name", "title"]);
        assert!(specs.use_keyset);
        assert_eq!(specs.cursor_field.as_deref(), Some("id"));
        assert_eq!(specs.cursor_value, Some(FieldValue::Int(9991)));
        assert_eq!(specs.in_filters["category_id"].len(), 3);
    }

    #[test]
    fn test_range_bounds_are_independent() {
        let lower_only = RangeFilter::at_least(4_i64);
        assert!(lower_only.min.is_some());
        assert!(lower_only.max.is_none());

        // A zero bound is a real constraint, distinct from absence.
        let zero_min = RangeFilter::at_least(0_i64);
        assert_eq!(zero_min.min, Some(FieldValue::Int(0)));
    }

    #[test]
    fn test_cursor_direction_sql() {
        assert_eq!(CursorDirection::Lt.as_operator(), "<");
        assert_eq!(CursorDirection::Gt.as_operator(), ">");
        assert_eq!(CursorDirection::Lt.implied_order(), "DESC");
        assert_eq!(CursorDirection::Gt.implied_order(), "ASC");
    }
}
