//! The paginated result envelope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::value::FieldValue;

/// One page of records plus paging metadata.
///
/// `total` is only computed by the offset strategy; the keyset strategy
/// reports `None` because it deliberately avoids a full count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The records on this page, in sort order.
    pub data: Vec<T>,
    /// Total matching rows, or `None` when not computed (keyset mode).
    pub total: Option<i64>,
    /// Whether more pages follow this one.
    pub has_more: bool,
    /// Opaque cursor for the next page (keyset mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<FieldValue>,
    /// Side-loaded relation rows, keyed by relation name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub related: HashMap<String, Vec<serde_json::Value>>,
}

impl<T> Page<T> {
    /// Build an offset-strategy page.
    pub fn offset(data: Vec<T>, total: i64, has_more: bool) -> Self {
        Self {
            data,
            total: Some(total),
            has_more,
            next_cursor: None,
            related: HashMap::new(),
        }
    }

    /// Build a keyset-strategy page.
    pub fn keyset(data: Vec<T>, has_more: bool, next_cursor: Option<FieldValue>) -> Self {
        Self {
            data,
            total: None,
            has_more,
            next_cursor,
            related: HashMap::new(),
        }
    }

    /// Whether the page carries no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_page_has_total() {
        let page = Page::offset(vec![1, 2, 3], 10, true);
        assert_eq!(page.total, Some(10));
        assert!(page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_keyset_page_total_not_computed() {
        let page = Page::keyset(vec![1, 2], true, Some(FieldValue::Int(2)));
        assert_eq!(page.total, None);
        assert_eq!(page.next_cursor, Some(FieldValue::Int(2)));
    }

    #[test]
    fn test_keyset_serializes_without_total_sentinel() {
        let page = Page::keyset(vec![1], false, None);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], serde_json::Value::Null);
        assert!(json.get("next_cursor").is_none());
        assert!(json.get("related").is_none());
    }
}
