//! Row selection: equality filters, ordering and limits.

use std::cmp::Ordering;

use serde_json::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A conjunction of `column = value` conditions.
///
/// An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Match rows where `column` equals `value`.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(column, value)
    }

    /// Add another equality condition.
    #[must_use]
    pub fn and_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// The conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Whether a JSON row satisfies every condition.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column).is_some_and(|v| values_equal(v, expected)))
    }

    /// Encode as `PostgREST` query pairs (`column=eq.value`).
    pub(crate) fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.conditions
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", scalar_text(value))))
            .collect()
    }
}

/// A select over one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Filter,
    columns: Option<String>,
    order: Option<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    /// Select every row and column.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict rows with `filter`.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Shorthand for a single equality filter.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let filter = self.filter.clone().and_eq(column, value);
        self.filter(filter)
    }

    /// Only return the listed columns (comma separated, `PostgREST` syntax).
    #[must_use]
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Order by a column.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn filter_ref(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub fn order(&self) -> Option<(&str, Order)> {
        self.order.as_ref().map(|(c, o)| (c.as_str(), *o))
    }

    #[must_use]
    pub const fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Encode as `PostgREST` query pairs.
    pub(crate) fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        pairs.extend(self.filter.to_query_pairs());
        if let Some((column, order)) = &self.order {
            pairs.push(("order".to_string(), format!("{column}.{}", order.as_str())));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Apply ordering and limit to rows that already passed the filter.
    pub(crate) fn arrange(&self, mut rows: Vec<Value>) -> Vec<Value> {
        if let Some((column, order)) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(column), b.get(column));
                match order {
                    Order::Ascending => ord,
                    Order::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Text form of a scalar for URL filters (strings unquoted).
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numbers compare by value so `7` matches `7.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Nulls and missing values sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Greater,
        (Some(_), None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_matches_all_conditions() {
        let filter = Filter::eq("id", 7).and_eq("status", "available");
        assert!(filter.matches(&json!({"id": 7, "status": "available"})));
        assert!(!filter.matches(&json!({"id": 7, "status": "pending"})));
        assert!(!filter.matches(&json!({"status": "available"})));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::default().matches(&json!({"anything": 1})));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(Filter::eq("price", 7).matches(&json!({"price": 7.0})));
    }

    #[test]
    fn test_query_pairs() {
        let query = Query::all()
            .eq("user_id", "abc")
            .order_by("id", Order::Ascending)
            .limit(1);
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "id.asc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_with_columns_and_bool() {
        let query = Query::all()
            .columns("id,status")
            .filter(Filter::eq("available", true));
        let pairs = query.to_query_pairs();
        assert_eq!(pairs[0], ("select".to_string(), "id,status".to_string()));
        assert_eq!(pairs[1], ("available".to_string(), "eq.true".to_string()));
    }

    #[test]
    fn test_arrange_orders_and_limits() {
        let rows = vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})];
        let query = Query::all().order_by("id", Order::Ascending);
        let ids: Vec<_> = query
            .arrange(rows.clone())
            .iter()
            .map(|r| r["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

        let query = Query::all().order_by("id", Order::Descending).limit(2);
        let ids: Vec<_> = query.arrange(rows).iter().map(|r| r["id"].as_i64()).collect();
        assert_eq!(ids, vec![Some(3), Some(2)]);
    }
}
