//! Row filters, ordering and limits.
//!
//! Queries render to the PostgREST query-string dialect understood by the
//! remote store, and are evaluated directly by [`MemoryStore`](crate::MemoryStore).

use serde_json::Value;

/// A single row predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column IS true|false|null`
    Is { column: String, value: IsValue },
    /// Any of the `(column, value)` equalities holds.
    AnyEq(Vec<(String, String)>),
    /// `column IN (values)`
    In { column: String, values: Vec<String> },
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    True,
    False,
    Null,
}

impl IsValue {
    fn as_str(self) -> &'static str {
        match self {
            IsValue::True => "true",
            IsValue::False => "false",
            IsValue::Null => "null",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A filtered, ordered and limited selection of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// An empty query matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Require a boolean column to hold `value`.
    pub fn is(mut self, column: impl Into<String>, value: bool) -> Self {
        let value = if value { IsValue::True } else { IsValue::False };
        self.filters.push(Filter::Is {
            column: column.into(),
            value,
        });
        self
    }

    /// Require `column` to be null.
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::Is {
            column: column.into(),
            value: IsValue::Null,
        });
        self
    }

    /// Require at least one of the given equalities to hold.
    pub fn any_eq<C, V>(mut self, pairs: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: ToString,
    {
        let pairs = pairs
            .into_iter()
            .map(|(c, v)| (c.into(), v.to_string()))
            .collect();
        self.filters.push(Filter::AnyEq(pairs));
        self
    }

    /// Require `column` to be one of `values`.
    pub fn within<V: ToString>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Sort ascending by `column`.
    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), Direction::Asc));
        self
    }

    /// Sort descending by `column`.
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), Direction::Desc));
        self
    }

    /// Return at most `n` rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn order(&self) -> Option<(&str, Direction)> {
        self.order.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.limit
    }

    /// Render as REST query-string pairs.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);

        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => {
                    params.push((column.clone(), format!("eq.{}", value)));
                }
                Filter::Is { column, value } => {
                    params.push((column.clone(), format!("is.{}", value.as_str())));
                }
                Filter::AnyEq(pairs) => {
                    let inner = pairs
                        .iter()
                        .map(|(c, v)| format!("{}.eq.{}", c, v))
                        .collect::<Vec<_>>()
                        .join(",");
                    params.push(("or".to_string(), format!("({})", inner)));
                }
                Filter::In { column, values } => {
                    params.push((column.clone(), format!("in.({})", values.join(","))));
                }
            }
        }

        if let Some((column, direction)) = &self.order {
            let dir = match direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", column, dir)));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Whether `row` satisfies every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|filter| filter_matches(filter, row))
    }
}

fn filter_matches(filter: &Filter, row: &Value) -> bool {
    match filter {
        Filter::Eq { column, value } => row.get(column).is_some_and(|v| scalar_eq(v, value)),
        Filter::Is { column, value } => {
            let field = row.get(column).unwrap_or(&Value::Null);
            match value {
                IsValue::True => field == &Value::Bool(true),
                IsValue::False => field == &Value::Bool(false),
                IsValue::Null => field.is_null(),
            }
        }
        Filter::AnyEq(pairs) => pairs
            .iter()
            .any(|(c, v)| row.get(c).is_some_and(|field| scalar_eq(field, v))),
        Filter::In { column, values } => row
            .get(column)
            .is_some_and(|field| values.iter().any(|v| scalar_eq(field, v))),
    }
}

/// Compare a JSON scalar against its query-string rendering.
pub(crate) fn scalar_eq(field: &Value, expected: &str) -> bool {
    match field {
        Value::String(s) => s == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Number(n) => n.to_string() == expected,
        _ => false,
    }
}
