use crate::bson::{Document, TotalOrd, Value};
use crate::utils::Order;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::ops::Bound;
use std::sync::Arc;

/// The predicate of [`Query::Where`]
pub type QueryPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A filter on the documents of a collection.
///
/// Field queries use the index on the field when one exists, otherwise every document is
/// read and the field value is tested. A missing field is tested as [`Value::Null`].
#[derive(Clone)]
pub enum Query {
    /// Every document in `_id` order
    All(Order),
    Eq(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    /// Both ends inclusive
    Between(String, Value, Value),
    StartsWith(String, String),
    In(String, Vec<Value>),
    Not(String, Value),
    Where(String, QueryPredicate),
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
}

impl Query {
    pub fn all() -> Query {
        Query::All(Order::Ascending)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Eq(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Lte(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Gte(field.into(), value.into())
    }

    pub fn between(
        field: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Query {
        Query::Between(field.into(), start.into(), end.into())
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Query {
        Query::StartsWith(field.into(), prefix.into())
    }

    pub fn in_list<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Query {
        Query::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn not(field: impl Into<String>, value: impl Into<Value>) -> Query {
        Query::Not(field.into(), value.into())
    }

    pub fn filter(
        field: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Query {
        Query::Where(field.into(), Arc::new(predicate))
    }

    pub fn and(left: Query, right: Query) -> Query {
        Query::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Query, right: Query) -> Query {
        Query::Or(Box::new(left), Box::new(right))
    }

    /// The field tested by a leaf query
    pub(crate) fn field(&self) -> Option<&str> {
        match self {
            Query::Eq(field, _)
            | Query::Lt(field, _)
            | Query::Lte(field, _)
            | Query::Gt(field, _)
            | Query::Gte(field, _)
            | Query::Between(field, _, _)
            | Query::StartsWith(field, _)
            | Query::In(field, _)
            | Query::Not(field, _)
            | Query::Where(field, _) => Some(field),
            Query::All(_) | Query::And(..) | Query::Or(..) => None,
        }
    }

    /// The key ranges of the index to scan for a leaf query, in ascending order without overlap.
    ///
    /// Every key in the ranges must still be tested with [`Query::matches_value`].
    pub(crate) fn index_ranges(&self) -> Vec<(Bound<Value>, Bound<Value>)> {
        use Bound::*;
        match self {
            Query::Eq(_, value) => vec![(Included(value.clone()), Included(value.clone()))],
            Query::Lt(_, value) => vec![(Unbounded, Excluded(value.clone()))],
            Query::Lte(_, value) => vec![(Unbounded, Included(value.clone()))],
            Query::Gt(_, value) => vec![(Excluded(value.clone()), Unbounded)],
            Query::Gte(_, value) => vec![(Included(value.clone()), Unbounded)],
            Query::Between(_, start, end) => vec![(Included(start.clone()), Included(end.clone()))],
            Query::StartsWith(_, prefix) => vec![(Included(Value::from(prefix.as_str())), Unbounded)],
            Query::In(_, values) => {
                let mut values = values.iter().collect::<Vec<_>>();
                values.sort_by(|l, r| l.total_cmp(r));
                values.dedup_by(|l, r| l.total_cmp(r) == Ordering::Equal);
                values
                    .into_iter()
                    .map(|x| (Included(x.clone()), Included(x.clone())))
                    .collect()
            }
            _ => vec![(Unbounded, Unbounded)],
        }
    }

    /// Returns true if the scan of an ascending index range can stop at this key
    pub(crate) fn is_past_range(&self, key: &Value) -> bool {
        match self {
            Query::StartsWith(_, prefix) => match key {
                Value::String(key) => key.as_str() > prefix.as_str() && !key.starts_with(prefix.as_str()),
                _ => key.ty() > crate::bson::BsonType::String,
            },
            _ => false,
        }
    }

    /// Tests the value of the field for a leaf query
    pub(crate) fn matches_value(&self, value: &Value) -> bool {
        fn same_kind(l: &Value, r: &Value) -> bool {
            l.ty() == r.ty() || (l.is_number() && r.is_number())
        }
        let cmp = |other: &Value| value.total_cmp(other);

        match self {
            Query::All(_) => true,
            Query::Eq(_, other) => cmp(other) == Ordering::Equal,
            Query::Lt(_, other) => same_kind(value, other) && cmp(other) == Ordering::Less,
            Query::Lte(_, other) => same_kind(value, other) && cmp(other) != Ordering::Greater,
            Query::Gt(_, other) => same_kind(value, other) && cmp(other) == Ordering::Greater,
            Query::Gte(_, other) => same_kind(value, other) && cmp(other) != Ordering::Less,
            Query::Between(_, start, end) => {
                cmp(start) != Ordering::Less && cmp(end) != Ordering::Greater
            }
            Query::StartsWith(_, prefix) => value
                .as_str()
                .is_some_and(|x| x.starts_with(prefix.as_str())),
            Query::In(_, values) => values.iter().any(|x| cmp(x) == Ordering::Equal),
            Query::Not(_, other) => cmp(other) != Ordering::Equal,
            Query::Where(_, predicate) => predicate(value),
            Query::And(left, right) => left.matches_value(value) && right.matches_value(value),
            Query::Or(left, right) => left.matches_value(value) || right.matches_value(value),
        }
    }

    /// Tests the document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Query::All(_) => true,
            Query::And(left, right) => left.matches(doc) && right.matches(doc),
            Query::Or(left, right) => left.matches(doc) || right.matches(doc),
            leaf => {
                // leaf queries always have a field
                let field = leaf.field().unwrap_or("_id");
                leaf.matches_value(doc.get_path(field).unwrap_or(&Value::Null))
            }
        }
    }
}

impl Debug for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::All(order) => write!(f, "All({order:?})"),
            Query::Eq(field, value) => write!(f, "{field} = {value:?}"),
            Query::Lt(field, value) => write!(f, "{field} < {value:?}"),
            Query::Lte(field, value) => write!(f, "{field} <= {value:?}"),
            Query::Gt(field, value) => write!(f, "{field} > {value:?}"),
            Query::Gte(field, value) => write!(f, "{field} >= {value:?}"),
            Query::Between(field, start, end) => write!(f, "{field} between {start:?} and {end:?}"),
            Query::StartsWith(field, prefix) => write!(f, "{field} starts with {prefix:?}"),
            Query::In(field, values) => write!(f, "{field} in {values:?}"),
            Query::Not(field, value) => write!(f, "{field} != {value:?}"),
            Query::Where(field, _) => write!(f, "{field} where (fn)"),
            Query::And(left, right) => write!(f, "({left:?} and {right:?})"),
            Query::Or(left, right) => write!(f, "({left:?} or {right:?})"),
        }
    }
}
