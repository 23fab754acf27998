//! Selective-update SQL building.
//!
//! `build_partial_update` turns an ordered list of `(field, value)` pairs into
//! a `SET` clause with `$N` placeholders plus the matching value list, e.g.
//!
//! ```text
//! [("firstName", "Aliya"), ("age", 32)] + {firstName -> first_name}
//!   => "\"first_name\"=$1, \"age\"=$2", ["Aliya", 32]
//! ```
//!
//! Values are always bound as parameters.  Column names cannot be, so every
//! resolved column must be a plain SQL identifier or the build fails.

use std::collections::HashMap;

use sqlx::Sqlite;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// The caller asked for an update with no fields.
    #[error("No data")]
    NoUpdateData,

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}

/// A value bound to a `$N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Fields to change, in the order they were supplied.
///
/// Field names are unique: setting a name twice replaces the value but keeps
/// the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFieldMap {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set `field` only when a new value was supplied.
    pub fn set_if_some<T: Into<SqlValue>>(&mut self, field: &str, value: Option<T>) {
        if let Some(v) = value {
            self.set(field, v);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for UpdateFieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// External field name -> storage column name.  Fields without an entry are
/// used as the column name unchanged.
#[derive(Debug, Clone, Default)]
pub struct ColumnAliases {
    aliases: HashMap<String, String>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases.get(field).map(String::as_str).unwrap_or(field)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ColumnAliases {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(field, column)| (field.to_string(), column.to_string()))
                .collect(),
        }
    }
}

/// A `SET` clause and its values; placeholder `$N` binds `values[N - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Index of the first placeholder free for the caller's `WHERE` clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

pub fn build_partial_update(
    fields: UpdateFieldMap,
    aliases: &ColumnAliases,
) -> Result<PartialUpdate, SqlError> {
    if fields.is_empty() {
        return Err(SqlError::NoUpdateData);
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (field, value)) in fields.fields.into_iter().enumerate() {
        let column = aliases.resolve(&field);
        if !is_plain_identifier(column) {
            return Err(SqlError::InvalidColumn(column.to_string()));
        }
        columns.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value);
    }

    Ok(PartialUpdate {
        set_clause: columns.join(", "),
        values,
    })
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Bind `values` to `query` in order.
pub fn bind_all<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn works_single_field() {
        let fields = UpdateFieldMap::new().with("firstName", "Aliya");
        let aliases = ColumnAliases::from([("firstName", "first_name")]);

        let result = build_partial_update(fields, &aliases).unwrap();
        assert_eq!(result.set_clause, "\"first_name\"=$1");
        assert_eq!(result.values, vec![SqlValue::from("Aliya")]);
    }

    #[test]
    fn works_multiple_fields_in_order() {
        let fields = UpdateFieldMap::new()
            .with("firstName", "Aliya")
            .with("age", 32);
        let aliases = ColumnAliases::from([("firstName", "first_name")]);

        let result = build_partial_update(fields, &aliases).unwrap();
        assert_eq!(result.set_clause, "\"first_name\"=$1, \"age\"=$2");
        assert_eq!(
            result.values,
            vec![SqlValue::from("Aliya"), SqlValue::Int(32)]
        );
        assert_eq!(result.next_placeholder(), 3);
    }

    #[test]
    fn works_without_aliases() {
        let fields = UpdateFieldMap::new().with("age", 32);
        let result = build_partial_update(fields, &ColumnAliases::new()).unwrap();
        assert_eq!(result.set_clause, "\"age\"=$1");
        assert_eq!(result.values, vec![SqlValue::Int(32)]);
    }

    #[test]
    fn empty_update_is_rejected() {
        assert_eq!(
            build_partial_update(UpdateFieldMap::new(), &ColumnAliases::new()),
            Err(SqlError::NoUpdateData)
        );
    }

    #[test]
    fn unsafe_column_is_rejected() {
        let fields = UpdateFieldMap::new().with("name\"=1; DROP TABLE users; --", "x");
        assert!(matches!(
            build_partial_update(fields, &ColumnAliases::new()),
            Err(SqlError::InvalidColumn(_))
        ));

        let aliases = ColumnAliases::from([("logoUrl", "logo url")]);
        let fields = UpdateFieldMap::new().with("logoUrl", "http://a.b");
        assert!(build_partial_update(fields, &aliases).is_err());
    }

    #[test]
    fn repeated_field_keeps_first_position() {
        let mut fields = UpdateFieldMap::new();
        fields.set("a", 1);
        fields.set("b", 2);
        fields.set("a", 3);

        let result = build_partial_update(fields, &ColumnAliases::new()).unwrap();
        assert_eq!(result.set_clause, "\"a\"=$1, \"b\"=$2");
        assert_eq!(result.values, vec![SqlValue::Int(3), SqlValue::Int(2)]);
    }

    #[test]
    fn set_if_some_skips_missing_values() {
        let mut fields = UpdateFieldMap::new();
        fields.set_if_some("name", Some("New"));
        fields.set_if_some::<i64>("numEmployees", None);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn option_none_binds_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(5_i64)), SqlValue::Int(5));
    }

    #[test]
    fn identifier_check() {
        assert!(is_plain_identifier("num_employees"));
        assert!(is_plain_identifier("_x1"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("1abc"));
        assert!(!is_plain_identifier("a-b"));
        assert!(!is_plain_identifier("a\"b"));
    }

    proptest! {
        #[test]
        fn placeholder_n_binds_value_n(names in proptest::collection::hash_set("[a-z][a-z0-9_]{0,8}", 1..12)) {
            let names: Vec<String> = names.into_iter().collect();
            let fields: UpdateFieldMap = names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.clone(), i as i64))
                .collect();

            let result = build_partial_update(fields, &ColumnAliases::new()).unwrap();
            let fragments: Vec<&str> = result.set_clause.split(", ").collect();

            prop_assert_eq!(fragments.len(), names.len());
            prop_assert_eq!(result.values.len(), names.len());
            for (i, fragment) in fragments.iter().enumerate() {
                prop_assert_eq!(*fragment, format!("\"{}\"=${}", names[i], i + 1));
                prop_assert_eq!(&result.values[i], &SqlValue::Int(i as i64));
            }
        }
    }
}
