use serde_json::Value;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool, Row};

use crate::database::error::StoreError;
use crate::database::models::ContactPatch;
use crate::filter::filter_where::is_valid_identifier;
use crate::filter::{Filter, FilterError, SqlResult};

/// Runs a `Filter` against a pool, decoding rows as `T`
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, StoreError> {
        let sql_result = self.filter.to_sql()?;
        tracing::debug!(query = %sql_result.query, "select");
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, StoreError> {
        let sql_result = self.filter.to_count_sql()?;
        tracing::debug!(query = %sql_result.query, "count");
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

/// Execute a prepared statement that returns at most one `T`
pub async fn fetch_optional_as<T>(sql_result: &SqlResult, pool: &PgPool) -> Result<Option<T>, StoreError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_optional(pool).await?)
}

/// `UPDATE ... SET <supplied columns>, updated_at = NOW() WHERE id = $n RETURNING *`
pub fn build_update(table_name: &str, id: i64, patch: &ContactPatch) -> Result<SqlResult, FilterError> {
    if !is_valid_identifier(table_name) {
        return Err(FilterError::InvalidTableName(table_name.to_string()));
    }

    let mut assignments: Vec<(&str, Value)> = Vec::new();
    if let Some(name) = &patch.name {
        assignments.push(("name", Value::String(name.clone())));
    }
    if let Some(email) = &patch.email {
        assignments.push(("email", nullable(email)));
    }
    if let Some(address) = &patch.address {
        assignments.push(("address", nullable(address)));
    }
    if let Some(phone) = &patch.phone {
        assignments.push(("phone", nullable(phone)));
    }
    if let Some(favorite) = patch.favorite {
        assignments.push(("favorite", Value::Bool(favorite)));
    }
    if let Some(avatar) = &patch.avatar {
        assignments.push(("avatar", Value::String(avatar.clone())));
    }

    let mut params = Vec::with_capacity(assignments.len() + 1);
    let mut set_parts = Vec::with_capacity(assignments.len() + 1);
    for (column, value) in assignments {
        params.push(value);
        set_parts.push(format!("\"{}\" = ${}", column, params.len()));
    }
    set_parts.push("\"updated_at\" = NOW()".to_string());
    params.push(Value::from(id));

    let query = format!(
        "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING *",
        table_name,
        set_parts.join(", "),
        params.len()
    );
    Ok(SqlResult { query, params })
}

fn nullable(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Contact columns are scalar; structured values are sent as text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_sets_only_supplied_columns() {
        let patch = ContactPatch {
            phone: Some(Some("555-0199".to_string())),
            email: Some(None),
            ..Default::default()
        };
        let sql = build_update("contacts", 7, &patch).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"contacts\" SET \"email\" = $1, \"phone\" = $2, \"updated_at\" = NOW() WHERE \"id\" = $3 RETURNING *"
        );
        assert_eq!(sql.params, vec![Value::Null, json!("555-0199"), json!(7)]);
    }

    #[test]
    fn empty_update_only_touches_timestamp() {
        let sql = build_update("contacts", 1, &ContactPatch::default()).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"contacts\" SET \"updated_at\" = NOW() WHERE \"id\" = $1 RETURNING *"
        );
        assert_eq!(sql.params, vec![json!(1)]);
    }

    #[test]
    fn update_rejects_bad_table() {
        assert!(build_update("contacts x", 1, &ContactPatch::default()).is_err());
    }
}
