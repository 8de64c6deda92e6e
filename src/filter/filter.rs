use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{is_valid_identifier, FilterWhere};
use super::types::{
    parse_flag, FilterOp, FilterOrderInfo, FilterWhereInfo, ListQuery, SortDirection, SqlResult,
};
use crate::config::PaginationConfig;
use crate::database::models::Contact;

/// Validated list criteria for the contacts collection
#[derive(Debug, Clone, PartialEq)]
pub struct ContactFilter {
    /// Case-insensitive substring of the contact name
    pub name: Option<String>,
    pub favorite: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

impl ContactFilter {
    /// First page of everything, using the configured page size
    pub fn all(pagination: &PaginationConfig) -> Self {
        Self {
            name: None,
            favorite: None,
            page: 1,
            limit: pagination.default_limit,
        }
    }

    pub fn from_query(query: &ListQuery, pagination: &PaginationConfig) -> Result<Self, FilterError> {
        let mut filter = Self::all(pagination);

        if let Some(name) = non_empty(&query.name) {
            filter.name = Some(name.to_string());
        }

        if let Some(favorite) = non_empty(&query.favorite) {
            filter.favorite = Some(
                parse_flag(favorite).ok_or_else(|| FilterError::InvalidFavorite(favorite.to_string()))?,
            );
        }

        if let Some(page) = non_empty(&query.page) {
            filter.page = match page.parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(FilterError::InvalidPage(format!("'{}' is not a positive integer", page))),
            };
        }

        if let Some(limit) = non_empty(&query.limit) {
            let requested = match limit.parse::<u32>() {
                Ok(l) if l >= 1 => l,
                _ => return Err(FilterError::InvalidLimit(format!("'{}' is not a positive integer", limit))),
            };
            filter.limit = if requested > pagination.max_limit {
                tracing::debug!(requested, max = pagination.max_limit, "limit exceeds max, capping");
                pagination.max_limit
            } else {
                requested
            };
        }

        Ok(filter)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// In-process equivalent of the generated WHERE clause
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(favorite) = self.favorite {
            if contact.favorite != favorite {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !contact.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Build the paged, id-ordered SQL filter for `table_name`
    pub fn to_filter(&self, table_name: &str) -> Result<Filter, FilterError> {
        let mut filter = Filter::new(table_name)?;
        if let Some(name) = &self.name {
            filter.where_condition("name", FilterOp::ILike, Value::String(name.clone()));
        }
        if let Some(favorite) = self.favorite {
            filter.where_condition("favorite", FilterOp::Eq, Value::Bool(favorite));
        }
        filter.order("id", SortDirection::Asc);
        filter.limit(self.limit, Some(self.offset()));
        Ok(filter)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parameterized SELECT / COUNT builder over a single table
pub struct Filter {
    table_name: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u32>,
    offset: Option<u64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(table_name));
        }
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn where_condition(&mut self, column: &str, operator: FilterOp, data: Value) -> &mut Self {
        self.conditions.push(FilterWhereInfo {
            column: column.to_string(),
            operator,
            data,
        });
        self
    }

    pub fn order(&mut self, column: &str, sort: SortDirection) -> &mut Self {
        self.order_data.push(FilterOrderInfo {
            column: column.to_string(),
            sort,
        });
        self
    }

    pub fn limit(&mut self, limit: u32, offset: Option<u64>) -> &mut Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// COUNT over the same conditions, ignoring order and paging
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pagination() -> PaginationConfig {
        PaginationConfig { default_limit: 5, max_limit: 20 }
    }

    fn query(name: Option<&str>, favorite: Option<&str>, page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            name: name.map(String::from),
            favorite: favorite.map(String::from),
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn empty_query_uses_defaults() {
        let filter = ContactFilter::from_query(&ListQuery::default(), &pagination()).unwrap();
        assert_eq!(filter, ContactFilter::all(&pagination()));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 5);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn parses_all_fields() {
        let filter =
            ContactFilter::from_query(&query(Some(" ann "), Some("true"), Some("3"), Some("4")), &pagination())
                .unwrap();
        assert_eq!(filter.name.as_deref(), Some("ann"));
        assert_eq!(filter.favorite, Some(true));
        assert_eq!(filter.offset(), 8);
    }

    #[test]
    fn blank_values_are_ignored() {
        let filter = ContactFilter::from_query(&query(Some(""), Some(" "), None, Some("")), &pagination()).unwrap();
        assert!(filter.name.is_none());
        assert!(filter.favorite.is_none());
        assert_eq!(filter.limit, 5);
    }

    #[test]
    fn limit_is_capped() {
        let filter = ContactFilter::from_query(&query(None, None, None, Some("500")), &pagination()).unwrap();
        assert_eq!(filter.limit, 20);
    }

    #[test]
    fn rejects_bad_paging_and_flags() {
        assert!(matches!(
            ContactFilter::from_query(&query(None, None, Some("0"), None), &pagination()),
            Err(FilterError::InvalidPage(_))
        ));
        assert!(matches!(
            ContactFilter::from_query(&query(None, None, None, Some("-2")), &pagination()),
            Err(FilterError::InvalidLimit(_))
        ));
        assert!(matches!(
            ContactFilter::from_query(&query(None, Some("sometimes"), None, None), &pagination()),
            Err(FilterError::InvalidFavorite(_))
        ));
    }

    #[test]
    fn generates_paged_select_and_count() {
        let filter =
            ContactFilter::from_query(&query(Some("Al"), Some("1"), Some("2"), None), &pagination()).unwrap();
        let sql = filter.to_filter("contacts").unwrap();

        let select = sql.to_sql().unwrap();
        assert_eq!(
            select.query,
            "SELECT * FROM \"contacts\" WHERE \"name\" ILIKE $1 AND \"favorite\" = $2 ORDER BY \"id\" ASC LIMIT 5 OFFSET 5"
        );
        assert_eq!(select.params, vec![json!("%Al%"), json!(true)]);

        let count = sql.to_count_sql().unwrap();
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM \"contacts\" WHERE \"name\" ILIKE $1 AND \"favorite\" = $2"
        );
        assert_eq!(count.params.len(), 2);
    }

    #[test]
    fn unfiltered_select_has_no_where() {
        let sql = ContactFilter::all(&pagination()).to_filter("contacts").unwrap();
        assert_eq!(
            sql.to_sql().unwrap().query,
            "SELECT * FROM \"contacts\" ORDER BY \"id\" ASC LIMIT 5 OFFSET 0"
        );
        assert_eq!(sql.to_count_sql().unwrap().query, "SELECT COUNT(*) AS count FROM \"contacts\"");
    }

    #[test]
    fn rejects_invalid_table_name() {
        assert!(matches!(Filter::new("contacts; --"), Err(FilterError::InvalidTableName(_))));
    }
}
