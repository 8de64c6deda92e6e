use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Case-insensitive substring match
    ILike,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Raw `GET /api/v1/contacts` query string. Values stay strings so that
/// malformed input is reported through the envelope rather than a plain-text rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub favorite: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Derived paging information returned next to a contact list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub total_records: u64,
    pub first_page: u32,
    pub last_page: u32,
    pub page: u32,
    pub limit: u32,
}

impl PaginationMetadata {
    pub fn new(total_records: u64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        let last_page = total_records.div_ceil(u64::from(limit)).max(1);
        Self {
            total_records,
            first_page: 1,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            page,
            limit,
        }
    }
}

/// Parse the boolean spellings HTML forms and query strings use
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
