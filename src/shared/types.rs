use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
    /// Machine-readable error code (errors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Structured error details (errors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self {
            total,
            page: None,
            page_size: None,
            total_pages: None,
        }
    }

    pub fn paginated(total: i64, page: &PageRequest) -> Self {
        Self {
            total,
            page: Some(page.page),
            page_size: Some(page.page_size),
            total_pages: Some(page.total_pages(total)),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// A resolved, clamped page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Clamp raw query values: page is at least 1, page_size falls back to
    /// `default_size` and is clamped to `1..=max_size`.
    pub fn resolve(
        page: Option<i64>,
        page_size: Option<i64>,
        default_size: i64,
        max_size: i64,
    ) -> Self {
        let max_size = max_size.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size),
        }
    }

    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
            code: None,
            details: None,
        }
    }

    pub fn error(
        code: &str,
        message: Option<String>,
        errors: Option<Vec<String>>,
        details: Option<Value>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
            code: Some(code.to_string()),
            details,
        }
    }
}

// =============================================================================
// QUERY HELPERS
// =============================================================================

/// Deserialize an optional filter value where an empty string or `any` means
/// "no filter".
pub fn optional_filter<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("any") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
