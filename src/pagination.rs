use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Page/limit pair after defaults have been applied.
///
/// Both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Builds from raw query values. Missing or non-numeric input falls back
    /// to the defaults; a numeric prefix (`"3abc"`) is honoured.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            page.and_then(leading_int).unwrap_or(DEFAULT_PAGE),
            limit.and_then(leading_int).unwrap_or(DEFAULT_LIMIT),
        )
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn page_info(&self, total: i64) -> PageInfo {
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            // ceiling without `total + limit - 1`, which overflows for huge limits
            total_pages: total / self.limit + i64::from(total % self.limit != 0),
        }
    }
}

/// `(limit, offset)` for a requested page, after defaulting.
pub fn paginate(page: i64, limit: i64) -> (i64, i64) {
    let p = Pagination::new(page, limit);
    (p.limit, p.offset())
}

fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// PageInfo
///
/// Pagination block returned next to a list of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}
