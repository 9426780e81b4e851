//! Page/limit planning and the paginated response envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest offset or limit a database driver accepts (a signed 64-bit bind).
pub const MAX_BOUND: u64 = i64::MAX.unsigned_abs();

/// A bounded fetch plan. `page` and `limit` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

impl PaginationOptions {
    /// Clamp `page` and `limit` to at least 1 and derive `skip`. `limit` and
    /// `skip` never exceed [`MAX_BOUND`].
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_BOUND);
        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit).min(MAX_BOUND),
        }
    }

    /// Lower `limit` to `max_limit` when one is configured.
    #[must_use]
    pub fn with_max_limit(self, max_limit: Option<u64>) -> Self {
        match max_limit {
            Some(max) if self.limit > max => Self::new(self.page, max),
            _ => self,
        }
    }
}

/// Build a plan from raw `page` and `limit` query values.
///
/// Values are read like a lenient integer parse: leading whitespace and an
/// optional sign are accepted and anything after the leading digits is
/// ignored, so `"3abc"` is 3. Absent or unparseable values fall back to page 1
/// and limit 10; non-positive values clamp to 1.
#[must_use]
pub fn plan(raw_page: Option<&str>, raw_limit: Option<&str>) -> PaginationOptions {
    let page = raw_page.and_then(leading_int).map_or(DEFAULT_PAGE, positive);
    let limit = raw_limit.and_then(leading_int).map_or(DEFAULT_LIMIT, positive);
    PaginationOptions::new(page, limit)
}

fn positive(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0).max(1)
}

/// Parse the leading integer of `raw`. Saturates instead of overflowing.
fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// One page of results with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginationResult<T> {
    /// Convert every item, keeping the totals.
    pub fn map_data<U>(self, f: impl FnMut(T) -> U) -> PaginationResult<U> {
        PaginationResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Wrap a fetched page. `data` is passed through untouched.
#[must_use]
pub fn assemble<T>(data: Vec<T>, total: u64, options: &PaginationOptions) -> PaginationResult<T> {
    PaginationResult {
        data,
        total,
        page: options.page,
        limit: options.limit,
        total_pages: total.div_ceil(options.limit.max(1)),
    }
}
