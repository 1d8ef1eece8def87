use super::Rejection;
use validator::ValidateRange;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub skip: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

/// Parses `limit` (1..=100, default 100) and `skip` (>= 0, default 0).
/// Out-of-range or non-integer values are rejected, never clamped.
pub fn validate_pagination(
    limit: Option<&str>,
    skip: Option<&str>,
) -> Result<Pagination, Rejection> {
    let limit = match limit {
        None => DEFAULT_LIMIT,
        Some(raw) => {
            let value: i64 = raw
                .trim()
                .parse()
                .map_err(|_| Rejection::Field("limit must be an integer"))?;
            if !value.validate_range(Some(1), Some(i64::from(MAX_LIMIT)), None, None) {
                return Err(Rejection::Field("limit must be between 1 and 100"));
            }
            value as u32
        }
    };

    let skip = match skip {
        None => 0,
        Some(raw) => {
            let value: i64 = raw
                .trim()
                .parse()
                .map_err(|_| Rejection::Field("skip must be an integer"))?;
            if !value.validate_range(Some(0), None, None, None) {
                return Err(Rejection::Field("skip must be non-negative"));
            }
            value as u64
        }
    };

    Ok(Pagination { limit, skip })
}
