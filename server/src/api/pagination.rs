use super::ApiError;
use crate::data::Page;
use crate::types::Pagination;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Validate `offset`/`limit` query values. Limits above the maximum are
/// clamped, not rejected.
pub fn page(offset: Option<i64>, limit: Option<i64>) -> Result<Page, ApiError> {
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::BadRequest(
            "offset must be zero or greater".to_string(),
        ));
    }

    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit <= 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }

    Ok(Page {
        offset,
        limit: limit.min(MAX_LIMIT),
    })
}

pub fn metadata(page: Page, total_count: i64) -> Pagination {
    Pagination {
        offset: page.offset,
        limit: page.limit,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            page(None, None).unwrap(),
            Page {
                offset: 0,
                limit: DEFAULT_LIMIT
            }
        );
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(page(Some(5), Some(1000)).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(page(Some(-1), None), Err(ApiError::BadRequest(_))));
        assert!(matches!(page(None, Some(0)), Err(ApiError::BadRequest(_))));
        assert!(matches!(page(None, Some(-3)), Err(ApiError::BadRequest(_))));
    }
}
