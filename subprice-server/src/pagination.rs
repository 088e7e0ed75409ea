//! Pagination Service
//!
//! Pages are 1-indexed slices `[(page - 1) * limit, page * limit)` over rows in
//! insertion order. Pages past the end are empty rather than clamped.

use serde::Serialize;
use subprice_common::{Result, Row, RowStore};

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Rows to skip before this page
    pub offset: i64,
}

/// Calculate pagination metadata from total results and the requested page
///
/// `page` and `limit` below 1 are clamped to 1.
///
/// # Examples
/// ```
/// use subprice_server::pagination::calculate_pagination;
///
/// // 25 rows at 10 per page = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 2, 10);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// let p = calculate_pagination(25, 0, 0);
/// assert_eq!(p.page, 1);
/// assert_eq!(p.limit, 1);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, requested_limit: i64) -> Pagination {
    let limit = requested_limit.max(1);
    let page = requested_page.max(1);
    let total = total_results.max(0);
    let total_pages = total / limit + i64::from(total % limit != 0);
    let offset = (page - 1).saturating_mul(limit);

    Pagination {
        page,
        limit,
        total_pages,
        offset,
    }
}

/// Resolve the effective page size: default when absent, within `[1, max]`
pub fn effective_limit(requested: Option<i64>, default_limit: i64, max_limit: i64) -> i64 {
    requested.unwrap_or(default_limit).clamp(1, max_limit.max(1))
}

/// One page of stored rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub data: Vec<Row>,
    pub page: i64,
    pub limit: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

/// Fetch one page of rows plus the page count
pub async fn get_page(store: &RowStore, page: i64, limit: i64) -> Result<Page> {
    let total_rows = store.count_all().await?;
    let pagination = calculate_pagination(total_rows, page, limit);

    let data = if pagination.offset >= total_rows {
        Vec::new()
    } else {
        store.find(pagination.offset, pagination.limit).await?
    };

    Ok(Page {
        data,
        page: pagination.page,
        limit: pagination.limit,
        total_rows,
        total_pages: pagination.total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use subprice_common::NewRow;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(250, 2, 100);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 100);
    }

    #[test]
    fn test_pagination_first_page() {
        let p = calculate_pagination(15, 1, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_past_end_not_clamped() {
        let p = calculate_pagination(15, 99, 10);
        assert_eq!(p.page, 99);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 980);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(15, -3, -1);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
        assert_eq!(p.total_pages, 15);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(20, 2, 10);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 10);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for total in 0..50 {
            for limit in 1..12 {
                let p = calculate_pagination(total, 1, limit);
                let expected = (total as f64 / limit as f64).ceil() as i64;
                assert_eq!(p.total_pages, expected, "total={} limit={}", total, limit);
            }
        }
    }

    #[test]
    fn test_total_pages_with_extreme_limit() {
        let p = calculate_pagination(5, 1, i64::MAX);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.offset, 0);

        let p = calculate_pagination(i64::MAX, 2, i64::MAX);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.offset, i64::MAX);

        let p = calculate_pagination(i64::MAX, 1, 2);
        assert_eq!(p.total_pages, i64::MAX / 2 + 1);
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 10, 1000), 10);
        assert_eq!(effective_limit(Some(0), 10, 1000), 1);
        assert_eq!(effective_limit(Some(-5), 10, 1000), 1);
        assert_eq!(effective_limit(Some(5000), 10, 1000), 1000);
    }

    #[tokio::test]
    async fn test_get_page_slices() {
        let store = RowStore::new(subprice_common::db::init_in_memory().await.unwrap());
        let rows = vec![
            NewRow {
                credit_score: Some(700.0),
                credit_lines: Some(3.0),
                ..NewRow::default()
            },
            NewRow {
                credit_score: Some(650.0),
                credit_lines: Some(5.0),
                ..NewRow::default()
            },
        ];
        store.insert_many(&rows).await.unwrap();

        let page = get_page(&store, 1, 10).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total_pages, 1);

        let page = get_page(&store, 2, 1).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].credit_score, Some(650.0));
        assert_eq!(page.total_pages, 2);

        let page = get_page(&store, 3, 1).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_rows, 2);
    }
}
