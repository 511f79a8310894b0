//! Pagination (spec §4.4 step 10): total-pages is always at least 1.

use metaseek_core::SearchResult;

pub struct Paginator;

impl Paginator {
    /// Returns the page slice and `(total_count, total_pages)`. `page` is
    /// 1-based; a page past the end yields an empty slice rather than an
    /// error.
    pub fn apply(results: &[SearchResult], page: u32, per_page: u32) -> (Vec<SearchResult>, usize, u32) {
        let total_count = results.len();
        let total_pages = metaseek_core::SearchResults::compute_total_pages(total_count, per_page);
        let page = page.max(1);
        let start = ((page - 1) as usize).saturating_mul(per_page.max(1) as usize);
        let page_slice = results
            .get(start..)
            .map(|rest| rest.iter().take(per_page.max(1) as usize).cloned().collect())
            .unwrap_or_default();
        (page_slice, total_count, total_pages)
    }
}
