//! Post-filtering (spec §4.4 step 8): exclude-site, exclude-terms, and date
//! bounds applied after dedup, before sorting.

use chrono::{DateTime, Utc};
use metaseek_core::SearchResult;

pub struct Filterer;

impl Filterer {
    pub fn apply(
        results: Vec<SearchResult>,
        exclude_site: Option<&str>,
        exclude_terms: &[String],
        date_before: Option<DateTime<Utc>>,
        date_after: Option<DateTime<Utc>>,
    ) -> Vec<SearchResult> {
        results
            .into_iter()
            .filter(|r| !Self::matches_excluded_site(r, exclude_site))
            .filter(|r| !Self::matches_excluded_term(r, exclude_terms))
            .filter(|r| Self::passes_date_before(r, date_before))
            .filter(|r| Self::passes_date_after(r, date_after))
            .collect()
    }

    /// Domain substring match against the result URL's host (spec §4.4 step
    /// 8). Falls back to matching over the raw URL string when it doesn't
    /// parse — some adapters emit relative or malformed URLs, and the
    /// substring match still degrades gracefully rather than letting those
    /// through unfiltered.
    fn matches_excluded_site(result: &SearchResult, exclude_site: Option<&str>) -> bool {
        let Some(site) = exclude_site.filter(|s| !s.is_empty()) else {
            return false;
        };
        let site = site.to_ascii_lowercase();
        let host = url::Url::parse(&result.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));
        match host {
            Some(host) => host.contains(&site),
            None => result.url.to_ascii_lowercase().contains(&site),
        }
    }

    fn matches_excluded_term(result: &SearchResult, terms: &[String]) -> bool {
        if terms.is_empty() {
            return false;
        }
        let haystack = format!("{} {}", result.title, result.content).to_ascii_lowercase();
        terms
            .iter()
            .any(|term| haystack.contains(&term.to_ascii_lowercase()))
    }

    /// Drop results with a known published-at strictly after the cutoff.
    /// Results with no published-at pass every date filter.
    fn passes_date_before(result: &SearchResult, cutoff: Option<DateTime<Utc>>) -> bool {
        match (result.published_at, cutoff) {
            (Some(published), Some(cutoff)) => published <= cutoff,
            _ => true,
        }
    }

    /// Drop results with a known published-at strictly before the cutoff.
    fn passes_date_after(result: &SearchResult, cutoff: Option<DateTime<Utc>>) -> bool {
        match (result.published_at, cutoff) {
            (Some(published), Some(cutoff)) => published >= cutoff,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use metaseek_core::Category;

    fn result(url: &str, title: &str, content: &str) -> SearchResult {
        let mut r = SearchResult::new(url, title, "e", Category::General, 0);
        r.content = content.to_string();
        r
    }

    #[test]
    fn exclude_site_matches_case_insensitively_on_substring() {
        let results = vec![result("https://Spam.example.com/a", "x", "")];
        let filtered = Filterer::apply(results, Some("spam.example"), &[], None, None);
        assert!(filtered.is_empty());
    }

    #[test]
    fn exclude_site_only_matches_the_host_not_a_path_segment() {
        let results = vec![result("https://example.com/spam.example/page", "x", "")];
        let filtered = Filterer::apply(results, Some("spam.example"), &[], None, None);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn exclude_terms_matches_title_or_content() {
        let results = vec![result("https://a", "Breaking News", "")];
        let filtered = Filterer::apply(results, None, &["breaking".to_string()], None, None);
        assert!(filtered.is_empty());
    }

    #[test]
    fn zero_published_at_survives_date_filters() {
        let results = vec![result("https://a", "x", "")];
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filtered = Filterer::apply(results, None, &[], Some(cutoff), Some(cutoff));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn date_after_drops_results_published_before_cutoff() {
        let mut r = result("https://a", "x", "");
        r.published_at = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filtered = Filterer::apply(vec![r], None, &[], None, Some(cutoff));
        assert!(filtered.is_empty());
    }
}
