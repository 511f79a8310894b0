//! Result ordering (spec §4.4.2).

use metaseek_core::{SearchResult, SortOrder};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Ordering;

pub struct Sorter;

impl Sorter {
    pub fn apply(mut results: Vec<SearchResult>, order: SortOrder) -> Vec<SearchResult> {
        match order {
            SortOrder::Relevance => {
                results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
            }
            SortOrder::Date => {
                results.sort_by(|a, b| Self::by_date(a, b, true));
            }
            SortOrder::DateAsc => {
                results.sort_by(|a, b| Self::by_date(a, b, false));
            }
            SortOrder::Popularity => {
                results.sort_by(|a, b| {
                    let pa = a.popularity + a.view_count.unwrap_or(0) as f64 / 1000.0;
                    let pb = b.popularity + b.view_count.unwrap_or(0) as f64 / 1000.0;
                    pb.partial_cmp(&pa)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
                });
            }
            SortOrder::Random => {
                let mut rng = SmallRng::from_entropy();
                results.shuffle(&mut rng);
            }
        }
        results
    }

    /// Shared date comparator: results with no `published_at` always sort
    /// last, regardless of direction. `descending` picks date vs. date-asc;
    /// the score tiebreaker is always descending.
    fn by_date(a: &SearchResult, b: &SearchResult, descending: bool) -> Ordering {
        match (a.published_at, b.published_at) {
            (Some(da), Some(db)) => {
                let ord = if descending { db.cmp(&da) } else { da.cmp(&db) };
                ord.then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use metaseek_core::Category;

    fn result(url: &str, score: f64) -> SearchResult {
        let mut r = SearchResult::new(url, "t", "e", Category::General, 0);
        r.score = score;
        r
    }

    #[test]
    fn relevance_sorts_score_descending() {
        let results = vec![result("a", 1.0), result("b", 5.0), result("c", 3.0)];
        let sorted = Sorter::apply(results, SortOrder::Relevance);
        assert_eq!(sorted.iter().map(|r| r.url.clone()).collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn date_sort_puts_unset_dates_last() {
        let mut with_date = result("a", 1.0);
        with_date.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let without_date = result("b", 99.0);
        let sorted = Sorter::apply(vec![without_date, with_date], SortOrder::Date);
        assert_eq!(sorted[0].url, "a");
        assert_eq!(sorted[1].url, "b");
    }

    #[test]
    fn date_asc_orders_earliest_first() {
        let mut early = result("early", 1.0);
        early.published_at = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let mut late = result("late", 1.0);
        late.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let sorted = Sorter::apply(vec![late, early], SortOrder::DateAsc);
        assert_eq!(sorted[0].url, "early");
    }

    #[test]
    fn popularity_combines_popularity_and_scaled_view_count() {
        let mut a = result("a", 1.0);
        a.popularity = 1.0;
        a.view_count = Some(5000);
        let mut b = result("b", 1.0);
        b.popularity = 10.0;
        let sorted = Sorter::apply(vec![b.clone(), a.clone()], SortOrder::Popularity);
        // a: 1 + 5000/1000 = 6, b: 10 -> b first
        assert_eq!(sorted[0].url, "b");
    }

    #[test]
    fn random_sort_preserves_the_full_set() {
        let results = vec![result("a", 1.0), result("b", 2.0), result("c", 3.0)];
        let sorted = Sorter::apply(results, SortOrder::Random);
        let mut urls: Vec<String> = sorted.into_iter().map(|r| r.url).collect();
        urls.sort();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }
}
