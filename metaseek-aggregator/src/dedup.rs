//! Cross-adapter deduplication and merging (spec §4.4.1): two passes over
//! the collected slice, by URL identity.

use metaseek_core::SearchResult;
use std::collections::{HashMap, HashSet};

/// Marker type mirroring the other pipeline stages (`Filterer`, `Sorter`,
/// `Paginator`) — a namespace for the dedup pass, not a value anyone holds
/// onto.
pub struct Deduplicator;

impl Deduplicator {
    /// Deduplicates `results` by URL, in input order, applying the score
    /// bonuses and field-merge rules from §4.4.1.
    pub fn merge(results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut count: HashMap<&str, u32> = HashMap::new();
        let mut engine_set: HashMap<&str, HashSet<&str>> = HashMap::new();
        for result in &results {
            *count.entry(result.url.as_str()).or_insert(0) += 1;
            engine_set
                .entry(result.url.as_str())
                .or_default()
                .insert(result.engine.as_str());
        }

        let mut order: Vec<String> = Vec::new();
        let mut canonical: HashMap<String, SearchResult> = HashMap::new();

        for result in results {
            let url = result.url.clone();
            match canonical.get_mut(&url) {
                None => {
                    let dup_count = *count.get(url.as_str()).unwrap_or(&1);
                    let distinct_engines = engine_set.get(url.as_str()).map(|s| s.len()).unwrap_or(1);
                    let mut entry = result;
                    entry.score += (dup_count as f64 - 1.0) * 50.0;
                    if distinct_engines > 1 {
                        entry.score += distinct_engines as f64 * 25.0;
                    }
                    entry.duplicate_count = dup_count;
                    order.push(url.clone());
                    canonical.insert(url, entry);
                }
                Some(existing) => Self::merge_into(existing, result),
            }
        }

        order.into_iter().filter_map(|url| canonical.remove(&url)).collect()
    }

    fn merge_into(canonical: &mut SearchResult, new: SearchResult) {
        if new.content.len() > canonical.content.len() {
            canonical.content = new.content;
        }
        if canonical.thumbnail.is_none() {
            canonical.thumbnail = new.thumbnail;
        }
        if canonical.author.is_none() {
            canonical.author = new.author;
        }
        if let Some(new_published) = new.published_at {
            let replace = match canonical.published_at {
                None => true,
                Some(existing) => new_published < existing,
            };
            if replace {
                canonical.published_at = Some(new_published);
            }
        }
        if new.relevance != 0.0 {
            canonical.relevance = (canonical.relevance + new.relevance) / 2.0;
        }
        canonical.popularity += new.popularity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use metaseek_core::Category;

    fn result(url: &str, engine: &str, score: f64) -> SearchResult {
        let mut r = SearchResult::new(url, "title", engine, Category::General, 0);
        r.score = score;
        r
    }

    #[test]
    fn unique_urls_pass_through_unchanged() {
        let merged = Deduplicator::merge(vec![result("https://a", "e1", 10.0)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].duplicate_count, 1);
    }

    #[test]
    fn duplicate_from_same_engine_gets_duplicate_bonus_only() {
        let merged = Deduplicator::merge(vec![
            result("https://a", "e1", 10.0),
            result("https://a", "e1", 10.0),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].duplicate_count, 2);
        // (2-1)*50 = 50 bonus, no diversity bonus since only one distinct engine.
        assert_eq!(merged[0].score, 60.0);
    }

    #[test]
    fn duplicate_across_two_engines_gets_both_bonuses() {
        let merged = Deduplicator::merge(vec![
            result("https://a", "e1", 10.0),
            result("https://a", "e2", 10.0),
        ]);
        assert_eq!(merged.len(), 1);
        // (2-1)*50 duplicate + 2*25 diversity = 50 + 50 = 100, plus base 10.
        assert_eq!(merged[0].score, 110.0);
    }

    #[test]
    fn content_keeps_the_longer_variant() {
        let mut a = result("https://a", "e1", 1.0);
        a.content = "short".to_string();
        let mut b = result("https://a", "e2", 1.0);
        b.content = "a much longer description".to_string();
        let merged = Deduplicator::merge(vec![a, b]);
        assert_eq!(merged[0].content, "a much longer description");
    }

    #[test]
    fn published_at_prefers_the_earlier_of_two_set_dates() {
        let mut a = result("https://a", "e1", 1.0);
        a.published_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let mut b = result("https://a", "e2", 1.0);
        b.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let merged = Deduplicator::merge(vec![a, b]);
        assert_eq!(
            merged[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn popularity_sums_and_relevance_averages() {
        let mut a = result("https://a", "e1", 1.0);
        a.popularity = 10.0;
        a.relevance = 0.4;
        let mut b = result("https://a", "e2", 1.0);
        b.popularity = 5.0;
        b.relevance = 0.8;
        let merged = Deduplicator::merge(vec![a, b]);
        assert_eq!(merged[0].popularity, 15.0);
        assert_eq!(merged[0].relevance, 0.6);
    }
}
