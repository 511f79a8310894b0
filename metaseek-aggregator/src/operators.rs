//! Applying parsed operators onto a `Query` (spec §4.4 step 2): explicit
//! `Query` fields set by the caller always win; an operator only fills a
//! field that is still at its empty/default value.

use metaseek_core::{Operators, Query, DEFAULT_LANGUAGE};

pub fn apply(query: &mut Query, ops: &Operators) {
    if query.exclude_site.is_none() {
        if let Some(site) = ops.exclude_site.first() {
            query.exclude_site = Some(site.clone());
        }
    }
    if query.exclude_terms.is_empty() && !ops.excluded_terms.is_empty() {
        query.exclude_terms = ops.excluded_terms.clone();
    }
    if query.language == DEFAULT_LANGUAGE {
        if let Some(lang) = &ops.language {
            query.language = lang.clone();
        }
    }
    if query.region.is_none() {
        if let Some(loc) = &ops.location {
            query.region = Some(loc.clone());
        }
    }
    if query.engines.is_empty() {
        if let Some(source) = &ops.source {
            query.engines = vec![source.clone()];
        }
    }
    if query.date_before.is_none() {
        if let Some(before) = ops.before {
            query.date_before = naive_date_to_utc(before);
        }
    }
    if query.date_after.is_none() {
        if let Some(after) = ops.after {
            query.date_after = naive_date_to_utc(after);
        }
    }
}

fn naive_date_to_utc(date: chrono::NaiveDate) -> Option<chrono::DateTime<chrono::Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
