//! Cache key derivation (spec §4.4 step 3): a fingerprint covering text,
//! category, language, region, sort, and time-range. Built from the
//! *cleaned* post-operator text rather than the raw query, so two inputs
//! that parse to the same directives and remainder hit the same entry.

use metaseek_core::Query;

/// 16 bytes of BLAKE3 output, hex-encoded — collision-safe for a bounded
/// cache and short enough to log without truncation.
pub fn fingerprint(query: &Query) -> String {
    let basis = format!(
        "{}|{}|{}|{}|{:?}|{}",
        query.cleaned_text,
        query.category,
        query.language,
        query.region.as_deref().unwrap_or(""),
        query.sort,
        query.time_range.as_deref().unwrap_or(""),
    );
    let full = blake3::hash(basis.as_bytes());
    hex::encode(&full.as_bytes()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaseek_core::Category;

    #[test]
    fn same_inputs_fingerprint_identically() {
        let mut q1 = Query::new("rust");
        q1.cleaned_text = "rust".to_string();
        let mut q2 = Query::new("rust");
        q2.cleaned_text = "rust".to_string();
        assert_eq!(fingerprint(&q1), fingerprint(&q2));
    }

    #[test]
    fn differing_category_changes_fingerprint() {
        let mut q1 = Query::new("rust");
        q1.cleaned_text = "rust".to_string();
        let mut q2 = q1.clone();
        q2.category = Category::News;
        assert_ne!(fingerprint(&q1), fingerprint(&q2));
    }
}
