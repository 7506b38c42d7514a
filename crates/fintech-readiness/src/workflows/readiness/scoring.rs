use crate::catalog::{RuleCatalog, Topic};

/// Readiness score for a set of matched topics.
///
/// Weights of the matched topics are summed in catalog order, scaled by 100 and
/// rounded to two decimals. Topics unknown to the catalog contribute nothing and
/// repeated topics count once. There is no cap: a catalog whose weights sum past
/// 1.0 can score above 100.
pub fn score(matched: &[Topic], catalog: &RuleCatalog) -> f64 {
    let total: f64 = catalog
        .entries()
        .iter()
        .filter(|entry| matched.contains(entry.topic()))
        .map(|entry| entry.weight())
        .sum();

    round_to_hundredths(total * 100.0)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
