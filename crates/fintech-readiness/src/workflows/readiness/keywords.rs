use crate::catalog::{RuleCatalog, Topic};

/// Topics from the catalog that occur at least once in `text`, in catalog order.
///
/// Each topic is tested independently against its compiled pattern; the number of
/// occurrences is not retained. Empty text never matches, whatever the match mode.
pub fn detect(text: &str, catalog: &RuleCatalog) -> Vec<Topic> {
    if text.is_empty() {
        return Vec::new();
    }

    catalog
        .entries()
        .iter()
        .filter(|entry| entry.is_mentioned_in(text))
        .map(|entry| entry.topic().clone())
        .collect()
}
