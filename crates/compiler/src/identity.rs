//! Cross-source work identity
//!
//! DOI when there is one, otherwise normalized title plus year. Two
//! distinct works with the same title and year and no DOI merge; there is
//! no further disambiguation.

use cartograph_common::models::{normalize_doi, normalize_title, WorkRecord};

/// Graph node id for the work `record` describes.
pub fn work_key(record: &WorkRecord) -> String {
    if let Some(doi) = record
        .doi
        .as_deref()
        .map(normalize_doi)
        .filter(|d| !d.is_empty())
    {
        return format!("doi:{}", doi);
    }

    let title = normalize_title(&record.title);
    if title.is_empty() {
        return format!("record:{}", record.id);
    }

    match record.year {
        Some(year) => format!("work:{}:{}", title, year),
        None => format!("work:{}", title),
    }
}

/// Node id for an author credited without an identifier
pub fn anonymous_author(work_id: &str) -> String {
    format!("{}:anon", work_id)
}
