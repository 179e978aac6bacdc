use regex_lite::Regex;
use std::sync::OnceLock;

fn orcid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("ORCID pattern is valid")
    })
}

/// Whether `candidate` is a canonical ORCID iD (`0000-0002-1825-0097`).
///
/// The final character is a checksum and may be `X`.
pub fn is_scholar_identifier(candidate: &str) -> bool {
    orcid_pattern().is_match(candidate)
}
