//! Short human-readable codes
//!
//! Codes are for scanning, not identity: two works may share `AT-15`.
//! Concept codes are the exception, since each one keys a RefIndex bucket.

use std::collections::HashSet;

/// Initials of the first two words, plus `-YY` when a year is known.
///
/// `code_for("Assemblage Theory and Method", Some(2015)) == "AT-15"`
pub fn code_for(label: &str, year: Option<i32>) -> String {
    let initials: String = label
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    match year {
        Some(year) => format!("{}-{:02}", initials, year.rem_euclid(100)),
        None => initials,
    }
}

/// `#` plus the first three letters of the term, uppercased.
pub fn concept_code(term: &str) -> String {
    let head: String = term.chars().take(3).flat_map(char::to_uppercase).collect();
    format!("#{}", head)
}

/// Hands out concept codes, suffixing repeats (`#ASS`, `#ASS2`, ...) so
/// every concept owns its own bucket. A suffixed code is never one already
/// handed out, even when a later term's own code looks suffixed.
#[derive(Debug, Default)]
pub struct ConceptCodes {
    issued: HashSet<String>,
}

impl ConceptCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, term: &str) -> String {
        let base = concept_code(term);
        let mut code = base.clone();
        let mut n = 1;
        while self.issued.contains(&code) {
            n += 1;
            code = format!("{}{}", base, n);
        }
        self.issued.insert(code.clone());
        code
    }
}
