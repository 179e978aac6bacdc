use serde::{Deserialize, Serialize};

/// One author credit on a work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkAuthor {
    /// ORCID iD when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default)]
    pub display_name: String,
}

impl WorkAuthor {
    pub fn identified(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            display_name: display_name.into(),
        }
    }

    pub fn anonymous(display_name: impl Into<String>) -> Self {
        Self {
            identifier: None,
            display_name: display_name.into(),
        }
    }
}

/// A bibliographic record (article, book, chapter, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    /// Stable per work within its source
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default)]
    pub authors: Vec<WorkAuthor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

/// Fields a secondary source may contribute to a record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bibliographic {
    pub doi: Option<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
}

impl WorkRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: None,
            authors: Vec::new(),
            doi: None,
            url: None,
            isbn: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_author(mut self, author: WorkAuthor) -> Self {
        self.authors.push(author);
        self
    }

    /// Both DOI and URL present: nothing a secondary source could add
    /// that the enricher is allowed to look up.
    pub fn is_fully_linked(&self) -> bool {
        self.doi.is_some() && self.url.is_some()
    }

    /// Fill absent `doi`/`url`/`year` from `found`. Present values are never
    /// overwritten.
    pub fn merged_with(mut self, found: Bibliographic) -> Self {
        if self.doi.is_none() {
            self.doi = found.doi;
        }
        if self.url.is_none() {
            self.url = found.url;
        }
        if self.year.is_none() {
            self.year = found.year;
        }
        self
    }

    pub fn bibliographic(&self) -> Bibliographic {
        Bibliographic {
            doi: self.doi.clone(),
            url: self.url.clone(),
            year: self.year,
        }
    }
}

/// Lowercase, strip resolver prefixes, trim.
pub fn normalize_doi(doi: &str) -> String {
    let lowered = doi.trim().to_lowercase();
    const PREFIXES: [&str; 5] = [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ];
    PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(&lowered)
        .trim()
        .to_string()
}

/// Lowercase, non-alphanumerics to spaces, whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
