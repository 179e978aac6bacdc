use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which derived-edge pass runs after the base author/work/concept edges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Base edges only
    ConceptComparison,
    /// Adds `influences` edges between time-ordered works sharing a concept
    Lineage,
    /// Adds `coauthor` edges between authors sharing a work
    CoWork,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::ConceptComparison => "concept_comparison",
            Mode::Lineage => "lineage",
            Mode::CoWork => "co_work",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concept_comparison" => Ok(Mode::ConceptComparison),
            "lineage" => Ok(Mode::Lineage),
            "co_work" => Ok(Mode::CoWork),
            other => Err(format!("unrecognized mode '{}'", other)),
        }
    }
}

/// Inclusive publication-year window; an absent bound is unbounded
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

impl YearWindow {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min.map_or(true, |min| year >= min) && self.max.map_or(true, |max| year <= max)
    }

    /// Unknown years are never "outside" the window.
    pub fn admits(&self, year: Option<i32>) -> bool {
        year.map_or(true, |y| self.contains(y))
    }
}

/// Cartography query as received on the wire.
///
/// `mode` stays a raw string here so a missing or unknown mode is reported
/// by the compiler as an invalid spec instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub concepts: Vec<String>,

    /// Scholar identifiers (ORCID iDs)
    #[serde(default)]
    pub scholars: Vec<String>,

    #[serde(default)]
    pub years: YearWindow,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_concept_freq: Option<u32>,
}

impl Spec {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode: Some(mode.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn with_concepts<I, S>(mut self, concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concepts = concepts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scholars<I, S>(mut self, scholars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scholars = scholars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.years = YearWindow::new(min, max);
        self
    }

    pub fn with_min_concept_freq(mut self, freq: u32) -> Self {
        self.min_concept_freq = Some(freq);
        self
    }
}
