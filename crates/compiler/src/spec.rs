//! Spec validation

use cartograph_common::errors::{AppError, Result};
use cartograph_common::models::{is_scholar_identifier, Mode, Spec, YearWindow};
use indexmap::IndexSet;
use tracing::debug;

/// A spec the compiler can run: known mode, normalized concepts, and only
/// well-formed scholar identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSpec {
    pub mode: Mode,
    /// Trimmed, lower-cased, deduplicated, in first-occurrence order
    pub concepts: Vec<String>,
    /// Valid identifiers in request order, deduplicated
    pub scholars: Vec<String>,
    pub years: YearWindow,
    pub min_concept_freq: u32,
}

impl TryFrom<&Spec> for ValidatedSpec {
    type Error = AppError;

    fn try_from(spec: &Spec) -> Result<Self> {
        let mode = match spec.mode.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AppError::InvalidSpec {
                    message: "mode is required".to_string(),
                })
            }
            Some(raw) => raw
                .parse::<Mode>()
                .map_err(|message| AppError::InvalidSpec { message })?,
        };

        let concepts: IndexSet<String> = spec
            .concepts
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let scholars: IndexSet<String> = spec
            .scholars
            .iter()
            .map(|s| s.trim())
            .filter(|s| {
                let valid = is_scholar_identifier(s);
                if !valid {
                    debug!(scholar = %s, "Dropping malformed scholar identifier");
                }
                valid
            })
            .map(str::to_string)
            .collect();

        Ok(Self {
            mode,
            concepts: concepts.into_iter().collect(),
            scholars: scholars.into_iter().collect(),
            years: spec.years,
            min_concept_freq: spec.min_concept_freq.unwrap_or(1),
        })
    }
}
