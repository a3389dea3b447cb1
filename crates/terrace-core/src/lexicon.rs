//! Custom lexicon files layered on top of the built-in polarity lexicon.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Valence range accepted for lexicon entries (VADER scale).
pub const MAX_TERM_WEIGHT: f64 = 4.0;

/// A YAML lexicon file of the form:
///
/// ```yaml
/// terms:
///   worldie: 3.0
///   bottled: -2.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconFile {
    #[serde(default)]
    pub terms: BTreeMap<String, f64>,
}

/// Load and validate a custom lexicon from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_lexicon(path: &Path) -> Result<LexiconFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LexiconFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_lexicon(&content)
}

/// Parse and validate lexicon YAML. Keys are lowercased.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is invalid or an entry fails validation.
pub fn parse_lexicon(content: &str) -> Result<LexiconFile, ConfigError> {
    let raw: LexiconFile = serde_yaml::from_str(content).map_err(ConfigError::LexiconFileParse)?;
    validate_lexicon(raw)
}

fn validate_lexicon(raw: LexiconFile) -> Result<LexiconFile, ConfigError> {
    let mut terms = BTreeMap::new();

    for (term, weight) in raw.terms {
        let normalized = term.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ConfigError::Validation(
                "lexicon term must be non-empty".to_string(),
            ));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "lexicon term '{term}' must be a single word"
            )));
        }
        if !weight.is_finite() || weight.abs() > MAX_TERM_WEIGHT {
            return Err(ConfigError::Validation(format!(
                "lexicon term '{term}' has weight {weight}; must be within [-{MAX_TERM_WEIGHT}, {MAX_TERM_WEIGHT}]"
            )));
        }
        if terms.insert(normalized.clone(), weight).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate lexicon term: '{normalized}'"
            )));
        }
    }

    Ok(LexiconFile { terms })
}

#[cfg(test)]
#[path = "lexicon_test.rs"]
mod tests;
