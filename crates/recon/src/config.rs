use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::classify::Classifier;
use crate::error::ReconError;

/// Production lookup tables, used when no lookup file is supplied.
pub const DEFAULT_LOOKUPS: &str = include_str!("../defaults/lookups.toml");

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Static lookup tables consumed by the engine. Loaded once per process and
/// shared read-only by every flavor run.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Owner whose review window has no look-ahead month.
    pub exception_owner: String,
    /// Lifecycle situations that are never inside the review window.
    #[serde(default = "default_excluded_situations")]
    pub excluded_situations: Vec<String>,
    #[serde(default)]
    pub owners: OwnerTables,
    #[serde(default)]
    pub comments: CommentTables,
}

fn default_excluded_situations() -> Vec<String> {
    vec!["ANULADA".into(), "NO RENOVADA".into(), "VIGENCIA ANTERIOR".into()]
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerTables {
    /// Owner name → categories that owner handles (Rimac flavor).
    #[serde(default)]
    pub by_category: BTreeMap<String, Vec<String>>,
    /// (line of business, product) → owner (Pacífico flavor).
    #[serde(default)]
    pub by_line_product: Vec<LineProductOwner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineProductOwner {
    pub line: String,
    pub product: String,
    pub owner: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Status code → remark. Keys are the codes written as TOML keys (`1 = "..."`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentTables {
    #[serde(default)]
    pub rimac: BTreeMap<String, String>,
    #[serde(default)]
    pub pacifico: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LookupConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: LookupConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded production tables.
    pub fn builtin() -> Result<Self, ReconError> {
        Self::from_toml(DEFAULT_LOOKUPS)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.exception_owner.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "exception_owner must not be blank".into(),
            ));
        }

        // A category may repeat under one owner, never across owners
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (owner, categories) in &self.owners.by_category {
            for category in categories {
                let norm = category.trim().to_uppercase();
                if let Some(prev) = seen.get(&norm) {
                    if *prev != owner.as_str() {
                        return Err(ReconError::ConfigValidation(format!(
                            "category '{category}' is assigned to both '{prev}' and '{owner}'"
                        )));
                    }
                }
                seen.insert(norm, owner.as_str());
            }
        }

        let mut pairs: HashMap<(String, String), &str> = HashMap::new();
        for entry in &self.owners.by_line_product {
            let key = (entry.line.trim().to_uppercase(), entry.product.trim().to_uppercase());
            if let Some(prev) = pairs.get(&key) {
                if *prev != entry.owner.as_str() {
                    return Err(ReconError::ConfigValidation(format!(
                        "line '{}' / product '{}' is assigned to both '{prev}' and '{}'",
                        entry.line, entry.product, entry.owner
                    )));
                }
            }
            pairs.insert(key, entry.owner.as_str());
        }

        validate_comment_codes("rimac", &self.comments.rimac, Classifier::Schedule)?;
        validate_comment_codes("pacifico", &self.comments.pacifico, Classifier::Renewal)?;

        Ok(())
    }
}

fn validate_comment_codes(
    table: &str,
    comments: &BTreeMap<String, String>,
    classifier: Classifier,
) -> Result<(), ReconError> {
    for key in comments.keys() {
        let code: u8 = key.trim().parse().map_err(|_| {
            ReconError::ConfigValidation(format!("comments.{table}: '{key}' is not a status code"))
        })?;
        if !classifier.codes().iter().any(|c| c.value() == code) {
            return Err(ReconError::ConfigValidation(format!(
                "comments.{table}: code {code} is not produced by this flavor (expected one of {})",
                classifier
                    .codes()
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
