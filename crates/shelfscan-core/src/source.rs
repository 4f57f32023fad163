use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

/// A known retail origin for listings.
///
/// Declaration order is significant: collection runs merge job results in
/// this order and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "tesco")]
    Tesco,
    #[serde(rename = "asda")]
    Asda,
    #[serde(rename = "lidl")]
    Lidl,
    #[serde(rename = "costco")]
    Costco,
    #[serde(rename = "bm")]
    BM,
    #[serde(rename = "iceland")]
    Iceland,
    #[serde(rename = "white_rose")]
    WhiteRose,
    #[serde(rename = "hotdeals")]
    HotDeals,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Tesco,
        Source::Asda,
        Source::Lidl,
        Source::Costco,
        Source::BM,
        Source::Iceland,
        Source::WhiteRose,
        Source::HotDeals,
    ];

    /// Stable machine identifier, e.g. `"white_rose"`.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Source::Tesco => "tesco",
            Source::Asda => "asda",
            Source::Lidl => "lidl",
            Source::Costco => "costco",
            Source::BM => "bm",
            Source::Iceland => "iceland",
            Source::WhiteRose => "white_rose",
            Source::HotDeals => "hotdeals",
        }
    }

    /// Human-facing retailer name, e.g. `"B&M"`.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Source::Tesco => "Tesco",
            Source::Asda => "Asda",
            Source::Lidl => "Lidl",
            Source::Costco => "Costco",
            Source::BM => "B&M",
            Source::Iceland => "Iceland",
            Source::WhiteRose => "White Rose",
            Source::HotDeals => "HotDeals",
        }
    }

    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Source::Tesco => "https://www.tesco.com",
            Source::Asda => "https://groceries.asda.com",
            Source::Lidl => "https://www.lidl.co.uk",
            Source::Costco => "https://www.costco.co.uk",
            Source::BM => "https://www.bmstores.co.uk",
            Source::Iceland => "https://www.iceland.co.uk",
            Source::WhiteRose => "https://www.whiterose.co.uk",
            Source::HotDeals => "https://www.hotdealsuk.com",
        }
    }

    /// Brand colour (hex, no `#`) used for generated placeholder images.
    #[must_use]
    pub fn placeholder_colour(self) -> &'static str {
        match self {
            Source::Tesco => "2563EB",
            Source::Asda => "16A34A",
            Source::Lidl => "DC2626",
            Source::Costco => "9333EA",
            Source::BM => "EA580C",
            Source::Iceland => "0891B2",
            Source::WhiteRose => "DB2777",
            Source::HotDeals => "FF6B35",
        }
    }

    /// Zero-based position in declaration order.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Source {
    type Err = CoreError;

    /// Accepts identifiers and display names in any case, ignoring spaces,
    /// `-`, `_` and `&` (so `"B&M"`, `"white rose"` and `"white_rose"` all work).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_' | '&'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "tesco" => Ok(Source::Tesco),
            "asda" => Ok(Source::Asda),
            "lidl" => Ok(Source::Lidl),
            "costco" => Ok(Source::Costco),
            "bm" => Ok(Source::BM),
            "iceland" => Ok(Source::Iceland),
            "whiterose" => Ok(Source::WhiteRose),
            "hotdeals" => Ok(Source::HotDeals),
            _ => Err(CoreError::UnknownSource(s.to_string())),
        }
    }
}

/// Hand-tuned per-source constants: how much a source's reputation counts in
/// ranking and how its synthetic prices are positioned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceProfile {
    pub source: Source,
    /// Static reputation weight in `[0, 1]`.
    pub reputation: f64,
    /// Multiplier applied to synthetic fallback prices (> 0).
    pub price_multiplier: f64,
}

/// Lookup table of [`SourceProfile`]s, one per known source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProfiles {
    profiles: BTreeMap<Source, SourceProfile>,
}

impl SourceProfiles {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        let profiles = Source::ALL
            .into_iter()
            .map(|source| {
                let (reputation, price_multiplier) = match source {
                    Source::Tesco => (0.9, 1.0),
                    Source::Asda => (0.85, 1.0),
                    Source::Lidl => (0.8, 0.9),
                    Source::Costco => (0.85, 1.2),
                    Source::BM => (0.75, 1.0),
                    Source::Iceland => (0.7, 1.0),
                    Source::WhiteRose => (0.7, 0.9),
                    Source::HotDeals => (0.9, 0.85),
                };
                (
                    source,
                    SourceProfile {
                        source,
                        reputation,
                        price_multiplier,
                    },
                )
            })
            .collect();
        Self { profiles }
    }

    #[must_use]
    pub fn get(&self, source: Source) -> SourceProfile {
        self.profiles
            .get(&source)
            .copied()
            .unwrap_or(SourceProfile {
                source,
                reputation: 0.5,
                price_multiplier: 1.0,
            })
    }

    #[must_use]
    pub fn reputation(&self, source: Source) -> f64 {
        self.get(source).reputation
    }

    #[must_use]
    pub fn price_multiplier(&self, source: Source) -> f64 {
        self.get(source).price_multiplier
    }

    /// Returns a copy of this table with the file's overrides applied.
    #[must_use]
    pub fn with_overrides(mut self, file: &SourcesFile) -> Self {
        for entry in &file.sources {
            let profile = self.profiles.entry(entry.source).or_insert(SourceProfile {
                source: entry.source,
                reputation: 0.5,
                price_multiplier: 1.0,
            });
            if let Some(reputation) = entry.reputation {
                profile.reputation = reputation;
            }
            if let Some(multiplier) = entry.price_multiplier {
                profile.price_multiplier = multiplier;
            }
        }
        self
    }
}

impl Default for SourceProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One entry of the sources override file. Omitted fields keep the built-in value.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceOverride {
    pub source: Source,
    pub reputation: Option<f64>,
    pub price_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceOverride>,
}

/// Load source profile overrides from a YAML file and apply them on top of
/// [`SourceProfiles::builtin`].
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_source_profiles(path: &Path) -> Result<SourceProfiles, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;
    validate_sources(&sources_file)?;

    Ok(SourceProfiles::builtin().with_overrides(&sources_file))
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &sources_file.sources {
        if !seen.insert(entry.source) {
            return Err(ConfigError::Validation(format!(
                "duplicate source: '{}'",
                entry.source
            )));
        }

        if let Some(reputation) = entry.reputation {
            if !(0.0..=1.0).contains(&reputation) {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has reputation {reputation}; must be within [0, 1]",
                    entry.source
                )));
            }
        }

        if let Some(multiplier) = entry.price_multiplier {
            if multiplier.is_nan() || multiplier <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has price_multiplier {multiplier}; must be positive",
                    entry.source
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
