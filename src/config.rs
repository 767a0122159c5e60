//! Layered settings: built-in defaults, then `travel-search.toml`, then `TRAVEL_*`
//! environment variables (`__` separates nested keys, e.g.
//! `TRAVEL_RANKING__SAME_LANGUAGE_QUOTA=5`). API keys are read separately by
//! the clients that need them.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "travel-search.toml";
const ENV_PREFIX: &str = "TRAVEL_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ranking: RankingConfig,
    pub index: IndexSettings,
    pub nlu: NluSettings,
}

impl Settings {
    /// Loads settings, reading `path` instead of the default file when given.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranking.validate()?;
        if self.index.timeout_secs == 0 {
            return Err(ConfigError::Invalid("index.timeout_secs must be at least 1".to_string()));
        }
        if self.nlu.timeout_secs == 0 {
            return Err(ConfigError::Invalid("nlu.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Thresholds and weights of the ranking pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Results scoring below this are dropped as noise.
    pub min_similarity: f32,
    /// Share of constraint credit a candidate needs to survive filtering.
    pub acceptance_ratio: f32,
    /// Score boost for a candidate matching every constraint.
    pub filter_boost: f32,
    /// Credit for a constraint matched only by a shared token.
    pub partial_match_credit: f32,
    /// Credit for a region constraint naming the whole city.
    pub generic_region_credit: f32,
    /// Region values too broad to filter on, compared case-insensitively.
    pub generic_regions: Vec<String>,
    /// Same-language results needed before other languages are excluded.
    pub same_language_quota: usize,
    /// Candidates fetched per requested result.
    pub overfetch_factor: usize,
    pub weights: FieldWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.1,
            acceptance_ratio: 0.5,
            filter_boost: 0.2,
            partial_match_credit: 0.7,
            generic_region_credit: 0.5,
            generic_regions: [
                "thành phố hồ chí minh",
                "tp.hcm",
                "tp hcm",
                "tp. hcm",
                "ho chi minh city",
                "hcmc",
                "saigon",
                "sài gòn",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            same_language_quota: 3,
            overfetch_factor: 3,
            weights: FieldWeights::default(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = [
            ("min_similarity", self.min_similarity),
            ("acceptance_ratio", self.acceptance_ratio),
            ("filter_boost", self.filter_boost),
            ("partial_match_credit", self.partial_match_credit),
            ("generic_region_credit", self.generic_region_credit),
        ];
        if let Some((name, value)) = unit.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(ConfigError::Invalid(format!(
                "ranking.{name} must be within [0, 1], got {value}"
            )));
        }
        let counts = [
            ("overfetch_factor", self.overfetch_factor),
            ("same_language_quota", self.same_language_quota),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("ranking.{name} must be at least 1")));
        }
        let w = &self.weights;
        let weights = [w.keywords, w.place_type, w.region, w.address];
        if weights.iter().any(|v| !(0.0..=1.0).contains(v)) || weights.iter().sum::<f32>() > 1.0 + 1e-6 {
            return Err(ConfigError::Invalid(
                "ranking.weights must be non-negative and sum to at most 1".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn is_generic_region(&self, region: &str) -> bool {
        let region = region.trim().to_lowercase();
        self.generic_regions
            .iter()
            .any(|g| g.trim().to_lowercase() == region)
    }
}

/// Additive boosts for literal query-word overlap, per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub keywords: f32,
    pub place_type: f32,
    pub region: f32,
    pub address: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            keywords: 0.25,
            place_type: 0.20,
            region: 0.20,
            address: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub base_url: String,
    pub collection: String,
    pub timeout_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            collection: "places".to_string(),
            timeout_secs: 10,
        }
    }
}

impl IndexSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NluSettings {
    pub timeout_secs: u64,
}

impl Default for NluSettings {
    fn default() -> Self {
        Self { timeout_secs: 8 }
    }
}

impl NluSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
