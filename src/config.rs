use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::adjust::ProjectionModel;
use crate::dataset::{SourceId, Tier};
use crate::error::PipelineError;

pub const DEFAULT_CONFIG_FILE: &str = "salary_projection";
pub const ENV_PREFIX: &str = "SALARY";

/// How fetch failures are recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Each failed source is replaced by its own default; the run continues.
    #[default]
    PerSource,
    /// The first failure aborts the run, which restarts once on defaults only.
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inflation_rate: f64,
    pub fallback_policy: FallbackPolicy,
    pub model: ProjectionModel,
    pub sources: SourceEndpoints,
    pub http: HttpSettings,
    pub regression: RegressionSettings,
    pub growth: GrowthSettings,
    pub extraction: ExtractionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            inflation_rate: 0.025,
            fallback_policy: FallbackPolicy::default(),
            model: ProjectionModel::default(),
            sources: SourceEndpoints::default(),
            http: HttpSettings::default(),
            regression: RegressionSettings::default(),
            growth: GrowthSettings::default(),
            extraction: ExtractionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceEndpoints {
    pub salary: String,
    pub demand: String,
    pub geographic: String,
    pub skills: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        SourceEndpoints {
            salary: "https://api.mockdatasalary.com/salaries".into(),
            demand: "https://api.mockjobdemand.com/demand".into(),
            geographic: "https://api.mockgeographic.com/factors".into(),
            skills: "https://api.mockskills.com/premiums".into(),
        }
    }
}

impl SourceEndpoints {
    pub fn url(&self, source: SourceId) -> &str {
        match source {
            SourceId::Salary => &self.salary,
            SourceId::Demand => &self.demand,
            SourceId::Geographic => &self.geographic,
            SourceId::Skills => &self.skills,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Extra attempts after the first one, for retryable failures only.
    pub retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_secs: 10,
            retries: 1,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One value per experience tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierValues {
    pub entry: f64,
    pub mid: f64,
    pub senior: f64,
}

impl TierValues {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Entry => self.entry,
            Tier::Mid => self.mid,
            Tier::Senior => self.senior,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionSettings {
    pub experience: TierValues,
}

impl Default for RegressionSettings {
    fn default() -> Self {
        RegressionSettings {
            experience: TierValues {
                entry: 0.0,
                mid: 1.0,
                senior: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    /// Assumed prior-year salary as a fraction of the current figure.
    pub prior_ratio: TierValues,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        GrowthSettings {
            prior_ratio: TierValues {
                entry: 0.95,
                mid: 0.90,
                senior: 0.85,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub enabled: bool,
    pub postings: Vec<String>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        ExtractionSettings {
            enabled: false,
            postings: vec![
                "Looking for an entry-level Data Scientist. The salary range is $90,000–$120,000."
                    .into(),
                "Hiring a senior Data Engineer with experience in cloud platforms. Salary up to $175,000."
                    .into(),
            ],
        }
    }
}

impl Settings {
    /// Defaults, then the optional file, then `SALARY_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, PipelineError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.inflation_rate.is_finite() || self.inflation_rate < -1.0 {
            return Err(PipelineError::Config(format!(
                "inflation_rate must be a finite value >= -1, got {}",
                self.inflation_rate
            )));
        }
        for tier in Tier::ALL {
            let ratio = self.growth.prior_ratio.get(tier);
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(PipelineError::Config(format!(
                    "growth.prior_ratio.{} must be positive, got {}",
                    tier.key(),
                    ratio
                )));
            }
            if !self.regression.experience.get(tier).is_finite() {
                return Err(PipelineError::Config(format!(
                    "regression.experience.{} must be finite",
                    tier.key()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let s = Settings::default();
        assert_eq!(s.inflation_rate, 0.025);
        assert_eq!(s.fallback_policy, FallbackPolicy::PerSource);
        assert_eq!(s.model, ProjectionModel::Chain);
        assert_eq!(s.http.retries, 1);
        assert!(!s.extraction.enabled);
        assert_eq!(s.extraction.postings.len(), 2);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let raw = r#"
            inflation_rate = 0.03
            fallback_policy = "fail-fast"

            [sources]
            salary = "http://localhost:8080/salaries"
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(settings.inflation_rate, 0.03);
        assert_eq!(settings.fallback_policy, FallbackPolicy::FailFast);
        assert_eq!(settings.sources.url(SourceId::Salary), "http://localhost:8080/salaries");
        assert_eq!(
            settings.sources.url(SourceId::Skills),
            "https://api.mockskills.com/premiums"
        );
        assert_eq!(settings.http.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_bad_values() {
        let mut s = Settings::default();
        s.inflation_rate = f64::NAN;
        assert!(matches!(s.validate(), Err(PipelineError::Config(_))));

        let mut s = Settings::default();
        s.growth.prior_ratio.mid = 0.0;
        assert!(s.validate().is_err());
    }
}
