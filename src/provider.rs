//! Dataset acquisition with built-in fallbacks.
//!
//! A provider only returns raw payloads; decoding is shared so every
//! transport classifies malformed data the same way.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{FallbackPolicy, HttpSettings, SourceEndpoints};
use crate::dataset::{DemandFactor, GeographicFactor, SalaryBand, SkillsMap, SourceId};
use crate::defaults;
use crate::error::{PipelineError, SourceError};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

pub trait DatasetProvider {
    /// Raw payload for one source.
    fn fetch(&self, source: SourceId) -> Result<String, SourceError>;
}

/// Blocking HTTP GET per source with a bounded timeout and retries.
pub struct HttpProvider {
    client: reqwest::blocking::Client,
    endpoints: SourceEndpoints,
    retries: u32,
}

impl HttpProvider {
    pub fn new(endpoints: SourceEndpoints, http: &HttpSettings) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(http.timeout())
            .build()?;
        Ok(HttpProvider {
            client,
            endpoints,
            retries: http.retries,
        })
    }

    fn fetch_once(&self, source: SourceId) -> Result<String, SourceError> {
        let url = self.endpoints.url(source);
        debug!(%source, url, "fetching dataset");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SourceError::Transport {
                source_id: source,
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                source_id: source,
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| SourceError::Transport {
            source_id: source,
            reason: e.to_string(),
        })
    }
}

impl DatasetProvider for HttpProvider {
    fn fetch(&self, source: SourceId) -> Result<String, SourceError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(source) {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(%source, error = %e, attempt, "retrying dataset fetch");
                    thread::sleep(RETRY_BACKOFF);
                }
                result => return result,
            }
        }
    }
}

/// Fixed in-memory payloads. Sources without a payload fail as unavailable.
#[derive(Debug, Default, Clone)]
pub struct StaticProvider {
    payloads: HashMap<SourceId, String>,
}

impl StaticProvider {
    /// Every source unavailable.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: SourceId, payload: impl Into<String>) -> Self {
        self.payloads.insert(source, payload.into());
        self
    }
}

impl DatasetProvider for StaticProvider {
    fn fetch(&self, source: SourceId) -> Result<String, SourceError> {
        self.payloads
            .get(&source)
            .cloned()
            .ok_or_else(|| SourceError::Transport {
                source_id: source,
                reason: "no payload available".into(),
            })
    }
}

/// One decoded source.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Salary(Vec<SalaryBand>),
    Demand(Vec<DemandFactor>),
    Geographic(Vec<GeographicFactor>),
    Skills(SkillsMap),
}

impl Dataset {
    pub fn default_for(source: SourceId) -> Self {
        match source {
            SourceId::Salary => Dataset::Salary(defaults::salary_bands()),
            SourceId::Demand => Dataset::Demand(defaults::demand_factors()),
            SourceId::Geographic => Dataset::Geographic(defaults::geographic_factors()),
            SourceId::Skills => Dataset::Skills(defaults::skills_premiums()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Salary(rows) => rows.len(),
            Dataset::Demand(rows) => rows.len(),
            Dataset::Geographic(rows) => rows.len(),
            Dataset::Skills(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn decode(source: SourceId, payload: &str) -> Result<Dataset, SourceError> {
    Ok(match source {
        SourceId::Salary => Dataset::Salary(decode_json(source, payload)?),
        SourceId::Demand => Dataset::Demand(decode_json(source, payload)?),
        SourceId::Geographic => Dataset::Geographic(decode_json(source, payload)?),
        SourceId::Skills => Dataset::Skills(decode_json(source, payload)?),
    })
}

fn decode_json<T: DeserializeOwned>(source: SourceId, payload: &str) -> Result<T, SourceError> {
    serde_json::from_str(payload).map_err(|e| SourceError::Malformed {
        source_id: source,
        reason: e.to_string(),
    })
}

pub fn try_fetch(provider: &dyn DatasetProvider, source: SourceId) -> Result<Dataset, SourceError> {
    let payload = provider.fetch(source)?;
    decode(source, &payload)
}

/// Never fails: any fetch or decode error yields the built-in dataset.
pub fn fetch_or_default(provider: &dyn DatasetProvider, source: SourceId) -> Dataset {
    resolve(provider, source).dataset
}

/// A dataset and whether it is the built-in substitute.
struct Resolved {
    dataset: Dataset,
    fallback: bool,
}

fn resolve(provider: &dyn DatasetProvider, source: SourceId) -> Resolved {
    match try_fetch(provider, source) {
        Ok(dataset) => {
            info!(%source, rows = dataset.len(), "fetched dataset");
            Resolved {
                dataset,
                fallback: false,
            }
        }
        Err(e) => {
            warn!(%source, error = %e, "source unavailable; using fallback dataset");
            Resolved {
                dataset: Dataset::default_for(source),
                fallback: true,
            }
        }
    }
}

/// Everything the projection needs, plus which sources were substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub salary: Vec<SalaryBand>,
    pub demand: Vec<DemandFactor>,
    pub geographic: Vec<GeographicFactor>,
    pub skills: SkillsMap,
    pub fallbacks: Vec<SourceId>,
}

impl Inputs {
    pub fn defaults() -> Self {
        Inputs {
            salary: defaults::salary_bands(),
            demand: defaults::demand_factors(),
            geographic: defaults::geographic_factors(),
            skills: defaults::skills_premiums(),
            fallbacks: SourceId::ALL.to_vec(),
        }
    }

    fn replace(&mut self, dataset: Dataset) {
        match dataset {
            Dataset::Salary(rows) => self.salary = rows,
            Dataset::Demand(rows) => self.demand = rows,
            Dataset::Geographic(rows) => self.geographic = rows,
            Dataset::Skills(map) => self.skills = map,
        }
    }
}

/// Fetch all four sources in order under `policy`.
///
/// `PerSource` never errors. `FailFast` returns `RunAborted` on the first
/// failure and leaves the defaults-only restart to the caller.
pub fn fetch_all(
    provider: &dyn DatasetProvider,
    policy: FallbackPolicy,
) -> Result<Inputs, PipelineError> {
    let mut inputs = Inputs::defaults();
    inputs.fallbacks.clear();
    for source in SourceId::ALL {
        let dataset = match policy {
            FallbackPolicy::PerSource => {
                let resolved = resolve(provider, source);
                if resolved.fallback {
                    inputs.fallbacks.push(source);
                }
                resolved.dataset
            }
            FallbackPolicy::FailFast => {
                let dataset = try_fetch(provider, source).map_err(PipelineError::RunAborted)?;
                info!(%source, rows = dataset.len(), "fetched dataset");
                dataset
            }
        };
        inputs.replace(dataset);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALARY: &str = r#"[
        {"Role":"QA Engineer","Entry-Level 2024":60000,"Mid-Level 2024":80000,"Senior-Level 2024":100000,"Currency":"USD"}
    ]"#;
    const DEMAND: &str = r#"[{"Role":"QA Engineer","Demand Factor":0.2}]"#;
    const GEO: &str = r#"[{"Role":"QA Engineer","Geographic Factor":0.1}]"#;
    const SKILLS: &str = r#"{"Testing":0.04}"#;

    fn full_provider() -> StaticProvider {
        StaticProvider::default()
            .with(SourceId::Salary, SALARY)
            .with(SourceId::Demand, DEMAND)
            .with(SourceId::Geographic, GEO)
            .with(SourceId::Skills, SKILLS)
    }

    #[test]
    fn decodes_each_source_shape() {
        match decode(SourceId::Salary, SALARY).unwrap() {
            Dataset::Salary(rows) => assert_eq!(rows[0].senior, 100_000.0),
            other => panic!("unexpected {other:?}"),
        }
        match decode(SourceId::Skills, SKILLS).unwrap() {
            Dataset::Skills(map) => assert_eq!(map.get("Testing"), Some(&0.04)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_payloads_are_classified() {
        let missing_field = decode(SourceId::Demand, r#"[{"Role":"A"}]"#);
        assert!(matches!(missing_field, Err(SourceError::Malformed { .. })));
        let not_json = decode(SourceId::Salary, "<html>oops</html>");
        assert!(matches!(not_json, Err(SourceError::Malformed { .. })));
    }

    #[test]
    fn skills_must_be_a_numeric_map() {
        let non_numeric = decode(SourceId::Skills, r#"{"Python":"high"}"#);
        assert!(matches!(
            non_numeric,
            Err(SourceError::Malformed { source_id: SourceId::Skills, .. })
        ));
        let not_a_map = decode(SourceId::Skills, r#"[0.05, 0.03]"#);
        assert!(not_a_map.is_err());
        let provider = full_provider().with(SourceId::Skills, r#"{"Python":"high"}"#);
        assert_eq!(
            fetch_or_default(&provider, SourceId::Skills),
            Dataset::default_for(SourceId::Skills)
        );
    }

    #[test]
    fn each_failed_source_yields_its_default() {
        let provider = StaticProvider::offline();
        for source in SourceId::ALL {
            assert_eq!(fetch_or_default(&provider, source), Dataset::default_for(source));
        }
    }

    #[test]
    fn per_source_policy_substitutes_only_failed_sources() {
        let provider = StaticProvider::default()
            .with(SourceId::Salary, SALARY)
            .with(SourceId::Geographic, GEO)
            .with(SourceId::Skills, "not json");
        let inputs = fetch_all(&provider, FallbackPolicy::PerSource).unwrap();
        assert_eq!(inputs.salary[0].role, "QA Engineer");
        assert_eq!(inputs.demand, defaults::demand_factors());
        assert_eq!(inputs.skills, defaults::skills_premiums());
        assert_eq!(inputs.fallbacks, vec![SourceId::Demand, SourceId::Skills]);
        for source in SourceId::ALL {
            let dataset = fetch_or_default(&provider, source);
            match source {
                SourceId::Salary => assert_eq!(dataset, Dataset::Salary(inputs.salary.clone())),
                SourceId::Demand => assert_eq!(dataset, Dataset::Demand(inputs.demand.clone())),
                SourceId::Geographic => {
                    assert_eq!(dataset, Dataset::Geographic(inputs.geographic.clone()))
                }
                SourceId::Skills => assert_eq!(dataset, Dataset::Skills(inputs.skills.clone())),
            }
        }
    }

    #[test]
    fn fail_fast_aborts_on_first_failure() {
        let provider = full_provider().with(SourceId::Geographic, "{}");
        let err = fetch_all(&provider, FallbackPolicy::FailFast).unwrap_err();
        match err {
            PipelineError::RunAborted(e) => assert_eq!(e.source_id(), SourceId::Geographic),
            other => panic!("unexpected {other:?}"),
        }
        let ok = fetch_all(&full_provider(), FallbackPolicy::FailFast).unwrap();
        assert!(ok.fallbacks.is_empty());
    }

    #[test]
    fn http_provider_falls_back_when_unreachable() {
        let endpoints = SourceEndpoints {
            salary: "http://127.0.0.1:9/salaries".into(),
            demand: "http://127.0.0.1:9/demand".into(),
            geographic: "http://127.0.0.1:9/factors".into(),
            skills: "http://127.0.0.1:9/premiums".into(),
        };
        let http = HttpSettings {
            timeout_secs: 2,
            retries: 0,
        };
        let provider = HttpProvider::new(endpoints, &http).unwrap();
        let err = provider.fetch(SourceId::Salary).unwrap_err();
        assert_eq!(err.source_id(), SourceId::Salary);
        assert!(!matches!(err, SourceError::Malformed { .. }));
        assert_eq!(
            fetch_or_default(&provider, SourceId::Demand),
            Dataset::default_for(SourceId::Demand)
        );
    }
}
