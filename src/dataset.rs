//! Row types for the four input datasets, the joined working table and the
//! projected output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const TARGET_YEAR: u16 = 2025;

/// The four logical input datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Salary,
    Demand,
    Geographic,
    Skills,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Salary,
        SourceId::Demand,
        SourceId::Geographic,
        SourceId::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Salary => "salary",
            SourceId::Demand => "demand",
            SourceId::Geographic => "geographic",
            SourceId::Skills => "skills",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBand {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Entry-Level 2024")]
    pub entry: f64,
    #[serde(rename = "Mid-Level 2024")]
    pub mid: f64,
    #[serde(rename = "Senior-Level 2024")]
    pub senior: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandFactor {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Demand Factor")]
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicFactor {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Geographic Factor")]
    pub factor: f64,
}

/// Skill name to premium rate. Not tied to any role.
pub type SkillsMap = BTreeMap<String, f64>;

/// Sum of every premium in the map; an empty map yields `0.0`.
pub fn total_premium(skills: &SkillsMap) -> f64 {
    skills.values().sum()
}

/// Anything keyed by role name for the join.
pub trait Keyed {
    fn role(&self) -> &str;
}

impl Keyed for SalaryBand {
    fn role(&self) -> &str {
        &self.role
    }
}

impl Keyed for DemandFactor {
    fn role(&self) -> &str {
        &self.role
    }
}

impl Keyed for GeographicFactor {
    fn role(&self) -> &str {
        &self.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Entry,
    Mid,
    Senior,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Entry, Tier::Mid, Tier::Senior];

    pub fn key(&self) -> &'static str {
        match self {
            Tier::Entry => "entry",
            Tier::Mid => "mid",
            Tier::Senior => "senior",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Entry => "Entry-Level",
            Tier::Mid => "Mid-Level",
            Tier::Senior => "Senior-Level",
        }
    }
}

/// One joined row: salary bands plus both per-role factors.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRecord {
    pub role: String,
    pub entry: f64,
    pub mid: f64,
    pub senior: f64,
    pub demand_factor: f64,
    pub geographic_factor: f64,
}

impl RoleRecord {
    pub fn figure(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Entry => self.entry,
            Tier::Mid => self.mid,
            Tier::Senior => self.senior,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRow {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Entry-Level 2025")]
    pub entry: f64,
    #[serde(rename = "Mid-Level 2025")]
    pub mid: f64,
    #[serde(rename = "Senior-Level 2025")]
    pub senior: f64,
}
