use serde::{Deserialize, Serialize};

fn default_interest_rate() -> f64 {
    0.10
}

fn default_years() -> i64 {
    10
}

fn default_iterations() -> i64 {
    10_000
}

/// A complete scenario in human-readable format
///
/// Counts are signed so that negative values survive parsing and are
/// reported as config errors rather than syntax errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioData {
    #[serde(default = "default_interest_rate")]
    pub interest_rate: f64,
    #[serde(default = "default_years")]
    pub years: i64,
    #[serde(default = "default_iterations")]
    pub iterations: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_percentiles: Option<bool>,
    pub sheet: SheetData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SheetData {
    #[serde(default)]
    pub groups: Vec<GroupData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupData {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub items: Vec<ItemData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub upfront_cost: CostData,
    #[serde(default)]
    pub recurring_cost: CostData,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DistributionType {
    Gaussian,
    Constant,
    Pareto,
}

/// A cost: distribution type, its parameters and its year window, in one map
///
/// Parameters are optional here and checked against `type` on conversion,
/// which keeps the YAML flat (`{ type: Gaussian, mu: 10, sigma: 2, start_year: "" }`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostData {
    #[serde(rename = "type")]
    pub kind: DistributionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default)]
    pub start_year: Option<YearData>,
    #[serde(default)]
    pub end_year: Option<YearData>,
}

impl Default for CostData {
    fn default() -> Self {
        Self {
            kind: DistributionType::Constant,
            mu: None,
            sigma: None,
            value: Some(0.0),
            alpha: None,
            scale: None,
            start_year: None,
            end_year: None,
        }
    }
}

/// A year bound as written: a number, or a string that is empty when unbounded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum YearData {
    Number(i64),
    Text(String),
}

impl YearData {
    /// The form written for an absent bound
    pub fn unbounded() -> Self {
        YearData::Text(String::new())
    }
}

impl From<Option<u32>> for YearData {
    fn from(year: Option<u32>) -> Self {
        match year {
            Some(year) => YearData::Number(i64::from(year)),
            None => YearData::unbounded(),
        }
    }
}
