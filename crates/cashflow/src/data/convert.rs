use cashflow_core::{
    config::SimulationConfig,
    error::ConfigError,
    model::{CashFlowGroup, CashFlowItem, CashFlowSheet, Cost, Distribution, YearWindow},
};

use super::scenario_data::{
    CostData, DistributionType, GroupData, ItemData, ScenarioData, SheetData, YearData,
};
use crate::error::ParseError;

/// Convert a parsed scenario document into the engine's sheet and config
pub fn to_model(data: &ScenarioData) -> Result<(CashFlowSheet, SimulationConfig), ParseError> {
    let config = convert_config(data)?;

    let groups = data
        .sheet
        .groups
        .iter()
        .map(convert_group)
        .collect::<Result<Vec<_>, _>>()?;
    let sheet = CashFlowSheet::new(groups)?;

    Ok((sheet, config))
}

/// Convert a sheet and config back into the document form
pub fn from_model(sheet: &CashFlowSheet, config: &SimulationConfig) -> ScenarioData {
    let defaults = SimulationConfig::default();

    ScenarioData {
        interest_rate: config.interest_rate,
        years: i64::from(config.years),
        iterations: i64::try_from(config.iterations).unwrap_or(i64::MAX),
        seed: Some(config.seed),
        percentiles: (config.percentiles != defaults.percentiles)
            .then(|| config.percentiles.clone()),
        yearly_percentiles: (config.yearly_percentiles != defaults.yearly_percentiles)
            .then_some(config.yearly_percentiles),
        sheet: SheetData {
            groups: sheet.groups().iter().map(group_data).collect(),
        },
    }
}

fn convert_config(data: &ScenarioData) -> Result<SimulationConfig, ParseError> {
    if data.years <= 0 {
        return Err(ConfigError::NonPositiveYears(data.years).into());
    }
    if data.iterations <= 0 {
        return Err(ConfigError::NonPositiveIterations(data.iterations).into());
    }

    let years = u32::try_from(data.years).map_err(|_| ConfigError::TooManyYears(data.years))?;
    let iterations = usize::try_from(data.iterations)
        .map_err(|_| ConfigError::TooManyIterations(data.iterations))?;

    let mut config = SimulationConfig::new(data.interest_rate, years, iterations);
    if let Some(seed) = data.seed {
        config = config.with_seed(seed);
    }
    if let Some(percentiles) = &data.percentiles {
        config = config.with_percentiles(percentiles.clone());
    }
    if let Some(enabled) = data.yearly_percentiles {
        config = config.with_yearly_percentiles(enabled);
    }
    config.validate()?;
    Ok(config)
}

fn convert_group(data: &GroupData) -> Result<CashFlowGroup, ParseError> {
    let items = data
        .items
        .iter()
        .map(|item| convert_item(&data.name, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CashFlowGroup::with_items(
        data.name.clone(),
        data.desc.clone(),
        items,
    )?)
}

fn convert_item(group: &str, data: &ItemData) -> Result<CashFlowItem, ParseError> {
    let path = format!("{}/{}", group, data.name);
    let upfront = convert_cost(&format!("{path}.upfront_cost"), &data.upfront_cost)?;
    let recurring = convert_cost(&format!("{path}.recurring_cost"), &data.recurring_cost)?;
    Ok(CashFlowItem::new(
        data.name.clone(),
        data.desc.clone(),
        upfront,
        recurring,
    )?)
}

fn convert_cost(field: &str, data: &CostData) -> Result<Cost, ParseError> {
    let param = |value: Option<f64>, parameter: &'static str| {
        value.ok_or_else(|| ParseError::MissingParameter {
            field: field.to_string(),
            parameter,
        })
    };

    let distribution = match data.kind {
        DistributionType::Gaussian => {
            Distribution::gaussian(param(data.mu, "mu")?, param(data.sigma, "sigma")?)?
        }
        DistributionType::Constant => Distribution::constant(param(data.value, "value")?)?,
        DistributionType::Pareto => Distribution::pareto_with_scale(
            param(data.alpha, "alpha")?,
            data.scale.unwrap_or(1.0),
        )?,
    };

    let start = parse_year(&format!("{field}.start_year"), data.start_year.as_ref())?;
    let end = parse_year(&format!("{field}.end_year"), data.end_year.as_ref())?;
    Ok(Cost::new(distribution, YearWindow::new(start, end)?))
}

/// Missing, null and `""` are unbounded; integers and integer strings are years
fn parse_year(field: &str, year: Option<&YearData>) -> Result<Option<u32>, ParseError> {
    let invalid = |value: String| ParseError::InvalidYear {
        field: field.to_string(),
        value,
    };

    match year {
        None => Ok(None),
        Some(YearData::Number(n)) => u32::try_from(*n)
            .map(Some)
            .map_err(|_| invalid(n.to_string())),
        Some(YearData::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| invalid(text.clone()))
        }
    }
}

fn group_data(group: &CashFlowGroup) -> GroupData {
    GroupData {
        name: group.name().to_string(),
        desc: group.description().to_string(),
        items: group.items().iter().map(item_data).collect(),
    }
}

fn item_data(item: &CashFlowItem) -> ItemData {
    ItemData {
        name: item.name().to_string(),
        desc: item.description().to_string(),
        upfront_cost: cost_data(item.upfront()),
        recurring_cost: cost_data(item.recurring()),
    }
}

fn cost_data(cost: &Cost) -> CostData {
    let mut data = CostData {
        kind: DistributionType::Constant,
        mu: None,
        sigma: None,
        value: None,
        alpha: None,
        scale: None,
        start_year: Some(cost.window.start().into()),
        end_year: Some(cost.window.end().into()),
    };

    match cost.distribution {
        Distribution::Gaussian { mu, sigma } => {
            data.kind = DistributionType::Gaussian;
            data.mu = Some(mu);
            data.sigma = Some(sigma);
        }
        Distribution::Constant { value } => {
            data.value = Some(value);
        }
        Distribution::Pareto { alpha, scale } => {
            data.kind = DistributionType::Pareto;
            data.alpha = Some(alpha);
            data.scale = Some(scale);
        }
    }

    data
}
