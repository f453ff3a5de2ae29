//! Load, save and run scenario documents

use cashflow_core::{
    config::SimulationConfig,
    model::{CashFlowSheet, SimulationSummary},
    simulation::simulate,
};
use color_eyre::eyre::WrapErr;

use crate::data::{ScenarioData, from_model, to_model};
use crate::error::ParseError;

/// Parse a YAML scenario into a validated sheet and config
pub fn load(source: &str) -> Result<(CashFlowSheet, SimulationConfig), ParseError> {
    let data: ScenarioData =
        serde_saphyr::from_str(source).map_err(|e| ParseError::Syntax(e.to_string()))?;
    let (sheet, config) = to_model(&data)?;

    tracing::info!(
        groups = sheet.groups().len(),
        items = sheet.item_count(),
        years = config.years,
        iterations = config.iterations,
        "Loaded scenario"
    );
    Ok((sheet, config))
}

/// Write a sheet and config as a YAML scenario. Unbounded years are written as `""`.
pub fn save(sheet: &CashFlowSheet, config: &SimulationConfig) -> Result<String, ParseError> {
    sheet.validate()?;
    config.validate()?;
    serde_saphyr::to_string(&from_model(sheet, config))
        .map_err(|e| ParseError::Serialize(e.to_string()))
}

/// Load a scenario and run it to completion
pub fn run_scenario(source: &str) -> color_eyre::Result<SimulationSummary> {
    let (sheet, config) = load(source).wrap_err("Failed to load scenario")?;
    let summary = simulate(&sheet, &config).wrap_err("Simulation failed")?;
    Ok(summary)
}
