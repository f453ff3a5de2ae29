mod cash_flow;
mod distribution;
mod results;
mod window;

pub use cash_flow::{CashFlowGroup, CashFlowItem, CashFlowSheet};
pub use distribution::Distribution;
pub use results::{
    DistributionSummary, GroupSummary, IterationOutcome, IterationTotal, MetricSummary,
    PresentValue, RepresentativeIteration, SimulationSummary, Trajectory, YearSummary,
};
pub use window::{Cost, YearWindow};
