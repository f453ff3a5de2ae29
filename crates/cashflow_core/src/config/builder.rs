//! Sheet Builder DSL
//!
//! Fluent construction of a `CashFlowSheet`. Builders accept raw parameters
//! and defer every check to `build()`, which returns the first `ModelError`.
//!
//! # Example
//!
//! ```ignore
//! use cashflow_core::config::{GroupBuilder, ItemBuilder, SheetBuilder};
//! use cashflow_core::model::Distribution;
//!
//! let sheet = SheetBuilder::new()
//!     .group(GroupBuilder::new("Hardware")
//!         .description("Servers and racks")
//!         .item(ItemBuilder::new("Server")
//!             .upfront(Distribution::Constant { value: 100.0 })
//!             .upfront_in_year(1)
//!             .recurring(Distribution::Constant { value: 10.0 })
//!             .recurring_years(1, 3)))
//!     .group(GroupBuilder::new("Staff")
//!         .item(ItemBuilder::new("Operator")
//!             .recurring(Distribution::Gaussian { mu: 60.0, sigma: 5.0 })))
//!     .build()?;
//! ```

use crate::error::ModelError;
use crate::model::{CashFlowGroup, CashFlowItem, CashFlowSheet, Cost, Distribution, YearWindow};

/// Builder for a single `CashFlowItem`
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    name: String,
    description: String,
    upfront: Distribution,
    upfront_window: (Option<u32>, Option<u32>),
    recurring: Distribution,
    recurring_window: (Option<u32>, Option<u32>),
}

impl ItemBuilder {
    /// New item with zero upfront and zero recurring cost
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            upfront: Distribution::default(),
            upfront_window: (None, None),
            recurring: Distribution::default(),
            recurring_window: (None, None),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn upfront(mut self, distribution: Distribution) -> Self {
        self.upfront = distribution;
        self
    }

    /// Shorthand for a constant upfront cost
    #[must_use]
    pub fn upfront_amount(self, value: f64) -> Self {
        self.upfront(Distribution::Constant { value })
    }

    /// Incur the upfront cost in `year` (1-based)
    #[must_use]
    pub fn upfront_in_year(mut self, year: u32) -> Self {
        self.upfront_window = (Some(year), Some(year));
        self
    }

    #[must_use]
    pub fn recurring(mut self, distribution: Distribution) -> Self {
        self.recurring = distribution;
        self
    }

    /// Shorthand for a constant recurring cost
    #[must_use]
    pub fn recurring_amount(self, value: f64) -> Self {
        self.recurring(Distribution::Constant { value })
    }

    /// Inclusive range of years in which the recurring cost applies
    #[must_use]
    pub fn recurring_years(mut self, start: u32, end: u32) -> Self {
        self.recurring_window = (Some(start), Some(end));
        self
    }

    #[must_use]
    pub fn recurring_from(mut self, start: u32) -> Self {
        self.recurring_window.0 = Some(start);
        self
    }

    #[must_use]
    pub fn recurring_until(mut self, end: u32) -> Self {
        self.recurring_window.1 = Some(end);
        self
    }

    pub fn build(self) -> Result<CashFlowItem, ModelError> {
        let upfront = Cost::new(
            self.upfront,
            YearWindow::new(self.upfront_window.0, self.upfront_window.1)?,
        );
        let recurring = Cost::new(
            self.recurring,
            YearWindow::new(self.recurring_window.0, self.recurring_window.1)?,
        );
        CashFlowItem::new(self.name, self.description, upfront, recurring)
    }
}

/// Builder for a `CashFlowGroup`
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    name: String,
    description: String,
    items: Vec<ItemBuilder>,
}

impl GroupBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn item(mut self, item: ItemBuilder) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> Result<CashFlowGroup, ModelError> {
        let items = self
            .items
            .into_iter()
            .map(ItemBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        CashFlowGroup::with_items(self.name, self.description, items)
    }
}

/// Builder for the root `CashFlowSheet`
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    groups: Vec<GroupBuilder>,
}

impl SheetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn group(mut self, group: GroupBuilder) -> Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> Result<CashFlowSheet, ModelError> {
        let groups = self
            .groups
            .into_iter()
            .map(GroupBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        CashFlowSheet::new(groups)
    }
}
