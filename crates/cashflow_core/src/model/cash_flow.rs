//! The static cash-flow model: items grouped into groups, groups into a sheet
//!
//! Aggregation is a plain sum over children in declaration order. The order
//! matters only because it fixes how the iteration's random stream is
//! consumed.

use std::fmt;

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::window::Cost;
use crate::error::ModelError;

fn check_name(kind: &'static str, name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), ModelError> {
    let mut seen = FxHashSet::default();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A single named line of the sheet with an upfront and a recurring cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowItem {
    name: String,
    #[serde(default)]
    description: String,
    upfront: Cost,
    recurring: Cost,
}

impl CashFlowItem {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        upfront: Cost,
        recurring: Cost,
    ) -> Result<Self, ModelError> {
        let item = Self {
            name: name.into(),
            description: description.into(),
            upfront,
            recurring,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("item", &self.name)?;
        self.upfront.validate()?;
        self.recurring.validate()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn upfront(&self) -> &Cost {
        &self.upfront
    }

    #[must_use]
    pub fn recurring(&self) -> &Cost {
        &self.recurring
    }

    /// Upfront cost for `year`: drawn once, at the first year of the upfront window.
    pub fn upfront_for_year<R: Rng + ?Sized>(
        &self,
        year: u32,
        rng: &mut R,
    ) -> Result<f64, ModelError> {
        if year == self.upfront.window.first_year() {
            self.upfront.sample(rng)
        } else {
            Ok(0.0)
        }
    }

    /// Recurring cost for `year`: drawn in every year of the recurring window.
    pub fn recurring_for_year<R: Rng + ?Sized>(
        &self,
        year: u32,
        horizon: u32,
        rng: &mut R,
    ) -> Result<f64, ModelError> {
        if self.recurring.window.contains(year, horizon) {
            self.recurring.sample(rng)
        } else {
            Ok(0.0)
        }
    }

    /// Total contribution of this item for `year` of a `horizon`-year run.
    ///
    /// The upfront draw happens before the recurring draw.
    pub fn cost_for_year<R: Rng + ?Sized>(
        &self,
        year: u32,
        horizon: u32,
        rng: &mut R,
    ) -> Result<f64, ModelError> {
        let upfront = self.upfront_for_year(year, rng)?;
        let recurring = self.recurring_for_year(year, horizon, rng)?;
        Ok(upfront + recurring)
    }
}

impl fmt::Display for CashFlowItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:14} -> {}", "Name", self.name)?;
        writeln!(f, "{:14} -> {}", "Description", self.description)?;
        writeln!(f, "{:14} -> {}", "Upfront Cost", self.upfront)?;
        write!(f, "{:14} -> {}", "Recurring Cost", self.recurring)
    }
}

/// A named collection of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowGroup {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    items: Vec<CashFlowItem>,
}

impl CashFlowGroup {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        check_name("group", &name)?;
        Ok(Self {
            name,
            description: description.into(),
            items: Vec::new(),
        })
    }

    pub fn with_items(
        name: impl Into<String>,
        description: impl Into<String>,
        items: impl IntoIterator<Item = CashFlowItem>,
    ) -> Result<Self, ModelError> {
        let mut group = Self::new(name, description)?;
        group.add_items(items)?;
        Ok(group)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_name("group", &self.name)?;
        for item in &self.items {
            item.validate()?;
        }
        check_unique("item", self.items.iter().map(CashFlowItem::name))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn items(&self) -> &[CashFlowItem] {
        &self.items
    }

    pub fn add_item(&mut self, item: CashFlowItem) -> Result<(), ModelError> {
        item.validate()?;
        if self.item(item.name()).is_some() {
            return Err(ModelError::DuplicateName {
                kind: "item",
                name: item.name,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Append items in order; stops at the first rejected item
    pub fn add_items(
        &mut self,
        items: impl IntoIterator<Item = CashFlowItem>,
    ) -> Result<(), ModelError> {
        for item in items {
            self.add_item(item)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn item(&self, name: &str) -> Option<&CashFlowItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Remove every item whose name is listed; returns how many were removed
    pub fn remove_items(&mut self, names: &[&str]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !names.contains(&item.name.as_str()));
        before - self.items.len()
    }

    #[must_use]
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(CashFlowItem::name).collect()
    }

    pub fn cost_for_year<R: Rng + ?Sized>(
        &self,
        year: u32,
        horizon: u32,
        rng: &mut R,
    ) -> Result<f64, ModelError> {
        let mut total = 0.0;
        for item in &self.items {
            total += item.cost_for_year(year, horizon, rng)?;
        }
        Ok(total)
    }
}

impl fmt::Display for CashFlowGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:14} -> {}", "Name", self.name)?;
        writeln!(f, "{:14} -> {}", "Description", self.description)?;
        write!(f, "{:14}", "Items")?;
        for item in &self.items {
            write!(f, "\n  =>")?;
            for line in item.to_string().lines() {
                write!(f, "\n\t{line}")?;
            }
        }
        Ok(())
    }
}

/// Root of the static model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSheet {
    groups: Vec<CashFlowGroup>,
}

impl CashFlowSheet {
    pub fn new(groups: impl IntoIterator<Item = CashFlowGroup>) -> Result<Self, ModelError> {
        let sheet = Self {
            groups: groups.into_iter().collect(),
        };
        sheet.validate()?;
        Ok(sheet)
    }

    /// Re-check every invariant of the tree.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.groups.is_empty() {
            return Err(ModelError::EmptySheet);
        }
        for group in &self.groups {
            group.validate()?;
        }
        check_unique("group", self.groups.iter().map(CashFlowGroup::name))
    }

    #[must_use]
    pub fn groups(&self) -> &[CashFlowGroup] {
        &self.groups
    }

    pub fn add_group(&mut self, group: CashFlowGroup) -> Result<(), ModelError> {
        group.validate()?;
        if self.group(group.name()).is_some() {
            return Err(ModelError::DuplicateName {
                kind: "group",
                name: group.name,
            });
        }
        self.groups.push(group);
        Ok(())
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&CashFlowGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut CashFlowGroup> {
        self.groups.iter_mut().find(|group| group.name == name)
    }

    /// Remove the listed groups. A sheet must keep at least one group, so
    /// removing all of them is rejected and leaves the sheet unchanged.
    pub fn remove_groups(&mut self, names: &[&str]) -> Result<usize, ModelError> {
        let remaining = self
            .groups
            .iter()
            .filter(|group| !names.contains(&group.name.as_str()))
            .count();
        if remaining == 0 {
            return Err(ModelError::EmptySheet);
        }
        let before = self.groups.len();
        self.groups
            .retain(|group| !names.contains(&group.name.as_str()));
        Ok(before - self.groups.len())
    }

    /// Group names paired with their item names, in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<(&str, Vec<&str>)> {
        self.groups
            .iter()
            .map(|group| (group.name(), group.item_names()))
            .collect()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    pub fn cost_for_year<R: Rng + ?Sized>(
        &self,
        year: u32,
        horizon: u32,
        rng: &mut R,
    ) -> Result<f64, ModelError> {
        let mut total = 0.0;
        for group in &self.groups {
            total += group.cost_for_year(year, horizon, rng)?;
        }
        Ok(total)
    }

    /// Fill `out[g]` with group `g`'s cost for `year` and return the sheet total.
    ///
    /// Consumes randomness in the same order as `cost_for_year`.
    pub fn costs_by_group<R: Rng + ?Sized>(
        &self,
        year: u32,
        horizon: u32,
        rng: &mut R,
        out: &mut [f64],
    ) -> Result<f64, ModelError> {
        debug_assert_eq!(out.len(), self.groups.len());
        let mut total = 0.0;
        for (group, slot) in self.groups.iter().zip(out.iter_mut()) {
            *slot = group.cost_for_year(year, horizon, rng)?;
            total += *slot;
        }
        Ok(total)
    }
}

impl fmt::Display for CashFlowSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Groups")?;
        for group in &self.groups {
            write!(f, "\n  =>")?;
            for line in group.to_string().lines() {
                write!(f, "\n\t{line}")?;
            }
        }
        Ok(())
    }
}
