// Exact-match predicates over cases
use crate::case::{AttributeSlot, Case, Features};

pub trait Filter {
    fn matches(&self, case: &Case) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Every case passes
    Any,
    CategoryEquals { slot: usize, value: String },
    NumberEquals { slot: usize, value: f64 },
    And(Vec<FilterCondition>),
}

impl FilterCondition {
    /// Equality on whichever kind of attribute `slot` points at
    pub fn equals(slot: AttributeSlot, features: &Features) -> Option<Self> {
        match slot {
            AttributeSlot::Categorical(i) => features.category(i).map(|v| FilterCondition::CategoryEquals {
                slot: i,
                value: v.to_string(),
            }),
            AttributeSlot::Numeric(i) => features
                .number(i)
                .map(|v| FilterCondition::NumberEquals { slot: i, value: v }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseFilter {
    condition: FilterCondition,
}

impl CaseFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn any() -> Self {
        Self::new(FilterCondition::Any)
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, features: &Features) -> bool {
        match condition {
            FilterCondition::Any => true,
            FilterCondition::CategoryEquals { slot, value } => features
                .category(*slot)
                .map(|v| v == value)
                .unwrap_or(false),
            FilterCondition::NumberEquals { slot, value } => features
                .number(*slot)
                .map(|v| v == *value)
                .unwrap_or(false),
            FilterCondition::And(conditions) => conditions
                .iter()
                .all(|c| Self::matches_condition(c, features)),
        }
    }
}

impl Filter for CaseFilter {
    fn matches(&self, case: &Case) -> bool {
        Self::matches_condition(&self.condition, &case.features)
    }
}
