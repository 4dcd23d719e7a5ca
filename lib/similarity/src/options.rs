// Distinct attribute values, optionally narrowed by equality constraints.
// Backs cascading pickers (manufacturer -> model -> fuel/engine) in a UI.

use casebase_core::{AttributeSlot, CaseFilter, Corpus, Filter, FilterCondition, Record, ValidationError};
use casebase_schema::{coerce_category, coerce_number, FeatureSchema};
use serde_json::Value;
use std::collections::BTreeSet;

/// Sorted distinct values of `attribute` over cases matching every constraint
pub fn distinct_values(
    schema: &FeatureSchema,
    corpus: &Corpus,
    attribute: &str,
    constraints: &Record,
) -> Result<Vec<Value>, ValidationError> {
    let slot = schema
        .slot(attribute)
        .ok_or_else(|| ValidationError::UnknownAttribute(attribute.to_string()))?;

    let filter = constraint_filter(schema, constraints)?;
    let matching = corpus.iter().filter(|case| filter.matches(case));

    let values = match slot {
        AttributeSlot::Categorical(i) => matching
            .filter_map(|case| case.features.category(i))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|v| Value::String(v.to_string()))
            .collect(),
        AttributeSlot::Numeric(i) => {
            let mut numbers: Vec<f64> = matching.filter_map(|case| case.features.number(i)).collect();
            numbers.sort_by(f64::total_cmp);
            numbers.dedup();
            numbers
                .into_iter()
                .filter_map(serde_json::Number::from_f64)
                .map(Value::Number)
                .collect()
        }
    };

    Ok(values)
}

fn constraint_filter(schema: &FeatureSchema, constraints: &Record) -> Result<CaseFilter, ValidationError> {
    let conditions = constraints
        .iter()
        .map(|(name, value)| {
            match schema
                .slot(name)
                .ok_or_else(|| ValidationError::UnknownAttribute(name.clone()))?
            {
                AttributeSlot::Categorical(slot) => Ok(FilterCondition::CategoryEquals {
                    slot,
                    value: coerce_category(name, value)?,
                }),
                AttributeSlot::Numeric(slot) => Ok(FilterCondition::NumberEquals {
                    slot,
                    value: coerce_number(name, value)?,
                }),
            }
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(CaseFilter::new(FilterCondition::And(conditions)))
}
