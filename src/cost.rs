use crate::errors::{Error, Result};
use crate::models::{entries_from_values, CostSummary, MealEntry, NormalizedMeal};
use serde_json::Value;

/// Flattens meal entries into one occurrence per displayed dish.
///
/// Grouped entries are replaced by their dishes (one level deep). Entries
/// shown under several meal types count once per slot.
pub fn normalize_meals(meals: &[MealEntry]) -> Vec<NormalizedMeal<'_>> {
    let mut normalized = Vec::with_capacity(meals.len());
    for meal in meals {
        if !meal.dishes.is_empty() {
            normalized.extend(meal.dishes.iter().map(occurrence));
        } else if !meal.meal_types.is_empty() {
            normalized.extend(std::iter::repeat_n(occurrence(meal), meal.meal_types.len()));
        } else {
            normalized.push(occurrence(meal));
        }
    }
    normalized
}

fn occurrence(meal: &MealEntry) -> NormalizedMeal<'_> {
    NormalizedMeal {
        name: meal.name.as_deref(),
        price_estimate: meal.price_estimate.as_ref(),
    }
}

pub fn summarize_cost(meals: &[MealEntry], default_currency: Option<&str>) -> CostSummary {
    let normalized = normalize_meals(meals);

    let mut summary = CostSummary {
        total_dishes: normalized.len(),
        ..CostSummary::default()
    };

    for meal in &normalized {
        let Some(price) = meal.price_estimate else {
            continue;
        };
        let Some((min, max)) = price.bounds() else {
            continue;
        };

        summary.total_min += min;
        summary.total_max += max;
        summary.dish_count += 1;
        if summary.detected_currency.is_none() {
            summary.detected_currency = price.currency.clone();
        }
    }

    summary.has_price_data = summary.dish_count > 0;
    summary.average_cost = if summary.has_price_data {
        (summary.total_min + summary.total_max) / 2.0
    } else {
        0.0
    };
    summary.currency = summary
        .detected_currency
        .clone()
        .or_else(|| default_currency.map(str::to_string));

    summary
}

/// Reads meal entries from untyped JSON. The top level must be an array;
/// `null` elements are dropped and malformed elements carry no data.
pub fn parse_meals(value: &Value) -> Result<Vec<MealEntry>> {
    match value {
        Value::Array(items) => Ok(entries_from_values(items)),
        other => Err(Error::invalid_argument(format!(
            "meals must be an array, got {}",
            json_kind(other)
        ))),
    }
}

pub fn summarize_cost_json(value: &Value, default_currency: Option<&str>) -> Result<CostSummary> {
    let meals = parse_meals(value)?;
    Ok(summarize_cost(&meals, default_currency))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
