use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One `(key, count)` row from a grouped aggregation. Keys are ISO dates
/// (`YYYY-MM-DD`) or months (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub key: String,
    pub count: u64,
}

impl CountBucket {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendUnit {
    #[default]
    Day,
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub key: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceEstimate {
    #[serde(deserialize_with = "lenient")]
    pub min: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub max: Option<f64>,
    #[serde(deserialize_with = "lenient_currency")]
    pub currency: Option<String>,
}

impl PriceEstimate {
    /// Effective `(min, max)` range. A bound counts only when it is finite
    /// and strictly positive; a single known bound is used for both ends.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let min = self.min.filter(|value| is_present(*value));
        let max = self.max.filter(|value| is_present(*value));
        match (min, max) {
            (Some(low), Some(high)) => Some((low, high)),
            (Some(exact), None) | (None, Some(exact)) => Some((exact, exact)),
            (None, None) => None,
        }
    }
}

fn is_present(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A dish or a grouped meal item from a meal plan. Fields with an
/// unexpected JSON shape deserialize as absent instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealEntry {
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_entries", skip_serializing_if = "Vec::is_empty")]
    pub dishes: Vec<MealEntry>,
    #[serde(deserialize_with = "lenient_labels", skip_serializing_if = "Vec::is_empty")]
    pub meal_types: Vec<String>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub price_estimate: Option<PriceEstimate>,
}

impl MealEntry {
    /// Non-object values become an entry with no data.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

pub(crate) fn entries_from_values(items: &[Value]) -> Vec<MealEntry> {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(MealEntry::from_value)
        .collect()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_currency<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let currency: Option<String> = lenient(deserializer)?;
    Ok(currency
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty()))
}

fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<MealEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(entries_from_values(&items)),
        _ => Ok(Vec::new()),
    }
}

fn lenient_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    // Every element is a slot, even when its label is unusable.
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::String(label) => label,
            other => other.to_string(),
        })
        .collect())
}

/// Flattened single occurrence of a priced item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMeal<'a> {
    pub name: Option<&'a str>,
    pub price_estimate: Option<&'a PriceEstimate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_min: f64,
    pub total_max: f64,
    pub average_cost: f64,
    pub has_price_data: bool,
    pub dish_count: usize,
    pub detected_currency: Option<String>,
    pub total_dishes: usize,
    /// Detected currency, else the caller's default.
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub metrics: BTreeMap<String, Vec<CountBucket>>,
    #[serde(deserialize_with = "lenient_entries")]
    pub meal_plan: Vec<MealEntry>,
}

#[derive(Debug, Serialize)]
pub struct MetricReport {
    pub daily: Vec<TrendPoint>,
    pub monthly: Vec<TrendPoint>,
    pub total_daily: u64,
    pub total_monthly: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub date: String,
    pub metrics: BTreeMap<String, MetricReport>,
}

#[derive(Debug, Deserialize)]
pub struct TrendRequest {
    #[serde(default)]
    pub buckets: Vec<CountBucket>,
    pub window_size: i64,
    #[serde(default)]
    pub unit: TrendUnit,
    pub reference_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub window: Option<i64>,
    #[serde(default)]
    pub unit: TrendUnit,
}

#[derive(Debug, Deserialize)]
pub struct CostRequest {
    #[serde(default)]
    pub meals: Value,
    pub default_currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormattedCost {
    pub total_min: String,
    pub total_max: String,
    pub average_cost: String,
}

#[derive(Debug, Serialize)]
pub struct CostResponse {
    pub summary: CostSummary,
    pub formatted: Option<FormattedCost>,
}
