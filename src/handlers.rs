use crate::config::MAX_WINDOW_SIZE;
use crate::cost::{summarize_cost, summarize_cost_json};
use crate::errors::{AppError, Error};
use crate::format::format_summary;
use crate::models::{
    CostRequest, CostResponse, CostSummary, StatsReport, TrendPoint, TrendQuery, TrendRequest,
    TrendUnit,
};
use crate::state::AppState;
use crate::stats::build_report;
use crate::trend::{fill_trend, fill_trend_today, rollup_months};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsReport>, AppError> {
    Ok(Json(build_report(&state.data, &state.config.trend)?))
}

pub async fn get_metric(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    query: Result<Query<TrendQuery>, QueryRejection>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let Query(query) = query?;
    let buckets = state
        .data
        .metrics
        .get(&metric)
        .ok_or_else(|| AppError::not_found(format!("unknown metric '{metric}'")))?;

    let window = match query.window {
        Some(window) => window_size(window)?,
        None => match query.unit {
            TrendUnit::Day => state.config.trend.days,
            TrendUnit::Month => state.config.trend.months,
        },
    };

    let points = match query.unit {
        TrendUnit::Day => fill_trend_today(buckets, window, TrendUnit::Day)?,
        TrendUnit::Month => fill_trend_today(&rollup_months(buckets), window, TrendUnit::Month)?,
    };
    debug!(%metric, window, "served metric trend");
    Ok(Json(points))
}

pub async fn trend(
    payload: Result<Json<TrendRequest>, JsonRejection>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let Json(payload) = payload?;
    let window = window_size(payload.window_size)?;
    let points = match payload.reference_date.as_deref().map(str::trim) {
        Some(raw) => {
            let reference = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| {
                Error::invalid_argument(format!("reference_date '{raw}' is not YYYY-MM-DD: {err}"))
            })?;
            fill_trend(&payload.buckets, window, payload.unit, reference)?
        }
        None => fill_trend_today(&payload.buckets, window, payload.unit)?,
    };
    Ok(Json(points))
}

pub async fn meal_plan_cost(State(state): State<AppState>) -> Json<CostResponse> {
    let summary = summarize_cost(&state.data.meal_plan, Some(&state.config.default_currency));
    Json(to_response(summary))
}

pub async fn cost_summary(
    State(state): State<AppState>,
    payload: Result<Json<CostRequest>, JsonRejection>,
) -> Result<Json<CostResponse>, AppError> {
    let Json(payload) = payload?;
    let default_currency = payload
        .default_currency
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(state.config.default_currency.as_str());

    let summary = summarize_cost_json(&payload.meals, Some(default_currency))?;
    debug!(
        total_dishes = summary.total_dishes,
        dish_count = summary.dish_count,
        "summarized meal cost"
    );
    Ok(Json(to_response(summary)))
}

fn to_response(summary: CostSummary) -> CostResponse {
    CostResponse {
        formatted: format_summary(&summary),
        summary,
    }
}

fn window_size(raw: i64) -> Result<usize, Error> {
    let window = usize::try_from(raw)
        .ok()
        .filter(|window| *window > 0)
        .ok_or_else(|| Error::invalid_argument(format!("window_size must be positive, got {raw}")))?;
    if window > MAX_WINDOW_SIZE {
        return Err(Error::invalid_argument(format!(
            "window_size {window} exceeds the limit of {MAX_WINDOW_SIZE}"
        )));
    }
    Ok(window)
}
