use crate::config::TrendSettings;
use crate::errors::Result;
use crate::models::{Dataset, MetricReport, StatsReport, TrendUnit};
use crate::trend::{fill_trend, rollup_months};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

pub fn build_report(data: &Dataset, settings: &TrendSettings) -> Result<StatsReport> {
    build_report_at(Local::now().date_naive(), data, settings)
}

pub fn build_report_at(
    today: NaiveDate,
    data: &Dataset,
    settings: &TrendSettings,
) -> Result<StatsReport> {
    let mut metrics = BTreeMap::new();
    for (name, buckets) in &data.metrics {
        let daily = fill_trend(buckets, settings.days, TrendUnit::Day, today)?;
        let monthly = fill_trend(&rollup_months(buckets), settings.months, TrendUnit::Month, today)?;

        metrics.insert(
            name.clone(),
            MetricReport {
                total_daily: daily.iter().map(|p| p.count).fold(0u64, u64::saturating_add),
                total_monthly: monthly.iter().map(|p| p.count).fold(0u64, u64::saturating_add),
                daily,
                monthly,
            },
        );
    }

    Ok(StatsReport {
        date: today.to_string(),
        metrics,
    })
}
