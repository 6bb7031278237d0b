use crate::errors::{Error, Result};
use crate::models::{CountBucket, TrendPoint, TrendUnit};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const MAX_PREALLOCATED_POINTS: usize = 4096;

pub fn fill_trend_today(
    buckets: &[CountBucket],
    window_size: usize,
    unit: TrendUnit,
) -> Result<Vec<TrendPoint>> {
    fill_trend(buckets, window_size, unit, Local::now().date_naive())
}

/// Dense trailing series ending at `reference`, oldest first. Keys absent
/// from `buckets` are filled with zero; duplicate keys keep the last count.
pub fn fill_trend(
    buckets: &[CountBucket],
    window_size: usize,
    unit: TrendUnit,
    reference: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    if window_size == 0 {
        return Err(Error::invalid_argument("window_size must be positive"));
    }

    // Reject before allocating: the oldest step is the one that can overflow.
    if step_back(reference, window_size - 1, unit).is_none() {
        return Err(Error::invalid_argument(format!(
            "window_size {window_size} reaches past the supported date range"
        )));
    }

    let lookup: HashMap<&str, u64> = buckets
        .iter()
        .map(|bucket| (bucket.key.as_str(), bucket.count))
        .collect();

    let mut points = Vec::with_capacity(window_size.min(MAX_PREALLOCATED_POINTS));
    for offset in (0..window_size).rev() {
        let date = step_back(reference, offset, unit).ok_or_else(|| {
            Error::invalid_argument(format!("step {offset} is outside the supported date range"))
        })?;
        let key = bucket_key(date, unit);
        let count = lookup.get(key.as_str()).copied().unwrap_or(0);
        points.push(TrendPoint {
            label: bucket_label(date, unit),
            key,
            count,
        });
    }

    Ok(points)
}

/// Sums daily buckets into `YYYY-MM` buckets, ordered by month. Buckets
/// already keyed by month are carried over and added to the day totals.
pub fn rollup_months(buckets: &[CountBucket]) -> Vec<CountBucket> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for bucket in buckets {
        if let Ok(date) = NaiveDate::parse_from_str(&bucket.key, "%Y-%m-%d") {
            days.insert(date, bucket.count);
        } else if let Some(month) = parse_month(&bucket.key) {
            months.insert(bucket_key(month, TrendUnit::Month), bucket.count);
        } else {
            debug!(key = %bucket.key, "skipping bucket without a date or month key");
        }
    }

    for (date, count) in days {
        let total = months.entry(bucket_key(date, TrendUnit::Month)).or_default();
        *total = total.saturating_add(count);
    }

    months
        .into_iter()
        .map(|(key, count)| CountBucket { key, count })
        .collect()
}

fn parse_month(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", key.trim()), "%Y-%m-%d").ok()
}

pub fn bucket_key(date: NaiveDate, unit: TrendUnit) -> String {
    match unit {
        TrendUnit::Day => date.format("%Y-%m-%d").to_string(),
        TrendUnit::Month => date.format("%Y-%m").to_string(),
    }
}

fn bucket_label(date: NaiveDate, unit: TrendUnit) -> String {
    match unit {
        TrendUnit::Day => date.format("%d/%m").to_string(),
        TrendUnit::Month => date.format("%b %Y").to_string(),
    }
}

// Months are stepped from the first of the month so day 31 never skips one.
fn step_back(reference: NaiveDate, offset: usize, unit: TrendUnit) -> Option<NaiveDate> {
    match unit {
        TrendUnit::Day => {
            let days = u64::try_from(offset).ok()?;
            reference.checked_sub_days(Days::new(days))
        }
        TrendUnit::Month => {
            let months = u32::try_from(offset).ok()?;
            reference.with_day(1)?.checked_sub_months(Months::new(months))
        }
    }
}
