use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/dataset.json";
pub const DEFAULT_CURRENCY: &str = "VND";
pub const DEFAULT_TREND_DAYS: usize = 7;
pub const DEFAULT_TREND_MONTHS: usize = 12;
/// Largest window the HTTP layer accepts, in days or months.
pub const MAX_WINDOW_SIZE: usize = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendSettings {
    pub days: usize,
    pub months: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            days: DEFAULT_TREND_DAYS,
            months: DEFAULT_TREND_MONTHS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub default_currency: String,
    pub trend: TrendSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let window = |key: &str, default: usize| {
            lookup(key)
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|value| (1..=MAX_WINDOW_SIZE).contains(value))
                .unwrap_or(default)
        };

        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            default_currency: lookup("APP_DEFAULT_CURRENCY")
                .map(|code| code.trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            trend: TrendSettings {
                days: window("APP_TREND_DAYS", DEFAULT_TREND_DAYS),
                months: window("APP_TREND_MONTHS", DEFAULT_TREND_MONTHS),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
