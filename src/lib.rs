pub mod app;
pub mod config;
pub mod cost;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod state;
pub mod trend;

pub use app::router;
pub use config::Config;
pub use cost::{normalize_meals, parse_meals, summarize_cost, summarize_cost_json};
pub use errors::{Error, Result};
pub use state::AppState;
pub use storage::load_data;
pub use trend::{fill_trend, fill_trend_today, rollup_months};
