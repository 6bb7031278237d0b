use crate::errors::{Error, Result};
use crate::models::Dataset;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// Loads the dataset snapshot. A missing or unreadable file yields an
/// empty dataset so the API still serves zero-filled series.
pub async fn load_data(path: &Path) -> Dataset {
    match read_data(path).await {
        Ok(data) => {
            info!(
                path = %path.display(),
                metrics = data.metrics.len(),
                meals = data.meal_plan.len(),
                "loaded dataset"
            );
            data
        }
        Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no dataset file, starting empty");
            Dataset::default()
        }
        Err(err) => {
            error!("failed to load dataset: {err}");
            Dataset::default()
        }
    }
}

pub async fn read_data(path: &Path) -> Result<Dataset> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
