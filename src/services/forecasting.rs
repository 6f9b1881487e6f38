use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    artifacts::{self, Artifact, ArtifactStore},
    config::AppConfig,
    errors::{ServiceError, ServiceResult},
    ml::{self, naive::round2, Forecaster, NaiveMovingAverage},
    models::{
        CategoryAggregate, DatasetKind, ForecastPoint, Frequency, ModelParams, ModelRegistryEntry,
        RunRequest, RunResult, RunSummary,
    },
    services::{aggregation, datasets::DatasetStore},
};

/// Fallbacks applied to run requests that omit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDefaults {
    pub horizon: u32,
    pub max_horizon: u32,
    pub frequency: Frequency,
}

impl RunDefaults {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            horizon: config.default_horizon,
            max_horizon: config.max_horizon,
            frequency: config.frequency(),
        }
    }

    /// Resolves a request into a concrete horizon and frequency.
    pub fn resolve(&self, request: &RunRequest) -> ServiceResult<(u32, Frequency)> {
        let horizon = match request.horizon {
            None | Some(0) => self.horizon,
            Some(h) if h < 0 => {
                return Err(ServiceError::ValidationError(format!(
                    "horizon must be a positive integer, got {}",
                    h
                )))
            }
            Some(h) if h > i64::from(self.max_horizon) => {
                return Err(ServiceError::ValidationError(format!(
                    "horizon must not exceed {}, got {}",
                    self.max_horizon, h
                )))
            }
            // Bounded by max_horizon above.
            Some(h) => h as u32,
        };

        let frequency = match request.frequency.as_deref().map(str::trim) {
            None | Some("") => self.frequency,
            Some(raw) => raw
                .parse()
                .map_err(|_| ServiceError::ConfigError("frequency must be 'W' or 'M'".into()))?,
        };

        Ok((horizon, frequency))
    }
}

/// Runs the ingest → aggregate → forecast → persist job.
pub struct ForecastingService {
    datasets: DatasetStore,
    artifacts: Arc<dyn ArtifactStore>,
    forecaster: Arc<dyn Forecaster>,
    defaults: RunDefaults,
    version: String,
    run_lock: Mutex<()>,
}

impl ForecastingService {
    pub fn new(
        datasets: DatasetStore,
        artifacts: Arc<dyn ArtifactStore>,
        defaults: RunDefaults,
        version: impl Into<String>,
    ) -> Self {
        Self {
            datasets,
            artifacts,
            forecaster: Arc::new(NaiveMovingAverage::default()),
            defaults,
            version: version.into(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AppConfig, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self::new(
            DatasetStore::new(&config.data_dir),
            artifacts,
            RunDefaults::from_config(config),
            config.app_version.clone(),
        )
    }

    pub fn datasets(&self) -> &DatasetStore {
        &self.datasets
    }

    /// Executes one run at `now` and overwrites both artifacts.
    ///
    /// Nothing is written unless inputs validate and all datasets parse. Runs are
    /// serialized so the two artifacts always come from the same run.
    #[instrument(skip(self, request), fields(horizon = ?request.horizon, frequency = ?request.frequency))]
    pub async fn run(&self, request: RunRequest, now: DateTime<Utc>) -> ServiceResult<RunResult> {
        let (horizon, frequency) = self.defaults.resolve(&request).map_err(|err| {
            warn!(error = %err, "rejected run request");
            err
        })?;

        let _guard = self.run_lock.lock().await;

        let sales = self.datasets.load(DatasetKind::Sales).await?;
        let tray_waste = self.datasets.load(DatasetKind::TrayWaste).await?;
        let plate_waste = self.datasets.load(DatasetKind::PlateWaste).await?;

        if sales.is_empty() {
            warn!("sales dataset missing or empty; run rejected");
            return Err(ServiceError::ValidationError(format!(
                "{} is missing or empty",
                DatasetKind::Sales.file_name()
            )));
        }

        let aggregates = aggregation::aggregate(&sales, &tray_waste, &plate_waste);
        aggregation::ensure_finite(&aggregates).map_err(|err| {
            warn!(error = %err, "aggregation overflowed; run rejected");
            err
        })?;
        let periods = ml::next_periods(now, horizon as usize, frequency);
        let forecasts = build_forecasts(self.forecaster.as_ref(), &aggregates, &periods);

        let timestamp = format_timestamp(now);
        let registry = build_registry(self.forecaster.as_ref(), &aggregates, frequency, &timestamp);

        artifacts::save_json(self.artifacts.as_ref(), Artifact::Forecasts, &forecasts).await?;
        artifacts::save_json(self.artifacts.as_ref(), Artifact::Registry, &registry).await?;

        info!(
            horizon,
            %frequency,
            categories = aggregates.len(),
            points = forecasts.len(),
            "forecast run completed"
        );

        Ok(RunResult {
            horizon,
            frequency,
            version: self.version.clone(),
            generated_at: timestamp,
            summary: RunSummary {
                categories: aggregates.len().to_string(),
                points: forecasts.len().to_string(),
            },
        })
    }

    pub async fn latest_forecasts(&self) -> ServiceResult<Vec<ForecastPoint>> {
        artifacts::latest_forecasts(self.artifacts.as_ref()).await
    }

    pub async fn latest_registry(&self) -> ServiceResult<Vec<ModelRegistryEntry>> {
        artifacts::latest_registry(self.artifacts.as_ref()).await
    }
}

/// One point per category and period, categories in aggregate order.
pub fn build_forecasts(
    forecaster: &dyn Forecaster,
    aggregates: &[CategoryAggregate],
    periods: &[String],
) -> Vec<ForecastPoint> {
    let mut points = Vec::with_capacity(aggregates.len() * periods.len());
    for aggregate in aggregates {
        let history = ml::synthetic_history(aggregate.net_consumption);
        let values = forecaster.forecast(&history, periods.len());
        points.extend(periods.iter().zip(values).map(|(ds, yhat)| ForecastPoint {
            category: aggregate.category.clone(),
            ds: ds.clone(),
            yhat: round2(yhat),
            yhat_lower: None,
            yhat_upper: None,
        }));
    }
    points
}

pub fn build_registry(
    forecaster: &dyn Forecaster,
    aggregates: &[CategoryAggregate],
    frequency: Frequency,
    timestamp: &str,
) -> Vec<ModelRegistryEntry> {
    aggregates
        .iter()
        .map(|aggregate| {
            let params = ModelParams {
                window: forecaster.window(),
                frequency,
            };
            ModelRegistryEntry::new(&aggregate.category, forecaster.name(), params, timestamp)
        })
        .collect()
}

/// `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
