pub mod aggregation;
pub mod datasets;
pub mod forecasting;

pub use datasets::DatasetStore;
pub use forecasting::{ForecastingService, RunDefaults};
