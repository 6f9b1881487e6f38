pub mod dataset;
pub mod forecast;
pub mod frequency;
pub mod job;

pub use dataset::{Column, Dataset, DatasetKind, DatasetRow};
pub use forecast::{
    CategoryAggregate, ForecastPoint, ModelParams, ModelRegistryEntry, NAIVE_MODEL_NAME,
    NAIVE_WINDOW,
};
pub use frequency::Frequency;
pub use job::{RunRequest, RunResult, RunSummary};
