pub mod naive;
pub mod periods;

pub use naive::{synthetic_history, Forecaster, NaiveMovingAverage};
pub use periods::{next_periods, period_instants};
