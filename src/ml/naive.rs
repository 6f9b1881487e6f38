//! Baseline moving-average forecaster.

use crate::models::{NAIVE_MODEL_NAME, NAIVE_WINDOW};

/// Length of the flat history fed to the forecaster for each category.
pub const SYNTHETIC_HISTORY_LEN: usize = 8;

/// A model that turns a chronological history into `horizon` predictions.
pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    fn window(&self) -> usize;

    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64>;
}

/// Mean of the last `window` points, rounded to cents and repeated over the horizon.
#[derive(Debug, Clone)]
pub struct NaiveMovingAverage {
    window: usize,
}

impl Default for NaiveMovingAverage {
    fn default() -> Self {
        Self {
            window: NAIVE_WINDOW,
        }
    }
}

impl Forecaster for NaiveMovingAverage {
    fn name(&self) -> &str {
        NAIVE_MODEL_NAME
    }

    fn window(&self) -> usize {
        self.window
    }

    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        if history.is_empty() {
            return vec![0.0; horizon];
        }

        let take = self.window.min(history.len());
        let tail = &history[history.len() - take..];
        let mean = tail.iter().sum::<f64>() / take as f64;

        vec![round2(mean); horizon]
    }
}

/// The history used for every category: its current net value repeated.
///
/// There is no per-period series yet, so the forecast always equals the
/// category's net consumption.
pub fn synthetic_history(net_consumption: f64) -> Vec<f64> {
    vec![net_consumption; SYNTHETIC_HISTORY_LEN]
}

/// Rounds to two decimals, resolving exact ties to the even neighbour.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let mut rounded = scaled.round();
    if (scaled - scaled.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded -= scaled.signum();
    }
    rounded / 100.0
}
