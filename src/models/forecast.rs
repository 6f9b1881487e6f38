use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Frequency;

/// Name recorded in the registry for the baseline model.
pub const NAIVE_MODEL_NAME: &str = "Naive-MA(4)";
/// Number of trailing history points averaged by the baseline model.
pub const NAIVE_WINDOW: usize = 4;

/// Per-category totals for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub sales: f64,
    pub tray_waste: f64,
    pub plate_waste: f64,
    /// `max(0, sales - tray_waste - plate_waste)`
    pub net_consumption: f64,
}

impl CategoryAggregate {
    pub fn new(category: impl Into<String>, sales: f64, tray_waste: f64, plate_waste: f64) -> Self {
        Self {
            category: category.into(),
            sales,
            tray_waste,
            plate_waste,
            net_consumption: (sales - tray_waste - plate_waste).max(0.0),
        }
    }
}

/// One predicted value for one category and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "categoria": "Primi",
    "ds": "2024-06-24",
    "yhat": 70.0,
    "yhat_lower": null,
    "yhat_upper": null
}))]
pub struct ForecastPoint {
    #[serde(rename = "categoria", alias = "category")]
    pub category: String,
    /// Period label
    pub ds: String,
    /// Predicted value
    pub yhat: f64,
    /// Lower bound; the naive model does not produce one
    pub yhat_lower: Option<f64>,
    /// Upper bound; the naive model does not produce one
    pub yhat_upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelParams {
    pub window: usize,
    pub frequency: Frequency,
}

/// Describes which model produced a category's forecast in the latest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "categoria": "Primi",
    "modello": "Naive-MA(4)",
    "params": {"window": 4, "frequency": "W"},
    "timestamp": "2024-06-17T10:30:00Z",
    "error": ""
}))]
pub struct ModelRegistryEntry {
    #[serde(rename = "categoria", alias = "category")]
    pub category: String,
    #[serde(rename = "modello", alias = "model")]
    pub model: String,
    pub params: ModelParams,
    pub timestamp: String,
    /// Empty on success
    #[serde(default)]
    pub error: String,
}

impl ModelRegistryEntry {
    /// A successful fit: `error` is left empty.
    pub fn new(
        category: impl Into<String>,
        model: impl Into<String>,
        params: ModelParams,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            model: model.into(),
            params,
            timestamp: timestamp.into(),
            error: String::new(),
        }
    }
}
