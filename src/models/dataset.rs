use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// The three input datasets consumed by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    #[strum(serialize = "sales")]
    Sales,
    #[strum(serialize = "tray-waste")]
    TrayWaste,
    #[strum(serialize = "plate-waste")]
    PlateWaste,
}

impl DatasetKind {
    /// File name of the dataset inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKind::Sales => "sales.csv",
            DatasetKind::TrayWaste => "tray-waste.csv",
            DatasetKind::PlateWaste => "plate-waste.csv",
        }
    }

    /// Multipart field names accepted for this dataset, canonical first.
    pub fn upload_fields(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Sales => &["sales", "vendite"],
            DatasetKind::TrayWaste => &["tray_waste", "scarto_teglia"],
            DatasetKind::PlateWaste => &["plate_waste", "scarto_piatto"],
        }
    }

    pub fn from_upload_field(field: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.upload_fields().contains(&field))
    }
}

/// Canonical dataset columns, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Region,
    City,
    School,
    Month,
    Week,
    DishCategory,
    Dish,
    Value,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Region,
        Column::City,
        Column::School,
        Column::Month,
        Column::Week,
        Column::DishCategory,
        Column::Dish,
        Column::Value,
    ];

    /// Source header names recognized for this column, after trimming.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Column::Region => &["Regione", "Region"],
            Column::City => &["Città", "City"],
            Column::School => &["Scuola", "School"],
            Column::Month => &["Mese", "Month"],
            Column::Week => &["Settimana", "Week"],
            Column::DishCategory => &["Categoria piatto", "Categoria", "DishCategory"],
            Column::Dish => &["Piatto", "Dish"],
            Column::Value => &["Valore", "Value"],
        }
    }
}

/// One observation of a dataset. Empty cells and absent columns are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub region: Option<String>,
    pub city: Option<String>,
    pub school: Option<String>,
    pub month: Option<String>,
    pub week: Option<String>,
    pub dish_category: Option<String>,
    pub dish: Option<String>,
    /// Raw cell text; coerced to a number during aggregation.
    pub value: Option<String>,
}

impl DatasetRow {
    pub fn set(&mut self, column: Column, cell: Option<String>) {
        let slot = match column {
            Column::Region => &mut self.region,
            Column::City => &mut self.city,
            Column::School => &mut self.school,
            Column::Month => &mut self.month,
            Column::Week => &mut self.week,
            Column::DishCategory => &mut self.dish_category,
            Column::Dish => &mut self.dish,
            Column::Value => &mut self.value,
        };
        *slot = cell;
    }

    /// Grouping key. Blank categories are treated as missing.
    pub fn category(&self) -> Option<&str> {
        self.dish_category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// Value coerced to a finite float; anything unparseable counts as 0.0.
    pub fn numeric_value(&self) -> f64 {
        self.value
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// A loaded dataset: always shaped to the canonical schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn empty(kind: DatasetKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn new(kind: DatasetKind, rows: Vec<DatasetRow>) -> Self {
        Self { kind, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
