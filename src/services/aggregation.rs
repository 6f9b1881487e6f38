use std::collections::BTreeMap;

use crate::{
    errors::{ServiceError, ServiceResult},
    models::{CategoryAggregate, Dataset},
};

/// Sums of the value column per category, keyed in category order.
pub fn sum_by_category(dataset: &Dataset) -> BTreeMap<String, f64> {
    let mut sums = BTreeMap::new();
    for row in &dataset.rows {
        if let Some(category) = row.category() {
            *sums.entry(category.to_string()).or_insert(0.0) += row.numeric_value();
        }
    }
    sums
}

/// Joins the three per-category sums over the union of categories.
///
/// A category absent from one input counts as 0.0 for that input. Output is
/// sorted by category.
pub fn aggregate(sales: &Dataset, tray_waste: &Dataset, plate_waste: &Dataset) -> Vec<CategoryAggregate> {
    let sales = sum_by_category(sales);
    let tray = sum_by_category(tray_waste);
    let plate = sum_by_category(plate_waste);

    let mut categories: Vec<&String> = sales.keys().chain(tray.keys()).chain(plate.keys()).collect();
    categories.sort();
    categories.dedup();

    categories
        .into_iter()
        .map(|category| {
            CategoryAggregate::new(
                category.clone(),
                sales.get(category).copied().unwrap_or(0.0),
                tray.get(category).copied().unwrap_or(0.0),
                plate.get(category).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

/// Fails when a category total overflowed to a non-finite value.
pub fn ensure_finite(aggregates: &[CategoryAggregate]) -> ServiceResult<()> {
    let overflowed = aggregates.iter().find(|a| {
        ![a.sales, a.tray_waste, a.plate_waste, a.net_consumption]
            .iter()
            .all(|v| v.is_finite())
    });
    match overflowed {
        Some(aggregate) => Err(ServiceError::ValidationError(format!(
            "totals for category '{}' are out of range",
            aggregate.category
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatasetKind, DatasetRow};
    use proptest::prelude::*;

    fn dataset(kind: DatasetKind, rows: &[(&str, &str)]) -> Dataset {
        Dataset::new(
            kind,
            rows.iter()
                .map(|(category, value)| DatasetRow {
                    dish_category: Some(category.to_string()),
                    value: Some(value.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn computes_net_consumption_per_category() {
        let sales = dataset(DatasetKind::Sales, &[("A", "60"), ("A", "40"), ("B", "10")]);
        let tray = dataset(DatasetKind::TrayWaste, &[("A", "20")]);
        let plate = dataset(DatasetKind::PlateWaste, &[("A", "10"), ("C", "5")]);

        let out = aggregate(&sales, &tray, &plate);
        let names: Vec<&str> = out.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        assert_eq!(out[0], CategoryAggregate::new("A", 100.0, 20.0, 10.0));
        assert_eq!(out[0].net_consumption, 70.0);
        assert_eq!(out[1].net_consumption, 10.0);
        // Waste-only category: sales default to zero, net is floored.
        assert_eq!(out[2].sales, 0.0);
        assert_eq!(out[2].net_consumption, 0.0);
    }

    #[test]
    fn non_numeric_values_count_as_zero() {
        let sales = dataset(DatasetKind::Sales, &[("A", "abc"), ("A", "7")]);
        let empty_tray = Dataset::empty(DatasetKind::TrayWaste);
        let empty_plate = Dataset::empty(DatasetKind::PlateWaste);

        let out = aggregate(&sales, &empty_tray, &empty_plate);
        assert_eq!(out[0].sales, 7.0);
    }

    #[test]
    fn rows_without_category_are_dropped() {
        let mut sales = dataset(DatasetKind::Sales, &[("A", "1")]);
        sales.rows.push(DatasetRow {
            value: Some("99".into()),
            ..Default::default()
        });

        let out = aggregate(
            &sales,
            &Dataset::empty(DatasetKind::TrayWaste),
            &Dataset::empty(DatasetKind::PlateWaste),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sales, 1.0);
    }

    #[test]
    fn all_zero_inputs_give_zero_net() {
        let sales = dataset(DatasetKind::Sales, &[("A", "0")]);
        let tray = dataset(DatasetKind::TrayWaste, &[("A", "0")]);
        let plate = dataset(DatasetKind::PlateWaste, &[("A", "0")]);
        assert_eq!(aggregate(&sales, &tray, &plate)[0].net_consumption, 0.0);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let sales = dataset(DatasetKind::Sales, &[("A", "1"), ("B", "1e308"), ("B", "1e308")]);
        let out = aggregate(
            &sales,
            &Dataset::empty(DatasetKind::TrayWaste),
            &Dataset::empty(DatasetKind::PlateWaste),
        );
        assert!(out[1].sales.is_infinite());

        let err = ensure_finite(&out).unwrap_err();
        assert!(err.to_string().contains("'B'"));
        assert!(ensure_finite(&out[..1]).is_ok());
    }

    fn rows_strategy() -> impl Strategy<Value = Vec<(String, f64)>> {
        proptest::collection::vec(("[A-D]", -1.0e5f64..1.0e5), 0..30)
    }

    fn to_dataset(kind: DatasetKind, rows: Vec<(String, f64)>) -> Dataset {
        Dataset::new(
            kind,
            rows.into_iter()
                .map(|(category, value)| DatasetRow {
                    dish_category: Some(category),
                    value: Some(value.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    proptest! {
        #[test]
        fn net_consumption_is_never_negative(
            sales in rows_strategy(),
            tray in rows_strategy(),
            plate in rows_strategy(),
        ) {
            let mut seen: Vec<String> = sales.iter().chain(&tray).chain(&plate).map(|(c, _)| c.clone()).collect();
            seen.sort();
            seen.dedup();

            let out = aggregate(
                &to_dataset(DatasetKind::Sales, sales),
                &to_dataset(DatasetKind::TrayWaste, tray),
                &to_dataset(DatasetKind::PlateWaste, plate),
            );

            prop_assert_eq!(out.iter().map(|a| a.category.clone()).collect::<Vec<_>>(), seen);
            prop_assert!(out.iter().all(|a| a.net_consumption >= 0.0));
        }
    }
}
