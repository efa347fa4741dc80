//! Portfolio Classifier
//!
//! Triage view over the whole catalog: one entry per product, most urgent
//! first.

use demand_core::{
    AlertType, DemandSummary, Product, ProductId, ProductRiskEntry, RawEvent, Severity, StockAlert,
};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::aggregator::{group_by_product, DailySeriesAggregator};
use crate::error::EngineResult;
use crate::statistics::summarize;

/// Classify every product and sort by severity, then by total demand
/// (largest first). Equal keys keep their input order.
///
/// Products without a summary get the all-zero one. Acknowledged alerts are
/// ignored; when a product has several open alerts the most severe wins.
pub fn classify_portfolio(
    products: &[Product],
    summaries: &HashMap<ProductId, DemandSummary>,
    alerts: &[StockAlert],
) -> Vec<ProductRiskEntry> {
    let mut open: HashMap<&str, Severity> = HashMap::new();
    for alert in alerts.iter().filter(|a| !a.acknowledged) {
        let severity = Severity::from_alert(Some(alert.alert_type));
        open.entry(alert.product_id.as_str())
            .and_modify(|current| *current = (*current).min(severity))
            .or_insert(severity);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(products.len());
    let mut entries: Vec<ProductRiskEntry> = Vec::with_capacity(products.len());
    for product in products {
        if !seen.insert(product.product_id.as_str()) {
            continue;
        }
        entries.push(ProductRiskEntry {
            product_id: product.product_id.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            summary: summaries
                .get(&product.product_id)
                .copied()
                .unwrap_or_default(),
            severity: open
                .get(product.product_id.as_str())
                .copied()
                .unwrap_or(Severity::Stable),
        });
    }

    if entries.len() < products.len() {
        tracing::debug!(
            "Dropped {} duplicate products from portfolio",
            products.len() - entries.len()
        );
    }

    // sort_by is stable
    entries.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| b.summary.total_demand.total_cmp(&a.summary.total_demand))
    });
    entries
}

/// The alert the inventory layer would currently have open for a product.
pub fn derive_alert(product: &Product) -> Option<StockAlert> {
    AlertType::for_stock(product.current_stock, product.reorder_point).map(|alert_type| StockAlert {
        product_id: product.product_id.clone(),
        alert_type,
        acknowledged: false,
    })
}

/// Alerts for every product in the catalog that currently needs one.
pub fn derive_alerts(products: &[Product]) -> Vec<StockAlert> {
    products.iter().filter_map(derive_alert).collect()
}

/// Summaries for every product that appears in `events`, computed in
/// parallel. Products with no events are simply absent from the map.
pub fn summarize_catalog(
    events: &[RawEvent],
    aggregator: &DailySeriesAggregator,
) -> EngineResult<HashMap<ProductId, DemandSummary>> {
    let grouped = group_by_product(events);
    tracing::debug!(
        "Summarizing {} products from {} events",
        grouped.len(),
        events.len()
    );

    grouped
        .into_par_iter()
        .map(|(product_id, product_events)| {
            let series = aggregator.build(&product_id, &product_events)?;
            Ok((product_id, summarize(&series)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, stock: f64, reorder_point: f64) -> Product {
        Product {
            product_id: id.to_string(),
            name: format!("Product {id}"),
            sku: None,
            current_stock: stock,
            reorder_point,
        }
    }

    fn alert(id: &str, alert_type: AlertType, acknowledged: bool) -> StockAlert {
        StockAlert {
            product_id: id.to_string(),
            alert_type,
            acknowledged,
        }
    }

    fn with_total(total_demand: f64) -> DemandSummary {
        DemandSummary {
            total_demand,
            ..Default::default()
        }
    }

    #[test]
    fn test_severity_then_demand_ordering() {
        let products = vec![
            product("a", 40.0, 10.0),
            product("b", 5.0, 10.0),
            product("c", 0.0, 10.0),
            product("d", 40.0, 10.0),
        ];
        let summaries = HashMap::from([
            ("a".to_string(), with_total(10.0)),
            ("b".to_string(), with_total(3.0)),
            ("c".to_string(), with_total(1.0)),
            ("d".to_string(), with_total(99.0)),
        ]);
        let alerts = vec![
            alert("b", AlertType::LowStock, false),
            alert("c", AlertType::OutOfStock, false),
        ];

        let ids: Vec<String> = classify_portfolio(&products, &summaries, &alerts)
            .into_iter()
            .map(|e| e.product_id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn test_acknowledged_alerts_ignored() {
        let products = vec![product("a", 0.0, 10.0)];
        let alerts = vec![alert("a", AlertType::OutOfStock, true)];
        let entries = classify_portfolio(&products, &HashMap::new(), &alerts);
        assert_eq!(entries[0].severity, Severity::Stable);
    }

    #[test]
    fn test_most_severe_open_alert_wins() {
        let products = vec![product("a", 0.0, 10.0)];
        let alerts = vec![
            alert("a", AlertType::LowStock, false),
            alert("a", AlertType::OutOfStock, false),
            alert("a", AlertType::LowStock, false),
        ];
        let entries = classify_portfolio(&products, &HashMap::new(), &alerts);
        assert_eq!(entries[0].severity, Severity::Critical);
    }

    #[test]
    fn test_duplicates_keep_first_and_ties_keep_input_order() {
        let mut renamed = product("a", 1.0, 1.0);
        renamed.name = "Second copy".into();
        let products = vec![product("x", 1.0, 1.0), product("a", 1.0, 1.0), renamed];

        let entries = classify_portfolio(&products, &HashMap::new(), &[]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product_id, "x");
        assert_eq!(entries[1].product_name, "Product a");
        assert_eq!(entries[1].summary, DemandSummary::default());
    }

    #[test]
    fn test_derive_alert() {
        assert_eq!(derive_alert(&product("a", 0.0, 5.0)).unwrap().alert_type, AlertType::OutOfStock);
        assert_eq!(derive_alert(&product("a", 5.0, 5.0)).unwrap().alert_type, AlertType::LowStock);
        assert!(derive_alert(&product("a", 6.0, 5.0)).is_none());
        assert_eq!(derive_alerts(&[product("a", 6.0, 5.0), product("b", 0.0, 5.0)]).len(), 1);
    }

    #[test]
    fn test_summarize_catalog() {
        let ts = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
        let events = vec![
            RawEvent::new("a", ts(1), 4.0),
            RawEvent::new("b", ts(1), 2.0),
            RawEvent::new("a", ts(2), 6.0),
            RawEvent::new("b", ts(3), -1.0),
        ];

        let summaries = summarize_catalog(&events, &DailySeriesAggregator::new()).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries["a"].total_demand, 10.0);
        assert_eq!(summaries["a"].span_days, 2);
        assert_eq!(summaries["b"].active_days, 1);
    }

    #[test]
    fn test_summarize_catalog_propagates_bad_events() {
        let events = vec![RawEvent::new("a", Utc::now(), f64::INFINITY)];
        assert!(summarize_catalog(&events, &DailySeriesAggregator::new()).is_err());
    }
}
