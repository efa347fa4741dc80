//! Catalog-level records supplied by the inventory layer, and the
//! severity classification built on them.

use serde::{Deserialize, Serialize};

use crate::types::{DemandSummary, ProductId};

/// A catalog product as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub current_stock: f64,
    /// Stock level at or below which the product counts as low.
    pub reorder_point: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AlertType {
    LowStock,
    OutOfStock,
}

impl AlertType {
    /// Alert the inventory layer raises for a stock level, if any.
    pub fn for_stock(current_stock: f64, reorder_point: f64) -> Option<Self> {
        if current_stock <= 0.0 {
            Some(AlertType::OutOfStock)
        } else if current_stock <= reorder_point {
            Some(AlertType::LowStock)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low_stock",
            AlertType::OutOfStock => "out_of_stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockAlert {
    pub product_id: ProductId,
    pub alert_type: AlertType,
    #[serde(default)]
    pub acknowledged: bool,
}

/// Portfolio triage level. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Severity {
    Critical,
    Warning,
    Stable,
}

impl Severity {
    pub fn from_alert(alert: Option<AlertType>) -> Self {
        match alert {
            Some(AlertType::OutOfStock) => Severity::Critical,
            Some(AlertType::LowStock) => Severity::Warning,
            None => Severity::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProductRiskEntry {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub summary: DemandSummary,
    pub severity: Severity,
}
