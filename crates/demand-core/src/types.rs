use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DemandError, DemandResult};
use crate::numeric::round_to;

pub type ProductId = String;

/// A raw quantity event as recorded by the inventory layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawEvent {
    pub product_id: ProductId,
    pub timestamp: DateTime<Utc>,
    pub signed_quantity: f64,
}

impl RawEvent {
    pub fn new(product_id: impl Into<ProductId>, timestamp: DateTime<Utc>, signed_quantity: f64) -> Self {
        Self {
            product_id: product_id.into(),
            timestamp,
            signed_quantity,
        }
    }

    /// Build an event from a textual timestamp.
    ///
    /// Accepts RFC 3339 instants (`2024-03-01T18:30:00Z`, `...+05:30`) and bare
    /// `YYYY-MM-DD` dates, which are taken as midnight UTC.
    pub fn parse(
        product_id: impl Into<ProductId>,
        timestamp: &str,
        signed_quantity: f64,
    ) -> DemandResult<Self> {
        Ok(Self::new(product_id, parse_timestamp(timestamp)?, signed_quantity))
    }
}

fn parse_timestamp(raw: &str) -> DemandResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN).and_utc());
    }
    Err(DemandError::invalid(format!("malformed timestamp: {raw:?}")))
}

/// How the sign of `RawEvent::signed_quantity` maps onto demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum QuantityConvention {
    /// Sale transactions: a positive quantity is units sold.
    #[default]
    SaleQuantity,
    /// Stock movements: a sale lowers stock, so the magnitude of a negative
    /// change is units sold and increases carry no demand.
    StockDelta,
}

impl QuantityConvention {
    /// Units of demand carried by a quantity under this convention.
    /// Non-positive results mean the event does not count as demand.
    pub fn demand_of(&self, signed_quantity: f64) -> f64 {
        match self {
            QuantityConvention::SaleQuantity => signed_quantity,
            QuantityConvention::StockDelta => -signed_quantity,
        }
    }
}

/// Aggregated demand for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DailyDemandPoint {
    pub day: NaiveDate,
    pub quantity: f64,
}

/// Sparse per-day demand for a single product, ascending by day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProductDemandSeries {
    pub product_id: ProductId,
    points: Vec<DailyDemandPoint>,
}

impl ProductDemandSeries {
    pub fn empty(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            points: Vec::new(),
        }
    }

    /// Build a series from points in any order.
    ///
    /// Duplicate days and non-positive or non-finite quantities are rejected;
    /// idle days must simply be absent.
    pub fn from_points(
        product_id: impl Into<ProductId>,
        mut points: Vec<DailyDemandPoint>,
    ) -> DemandResult<Self> {
        if let Some(bad) = points
            .iter()
            .find(|p| !p.quantity.is_finite() || p.quantity <= 0.0)
        {
            return Err(DemandError::invalid(format!(
                "daily quantity for {} must be positive, got {}",
                bad.day, bad.quantity
            )));
        }

        points.sort_by_key(|p| p.day);
        if let Some(pair) = points.windows(2).find(|w| w[0].day == w[1].day) {
            return Err(DemandError::invalid(format!(
                "duplicate day {} in demand series",
                pair[0].day
            )));
        }

        Ok(Self {
            product_id: product_id.into(),
            points,
        })
    }

    pub fn points(&self) -> &[DailyDemandPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of days that actually carry demand.
    pub fn active_days(&self) -> usize {
        self.points.len()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.day)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.day)
    }

    /// Calendar span from first to last active day, inclusive. 0 when empty.
    pub fn span_days(&self) -> u32 {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => {
                let diff = (last - first).num_days().max(0) as u32;
                (diff + 1).max(1)
            }
            _ => 0,
        }
    }

    pub fn quantities(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.quantity)
    }
}

/// Descriptive statistics for a demand series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DemandSummary {
    pub total_demand: f64,
    pub avg_daily: f64,
    pub peak_day: Option<NaiveDate>,
    pub peak_qty: f64,
    pub volatility: f64,
    pub span_days: u32,
    pub active_days: usize,
}

impl DemandSummary {
    pub fn is_empty(&self) -> bool {
        self.active_days == 0
    }

    /// Volatility relative to the daily average, as a 0-100 percentage.
    ///
    /// Stand-in for forecast MAPE when no backtest is available.
    pub fn error_margin(&self) -> f64 {
        if self.avg_daily <= 0.0 {
            return 0.0;
        }
        let margin = self.volatility / self.avg_daily.max(1.0) * 100.0;
        if margin.is_finite() {
            margin.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// Traffic-light status for a stockout estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RiskStatus {
    Critical,
    Warning,
    Safe,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Critical => "Critical",
            RiskStatus::Warning => "Warning",
            RiskStatus::Safe => "Safe",
        }
    }
}

/// Time-to-stockout estimate for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockoutRisk {
    pub will_stockout: bool,
    /// `+inf` when there is no demand; serialized as `null`.
    #[serde(with = "infinite_as_null")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>))]
    pub days_until_stockout: f64,
    pub confidence: f64,
    pub recommendation: String,
}

impl StockoutRisk {
    /// Risk for a product that has never sold.
    pub fn insufficient_data() -> Self {
        Self {
            will_stockout: false,
            days_until_stockout: f64::INFINITY,
            confidence: 0.0,
            recommendation: "Not enough sales data to estimate risk".to_string(),
        }
    }

    /// Days until stockout rounded for display, floored at 0.
    /// `None` when stock never runs out at the current rate.
    pub fn display_days(&self) -> Option<i64> {
        if self.days_until_stockout.is_finite() {
            Some(self.days_until_stockout.round().max(0.0) as i64)
        } else {
            None
        }
    }

    pub fn status(&self) -> RiskStatus {
        match self.display_days() {
            Some(days) if self.will_stockout && days <= 3 => RiskStatus::Critical,
            Some(days) if self.will_stockout && days <= 7 => RiskStatus::Warning,
            _ => RiskStatus::Safe,
        }
    }
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// One future day of forecast demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ForecastPoint {
    pub day: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Accuracy metadata reported by a forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ForecastMetrics {
    pub mape: Option<f64>,
    /// `None` when the provider did not report a count; `Some(0)` is a real zero.
    pub data_points: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AccuracySource {
    /// MAPE computed by the provider's own backtest.
    Provider,
    /// Volatility-based error margin from the local summary.
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ForecastAccuracy {
    pub mape: f64,
    pub data_points_used: usize,
    pub source: AccuracySource,
}

/// Replenishment advice over a forecast horizon.
///
/// Numbers are kept at full precision; use the `display_*` helpers for
/// presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReorderSuggestion {
    pub recommended_quantity: u64,
    pub predicted_demand: f64,
    pub current_stock: f64,
    pub net_position: f64,
    pub coverage_days: Option<f64>,
    pub avg_daily_predicted: f64,
    pub reorder_point: f64,
    pub horizon_days: u32,
}

impl ReorderSuggestion {
    pub fn display_net_position(&self) -> i64 {
        self.net_position.round() as i64
    }

    /// Whole days of cover, floored at 0.
    pub fn display_coverage_days(&self) -> Option<u64> {
        self.coverage_days
            .filter(|d| d.is_finite())
            .map(|d| d.floor().max(0.0) as u64)
    }

    pub fn needs_reorder(&self) -> bool {
        self.recommended_quantity > 0
    }

    pub fn guidance(&self) -> String {
        if self.needs_reorder() {
            format!(
                "Plan to reorder {} units to remain stocked for the next {} days.",
                self.recommended_quantity, self.horizon_days
            )
        } else {
            format!(
                "Current inventory comfortably covers the next {} days of projected demand.",
                self.horizon_days
            )
        }
    }
}

/// One row of the combined history + forecast chart.
///
/// Historical rows carry only `historical`; forecast rows carry only the
/// prediction and its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChartPoint {
    pub day: NaiveDate,
    pub historical: Option<f64>,
    pub predicted: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl ChartPoint {
    pub fn from_history(point: &DailyDemandPoint) -> Self {
        Self {
            day: point.day,
            historical: Some(round_to(point.quantity, 2)),
            predicted: None,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn from_forecast(point: &ForecastPoint) -> Self {
        Self {
            day: point.day,
            historical: None,
            predicted: Some(point.predicted),
            lower_bound: Some(point.lower_bound),
            upper_bound: Some(point.upper_bound),
        }
    }

    pub fn is_forecast(&self) -> bool {
        self.predicted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let a = RawEvent::parse("p1", "2024-03-01T23:30:00Z", 2.0).unwrap();
        assert_eq!(a.timestamp.date_naive(), day(1));

        let b = RawEvent::parse("p1", "2024-03-02T01:00:00+05:30", 2.0).unwrap();
        assert_eq!(b.timestamp.date_naive(), day(1));

        let c = RawEvent::parse("p1", "2024-03-05", 1.0).unwrap();
        assert_eq!(c.timestamp.date_naive(), day(5));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = RawEvent::parse("p1", "yesterday", 1.0).unwrap_err();
        assert!(matches!(err, DemandError::InvalidInput(_)));
    }

    #[test]
    fn test_quantity_convention() {
        assert_eq!(QuantityConvention::SaleQuantity.demand_of(3.0), 3.0);
        assert_eq!(QuantityConvention::StockDelta.demand_of(-3.0), 3.0);
        assert!(QuantityConvention::StockDelta.demand_of(5.0) < 0.0);
    }

    #[test]
    fn test_series_from_points_sorts_and_spans() {
        let series = ProductDemandSeries::from_points(
            "p1",
            vec![
                DailyDemandPoint { day: day(3), quantity: 10.0 },
                DailyDemandPoint { day: day(1), quantity: 10.0 },
            ],
        )
        .unwrap();

        assert_eq!(series.first_day(), Some(day(1)));
        assert_eq!(series.span_days(), 3);
        assert_eq!(series.active_days(), 2);
    }

    #[test]
    fn test_series_from_points_rejects_duplicates() {
        let result = ProductDemandSeries::from_points(
            "p1",
            vec![
                DailyDemandPoint { day: day(2), quantity: 1.0 },
                DailyDemandPoint { day: day(2), quantity: 4.0 },
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_series_span_is_zero() {
        assert_eq!(ProductDemandSeries::empty("p1").span_days(), 0);
    }

    #[test]
    fn test_error_margin_bounds() {
        let summary = DemandSummary {
            avg_daily: 2.0,
            volatility: 10.0,
            ..Default::default()
        };
        assert_eq!(summary.error_margin(), 100.0);

        let flat = DemandSummary::default();
        assert_eq!(flat.error_margin(), 0.0);
    }

    #[test]
    fn test_infinite_days_serialize_as_null() {
        let risk = StockoutRisk::insufficient_data();
        let json = serde_json::to_value(&risk).unwrap();
        assert!(json["days_until_stockout"].is_null());

        let back: StockoutRisk = serde_json::from_value(json).unwrap();
        assert!(back.days_until_stockout.is_infinite());
    }

    #[test]
    fn test_risk_status_tiers() {
        let mut risk = StockoutRisk {
            will_stockout: true,
            days_until_stockout: 2.6,
            confidence: 0.5,
            recommendation: String::new(),
        };
        assert_eq!(risk.status(), RiskStatus::Critical);

        risk.days_until_stockout = 6.0;
        assert_eq!(risk.status(), RiskStatus::Warning);

        risk.days_until_stockout = 20.0;
        assert_eq!(risk.status(), RiskStatus::Safe);
    }

    #[test]
    fn test_reorder_guidance() {
        let suggestion = ReorderSuggestion {
            recommended_quantity: 37,
            predicted_demand: 65.0,
            current_stock: 28.0,
            net_position: -37.0,
            coverage_days: Some(12.92),
            avg_daily_predicted: 65.0 / 30.0,
            reorder_point: 50.0,
            horizon_days: 30,
        };
        assert_eq!(suggestion.display_coverage_days(), Some(12));
        assert!(suggestion.guidance().contains("37 units"));
    }
}
