//! Daily Series Aggregator
//!
//! Buckets raw quantity events into one demand value per calendar day.
//! The calendar day of an event is the local date of its timestamp under a
//! fixed UTC offset chosen by the caller; the default offset is zero, so an
//! event at `23:30Z` and one at `00:30Z` the next morning land on different
//! days. Idle days are never materialized.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use demand_core::{
    DailyDemandPoint, ProductDemandSeries, ProductId, QuantityConvention, RawEvent,
};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy)]
pub struct DailySeriesAggregator {
    offset: FixedOffset,
    convention: QuantityConvention,
}

impl Default for DailySeriesAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DailySeriesAggregator {
    /// UTC day boundaries, positive quantities are sales.
    pub fn new() -> Self {
        Self {
            offset: Utc.fix(),
            convention: QuantityConvention::SaleQuantity,
        }
    }

    /// Bucket by local date at a fixed offset from UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_convention(mut self, convention: QuantityConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn convention(&self) -> QuantityConvention {
        self.convention
    }

    /// Calendar day an instant falls on under this aggregator's offset.
    pub fn bucket_day(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.offset).date_naive()
    }

    /// Aggregate one product's events into its daily demand series.
    pub fn build(&self, product_id: &str, events: &[RawEvent]) -> EngineResult<ProductDemandSeries> {
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut discarded = 0usize;

        for event in events {
            if event.product_id != product_id {
                return Err(EngineError::invalid(format!(
                    "event for product {} passed to series of {}",
                    event.product_id, product_id
                )));
            }
            if !event.signed_quantity.is_finite() {
                return Err(EngineError::invalid(format!(
                    "non-finite quantity {} at {}",
                    event.signed_quantity, event.timestamp
                )));
            }

            let demand = self.convention.demand_of(event.signed_quantity);
            if demand <= 0.0 {
                discarded += 1;
                continue;
            }

            *by_day.entry(self.bucket_day(&event.timestamp)).or_insert(0.0) += demand;
        }

        if discarded > 0 {
            tracing::debug!(
                "Discarded {} non-demand events for {} ({} kept across {} days)",
                discarded,
                product_id,
                events.len() - discarded,
                by_day.len()
            );
        }

        let points = by_day
            .into_iter()
            .map(|(day, quantity)| DailyDemandPoint { day, quantity })
            .collect();

        Ok(ProductDemandSeries::from_points(product_id, points)?)
    }
}

/// Build a series with UTC day boundaries and sale-quantity semantics.
pub fn build_series(product_id: &str, events: &[RawEvent]) -> EngineResult<ProductDemandSeries> {
    DailySeriesAggregator::new().build(product_id, events)
}

/// Split a mixed event stream into per-product lists, ordered by product id.
/// Event order within a product is preserved.
pub fn group_by_product(events: &[RawEvent]) -> BTreeMap<ProductId, Vec<RawEvent>> {
    let mut grouped: BTreeMap<ProductId, Vec<RawEvent>> = BTreeMap::new();
    for event in events {
        grouped
            .entry(event.product_id.clone())
            .or_default()
            .push(event.clone());
    }
    grouped
}
