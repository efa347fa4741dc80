use demand_core::{
    ChartPoint, DemandSummary, ForecastAccuracy, Product, ProductDemandSeries, ProductRiskEntry,
    RawEvent, ReorderSuggestion, StockAlert, StockoutRisk,
};
use forecast_client::{ForecastConfig, ForecastProvider, HttpForecastProvider};
use serde::Serialize;
use std::sync::Arc;

use crate::aggregator::DailySeriesAggregator;
use crate::error::EngineResult;
use crate::forecast_adapter::{chart_series, resolve_accuracy, ForecastAdapter, ForecastOutcome};
use crate::portfolio::{classify_portfolio, summarize_catalog};
use crate::reorder::reorder_for_forecast;
use crate::statistics::{heuristic_accuracy, summarize};
use crate::stockout::estimate_stockout_risk;

/// Everything the engine can say about a product from its history alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInsight {
    pub product_id: String,
    pub summary: DemandSummary,
    pub risk: StockoutRisk,
    pub accuracy: ForecastAccuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub outcome: ForecastOutcome,
    pub accuracy: ForecastAccuracy,
    /// Empty when the provider had nothing to predict.
    pub chart: Vec<ChartPoint>,
    pub reorder: Option<ReorderSuggestion>,
}

/// Entry point tying aggregation, statistics and the forecast provider
/// together.
pub struct DemandEngine {
    aggregator: DailySeriesAggregator,
    adapter: ForecastAdapter,
}

impl DemandEngine {
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        Self {
            aggregator: DailySeriesAggregator::new(),
            adapter: ForecastAdapter::new(provider),
        }
    }

    /// HTTP-backed engine using the configured service, timeout and horizon.
    pub fn from_config(config: &ForecastConfig) -> EngineResult<Self> {
        let provider = HttpForecastProvider::from_config(config)?;
        let adapter = ForecastAdapter::new(Arc::new(provider))
            .with_timeout(config.timeout)
            .with_default_horizon(config.default_horizon_days);
        Ok(Self {
            aggregator: DailySeriesAggregator::new(),
            adapter,
        })
    }

    pub fn with_aggregator(mut self, aggregator: DailySeriesAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_adapter(mut self, adapter: ForecastAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn aggregator(&self) -> &DailySeriesAggregator {
        &self.aggregator
    }

    pub fn adapter(&self) -> &ForecastAdapter {
        &self.adapter
    }

    pub fn history(&self, product: &Product, events: &[RawEvent]) -> EngineResult<ProductDemandSeries> {
        self.aggregator.build(&product.product_id, events)
    }

    pub fn product_insight(&self, product: &Product, events: &[RawEvent]) -> EngineResult<ProductInsight> {
        let series = self.history(product, events)?;
        let summary = summarize(&series);

        let risk = if summary.is_empty() {
            StockoutRisk::insufficient_data()
        } else {
            estimate_stockout_risk(product.current_stock, summary.avg_daily, product.reorder_point)?
        };

        Ok(ProductInsight {
            product_id: product.product_id.clone(),
            summary,
            risk,
            accuracy: heuristic_accuracy(&summary),
        })
    }

    /// Forecast a product and combine it with its history.
    ///
    /// `horizon_days` falls back to the adapter's default. Reorder advice comes
    /// from the provider when it sends a block, otherwise it is computed from
    /// the summed forecast.
    pub async fn forecast_report(
        &self,
        product: &Product,
        history: &ProductDemandSeries,
        horizon_days: Option<u32>,
    ) -> EngineResult<ForecastReport> {
        let horizon = horizon_days.unwrap_or_else(|| self.adapter.default_horizon_days());
        let outcome = self.adapter.request_forecast(&product.product_id, horizon).await?;

        let summary = summarize(history);
        let accuracy = resolve_accuracy(&summary, outcome.metrics());

        let (chart, reorder) = match outcome.forecast() {
            Some(forecast) => {
                let chart = chart_series(history, &forecast.points)?;
                let reorder = match &forecast.reorder {
                    Some(block) => block.clone(),
                    None => reorder_for_forecast(
                        &forecast.points,
                        forecast.horizon_days,
                        product.current_stock,
                        product.reorder_point,
                    )?,
                };
                (chart, Some(reorder))
            }
            None => (Vec::new(), None),
        };

        Ok(ForecastReport {
            outcome,
            accuracy,
            chart,
            reorder,
        })
    }

    /// Summaries for the whole catalog followed by severity triage.
    pub fn portfolio(
        &self,
        products: &[Product],
        events: &[RawEvent],
        alerts: &[StockAlert],
    ) -> EngineResult<Vec<ProductRiskEntry>> {
        let summaries = summarize_catalog(events, &self.aggregator)?;
        Ok(classify_portfolio(products, &summaries, alerts))
    }
}
