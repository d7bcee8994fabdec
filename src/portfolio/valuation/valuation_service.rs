use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::assets::{Asset, AssetClass, AssetRepositoryTrait};
use crate::constants::PCT_DECIMAL_PRECISION;
use crate::errors::Result;
use crate::fx::FxRateCache;
use crate::market_data::MarketDataProviderTrait;
use crate::portfolio::positions::Position;

use super::valuation_model::{PortfolioValuation, PositionValuation};

#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Values the given positions in `reporting_currency` as of `as_of`
    /// (`None` = live). A single position's price or FX failure degrades to
    /// a fallback value and never aborts the rest of the pass.
    async fn value_positions(
        &self,
        positions: &[Position],
        reporting_currency: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation>;
}

pub struct ValuationService {
    provider: Arc<dyn MarketDataProviderTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        provider: Arc<dyn MarketDataProviderTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
    ) -> Self {
        ValuationService {
            provider,
            asset_repository,
        }
    }

    /// Resolves the asset's price as of the date, falling back to the last
    /// known price (or zero) when the oracle has nothing usable.
    async fn resolve_price(&self, asset: &Asset, as_of: Option<NaiveDate>) -> (Decimal, bool) {
        match self.provider.get_price(&asset.symbol, as_of).await {
            Ok(quote) => (quote.price, false),
            Err(e) => {
                let fallback = asset.last_price.unwrap_or(Decimal::ZERO);
                warn!(
                    "Price lookup failed for {}: {}. Falling back to {}.",
                    asset.symbol, e, fallback
                );
                (fallback, true)
            }
        }
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn value_positions(
        &self,
        positions: &[Position],
        reporting_currency: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<PortfolioValuation> {
        if positions.is_empty() {
            return Ok(PortfolioValuation::empty(reporting_currency, as_of));
        }
        debug!(
            "Valuing {} positions in {} as of {:?}",
            positions.len(),
            reporting_currency,
            as_of
        );

        let mut fx_cache = FxRateCache::new(self.provider.clone());
        let mut valued = Vec::with_capacity(positions.len());
        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;

        for position in positions {
            let asset = self.asset_repository.get_by_id(&position.asset_id)?;

            let (current_price, price_is_fallback) = self.resolve_price(&asset, as_of).await;

            // Pension contracts report one aggregate value; everything else
            // is unit price x quantity.
            let value_local = if asset.asset_class == AssetClass::PensionContract {
                current_price
            } else {
                position.quantity * current_price
            };

            let (rate, fx_is_fallback) = fx_cache
                .rate_or_fallback(&asset.currency, reporting_currency, as_of)
                .await;

            let market_value = value_local * rate;
            let cost_basis = position.cost_basis * rate;
            let gain_loss = market_value - cost_basis;
            let gain_loss_pct = if cost_basis != Decimal::ZERO {
                (gain_loss / cost_basis).round_dp(PCT_DECIMAL_PRECISION)
            } else {
                Decimal::ZERO
            };

            total_value += market_value;
            total_cost += cost_basis;

            valued.push(PositionValuation {
                asset_id: asset.id.clone(),
                symbol: asset.symbol.clone(),
                asset_class: asset.asset_class,
                currency: asset.currency.clone(),
                quantity: position.quantity,
                average_cost: position.average_cost,
                current_price,
                cost_basis,
                market_value,
                gain_loss,
                gain_loss_pct,
                allocation_pct: Decimal::ZERO,
                price_is_fallback,
                fx_is_fallback,
            });
        }

        // Allocation needs the final total, hence the second pass.
        if total_value != Decimal::ZERO {
            for item in &mut valued {
                item.allocation_pct =
                    (item.market_value / total_value).round_dp(PCT_DECIMAL_PRECISION);
            }
        }

        let total_gain_loss = total_value - total_cost;
        let total_gain_loss_pct = if total_cost != Decimal::ZERO {
            (total_gain_loss / total_cost).round_dp(PCT_DECIMAL_PRECISION)
        } else {
            Decimal::ZERO
        };

        Ok(PortfolioValuation {
            currency: reporting_currency.to_string(),
            as_of,
            positions: valued,
            total_value,
            total_cost,
            total_gain_loss,
            total_gain_loss_pct,
        })
    }
}
