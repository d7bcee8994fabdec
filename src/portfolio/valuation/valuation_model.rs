use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::AssetClass;

/// Valuation of a single position.
///
/// `current_price` and `average_cost` are denominated in the asset's own
/// currency; `cost_basis`, `market_value` and `gain_loss` are in the
/// valuation's reporting currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub asset_id: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub currency: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub current_price: Decimal,
    pub cost_basis: Decimal,
    pub market_value: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_pct: Decimal,
    pub allocation_pct: Decimal,
    /// The oracle had no usable price; the asset's last known price (or
    /// zero) was used instead.
    pub price_is_fallback: bool,
    /// The oracle had no usable cross-rate; a rate of 1 was used instead.
    pub fx_is_fallback: bool,
}

/// Whole-portfolio valuation result in one reporting currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub currency: String,
    pub as_of: Option<NaiveDate>,
    pub positions: Vec<PositionValuation>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_pct: Decimal,
}

impl PortfolioValuation {
    pub fn empty(currency: &str, as_of: Option<NaiveDate>) -> Self {
        PortfolioValuation {
            currency: currency.to_string(),
            as_of,
            positions: Vec::new(),
            total_value: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_gain_loss: Decimal::ZERO,
            total_gain_loss_pct: Decimal::ZERO,
        }
    }
}
