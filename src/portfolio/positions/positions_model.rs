use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holding state for one (portfolio, asset) pair as of a cutoff date.
/// Derived from the ledger, never persisted. Quantity is never negative;
/// short positions are not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub portfolio_id: String,
    pub asset_id: String,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub average_cost: Decimal,
}

impl Position {
    pub fn is_empty(&self) -> bool {
        self.quantity == Decimal::ZERO && self.cost_basis == Decimal::ZERO
    }
}
