use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DECIMAL_PRECISION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Monthly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "MONTHLY",
            Period::Yearly => "YEARLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotKind {
    Portfolio,
    CashFlow,
    SalarySavings,
    Dividend,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Portfolio => "PORTFOLIO",
            SnapshotKind::CashFlow => "CASH_FLOW",
            SnapshotKind::SalarySavings => "SALARY_SAVINGS",
            SnapshotKind::Dividend => "DIVIDEND",
        }
    }
}

/// Immutable point-in-time aggregate of a portfolio, cash-flow stream,
/// salary/savings stream or dividend year.
///
/// Created once through the snapshot service; never mutated afterwards
/// except for the IRR backfill on portfolio snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub kind: SnapshotKind,
    /// Parent reference: portfolio id, cash-flow stream id, or the
    /// reporting currency for dividend snapshots.
    pub entity_id: String,
    pub snapshot_date: NaiveDate,
    pub period: Option<Period>,
    /// Calendar year covered by dividend snapshots.
    pub year: Option<i32>,
    pub name: String,
    pub slug: String,
    pub currency: String,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_pct: Decimal,
    /// Money-weighted return, backfilled after creation. The first-ever
    /// snapshot of a portfolio has no predecessor and stays `None`.
    pub irr_pct: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Per-asset or per-category breakdown row. Owned by exactly one snapshot
/// and deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub id: String,
    pub snapshot_id: String,
    /// Asset symbol or category name.
    pub label: String,
    pub asset_id: Option<String>,
    pub quantity: Option<Decimal>,
    pub average_cost: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub cost_basis: Decimal,
    pub market_value: Decimal,
    pub gain_loss: Decimal,
    pub allocation_pct: Decimal,
}

impl SnapshotItem {
    pub fn new(snapshot_id: &str, label: &str) -> Self {
        SnapshotItem {
            id: uuid::Uuid::new_v4().to_string(),
            snapshot_id: snapshot_id.to_string(),
            label: label.to_string(),
            asset_id: None,
            quantity: None,
            average_cost: None,
            current_price: None,
            cost_basis: Decimal::ZERO,
            market_value: Decimal::ZERO,
            gain_loss: Decimal::ZERO,
            allocation_pct: Decimal::ZERO,
        }
    }

    /// Rounds the monetary fields to the persisted precision.
    pub fn rounded(mut self) -> Self {
        self.cost_basis = self.cost_basis.round_dp(DECIMAL_PRECISION);
        self.market_value = self.market_value.round_dp(DECIMAL_PRECISION);
        self.gain_loss = self.gain_loss.round_dp(DECIMAL_PRECISION);
        self
    }
}

impl Snapshot {
    pub fn new(
        kind: SnapshotKind,
        entity_id: &str,
        snapshot_date: NaiveDate,
        name: String,
        slug: String,
        currency: &str,
    ) -> Self {
        Snapshot {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            entity_id: entity_id.to_string(),
            snapshot_date,
            period: None,
            year: None,
            name,
            slug,
            currency: currency.to_string(),
            total_value: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_gain_loss: Decimal::ZERO,
            total_gain_loss_pct: Decimal::ZERO,
            irr_pct: None,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Rows worth charting: zero-amount items are recorded but excluded from
/// downstream rendering.
pub fn chart_items(items: &[SnapshotItem]) -> Vec<&SnapshotItem> {
    items
        .iter()
        .filter(|item| item.market_value != Decimal::ZERO || item.cost_basis != Decimal::ZERO)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn chart_items_drop_zero_rows() {
        let mut kept = SnapshotItem::new("s1", "THYAO");
        kept.market_value = dec!(100);
        let mut cost_only = SnapshotItem::new("s1", "GARAN");
        cost_only.cost_basis = dec!(50);
        let zero = SnapshotItem::new("s1", "EMPTY");

        let items = vec![kept, cost_only, zero];
        let charted = chart_items(&items);
        assert_eq!(charted.len(), 2);
        assert!(charted.iter().all(|item| item.label != "EMPTY"));
    }

    #[test]
    fn rounding_uses_persisted_precision() {
        let mut item = SnapshotItem::new("s1", "THYAO");
        item.market_value = dec!(1.23456789);
        let rounded = item.rounded();
        assert_eq!(rounded.market_value, dec!(1.234568));
    }
}
