use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions_errors::{Result, TransactionError};

/// Closed set of ledger entry kinds. Each variant carries only the fields
/// that are meaningful for it; anything else is unrepresentable.
///
/// `rate_pct` is the capital-increase rate in percent (100 doubles the
/// share count). Rights and bonus share counts are proportional and may be
/// fractional; quantities are arbitrary-precision decimals throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransactionKind {
    Buy {
        quantity: Decimal,
        unit_price: Decimal,
    },
    Sell {
        quantity: Decimal,
        unit_price: Decimal,
    },
    Dividend {
        amount: Decimal,
    },
    Coupon {
        amount: Decimal,
    },
    BonusIssue {
        rate_pct: Decimal,
    },
    RightsExercised {
        rate_pct: Decimal,
        unit_price: Decimal,
    },
    RightsNotExercised {
        rate_pct: Decimal,
    },
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy { .. } => "BUY",
            TransactionKind::Sell { .. } => "SELL",
            TransactionKind::Dividend { .. } => "DIVIDEND",
            TransactionKind::Coupon { .. } => "COUPON",
            TransactionKind::BonusIssue { .. } => "BONUS_CAPITAL_INCREASE",
            TransactionKind::RightsExercised { .. } => "RIGHTS_EXERCISED",
            TransactionKind::RightsNotExercised { .. } => "RIGHTS_NOT_EXERCISED",
        }
    }

    /// Validates field constraints at construction time.
    pub fn validate(&self) -> Result<()> {
        match self {
            TransactionKind::Buy {
                quantity,
                unit_price,
            }
            | TransactionKind::Sell {
                quantity,
                unit_price,
            } => {
                if *quantity < Decimal::ZERO {
                    return Err(TransactionError::InvalidData(format!(
                        "{}: quantity must not be negative",
                        self.as_str()
                    )));
                }
                if *unit_price <= Decimal::ZERO {
                    return Err(TransactionError::InvalidData(format!(
                        "{}: unit price must be positive",
                        self.as_str()
                    )));
                }
                Ok(())
            }
            TransactionKind::Dividend { amount } | TransactionKind::Coupon { amount } => {
                if *amount < Decimal::ZERO {
                    return Err(TransactionError::InvalidData(format!(
                        "{}: amount must not be negative",
                        self.as_str()
                    )));
                }
                Ok(())
            }
            TransactionKind::BonusIssue { rate_pct }
            | TransactionKind::RightsNotExercised { rate_pct } => {
                if *rate_pct < Decimal::ZERO {
                    return Err(TransactionError::InvalidData(format!(
                        "{}: capital increase rate must not be negative",
                        self.as_str()
                    )));
                }
                Ok(())
            }
            TransactionKind::RightsExercised {
                rate_pct,
                unit_price,
            } => {
                if *rate_pct < Decimal::ZERO {
                    return Err(TransactionError::InvalidData(
                        "RIGHTS_EXERCISED: capital increase rate must not be negative".to_string(),
                    ));
                }
                if *unit_price <= Decimal::ZERO {
                    return Err(TransactionError::InvalidData(
                        "RIGHTS_EXERCISED: unit price must be positive".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Domain model for a ledger entry. Immutable once created; a transaction
/// may belong to several portfolios at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub asset_id: String,
    pub portfolio_ids: Vec<String>,
    pub trade_date: NaiveDate,
    pub kind: TransactionKind,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn new(
        asset_id: &str,
        portfolio_ids: Vec<String>,
        trade_date: NaiveDate,
        kind: TransactionKind,
    ) -> Result<Self> {
        if asset_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        kind.validate()?;
        Ok(Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            portfolio_ids,
            trade_date,
            kind,
            created_at: Utc::now().naive_utc(),
        })
    }

    /// Gross cash amount of the entry: quantity x unit price for trades,
    /// the paid amount for income entries, zero for capital events that
    /// move no cash through the ledger.
    pub fn gross_amount(&self) -> Decimal {
        match &self.kind {
            TransactionKind::Buy {
                quantity,
                unit_price,
            }
            | TransactionKind::Sell {
                quantity,
                unit_price,
            } => *quantity * *unit_price,
            TransactionKind::Dividend { amount } | TransactionKind::Coupon { amount } => *amount,
            TransactionKind::BonusIssue { .. }
            | TransactionKind::RightsExercised { .. }
            | TransactionKind::RightsNotExercised { .. } => Decimal::ZERO,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(
            self.kind,
            TransactionKind::Dividend { .. } | TransactionKind::Coupon { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn buy_requires_positive_unit_price() {
        let kind = TransactionKind::Buy {
            quantity: dec!(10),
            unit_price: dec!(0),
        };
        assert!(Transaction::new("asset-1", vec![], date("2023-01-02"), kind).is_err());
    }

    #[test]
    fn sell_rejects_negative_quantity() {
        let kind = TransactionKind::Sell {
            quantity: dec!(-1),
            unit_price: dec!(5),
        };
        assert!(Transaction::new("asset-1", vec![], date("2023-01-02"), kind).is_err());
    }

    #[test]
    fn bonus_accepts_fractional_rate() {
        let kind = TransactionKind::BonusIssue {
            rate_pct: dec!(12.5),
        };
        let tx = Transaction::new("asset-1", vec!["p1".to_string()], date("2023-01-02"), kind)
            .unwrap();
        assert_eq!(tx.gross_amount(), Decimal::ZERO);
    }

    #[test]
    fn gross_amount_for_trades_and_income() {
        let buy = Transaction::new(
            "asset-1",
            vec![],
            date("2023-01-02"),
            TransactionKind::Buy {
                quantity: dec!(3),
                unit_price: dec!(150.5),
            },
        )
        .unwrap();
        assert_eq!(buy.gross_amount(), dec!(451.5));

        let dividend = Transaction::new(
            "asset-1",
            vec![],
            date("2023-06-02"),
            TransactionKind::Dividend {
                amount: dec!(42.75),
            },
        )
        .unwrap();
        assert!(dividend.is_income());
        assert_eq!(dividend.gross_amount(), dec!(42.75));
    }
}
