use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::transactions::{Transaction, TransactionKind};

use super::positions_model::Position;

const HUNDRED: Decimal = dec!(100);

/// Replays one asset's ledger within one portfolio and derives the holding
/// state as of `cutoff` (inclusive; `None` = whole ledger).
///
/// `transactions` must already be filtered to the asset; entries are folded
/// in (trade_date, created_at) order regardless of input order. If the
/// quantity drops to zero or below at any step, both quantity and cost
/// basis reset to zero.
pub fn calculate_position(
    portfolio_id: &str,
    asset_id: &str,
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> Position {
    let mut ordered: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| cutoff.map_or(true, |date| tx.trade_date <= date))
        .collect();
    ordered.sort_by(|a, b| {
        a.trade_date
            .cmp(&b.trade_date)
            .then(a.created_at.cmp(&b.created_at))
    });

    let mut quantity = Decimal::ZERO;
    let mut cost_basis = Decimal::ZERO;

    for tx in ordered {
        match &tx.kind {
            TransactionKind::Buy {
                quantity: qty,
                unit_price,
            } => {
                quantity += *qty;
                cost_basis += *qty * *unit_price;
            }
            TransactionKind::Sell {
                quantity: qty,
                unit_price: _,
            } => {
                if quantity > Decimal::ZERO {
                    let average_cost = cost_basis / quantity;
                    cost_basis -= average_cost * *qty;
                }
                quantity -= *qty;
            }
            TransactionKind::BonusIssue { rate_pct } => {
                // New shares at zero cost; average cost dilutes.
                quantity += quantity * *rate_pct / HUNDRED;
            }
            TransactionKind::RightsExercised {
                rate_pct,
                unit_price,
            } => {
                let new_shares = quantity * *rate_pct / HUNDRED;
                quantity += new_shares;
                cost_basis += new_shares * *unit_price;
            }
            // Opted-out rights dilute the position's market value, not its
            // quantity or cost basis; the post-dilution price carries it.
            TransactionKind::RightsNotExercised { .. } => {}
            TransactionKind::Dividend { .. } | TransactionKind::Coupon { .. } => {}
        }

        if quantity <= Decimal::ZERO {
            quantity = Decimal::ZERO;
            cost_basis = Decimal::ZERO;
        }
    }

    let average_cost = if quantity > Decimal::ZERO {
        cost_basis / quantity
    } else {
        Decimal::ZERO
    };

    Position {
        portfolio_id: portfolio_id.to_string(),
        asset_id: asset_id.to_string(),
        quantity,
        cost_basis,
        average_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tx(date_str: &str, kind: TransactionKind) -> Transaction {
        Transaction::new("asset-1", vec!["p1".to_string()], date(date_str), kind).unwrap()
    }

    fn buy(date_str: &str, quantity: Decimal, unit_price: Decimal) -> Transaction {
        tx(
            date_str,
            TransactionKind::Buy {
                quantity,
                unit_price,
            },
        )
    }

    fn sell(date_str: &str, quantity: Decimal, unit_price: Decimal) -> Transaction {
        tx(
            date_str,
            TransactionKind::Sell {
                quantity,
                unit_price,
            },
        )
    }

    #[test]
    fn buys_accumulate_quantity_and_cost() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            buy("2023-02-02", dec!(5), dec!(8)),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.cost_basis, dec!(90));
        assert_eq!(position.average_cost, dec!(6));
    }

    #[test]
    fn sell_reduces_cost_basis_at_average_cost() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            buy("2023-02-02", dec!(10), dec!(15)),
            sell("2023-03-02", dec!(5), dec!(20)),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        // Average cost 10; selling 5 removes 50 of cost basis.
        assert_eq!(position.quantity, dec!(15));
        assert_eq!(position.cost_basis, dec!(150));
        assert_eq!(position.average_cost, dec!(10));
    }

    #[test]
    fn overselling_floors_at_zero_and_resets_cost() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            sell("2023-02-02", dec!(25), dec!(6)),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, Decimal::ZERO);
        assert_eq!(position.cost_basis, Decimal::ZERO);
        assert_eq!(position.average_cost, Decimal::ZERO);
        assert!(position.is_empty());
    }

    #[test]
    fn position_recovers_after_flatting_out() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            sell("2023-02-02", dec!(10), dec!(6)),
            buy("2023-03-02", dec!(4), dec!(7)),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(4));
        assert_eq!(position.cost_basis, dec!(28));
    }

    #[test]
    fn bonus_issue_dilutes_average_cost_only() {
        let ledger = vec![
            buy("2023-01-02", dec!(100), dec!(6)),
            tx(
                "2023-04-02",
                TransactionKind::BonusIssue {
                    rate_pct: dec!(100),
                },
            ),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(200));
        assert_eq!(position.cost_basis, dec!(600));
        assert_eq!(position.average_cost, dec!(3));
    }

    #[test]
    fn fractional_bonus_rate() {
        let ledger = vec![
            buy("2023-01-02", dec!(30), dec!(10)),
            tx("2023-04-02", TransactionKind::BonusIssue { rate_pct: dec!(50) }),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(45));
        assert_eq!(position.cost_basis, dec!(300));
    }

    #[test]
    fn rights_exercised_adds_shares_and_cost() {
        let ledger = vec![
            buy("2023-01-02", dec!(100), dec!(6)),
            tx(
                "2023-04-02",
                TransactionKind::RightsExercised {
                    rate_pct: dec!(50),
                    unit_price: dec!(1),
                },
            ),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(150));
        assert_eq!(position.cost_basis, dec!(650));
    }

    #[test]
    fn rights_not_exercised_changes_nothing() {
        let ledger = vec![
            buy("2023-01-02", dec!(100), dec!(6)),
            tx(
                "2023-04-02",
                TransactionKind::RightsNotExercised {
                    rate_pct: dec!(100),
                },
            ),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(100));
        assert_eq!(position.cost_basis, dec!(600));
    }

    #[test]
    fn income_entries_do_not_touch_the_position() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            tx(
                "2023-05-02",
                TransactionKind::Dividend { amount: dec!(120) },
            ),
            tx("2023-06-02", TransactionKind::Coupon { amount: dec!(80) }),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(10));
        assert_eq!(position.cost_basis, dec!(50));
    }

    #[test]
    fn cutoff_excludes_later_trades() {
        let ledger = vec![
            buy("2023-01-02", dec!(10), dec!(5)),
            sell("2023-06-02", dec!(10), dec!(9)),
        ];
        let position =
            calculate_position("p1", "asset-1", &ledger, Some(date("2023-03-31")));
        assert_eq!(position.quantity, dec!(10));
        assert_eq!(position.cost_basis, dec!(50));

        // Cutoff on the trade date itself includes it.
        let flat = calculate_position("p1", "asset-1", &ledger, Some(date("2023-06-02")));
        assert!(flat.is_empty());
    }

    #[test]
    fn same_day_entries_fold_in_creation_order() {
        let d = date("2023-01-02");
        let mut first = buy("2023-01-02", dec!(10), dec!(5));
        let mut second = sell("2023-01-02", dec!(10), dec!(6));
        let base: NaiveDateTime = d.and_hms_opt(9, 0, 0).unwrap();
        first.created_at = base;
        second.created_at = base + Duration::seconds(1);

        // Shuffled input; the sell must still land after the buy.
        let position = calculate_position("p1", "asset-1", &[second, first], None);
        assert!(position.is_empty());
    }

    #[test]
    fn average_cost_keeps_full_decimal_precision() {
        let ledger = vec![
            buy("2023-01-02", dec!(3), dec!(9)),
            tx(
                "2023-02-02",
                TransactionKind::BonusIssue {
                    rate_pct: dec!(200),
                },
            ),
        ];
        let position = calculate_position("p1", "asset-1", &ledger, None);
        assert_eq!(position.quantity, dec!(9));
        // 27 / 9 stays exact; a non-terminating division keeps 28 digits.
        assert_eq!(position.average_cost, dec!(3));

        let uneven = vec![buy("2023-01-02", dec!(3), dec!(9.333333)), sell("2023-02-02", dec!(1), dec!(10))];
        let p = calculate_position("p1", "asset-1", &uneven, None);
        assert_eq!(p.quantity, dec!(2));
    }
}
