use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::transactions::{Transaction, TransactionRepositoryTrait};

use super::positions_calculator::calculate_position;
use super::positions_model::Position;

pub trait PositionsServiceTrait: Send + Sync {
    /// Reconstructs all open positions of a portfolio as of `as_of`
    /// (inclusive; `None` = whole ledger). Assets whose ledger folds down
    /// to an empty position are omitted.
    fn get_positions(&self, portfolio_id: &str, as_of: Option<NaiveDate>)
        -> Result<Vec<Position>>;
}

pub struct PositionsService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl PositionsService {
    pub fn new(transaction_repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        PositionsService {
            transaction_repository,
        }
    }
}

impl PositionsServiceTrait for PositionsService {
    fn get_positions(
        &self,
        portfolio_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<Position>> {
        let transactions = self.transaction_repository.get_for_portfolio(portfolio_id)?;
        debug!(
            "Reconstructing positions for portfolio {} from {} transactions",
            portfolio_id,
            transactions.len()
        );

        // BTreeMap keeps the per-asset grouping deterministic.
        let mut by_asset: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
        for tx in transactions {
            by_asset.entry(tx.asset_id.clone()).or_default().push(tx);
        }

        let positions = by_asset
            .iter()
            .map(|(asset_id, ledger)| calculate_position(portfolio_id, asset_id, ledger, as_of))
            .filter(|position| !position.is_empty())
            .collect();

        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::TransactionKind;
    use rust_decimal_macros::dec;

    struct FakeTransactionRepository {
        transactions: Vec<Transaction>,
    }

    impl TransactionRepositoryTrait for FakeTransactionRepository {
        fn get_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.portfolio_ids.iter().any(|id| id == portfolio_id))
                .cloned()
                .collect())
        }

        fn get_income_in_range(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.is_income() && tx.trade_date >= start && tx.trade_date <= end)
                .cloned()
                .collect())
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn buy(asset: &str, date_str: &str, quantity: rust_decimal::Decimal) -> Transaction {
        Transaction::new(
            asset,
            vec!["p1".to_string()],
            date(date_str),
            TransactionKind::Buy {
                quantity,
                unit_price: dec!(10),
            },
        )
        .unwrap()
    }

    fn sell(asset: &str, date_str: &str, quantity: rust_decimal::Decimal) -> Transaction {
        Transaction::new(
            asset,
            vec!["p1".to_string()],
            date(date_str),
            TransactionKind::Sell {
                quantity,
                unit_price: dec!(12),
            },
        )
        .unwrap()
    }

    #[test]
    fn groups_ledger_per_asset_and_drops_empty_positions() {
        let repository = Arc::new(FakeTransactionRepository {
            transactions: vec![
                buy("aaa", "2023-01-02", dec!(10)),
                buy("bbb", "2023-01-03", dec!(4)),
                sell("bbb", "2023-02-03", dec!(4)),
            ],
        });
        let service = PositionsService::new(repository);

        let positions = service.get_positions("p1", None).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].asset_id, "aaa");
        assert_eq!(positions[0].quantity, dec!(10));
    }

    #[test]
    fn as_of_date_reconstructs_history() {
        let repository = Arc::new(FakeTransactionRepository {
            transactions: vec![
                buy("aaa", "2023-01-02", dec!(10)),
                sell("aaa", "2023-03-02", dec!(6)),
            ],
        });
        let service = PositionsService::new(repository);

        let then = service
            .get_positions("p1", Some(date("2023-02-01")))
            .unwrap();
        assert_eq!(then[0].quantity, dec!(10));

        let now = service.get_positions("p1", None).unwrap();
        assert_eq!(now[0].quantity, dec!(4));
    }
}
