use chrono::NaiveDate;

use crate::errors::Result;

use super::transactions_model::Transaction;

/// Read access to the transaction ledger.
///
/// Implementations return rows ordered by (trade_date, created_at); callers
/// that depend on fold order re-sort defensively.
pub trait TransactionRepositoryTrait: Send + Sync {
    /// All transactions belonging to the given portfolio.
    fn get_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;

    /// Dividend and coupon entries across the whole ledger with
    /// `trade_date` inside `[start, end]`.
    fn get_income_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>>;
}
