use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDirection {
    Income,
    Expense,
}

/// A dated, category-tagged amount inside one cash-flow stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEntry {
    pub id: String,
    pub flow_id: String,
    pub entry_date: NaiveDate,
    pub category: String,
    pub direction: EntryDirection,
    pub amount: Decimal,
    pub currency: String,
}

impl CashFlowEntry {
    /// Amount signed by direction: income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            EntryDirection::Income => self.amount,
            EntryDirection::Expense => -self.amount,
        }
    }
}

/// One month's salary and saved amounts inside a cash-flow stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    pub id: String,
    pub flow_id: String,
    pub record_date: NaiveDate,
    pub salary: Decimal,
    pub saved: Decimal,
    pub currency: String,
}
