use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A market price observation for a symbol on a given date.
///
/// The price is denominated in `currency`, the asset's own listing
/// currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub quote_date: NaiveDate,
    pub price: Decimal,
    pub currency: String,
}
