use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::market_data_errors::MarketDataError;
use super::market_data_model::Quote;

/// Price and FX oracle. External data source; any call may fail or return
/// stale data, and callers are expected to degrade gracefully per lookup.
///
/// `as_of = None` means "latest available"; `Some(date)` resolves the most
/// recent observation on or before that date.
#[async_trait]
pub trait MarketDataProviderTrait: Send + Sync {
    async fn get_price(
        &self,
        symbol: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Quote, MarketDataError>;

    async fn get_fx_rate(
        &self,
        from: &str,
        to: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, MarketDataError>;
}
