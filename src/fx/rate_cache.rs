use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::market_data::{MarketDataError, MarketDataProviderTrait};

/// FX lookups memoized per (from, to, date) for the lifetime of one
/// valuation pass. Owned by the pass, never shared across requests.
pub struct FxRateCache {
    provider: Arc<dyn MarketDataProviderTrait>,
    rates: HashMap<(String, String, Option<NaiveDate>), Decimal>,
}

impl FxRateCache {
    pub fn new(provider: Arc<dyn MarketDataProviderTrait>) -> Self {
        FxRateCache {
            provider,
            rates: HashMap::new(),
        }
    }

    /// Cross-rate `from -> to` as of the given date, hitting the oracle at
    /// most once per (from, to, date) tuple.
    pub async fn get_rate(
        &mut self,
        from: &str,
        to: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, MarketDataError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let key = (from.to_string(), to.to_string(), as_of);
        if let Some(rate) = self.rates.get(&key) {
            return Ok(*rate);
        }
        let rate = self.provider.get_fx_rate(from, to, as_of).await?;
        self.rates.insert(key, rate);
        Ok(rate)
    }

    /// Like [`get_rate`](Self::get_rate), but degrades to a rate of 1 on
    /// failure. Returns the rate and whether the fallback was used.
    pub async fn rate_or_fallback(
        &mut self,
        from: &str,
        to: &str,
        as_of: Option<NaiveDate>,
    ) -> (Decimal, bool) {
        match self.get_rate(from, to, as_of).await {
            Ok(rate) => (rate, false),
            Err(e) => {
                warn!("FX rate {}->{} unavailable: {}. Using 1.0.", from, to, e);
                (Decimal::ONE, true)
            }
        }
    }
}
