use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::Quote;
use crate::market_data::market_data_traits::MarketDataProviderTrait;

/// Oracle backed by manually entered quotes and rates.
///
/// Quotes and rates are kept per date; a lookup resolves the most recent
/// observation on or before the requested date. Missing direct FX pairs
/// fall back to the inverse pair.
#[derive(Default)]
pub struct ManualProvider {
    quotes: RwLock<HashMap<String, BTreeMap<NaiveDate, Quote>>>,
    rates: RwLock<HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_quote(&self, quote: Quote) {
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        quotes
            .entry(quote.symbol.clone())
            .or_default()
            .insert(quote.quote_date, quote);
    }

    pub fn add_rate(&self, from: &str, to: &str, rate_date: NaiveDate, rate: Decimal) {
        let mut rates = self.rates.write().unwrap_or_else(|e| e.into_inner());
        rates
            .entry((from.to_string(), to.to_string()))
            .or_default()
            .insert(rate_date, rate);
    }

    fn resolve<T: Clone>(series: &BTreeMap<NaiveDate, T>, as_of: Option<NaiveDate>) -> Option<T> {
        match as_of {
            None => series.values().next_back().cloned(),
            Some(date) => series.range(..=date).next_back().map(|(_, v)| v.clone()),
        }
    }
}

#[async_trait]
impl MarketDataProviderTrait for ManualProvider {
    async fn get_price(
        &self,
        symbol: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Quote, MarketDataError> {
        let quotes = self.quotes.read().unwrap_or_else(|e| e.into_inner());
        quotes
            .get(symbol)
            .and_then(|series| Self::resolve(series, as_of))
            .ok_or_else(|| MarketDataError::QuoteNotFound(symbol.to_string()))
    }

    async fn get_fx_rate(
        &self,
        from: &str,
        to: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, MarketDataError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let rates = self.rates.read().unwrap_or_else(|e| e.into_inner());
        if let Some(rate) = rates
            .get(&(from.to_string(), to.to_string()))
            .and_then(|series| Self::resolve(series, as_of))
        {
            return Ok(rate);
        }
        // Try the inverse pair
        if let Some(inverse) = rates
            .get(&(to.to_string(), from.to_string()))
            .and_then(|series| Self::resolve(series, as_of))
        {
            if inverse != Decimal::ZERO {
                return Ok(Decimal::ONE / inverse);
            }
        }
        Err(MarketDataError::RateNotFound(
            from.to_string(),
            to.to_string(),
        ))
    }
}
