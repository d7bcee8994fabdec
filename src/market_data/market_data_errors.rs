use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No quote found for symbol {0}")]
    QuoteNotFound(String),

    #[error("No exchange rate found for {0}/{1}")]
    RateNotFound(String, String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),
}
