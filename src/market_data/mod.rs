pub mod market_data_errors;
pub mod market_data_model;
pub mod market_data_traits;
pub mod providers;

pub use market_data_errors::MarketDataError;
pub use market_data_model::Quote;
pub use market_data_traits::MarketDataProviderTrait;
pub use providers::manual_provider::ManualProvider;
