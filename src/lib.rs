pub mod assets;
pub mod cashflow;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod market_data;
pub mod portfolio;
pub mod settings;
pub mod transactions;
pub mod utils;

pub use errors::{Error, Result};
pub use portfolio::*;
pub use transactions::*;
