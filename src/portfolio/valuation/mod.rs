pub mod valuation_model;
pub mod valuation_service;

pub use valuation_model::{PortfolioValuation, PositionValuation};
pub use valuation_service::{ValuationService, ValuationServiceTrait};
