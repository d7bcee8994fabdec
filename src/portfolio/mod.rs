pub mod performance;
pub mod portfolio_model;
pub mod portfolio_traits;
pub mod positions;
pub mod snapshot;
pub mod valuation;

pub use portfolio_model::Portfolio;
pub use portfolio_traits::PortfolioRepositoryTrait;
