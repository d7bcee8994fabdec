use crate::errors::Result;

use super::portfolio_model::Portfolio;

pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;
}
