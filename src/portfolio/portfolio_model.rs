use serde::{Deserialize, Serialize};

/// Domain model for a portfolio. Transactions reference portfolios
/// many-to-many; the portfolio itself only carries identity and display
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    /// Reporting currency override; falls back to the configured base
    /// currency when absent.
    pub currency: Option<String>,
}

impl Portfolio {
    pub fn new(name: &str) -> Self {
        Portfolio {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            currency: None,
        }
    }
}
