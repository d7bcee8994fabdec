use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ValidationError;

/// Asset class taxonomy. `PensionContract` (BES) marks contracts that are
/// valued as a single aggregate amount rather than unit price x quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Stock,
    Etf,
    Fund,
    Bond,
    Cash,
    Crypto,
    PensionContract,
    Other,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Etf => "ETF",
            AssetClass::Fund => "FUND",
            AssetClass::Bond => "BOND",
            AssetClass::Cash => "CASH",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::PensionContract => "PENSION_CONTRACT",
            AssetClass::Other => "OTHER",
        }
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STOCK" => Ok(AssetClass::Stock),
            "ETF" => Ok(AssetClass::Etf),
            "FUND" => Ok(AssetClass::Fund),
            "BOND" => Ok(AssetClass::Bond),
            "CASH" => Ok(AssetClass::Cash),
            "CRYPTO" => Ok(AssetClass::Crypto),
            "PENSION_CONTRACT" | "BES" => Ok(AssetClass::PensionContract),
            "OTHER" => Ok(AssetClass::Other),
            _ => Err(ValidationError::InvalidInput(format!(
                "Unknown asset class: {}",
                s
            ))),
        }
    }
}

/// Domain model representing an asset in the system.
///
/// `last_price` is always denominated in the asset's own `currency`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: Option<String>,
    pub asset_class: AssetClass,
    pub currency: String,
    pub last_price: Option<Decimal>,
    pub last_price_at: Option<NaiveDateTime>,
}

impl Asset {
    pub fn new(symbol: &str, currency: &str, asset_class: AssetClass) -> Self {
        Asset {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            name: None,
            asset_class,
            currency: currency.to_string(),
            last_price: None,
            last_price_at: None,
        }
    }

    /// Validates the asset data
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()));
        }
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingField("currency".to_string()));
        }
        Ok(())
    }

    pub fn display_label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}
