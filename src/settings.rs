use std::sync::{Arc, RwLock};

/// Default reporting currency when none is configured.
pub const DEFAULT_BASE_CURRENCY: &str = "TRY";

/// Runtime configuration shared across services.
#[derive(Clone)]
pub struct Settings {
    base_currency: Arc<RwLock<String>>,
}

impl Settings {
    pub fn new(base_currency: &str) -> Self {
        Settings {
            base_currency: Arc::new(RwLock::new(base_currency.to_string())),
        }
    }

    pub fn base_currency(&self) -> String {
        self.base_currency
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_base_currency(&self, currency: &str) {
        let mut guard = self
            .base_currency
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *guard = currency.to_string();
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new(DEFAULT_BASE_CURRENCY)
    }
}
