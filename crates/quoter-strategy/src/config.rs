//! Capital and sizing configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Capital settings the sizer works against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Total portfolio value in USD, split evenly across configured markets.
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: Decimal,

    /// Minimum notional per order in USD. Sides below this quote nothing.
    #[serde(default = "default_min_order_value")]
    pub min_order_value: Decimal,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            portfolio_value: default_portfolio_value(),
            min_order_value: default_min_order_value(),
        }
    }
}

fn default_portfolio_value() -> Decimal {
    Decimal::new(9975, 1) // 997.5
}

fn default_min_order_value() -> Decimal {
    Decimal::new(10, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = SizingConfig::default();
        assert_eq!(config.portfolio_value, dec!(997.5));
        assert_eq!(config.min_order_value, dec!(10));
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: SizingConfig = toml::from_str("portfolio_value = 5000").unwrap();
        assert_eq!(config.portfolio_value, dec!(5000));
        assert_eq!(config.min_order_value, dec!(10));
    }
}
