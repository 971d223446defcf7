//! Price Value Object
//!
//! Amounts are stored in a `NUMERIC(12, 2)` column, so a price is bounded
//! below by zero and above by 9 999 999 999.99, and always carries exactly
//! two decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, CatalogResult};

/// Digits kept after the decimal point (`NUMERIC(12, 2)`)
pub const PRICE_SCALE: u32 = 2;

/// Largest amount the price column holds
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, PRICE_SCALE)
}

/// Non-negative amount with two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Validate a submitted amount
    ///
    /// ## Arguments
    /// * `amount` - Any decimal; trailing zeros beyond two places are fine
    ///
    /// ## Returns
    /// The price rescaled to two places, `Validation` for a negative amount
    /// or sub-cent digits, `PriceTooHigh` above [`max_price`]
    pub fn new(amount: Decimal) -> CatalogResult<Self> {
        if amount < Decimal::ZERO {
            return Err(CatalogError::Validation("Price cannot be negative".into()));
        }

        if amount.normalize().scale() > PRICE_SCALE {
            return Err(CatalogError::Validation(format!(
                "Price must have at most {} decimal places",
                PRICE_SCALE
            )));
        }

        let max = max_price();
        if amount > max {
            return Err(CatalogError::PriceTooHigh { max });
        }

        let mut amount = amount;
        amount.rescale(PRICE_SCALE);
        Ok(Self(amount))
    }

    pub fn from_db(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
