//! Currency and minor-unit conversion.
//!
//! Storefront prices arrive in major units (rupees); the payment processor
//! and the order store work in minor units (paise). The exponent is part of
//! the configured [`Currency`] instead of being assumed.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Highest exponent accepted in configuration.
pub const MAX_MINOR_UNIT_EXPONENT: u32 = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is negative")]
    Negative,
    #[error("amount has more decimal places than the currency allows")]
    FractionalMinorUnit,
    #[error("quantity must be a positive integer")]
    InvalidQuantity,
    #[error("amount overflows")]
    Overflow,
}

/// The single currency a deployment charges in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// Lower-case ISO 4217 code, as the processor expects it.
    pub code: String,
    /// Number of minor units per major unit, as a power of ten.
    pub minor_unit_exponent: u32,
}

impl Currency {
    pub fn new(code: impl Into<String>, minor_unit_exponent: u32) -> Self {
        Self {
            code: code.into().to_ascii_lowercase(),
            minor_unit_exponent,
        }
    }

    /// Indian rupee, two decimal places.
    pub fn inr() -> Self {
        Self::new("inr", 2)
    }

    /// Convert a major-unit amount to minor units.
    ///
    /// Fails if the amount is negative, has sub-minor-unit precision, or
    /// does not fit in an `i64`.
    pub fn to_minor_units(&self, major: Decimal) -> Result<i64, AmountError> {
        if major.is_sign_negative() && !major.is_zero() {
            return Err(AmountError::Negative);
        }
        let factor = 10i64
            .checked_pow(self.minor_unit_exponent)
            .ok_or(AmountError::Overflow)?;
        let scaled = major
            .checked_mul(Decimal::from(factor))
            .ok_or(AmountError::Overflow)?;
        if !scaled.fract().is_zero() {
            return Err(AmountError::FractionalMinorUnit);
        }
        scaled.to_i64().ok_or(AmountError::Overflow)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::inr()
    }
}

/// `unit_amount × quantity`, with the quantity required to be positive.
pub fn line_total(unit_amount: i64, quantity: i64) -> Result<i64, AmountError> {
    if quantity <= 0 {
        return Err(AmountError::InvalidQuantity);
    }
    unit_amount
        .checked_mul(quantity)
        .ok_or(AmountError::Overflow)
}
