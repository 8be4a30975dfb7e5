use crate::constants::STROOP_SCALE;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("malformed amount {0:?}")]
    Malformed(String),

    #[error("amount {0:?} has more than {STROOP_SCALE} decimal places")]
    TooPrecise(String),
}

/// Converts a decimal amount (e.g. `"12.3456789"`) into integer stroops
/// (`"123456789"`), the unit account balances are stored in.
pub fn to_stroops(amount: &str) -> Result<String, AmountError> {
    let dec = Decimal::from_str(amount).map_err(|_| AmountError::Malformed(amount.to_string()))?;
    if dec.normalize().scale() > STROOP_SCALE {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }
    let stroops = dec
        .checked_mul(Decimal::from(10_i64.pow(STROOP_SCALE)))
        .ok_or_else(|| AmountError::Malformed(amount.to_string()))?;
    Ok(stroops.trunc().normalize().to_string())
}
