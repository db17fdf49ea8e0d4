use option_types::{OptionError, RATE_SCALE};

use crate::full_math::{mul_div_ceil, mul_div_floor};

fn check_rate(rate: i128) -> Result<(), OptionError> {
    if rate <= 0 {
        return Err(OptionError::InvalidParams);
    }
    Ok(())
}

/// Real value of `wrapped` interest-bearing units at `rate`, rounded down
pub fn to_real(wrapped: i128, rate: i128) -> Result<i128, OptionError> {
    check_rate(rate)?;
    mul_div_floor(wrapped, rate, RATE_SCALE)
}

/// Wrapped units worth at least `real` at `rate` (what the protocol collects)
pub fn to_wrapped_ceil(real: i128, rate: i128) -> Result<i128, OptionError> {
    check_rate(rate)?;
    mul_div_ceil(real, RATE_SCALE, rate)
}

/// Wrapped units worth at most `real` at `rate` (what the protocol pays out)
pub fn to_wrapped_floor(real: i128, rate: i128) -> Result<i128, OptionError> {
    check_rate(rate)?;
    mul_div_floor(real, RATE_SCALE, rate)
}
