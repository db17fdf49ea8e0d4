use option_types::{OptionError, BPS_DENOMINATOR};

use crate::full_math::{mul_div_ceil, mul_div_floor};

/// Strike owed for exercising `amount` option tokens
///
/// Formula: ceil(amount × price / base). Rounds in the vault's favour so a
/// dust exercise can never be free.
///
/// Example: base = 100, price = 50, 100 options → 50 strike
pub fn strike_for(amount: i128, base: i128, price: i128) -> Result<i128, OptionError> {
    mul_div_ceil(amount, price, base)
}

/// Pro-rata share of `pool` for `amount` out of `supply` claims
///
/// Formula: floor(pool × amount / supply)
///
/// Claiming the whole supply returns the whole pool, so the last claimant
/// collects any rounding dust.
pub fn pro_rata(pool: i128, amount: i128, supply: i128) -> Result<i128, OptionError> {
    if amount > supply || supply <= 0 {
        return Err(OptionError::InsufficientProceeds);
    }
    if pool == 0 {
        return Ok(0);
    }
    if amount == supply {
        return Ok(pool);
    }
    mul_div_floor(pool, amount, supply)
}

/// Flash settlement fee on a loan of `amount`
///
/// Formula: ceil(amount × fee_bps / 10_000)
pub fn flash_fee(amount: i128, fee_bps: u32) -> Result<i128, OptionError> {
    mul_div_ceil(amount, fee_bps as i128, BPS_DENOMINATOR)
}
