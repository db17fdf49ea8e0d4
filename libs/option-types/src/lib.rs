#![no_std]

mod error;
mod interfaces;
mod params;
mod vault;

pub use error::*;
pub use interfaces::*;
pub use params::*;
pub use vault::*;

/// Denominator for fees expressed in basis points
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Upper bound on the flash fee a registry may configure (10%)
pub const MAX_FLASH_FEE_BPS: u32 = 1_000;

/// Fixed-point scale of interest-bearing exchange rates (1e9 = 1.0)
pub const RATE_SCALE: i128 = 1_000_000_000;

/// Reject zero and negative token amounts
pub fn require_positive(amount: i128) -> Result<(), OptionError> {
    if amount == 0 {
        return Err(OptionError::ZeroAmount);
    }
    if amount < 0 {
        return Err(OptionError::InvalidAmount);
    }
    Ok(())
}
