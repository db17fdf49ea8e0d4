use option_types::OptionError;
use soroban_fixed_point_math::FixedPoint;

/// Multiply and divide, rounding down
/// Returns floor((a * b) / denominator)
///
/// Inputs are non-negative token amounts; a zero denominator or an
/// intermediate that does not fit is reported as `MathOverflow`.
pub fn mul_div_floor(a: i128, b: i128, denominator: i128) -> Result<i128, OptionError> {
    if denominator == 0 {
        return Err(OptionError::MathOverflow);
    }
    a.fixed_mul_floor(b, denominator)
        .ok_or(OptionError::MathOverflow)
}

/// Multiply and divide, rounding up
/// Returns ceil((a * b) / denominator)
pub fn mul_div_ceil(a: i128, b: i128, denominator: i128) -> Result<i128, OptionError> {
    if denominator == 0 {
        return Err(OptionError::MathOverflow);
    }
    a.fixed_mul_ceil(b, denominator)
        .ok_or(OptionError::MathOverflow)
}

/// Checked addition for accounting counters
pub fn add(a: i128, b: i128) -> Result<i128, OptionError> {
    a.checked_add(b).ok_or(OptionError::MathOverflow)
}

/// Checked subtraction that refuses to take a counter below zero
pub fn sub(a: i128, b: i128) -> Result<i128, OptionError> {
    match a.checked_sub(b) {
        Some(v) if v >= 0 => Ok(v),
        _ => Err(OptionError::MathOverflow),
    }
}
