// ============================================================================
// VAULT ACCOUNTING - pure state transitions
// ============================================================================
//
// Every transition validates first and only then mutates. On `Err` the state
// passed in is left untouched, so callers can persist it unconditionally
// after a successful call.
//
// Per-unit lifecycle:
//   mint ──> exercisable ──exercise (now < expiry)──> exercised ──redeem──> closed
//                        ──expire   (now >= expiry)─> expired   ──redeem──> closed
//                        ──close    (now < expiry)──────────────────────> closed
//
// ============================================================================

use option_types::{require_positive, OptionError, VaultState};

use crate::full_math::{add, sub};
use crate::ratio::pro_rata;

/// Amounts released by a redemption
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RedeemPayout {
    pub strike: i128,
    pub underlying: i128,
}

/// Record a deposit of `amount` underlying.
///
/// Returns (option tokens, redeem tokens) to issue: both 1:1 with the
/// deposited underlying.
pub fn mint(state: &mut VaultState, amount: i128) -> Result<(i128, i128), OptionError> {
    require_positive(amount)?;

    let option_supply = add(state.option_supply, amount)?;
    let redeem_supply = add(state.redeem_supply, amount)?;
    let locked_underlying = add(state.locked_underlying, amount)?;

    state.option_supply = option_supply;
    state.redeem_supply = redeem_supply;
    state.locked_underlying = locked_underlying;
    Ok((amount, amount))
}

/// First half of an exercise: retire `amount` options and release the
/// underlying backing them
pub fn debit_exercise(state: &mut VaultState, amount: i128) -> Result<(), OptionError> {
    require_positive(amount)?;
    if amount > state.locked_underlying || amount > state.option_supply {
        return Err(OptionError::InsufficientBalance);
    }

    state.option_supply = sub(state.option_supply, amount)?;
    state.locked_underlying = sub(state.locked_underlying, amount)?;
    Ok(())
}

/// Second half of an exercise: book `strike_paid` proceeds for `amount`
/// exercised units. Only called once the payment is verified.
pub fn credit_exercise(
    state: &mut VaultState,
    amount: i128,
    strike_paid: i128,
) -> Result<(), OptionError> {
    require_positive(amount)?;
    if strike_paid < 0 {
        return Err(OptionError::InvalidAmount);
    }

    let exercised_units = add(state.exercised_units, amount)?;
    let locked_strike = add(state.locked_strike, strike_paid)?;

    state.exercised_units = exercised_units;
    state.locked_strike = locked_strike;
    Ok(())
}

/// Full exercise of `amount` options against `strike_paid` strike
pub fn exercise(
    state: &mut VaultState,
    amount: i128,
    strike_paid: i128,
) -> Result<(), OptionError> {
    let mut next = state.clone();
    debit_exercise(&mut next, amount)?;
    credit_exercise(&mut next, amount, strike_paid)?;
    *state = next;
    Ok(())
}

/// Paired burn of `amount` options and `amount` redeem tokens, releasing
/// `amount` underlying. Never touches the strike side.
pub fn close(state: &mut VaultState, amount: i128) -> Result<i128, OptionError> {
    require_positive(amount)?;
    if amount > state.locked_underlying
        || amount > state.option_supply
        || amount > state.redeem_supply
    {
        return Err(OptionError::InsufficientBalance);
    }

    state.option_supply = sub(state.option_supply, amount)?;
    state.redeem_supply = sub(state.redeem_supply, amount)?;
    state.locked_underlying = sub(state.locked_underlying, amount)?;
    Ok(amount)
}

/// Burn `amount` redeem tokens.
///
/// Before expiry only exercised units can be redeemed: the claimant receives
/// a pro-rata share of strike proceeds over `exercised_units`. From expiry
/// on, the claimant receives a pro-rata share of every remaining pool over
/// `redeem_supply`. Flash fees are shared pro-rata over `redeem_supply` in
/// both cases.
pub fn redeem(
    state: &mut VaultState,
    amount: i128,
    expired: bool,
) -> Result<RedeemPayout, OptionError> {
    require_positive(amount)?;
    if amount > state.redeem_supply {
        return Err(OptionError::InsufficientBalance);
    }

    let mut next = state.clone();
    let fee = pro_rata(state.fee_underlying, amount, state.redeem_supply)?;
    next.fee_underlying = sub(next.fee_underlying, fee)?;

    let payout = if expired {
        let strike = pro_rata(state.locked_strike, amount, state.redeem_supply)?;
        let underlying = pro_rata(state.locked_underlying, amount, state.redeem_supply)?;
        let units = pro_rata(state.exercised_units, amount, state.redeem_supply)?;

        next.locked_strike = sub(next.locked_strike, strike)?;
        next.locked_underlying = sub(next.locked_underlying, underlying)?;
        next.exercised_units = sub(next.exercised_units, units)?;

        RedeemPayout {
            strike,
            underlying: add(underlying, fee)?,
        }
    } else {
        if amount > state.exercised_units {
            return Err(OptionError::InsufficientProceeds);
        }
        let strike = pro_rata(state.locked_strike, amount, state.exercised_units)?;

        next.locked_strike = sub(next.locked_strike, strike)?;
        next.exercised_units = sub(next.exercised_units, amount)?;

        RedeemPayout {
            strike,
            underlying: fee,
        }
    };

    next.redeem_supply = sub(next.redeem_supply, amount)?;
    *state = next;
    Ok(payout)
}

/// Book `fee` underlying collected by a flash settlement
pub fn accrue_fee(state: &mut VaultState, fee: i128) -> Result<(), OptionError> {
    if fee < 0 {
        return Err(OptionError::InvalidAmount);
    }
    state.fee_underlying = add(state.fee_underlying, fee)?;
    Ok(())
}
