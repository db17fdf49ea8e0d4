// ============================================================================
// FLASH SETTLEMENT
// ============================================================================
//
// Both entry points follow the same three steps inside one invocation:
//
//   1. debit   - record balances, set the flash lock, send the loan
//   2. callback - hand control to the receiver's `on_flash`
//   3. verify  - require the vault to have gained what it is owed
//
// Any failure in step 3 returns `FlashRepaymentShortfall`. The host then
// reverts the whole invocation, including the loan transfer, the option
// burn and the lock itself. While the lock is set every vault entry point
// fails with `Reentrant`.
//
// ============================================================================

use claim_ledger as ledger;
use option_math as math;
use option_types::{require_positive, FlashReceiverClient, OptionError};
use soroban_sdk::{log, Address, Bytes, Env, Symbol};

use crate::invariants;
use crate::storage::{get_config, get_state, set_locked, set_state};
use crate::transfer::{held, push};
use crate::{ensure_active, ensure_idle};

/// Lend `amount` underlying to `recipient` for the duration of its callback.
///
/// The receiver owes back `amount + fee`; the fee accrues to redeem holders.
pub fn flash(env: &Env, amount: i128, recipient: &Address, data: Bytes) -> Result<bool, OptionError> {
    ensure_idle(env)?;
    let config = get_config(env)?;
    require_positive(amount)?;

    let asset = config.params.underlying.clone();
    let fee = math::flash_fee(amount, config.flash_fee_bps)?;
    let owed = math::add(amount, fee)?;

    let before = held(env, &asset);
    if amount > before {
        return Err(OptionError::InsufficientBalance);
    }

    set_locked(env, true);
    push(env, &asset, recipient, amount)?;

    let vault = env.current_contract_address();
    FlashReceiverClient::new(env, recipient).on_flash(&vault, &asset, &amount, &asset, &owed, &data);

    let after = held(env, &asset);
    if after < math::add(before, fee)? {
        log!(env, "flash shortfall", before, after, fee);
        return Err(OptionError::FlashRepaymentShortfall);
    }

    let mut state = get_state(env);
    math::accrue_fee(&mut state, after - before)?;
    debug_assert!(invariants::solvent(&state, after, held(env, &config.params.strike)));
    set_state(env, &state);
    set_locked(env, false);

    env.events().publish(
        (Symbol::new(env, "flash"), recipient.clone()),
        (amount, after - before),
    );

    Ok(true)
}

/// Exercise `amount` of `from`'s options without prefunding the strike.
///
/// The underlying goes to `recipient` first; its callback must leave the
/// vault holding at least the strike due for `amount` options.
pub fn flash_exercise(
    env: &Env,
    from: &Address,
    amount: i128,
    recipient: &Address,
    data: Bytes,
) -> Result<i128, OptionError> {
    ensure_idle(env)?;
    let config = get_config(env)?;
    ensure_active(env, &config)?;
    require_positive(amount)?;

    let params = &config.params;
    let strike_due = math::strike_for(amount, params.base, params.price)?;

    let mut state = get_state(env);
    math::debit_exercise(&mut state, amount)?;
    ledger::burn(env, from, amount)?;
    set_state(env, &state);

    let strike_before = held(env, &params.strike);

    set_locked(env, true);
    push(env, &params.underlying, recipient, amount)?;

    let vault = env.current_contract_address();
    FlashReceiverClient::new(env, recipient).on_flash(
        &vault,
        &params.underlying,
        &amount,
        &params.strike,
        &strike_due,
        &data,
    );

    let paid = held(env, &params.strike) - strike_before;
    if paid < strike_due {
        log!(env, "flash exercise shortfall", strike_due, paid);
        return Err(OptionError::FlashRepaymentShortfall);
    }

    math::credit_exercise(&mut state, amount, paid)?;
    set_state(env, &state);
    set_locked(env, false);

    env.events().publish(
        (Symbol::new(env, "exercise"), from.clone()),
        (amount, paid),
    );

    Ok(paid)
}
