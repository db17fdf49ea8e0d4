#![no_std]

mod flash;
mod invariants;
mod storage;
mod transfer;

use claim_ledger as ledger;
use option_math as math;
use option_types::{
    option_id, require_positive, ClaimClient, OptionError, OptionParams, VaultConfig, VaultState,
    MAX_FLASH_FEE_BPS,
};
use soroban_sdk::{
    contract, contractimpl, log, token, Address, Bytes, BytesN, Env, String, Symbol,
};
use storage::{get_config, get_state, is_initialized, is_locked, set_config, set_state};
use transfer::{held, pull, push};

/// Token metadata of every vault's option token
const OPTION_NAME: &str = "Option";
const OPTION_SYMBOL: &str = "OPT";

#[contract]
pub struct OptionVault;

#[contractimpl]
impl OptionVault {
    /// Initialize a vault for one option series.
    ///
    /// Called once by the registry right after deployment. The option token
    /// inherits the underlying's decimals.
    pub fn initialize(
        env: Env,
        registry: Address,
        params: OptionParams,
        redeem_token: Address,
        flash_fee_bps: u32,
    ) -> Result<(), OptionError> {
        if is_initialized(&env) {
            return Err(OptionError::AlreadyInitialized);
        }
        registry.require_auth();

        params.validate()?;
        if flash_fee_bps > MAX_FLASH_FEE_BPS {
            return Err(OptionError::InvalidParams);
        }

        let decimals = token::Client::new(&env, &params.underlying).decimals();
        let config = VaultConfig {
            registry,
            option_id: option_id(&env, &params),
            params,
            redeem_token,
            flash_fee_bps,
            decimals,
        };
        set_config(&env, &config);
        set_state(&env, &VaultState::default());
        Ok(())
    }

    // === Lifecycle ===

    /// Write options: `from` deposits `amount` underlying and `recipient`
    /// receives `amount` option tokens and `amount` redeem tokens.
    ///
    /// # Returns
    /// (option tokens minted, redeem tokens minted)
    pub fn mint(
        env: Env,
        amount: i128,
        from: Address,
        recipient: Address,
    ) -> Result<(i128, i128), OptionError> {
        from.require_auth();
        ensure_idle(&env)?;
        let config = get_config(&env)?;
        ensure_active(&env, &config)?;

        let mut state = get_state(&env);
        let (options, redeems) = math::mint(&mut state, amount)?;
        commit(&env, &state, true);

        ledger::mint(&env, &recipient, options)?;
        ClaimClient::new(&env, &config.redeem_token).mint(
            &env.current_contract_address(),
            &recipient,
            &redeems,
        );
        pull(
            &env,
            &config.params.underlying,
            &from,
            amount,
            OptionError::TransferFailed,
        )?;

        log!(&env, "mint", amount, options);
        env.events().publish(
            (Symbol::new(&env, "mint"), recipient),
            (options, redeems),
        );

        Ok((options, redeems))
    }

    /// Exercise `amount` options held by `from`: pay the strike, receive
    /// `amount` underlying. Only before expiry.
    pub fn exercise(env: Env, amount: i128, from: Address) -> Result<i128, OptionError> {
        from.require_auth();
        ensure_idle(&env)?;
        let config = get_config(&env)?;
        ensure_active(&env, &config)?;
        require_positive(amount)?;

        let params = &config.params;
        let strike_due = math::strike_for(amount, params.base, params.price)?;

        let mut state = get_state(&env);
        math::exercise(&mut state, amount, strike_due)?;
        ledger::burn(&env, &from, amount)?;
        commit(&env, &state, true);

        pull(
            &env,
            &params.strike,
            &from,
            strike_due,
            OptionError::InsufficientPayment,
        )?;
        push(&env, &params.underlying, &from, amount)?;

        log!(&env, "exercise", amount, strike_due);
        env.events().publish(
            (Symbol::new(&env, "exercise"), from),
            (amount, strike_due),
        );

        Ok(amount)
    }

    /// Burn `amount` redeem tokens held by `from` for their share of the
    /// vault's proceeds.
    ///
    /// Before expiry only strike proceeds of exercised units (plus accrued
    /// flash fees) are claimable. From expiry on every remaining pool is
    /// split pro-rata over the outstanding redeem supply.
    ///
    /// # Returns
    /// (strike released, underlying released)
    pub fn redeem(env: Env, amount: i128, from: Address) -> Result<(i128, i128), OptionError> {
        from.require_auth();
        ensure_idle(&env)?;
        let config = get_config(&env)?;
        require_positive(amount)?;

        let claim = ClaimClient::new(&env, &config.redeem_token);
        if claim.balance(&from) < amount {
            return Err(OptionError::InsufficientBalance);
        }

        let expired = config.params.is_expired(env.ledger().timestamp());
        let mut state = get_state(&env);
        let payout = math::redeem(&mut state, amount, expired)?;

        // Balances below the payout mean the accounting is broken
        if held(&env, &config.params.strike) < payout.strike
            || held(&env, &config.params.underlying) < payout.underlying
        {
            log!(&env, "redeem exceeds holdings", payout.strike, payout.underlying);
            return Err(OptionError::InsufficientProceeds);
        }
        commit(&env, &state, !expired);

        claim.burn(&env.current_contract_address(), &from, &amount);
        push(&env, &config.params.strike, &from, payout.strike)?;
        push(&env, &config.params.underlying, &from, payout.underlying)?;

        env.events().publish(
            (Symbol::new(&env, "redeem"), from),
            (amount, payout.strike, payout.underlying),
        );

        Ok((payout.strike, payout.underlying))
    }

    /// Burn `amount` options together with `amount` redeem tokens and take
    /// back `amount` underlying. Only before expiry.
    pub fn close(env: Env, amount: i128, from: Address) -> Result<i128, OptionError> {
        from.require_auth();
        ensure_idle(&env)?;
        let config = get_config(&env)?;
        ensure_active(&env, &config)?;
        require_positive(amount)?;

        let claim = ClaimClient::new(&env, &config.redeem_token);
        if claim.balance(&from) < amount {
            return Err(OptionError::InsufficientBalance);
        }

        let mut state = get_state(&env);
        let released = math::close(&mut state, amount)?;
        ledger::burn(&env, &from, amount)?;
        commit(&env, &state, true);

        claim.burn(&env.current_contract_address(), &from, &amount);
        push(&env, &config.params.underlying, &from, released)?;

        env.events().publish(
            (Symbol::new(&env, "close"), from),
            released,
        );

        Ok(released)
    }

    // === Flash settlement ===

    /// Lend `amount` underlying to `recipient` against repayment plus fee
    /// within its `on_flash` callback.
    pub fn flash(env: Env, amount: i128, recipient: Address, data: Bytes) -> Result<bool, OptionError> {
        flash::flash(&env, amount, &recipient, data)
    }

    /// Exercise `from`'s options, delivering the underlying to `recipient`
    /// and collecting the strike from its `on_flash` callback.
    ///
    /// # Returns
    /// Strike actually received
    pub fn flash_exercise(
        env: Env,
        from: Address,
        amount: i128,
        recipient: Address,
        data: Bytes,
    ) -> Result<i128, OptionError> {
        from.require_auth();
        flash::flash_exercise(&env, &from, amount, &recipient, data)
    }

    // === Option token ===

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), OptionError> {
        from.require_auth();
        ensure_idle(&env)?;
        ledger::transfer(&env, &from, &to, amount)
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), OptionError> {
        spender.require_auth();
        ensure_idle(&env)?;
        ledger::spend_allowance(&env, &from, &spender, amount)?;
        ledger::transfer(&env, &from, &to, amount)
    }

    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
        expiration_ledger: u32,
    ) -> Result<(), OptionError> {
        from.require_auth();
        ledger::approve(&env, &from, &spender, amount, expiration_ledger)
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        ledger::allowance(&env, &from, &spender)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        ledger::balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        ledger::total_supply(&env)
    }

    pub fn decimals(env: Env) -> Result<u32, OptionError> {
        Ok(get_config(&env)?.decimals)
    }

    pub fn name(env: Env) -> String {
        String::from_str(&env, OPTION_NAME)
    }

    pub fn symbol(env: Env) -> String {
        String::from_str(&env, OPTION_SYMBOL)
    }

    // === View Functions ===

    pub fn params(env: Env) -> Result<OptionParams, OptionError> {
        Ok(get_config(&env)?.params)
    }

    pub fn config(env: Env) -> Result<VaultConfig, OptionError> {
        get_config(&env)
    }

    pub fn state(env: Env) -> VaultState {
        get_state(&env)
    }

    pub fn redeem_token(env: Env) -> Result<Address, OptionError> {
        Ok(get_config(&env)?.redeem_token)
    }

    pub fn registry(env: Env) -> Result<Address, OptionError> {
        Ok(get_config(&env)?.registry)
    }

    pub fn option_id(env: Env) -> Result<BytesN<32>, OptionError> {
        Ok(get_config(&env)?.option_id)
    }

    pub fn is_expired(env: Env) -> Result<bool, OptionError> {
        let config = get_config(&env)?;
        Ok(config.params.is_expired(env.ledger().timestamp()))
    }

    pub fn flash_fee_bps(env: Env) -> Result<u32, OptionError> {
        Ok(get_config(&env)?.flash_fee_bps)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reject any entry while a flash settlement is in flight
pub(crate) fn ensure_idle(env: &Env) -> Result<(), OptionError> {
    if is_locked(env) {
        return Err(OptionError::Reentrant);
    }
    Ok(())
}

/// Mint, exercise and close stop at `expiry` (exclusive)
pub(crate) fn ensure_active(env: &Env, config: &VaultConfig) -> Result<(), OptionError> {
    if config.params.is_expired(env.ledger().timestamp()) {
        return Err(OptionError::Expired);
    }
    Ok(())
}

/// Persist a state produced by a lifecycle transition
fn commit(env: &Env, state: &VaultState, active: bool) {
    debug_assert!(invariants::holds(state, active));
    set_state(env, state);
}

#[cfg(test)]
mod test;
