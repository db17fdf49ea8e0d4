#![no_std]

//! Perpetual writer pool over interest-bearing collateral.
//!
//! Writers deposit interest-bearing underlying, own pool shares and receive
//! option rights in real units. The pool backs those rights by writing on a
//! vault; holders exercise by giving up rights and paying strike at the
//! vault's ratio. Exposure is tracked in real units, so appreciation of the
//! interest-bearing assets is surplus that `rebalance` strips to the yield
//! receiver once per accrual period. When the vault expires the pool redeems
//! its position and serves every operation from its own balances.

mod storage;

use claim_ledger as ledger;
use option_math as math;
use option_types::{
    require_positive, ClaimClient, InterestBearingClient, OptionError, VaultClient,
};
use soroban_sdk::auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation};
use soroban_sdk::{contract, contractimpl, log, token, vec, Address, Env, IntoVal, Symbol};
use storage::{
    get_config, get_last_period, get_shares, get_state, has_config, set_config, set_last_period,
    set_shares, set_state, WrapperConfig, WrapperState,
};

#[contract]
pub struct PerpetualWrapper;

#[contractimpl]
impl PerpetualWrapper {
    /// Bind the wrapper to `vault`; strike ratio and assets are read from it
    pub fn initialize(
        env: Env,
        admin: Address,
        vault: Address,
        receiver: Address,
        period: u64,
    ) -> Result<(), OptionError> {
        if has_config(&env) {
            return Err(OptionError::AlreadyInitialized);
        }
        admin.require_auth();

        if period == 0 {
            return Err(OptionError::InvalidParams);
        }

        let vault_client = VaultClient::new(&env, &vault);
        if vault_client.is_expired() {
            return Err(OptionError::Expired);
        }

        let params = vault_client.params();
        let config = WrapperConfig {
            admin,
            vault,
            ib_underlying: params.underlying,
            ib_strike: params.strike,
            base: params.base,
            price: params.price,
            receiver,
            period,
        };
        set_config(&env, &config);
        set_state(&env, &WrapperState::default());
        Ok(())
    }

    /// Deposit interest-bearing underlying worth `real_amount` real units.
    /// The writer is credited with shares and `real_amount` option rights.
    ///
    /// # Returns
    /// Shares credited to `writer`
    pub fn deposit(env: Env, writer: Address, real_amount: i128) -> Result<i128, OptionError> {
        writer.require_auth();
        require_positive(real_amount)?;
        let config = get_config(&env)?;

        let mut state = get_state(&env);
        settle(&env, &config, &mut state)?;

        let rate_u = exchange_rate(&env, &config.ib_underlying);
        let wrapped = math::to_wrapped_ceil(real_amount, rate_u)?;

        let shares = if state.total_shares == 0 {
            real_amount
        } else {
            math::mul_div_floor(real_amount, state.total_shares, pool_units(&state, &config)?)?
        };
        if shares == 0 {
            return Err(OptionError::InvalidAmount);
        }

        state.total_shares = math::add(state.total_shares, shares)?;
        state.real_underlying = math::add(state.real_underlying, real_amount)?;
        set_state(&env, &state);
        set_shares(&env, &writer, math::add(get_shares(&env, &writer), shares)?);
        ledger::mint(&env, &writer, real_amount)?;

        let wrapper = env.current_contract_address();
        send(&env, &config.ib_underlying, &writer, &wrapper, wrapped, OptionError::TransferFailed)?;

        if !state.settled {
            authorize_vault_pull(&env, &config, wrapped);
            VaultClient::new(&env, &config.vault).mint(&wrapped, &wrapper, &wrapper);
        }

        env.events().publish(
            (Symbol::new(&env, "deposit"), writer),
            (real_amount, wrapped, shares),
        );

        Ok(shares)
    }

    /// Exercise `real_amount` option rights held by `holder`: the rights are
    /// burned and the strike for `real_amount` real underlying is paid at the
    /// vault's ratio.
    ///
    /// # Returns
    /// Interest-bearing underlying sent to `holder`
    pub fn exercise(env: Env, holder: Address, real_amount: i128) -> Result<i128, OptionError> {
        holder.require_auth();
        require_positive(real_amount)?;
        let config = get_config(&env)?;

        let mut state = get_state(&env);
        settle(&env, &config, &mut state)?;
        if real_amount > state.real_underlying {
            return Err(OptionError::InsufficientBalance);
        }
        ledger::burn(&env, &holder, real_amount)?;

        let rate_u = exchange_rate(&env, &config.ib_underlying);
        let rate_s = exchange_rate(&env, &config.ib_strike);
        let strike_real = math::strike_for(real_amount, config.base, config.price)?;
        let strike_in = math::to_wrapped_ceil(strike_real, rate_s)?;
        let wrapped_out = math::to_wrapped_floor(real_amount, rate_u)?;

        state.real_underlying = math::sub(state.real_underlying, real_amount)?;
        state.real_strike = math::add(state.real_strike, strike_real)?;
        set_state(&env, &state);

        let wrapper = env.current_contract_address();
        send(&env, &config.ib_strike, &holder, &wrapper, strike_in, OptionError::InsufficientPayment)?;
        release(&env, &config, &state, &holder, wrapped_out)?;

        env.events().publish(
            (Symbol::new(&env, "exercise"), holder),
            (real_amount, strike_in, wrapped_out),
        );

        Ok(wrapped_out)
    }

    /// Burn `shares` for a pro-rata cut of both legs at current rates.
    /// The writer gives up option rights for the real underlying taken out.
    /// The last writer out takes every remaining unit.
    ///
    /// # Returns
    /// (interest-bearing underlying, interest-bearing strike)
    pub fn withdraw(env: Env, writer: Address, shares: i128) -> Result<(i128, i128), OptionError> {
        writer.require_auth();
        require_positive(shares)?;
        let config = get_config(&env)?;

        let held = get_shares(&env, &writer);
        if shares > held {
            return Err(OptionError::InsufficientBalance);
        }

        let wrapper = env.current_contract_address();
        let mut state = get_state(&env);
        settle(&env, &config, &mut state)?;

        let (real_u, real_s, underlying_out, strike_out) = if shares == state.total_shares {
            (
                state.real_underlying,
                state.real_strike,
                held_underlying(&env, &config, &state),
                token::Client::new(&env, &config.ib_strike).balance(&wrapper),
            )
        } else {
            let real_u = math::pro_rata(state.real_underlying, shares, state.total_shares)?;
            let real_s = math::pro_rata(state.real_strike, shares, state.total_shares)?;
            (
                real_u,
                real_s,
                math::to_wrapped_floor(real_u, exchange_rate(&env, &config.ib_underlying))?,
                math::to_wrapped_floor(real_s, exchange_rate(&env, &config.ib_strike))?,
            )
        };

        if real_u > 0 {
            ledger::burn(&env, &writer, real_u)?;
        }
        state.total_shares = math::sub(state.total_shares, shares)?;
        state.real_underlying = math::sub(state.real_underlying, real_u)?;
        state.real_strike = math::sub(state.real_strike, real_s)?;
        set_state(&env, &state);
        set_shares(&env, &writer, held - shares);

        release(&env, &config, &state, &writer, underlying_out)?;
        if strike_out > 0 {
            send(&env, &config.ib_strike, &wrapper, &writer, strike_out, OptionError::TransferFailed)?;
        }

        env.events().publish(
            (Symbol::new(&env, "withdraw"), writer),
            (shares, underlying_out, strike_out),
        );

        Ok((underlying_out, strike_out))
    }

    /// Send interest accrued on both legs to the yield receiver.
    ///
    /// Runs at most once per accrual period; later calls in the same
    /// period return (0, 0) and change nothing.
    pub fn rebalance(env: Env) -> Result<(i128, i128), OptionError> {
        let config = get_config(&env)?;
        let mut state = get_state(&env);
        settle(&env, &config, &mut state)?;

        let current = env.ledger().timestamp() / config.period;
        if get_last_period(&env) == Some(current) {
            return Ok((0, 0));
        }
        set_last_period(&env, current);

        let (surplus_u, surplus_s) = surplus(&env, &config)?;
        let wrapper = env.current_contract_address();

        release(&env, &config, &state, &config.receiver, surplus_u)?;
        if surplus_s > 0 {
            send(&env, &config.ib_strike, &wrapper, &config.receiver, surplus_s, OptionError::TransferFailed)?;
        }

        log!(&env, "rebalance", current, surplus_u, surplus_s);
        env.events().publish(
            (Symbol::new(&env, "rebalance"), current),
            (surplus_u, surplus_s),
        );

        Ok((surplus_u, surplus_s))
    }

    // === Option rights ===

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), OptionError> {
        from.require_auth();
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

    /// Option rights held by `id`, in real underlying units
    pub fn balance(env: Env, id: Address) -> i128 {
        ledger::balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        ledger::total_supply(&env)
    }

    // === View Functions ===

    /// Yield a rebalance would strip right now
    pub fn pending_yield(env: Env) -> Result<(i128, i128), OptionError> {
        surplus(&env, &get_config(&env)?)
    }

    /// Real value of everything the wrapper holds, per leg
    pub fn reserves(env: Env) -> Result<(i128, i128), OptionError> {
        let config = get_config(&env)?;
        let wrapper = env.current_contract_address();
        let held_u = held_underlying(&env, &config, &get_state(&env));
        let held_s = token::Client::new(&env, &config.ib_strike).balance(&wrapper);
        Ok((
            math::to_real(held_u, exchange_rate(&env, &config.ib_underlying))?,
            math::to_real(held_s, exchange_rate(&env, &config.ib_strike))?,
        ))
    }

    pub fn config(env: Env) -> Result<WrapperConfig, OptionError> {
        get_config(&env)
    }

    pub fn state(env: Env) -> WrapperState {
        get_state(&env)
    }

    pub fn shares_of(env: Env, writer: Address) -> i128 {
        get_shares(&env, &writer)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn exchange_rate(env: &Env, asset: &Address) -> i128 {
    InterestBearingClient::new(env, asset).exchange_rate()
}

/// Pool size in real underlying units, strike leg converted at the ratio
fn pool_units(state: &WrapperState, config: &WrapperConfig) -> Result<i128, OptionError> {
    let strike_as_underlying = math::mul_div_floor(state.real_strike, config.base, config.price)?;
    math::add(state.real_underlying, strike_as_underlying)
}

/// Interest-bearing units held above what backs the real exposure
fn surplus(env: &Env, config: &WrapperConfig) -> Result<(i128, i128), OptionError> {
    let state = get_state(env);
    let wrapper = env.current_contract_address();

    let held_u = held_underlying(env, config, &state);
    let needed_u =
        math::to_wrapped_ceil(state.real_underlying, exchange_rate(env, &config.ib_underlying))?;

    let held_s = token::Client::new(env, &config.ib_strike).balance(&wrapper);
    let needed_s = math::to_wrapped_ceil(state.real_strike, exchange_rate(env, &config.ib_strike))?;

    Ok(((held_u - needed_u).max(0), (held_s - needed_s).max(0)))
}

/// Interest-bearing underlying the pool controls: vault options before
/// settlement, its own balance after
fn held_underlying(env: &Env, config: &WrapperConfig, state: &WrapperState) -> i128 {
    let wrapper = env.current_contract_address();
    if state.settled {
        token::Client::new(env, &config.ib_underlying).balance(&wrapper)
    } else {
        VaultClient::new(env, &config.vault).balance(&wrapper)
    }
}

/// Pay out `amount` interest-bearing underlying, closing it out of the
/// vault first while the position is still open
fn release(
    env: &Env,
    config: &WrapperConfig,
    state: &WrapperState,
    to: &Address,
    amount: i128,
) -> Result<(), OptionError> {
    if amount == 0 {
        return Ok(());
    }
    let wrapper = env.current_contract_address();
    if !state.settled {
        VaultClient::new(env, &config.vault).close(&amount, &wrapper);
    }
    send(env, &config.ib_underlying, &wrapper, to, amount, OptionError::TransferFailed)
}

/// Redeem the whole vault position once the vault has expired.
///
/// Underlying the vault lost to exercises by other writers' holders comes
/// back as strike, so the underlying leg is capped by what was received and
/// the strike received is added to the strike leg.
fn settle(env: &Env, config: &WrapperConfig, state: &mut WrapperState) -> Result<(), OptionError> {
    if state.settled {
        return Ok(());
    }
    let vault = VaultClient::new(env, &config.vault);
    if !vault.is_expired() {
        return Ok(());
    }

    let wrapper = env.current_contract_address();
    let redeems = ClaimClient::new(env, &vault.redeem_token()).balance(&wrapper);
    if redeems > 0 {
        let (strike, underlying) = vault.redeem(&redeems, &wrapper);
        let real_u = math::to_real(underlying, exchange_rate(env, &config.ib_underlying))?;
        let real_s = math::to_real(strike, exchange_rate(env, &config.ib_strike))?;
        state.real_underlying = state.real_underlying.min(real_u);
        state.real_strike = math::add(state.real_strike, real_s)?;
        log!(env, "settled", redeems, strike, underlying);
    }

    state.settled = true;
    set_state(env, state);
    env.events()
        .publish((Symbol::new(env, "settle"), config.vault.clone()), redeems);
    Ok(())
}

fn send(
    env: &Env,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
    err: OptionError,
) -> Result<(), OptionError> {
    match token::Client::new(env, asset).try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(err),
    }
}

/// Pre-authorize the vault pulling `amount` collateral from the wrapper
/// during `mint`
fn authorize_vault_pull(env: &Env, config: &WrapperConfig, amount: i128) {
    env.authorize_as_current_contract(vec![
        env,
        InvokerContractAuthEntry::Contract(SubContractInvocation {
            context: ContractContext {
                contract: config.ib_underlying.clone(),
                fn_name: Symbol::new(env, "transfer"),
                args: (env.current_contract_address(), config.vault.clone(), amount).into_val(env),
            },
            sub_invocations: vec![env],
        }),
    ]);
}
