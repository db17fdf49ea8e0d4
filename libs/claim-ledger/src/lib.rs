//! Fungible balance ledger shared by the option token (held inside its
//! vault) and the redeem claim token.
//!
//! Storage entries use their own key enum so they never collide with the
//! host contract's `DataKey`. Callers own authorization: every function here
//! assumes the relevant `require_auth` already happened.

#![no_std]

use option_types::{require_positive, OptionError};
use soroban_sdk::{contracttype, Address, Env, Symbol};

/// Storage keys for token balances
#[contracttype]
#[derive(Clone)]
pub enum LedgerKey {
    /// Holder balance (Persistent storage)
    Balance(Address),
    /// Spending allowance (Temporary storage, lives until its expiration ledger)
    Allowance(AllowanceKey),
    /// Total outstanding units (Instance storage)
    Supply,
}

#[contracttype]
#[derive(Clone)]
pub struct AllowanceKey {
    pub from: Address,
    pub spender: Address,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AllowanceValue {
    pub amount: i128,
    pub expiration_ledger: u32,
}

const BALANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const BALANCE_TTL_EXTEND: u32 = 518400; // ~30 days

fn extend_balance_ttl(env: &Env, key: &LedgerKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, BALANCE_TTL_THRESHOLD, BALANCE_TTL_EXTEND);
}

// === Balances ===

pub fn balance(env: &Env, id: &Address) -> i128 {
    let key = LedgerKey::Balance(id.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(amount) => {
            extend_balance_ttl(env, &key);
            amount
        }
        None => 0,
    }
}

fn set_balance(env: &Env, id: &Address, amount: i128) {
    let key = LedgerKey::Balance(id.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        extend_balance_ttl(env, &key);
    }
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&LedgerKey::Supply)
        .unwrap_or(0)
}

fn set_total_supply(env: &Env, supply: i128) {
    env.storage().instance().set(&LedgerKey::Supply, &supply);
}

/// Credit `amount` new units to `to`
pub fn mint(env: &Env, to: &Address, amount: i128) -> Result<(), OptionError> {
    require_positive(amount)?;

    let supply = total_supply(env)
        .checked_add(amount)
        .ok_or(OptionError::MathOverflow)?;
    let next = balance(env, to)
        .checked_add(amount)
        .ok_or(OptionError::MathOverflow)?;

    set_balance(env, to, next);
    set_total_supply(env, supply);

    env.events()
        .publish((Symbol::new(env, "mint"), to.clone()), amount);
    Ok(())
}

/// Destroy `amount` units held by `from`
pub fn burn(env: &Env, from: &Address, amount: i128) -> Result<(), OptionError> {
    require_positive(amount)?;

    let held = balance(env, from);
    if held < amount {
        return Err(OptionError::InsufficientBalance);
    }

    set_balance(env, from, held - amount);
    set_total_supply(env, total_supply(env) - amount);

    env.events()
        .publish((Symbol::new(env, "burn"), from.clone()), amount);
    Ok(())
}

pub fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), OptionError> {
    require_positive(amount)?;

    let held = balance(env, from);
    if held < amount {
        return Err(OptionError::InsufficientBalance);
    }

    if from != to {
        let credited = balance(env, to)
            .checked_add(amount)
            .ok_or(OptionError::MathOverflow)?;
        set_balance(env, from, held - amount);
        set_balance(env, to, credited);
    }

    env.events().publish(
        (Symbol::new(env, "transfer"), from.clone(), to.clone()),
        amount,
    );
    Ok(())
}

// === Allowances ===

pub fn allowance(env: &Env, from: &Address, spender: &Address) -> i128 {
    let key = LedgerKey::Allowance(AllowanceKey {
        from: from.clone(),
        spender: spender.clone(),
    });
    match env.storage().temporary().get::<_, AllowanceValue>(&key) {
        Some(value) if value.expiration_ledger >= env.ledger().sequence() => value.amount,
        _ => 0,
    }
}

/// Set (not add to) the allowance of `spender` over `from`'s units
pub fn approve(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
    expiration_ledger: u32,
) -> Result<(), OptionError> {
    if amount < 0 {
        return Err(OptionError::InvalidAmount);
    }
    let current = env.ledger().sequence();
    if amount > 0 && expiration_ledger < current {
        return Err(OptionError::InvalidParams);
    }

    let key = LedgerKey::Allowance(AllowanceKey {
        from: from.clone(),
        spender: spender.clone(),
    });
    let value = AllowanceValue {
        amount,
        expiration_ledger,
    };
    env.storage().temporary().set(&key, &value);
    if amount > 0 {
        let live_for = expiration_ledger - current;
        env.storage().temporary().extend_ttl(&key, live_for, live_for);
    }

    env.events().publish(
        (Symbol::new(env, "approve"), from.clone(), spender.clone()),
        (amount, expiration_ledger),
    );
    Ok(())
}

/// Consume `amount` of `spender`'s allowance over `from`
pub fn spend_allowance(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), OptionError> {
    require_positive(amount)?;
    let available = allowance(env, from, spender);
    if available < amount {
        return Err(OptionError::InsufficientAllowance);
    }

    let key = LedgerKey::Allowance(AllowanceKey {
        from: from.clone(),
        spender: spender.clone(),
    });
    let mut value: AllowanceValue = env
        .storage()
        .temporary()
        .get(&key)
        .unwrap_or_default();
    value.amount = available - amount;
    env.storage().temporary().set(&key, &value);
    Ok(())
}
