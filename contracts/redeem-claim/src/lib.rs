#![no_std]

//! Redeem claim token of one option vault.
//!
//! Writers receive one claim per option they mint. The balance is a freely
//! transferable claim on the vault's strike proceeds and, after expiry, on
//! whatever underlying remains. Supply changes only through the bound vault.

use claim_ledger as ledger;
use option_types::OptionError;
use soroban_sdk::{
    contract, contractimpl, contracttype, panic_with_error, Address, Env, String,
};

#[contract]
pub struct RedeemClaim;

/// Storage keys for the claim contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// ClaimConfig (Instance storage)
    Config,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimConfig {
    /// The only address allowed to mint and burn
    pub vault: Address,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn get_config(env: &Env) -> Result<ClaimConfig, OptionError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(OptionError::NotInitialized)
}

/// Only the bound vault passes, and it must actually be the invoker
fn require_vault(env: &Env, caller: &Address) -> Result<(), OptionError> {
    let config = get_config(env)?;
    if *caller != config.vault {
        return Err(OptionError::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

#[contractimpl]
impl RedeemClaim {
    /// Bind the claim to its vault. Called once, by the registry, right after
    /// deployment.
    pub fn initialize(
        env: Env,
        vault: Address,
        decimals: u32,
        name: String,
        symbol: String,
    ) -> Result<(), OptionError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(OptionError::AlreadyInitialized);
        }

        let config = ClaimConfig {
            vault,
            decimals,
            name,
            symbol,
        };
        env.storage().instance().set(&DataKey::Config, &config);
        extend_instance_ttl(&env);
        Ok(())
    }

    // === Vault-only supply changes ===

    pub fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), OptionError> {
        require_vault(&env, &caller)?;
        ledger::mint(&env, &to, amount)
    }

    pub fn burn(env: Env, caller: Address, from: Address, amount: i128) -> Result<(), OptionError> {
        require_vault(&env, &caller)?;
        ledger::burn(&env, &from, amount)
    }

    // === Token interface ===

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();
        if let Err(e) = ledger::transfer(&env, &from, &to, amount) {
            panic_with_error!(&env, e);
        }
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();
        if let Err(e) = ledger::spend_allowance(&env, &from, &spender, amount)
            .and_then(|_| ledger::transfer(&env, &from, &to, amount))
        {
            panic_with_error!(&env, e);
        }
    }

    pub fn approve(env: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        from.require_auth();
        if let Err(e) = ledger::approve(&env, &from, &spender, amount, expiration_ledger) {
            panic_with_error!(&env, e);
        }
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

    pub fn name(env: Env) -> Result<String, OptionError> {
        Ok(get_config(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, OptionError> {
        Ok(get_config(&env)?.symbol)
    }

    /// The vault this claim is bound to
    pub fn vault(env: Env) -> Result<Address, OptionError> {
        Ok(get_config(&env)?.vault)
    }
}
