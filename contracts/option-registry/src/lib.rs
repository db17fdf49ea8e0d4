#![no_std]

use option_types::{
    claim_salt, option_id, ClaimClient, OptionError, OptionParams, VaultClient, MAX_FLASH_FEE_BPS,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, token, Address, BytesN, Env, String, Symbol,
    TryFromVal, Val, Vec,
};

#[contract]
pub struct OptionRegistry;

/// Storage keys for the registry contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Vault WASM hash for deployment
    VaultWasmHash,
    /// Redeem claim WASM hash for deployment
    ClaimWasmHash,
    /// Flash fee (basis points) handed to newly deployed vaults
    FlashFeeBps,
    /// OptionId -> vault address
    Option(BytesN<32>),
    /// Vault address -> redeem claim address
    ClaimOf(Address),
    /// Total number of vaults deployed (counter for indexed storage)
    OptionCount,
    /// Vault address at index (indexed storage to avoid unbounded Vec)
    OptionAt(u32),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Page size cap, keeps a page well inside the 100 read entries per tx
const MAX_PAGE: u32 = 50;

// ============================================================================
// DEPLOYMENT MODEL
// ============================================================================
// - One vault per OptionId, deployed with salt = OptionId, so its address
//   is a pure function of (registry, params)
// - One redeem claim per vault, deployed with salt = sha256(id || "redeem")
// - Both are initialized inside the deploying transaction; nobody else can
//   front-run the one-shot `initialize` calls
// ============================================================================

#[contractimpl]
impl OptionRegistry {
    /// Initialize registry with admin, contract WASM hashes and flash fee
    pub fn initialize(
        env: Env,
        admin: Address,
        vault_wasm_hash: BytesN<32>,
        claim_wasm_hash: BytesN<32>,
        flash_fee_bps: u32,
    ) -> Result<(), OptionError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(OptionError::AlreadyInitialized);
        }
        admin.require_auth();

        if flash_fee_bps > MAX_FLASH_FEE_BPS {
            return Err(OptionError::InvalidParams);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::VaultWasmHash, &vault_wasm_hash);
        env.storage()
            .instance()
            .set(&DataKey::ClaimWasmHash, &claim_wasm_hash);
        env.storage()
            .instance()
            .set(&DataKey::FlashFeeBps, &flash_fee_bps);

        // Vault counter (indexed storage instead of unbounded Vec)
        env.storage().instance().set(&DataKey::OptionCount, &0u32);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Deterministic id of an option series
    pub fn get_id(env: Env, params: OptionParams) -> BytesN<32> {
        option_id(&env, &params)
    }

    /// Deploy the vault and redeem claim for `params`
    /// Returns the vault address
    ///
    /// Deployment needs the uploaded vault and claim wasm, so native unit
    /// tests stop at the checks before it; vault and claim wiring is
    /// exercised by registering both contracts directly in their own tests.
    pub fn deploy_option(env: Env, params: OptionParams) -> Result<Address, OptionError> {
        let admin: Option<Address> = env.storage().instance().get(&DataKey::Admin);
        if admin.is_none() {
            return Err(OptionError::NotInitialized);
        }

        params.validate()?;
        if params.is_expired(env.ledger().timestamp()) {
            return Err(OptionError::Expired);
        }

        let id = option_id(&env, &params);
        let option_key = DataKey::Option(id.clone());
        if env.storage().persistent().has(&option_key) {
            return Err(OptionError::AlreadyExists);
        }

        let vault_wasm_hash: BytesN<32> = get_instance(&env, &DataKey::VaultWasmHash)?;
        let claim_wasm_hash: BytesN<32> = get_instance(&env, &DataKey::ClaimWasmHash)?;
        let flash_fee_bps: u32 = get_instance(&env, &DataKey::FlashFeeBps)?;

        let vault = env
            .deployer()
            .with_current_contract(id.clone())
            .deploy_v2(vault_wasm_hash, ());
        let claim = env
            .deployer()
            .with_current_contract(claim_salt(&env, &id))
            .deploy_v2(claim_wasm_hash, ());

        let decimals = token::Client::new(&env, &params.underlying).decimals();
        ClaimClient::new(&env, &claim).initialize(
            &vault,
            &decimals,
            &String::from_str(&env, "Redeem"),
            &String::from_str(&env, "RDM"),
        );
        VaultClient::new(&env, &vault).initialize(
            &env.current_contract_address(),
            &params,
            &claim,
            &flash_fee_bps,
        );

        env.storage().persistent().set(&option_key, &vault);
        extend_persistent_ttl(&env, &option_key);

        let claim_key = DataKey::ClaimOf(vault.clone());
        env.storage().persistent().set(&claim_key, &claim);
        extend_persistent_ttl(&env, &claim_key);

        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::OptionCount)
            .unwrap_or(0);
        let at_key = DataKey::OptionAt(count);
        env.storage().persistent().set(&at_key, &vault);
        extend_persistent_ttl(&env, &at_key);
        env.storage()
            .instance()
            .set(&DataKey::OptionCount, &(count + 1));

        env.events().publish(
            (Symbol::new(&env, "option_deployed"), id),
            (vault.clone(), claim, params.expiry),
        );

        extend_instance_ttl(&env);
        Ok(vault)
    }

    /// Vault deployed for `id`, if any
    pub fn options(env: Env, id: BytesN<32>) -> Option<Address> {
        let key = DataKey::Option(id);
        let vault = env.storage().persistent().get(&key);
        if vault.is_some() {
            extend_persistent_ttl(&env, &key);
        }
        vault
    }

    /// Vault deployed for `id`; `NotFound` if none
    pub fn get_option(env: Env, id: BytesN<32>) -> Result<Address, OptionError> {
        Self::options(env, id).ok_or(OptionError::NotFound)
    }

    /// Redeem claim token bound to `vault`
    pub fn token_of(env: Env, vault: Address) -> Option<Address> {
        env.storage().persistent().get(&DataKey::ClaimOf(vault))
    }

    /// Address the vault for `id` has (or will have) once deployed
    pub fn predict_address(env: Env, id: BytesN<32>) -> Address {
        env.deployer().with_current_contract(id).deployed_address()
    }

    /// Set the flash fee for vaults deployed from now on
    pub fn set_flash_fee(env: Env, flash_fee_bps: u32) -> Result<(), OptionError> {
        let admin: Address = get_instance(&env, &DataKey::Admin)?;
        admin.require_auth();

        if flash_fee_bps > MAX_FLASH_FEE_BPS {
            return Err(OptionError::InvalidParams);
        }

        env.storage()
            .instance()
            .set(&DataKey::FlashFeeBps, &flash_fee_bps);
        env.events().publish(
            (Symbol::new(&env, "flash_fee_set"),),
            flash_fee_bps,
        );
        extend_instance_ttl(&env);
        Ok(())
    }

    pub fn flash_fee_bps(env: Env) -> Result<u32, OptionError> {
        get_instance(&env, &DataKey::FlashFeeBps)
    }

    /// Get total number of vaults deployed
    pub fn option_count(env: Env) -> u32 {
        extend_instance_ttl(&env);
        env.storage()
            .instance()
            .get(&DataKey::OptionCount)
            .unwrap_or(0)
    }

    /// Get vault address at specific index
    pub fn option_at(env: Env, index: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::OptionAt(index))
    }

    /// Get vaults with pagination
    /// Returns up to `limit` vaults starting from `start_index`, at most 50
    pub fn options_paginated(env: Env, start_index: u32, limit: u32) -> Vec<Address> {
        let safe_limit = limit.min(MAX_PAGE);
        let count = Self::option_count(env.clone());
        let end_index = start_index.saturating_add(safe_limit).min(count);

        let mut vaults: Vec<Address> = Vec::new(&env);
        for i in start_index..end_index {
            if let Some(vault) = env.storage().persistent().get(&DataKey::OptionAt(i)) {
                vaults.push_back(vault);
            }
        }
        vaults
    }

    pub fn admin(env: Env) -> Result<Address, OptionError> {
        get_instance(&env, &DataKey::Admin)
    }
}

fn get_instance<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Result<V, OptionError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(key)
        .ok_or(OptionError::NotInitialized)
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
