use option_types::OptionError;
use soroban_sdk::{contracttype, Address, Env};

/// Storage keys for the wrapper contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// WrapperConfig (Instance storage)
    Config,
    /// WrapperState (Instance storage)
    State,
    /// Last accrual period a rebalance ran in (Instance storage)
    LastPeriod,
    /// Writer -> pool shares (Persistent storage)
    Shares(Address),
}

/// Wrapper configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug)]
pub struct WrapperConfig {
    pub admin: Address,
    /// Vault whose underlying and strike are both interest-bearing
    pub vault: Address,
    /// Interest-bearing underlying (the vault's underlying)
    pub ib_underlying: Address,
    /// Interest-bearing strike (the vault's strike)
    pub ib_strike: Address,
    /// Strike ratio copied from the vault
    pub base: i128,
    pub price: i128,
    /// Recipient of stripped yield
    pub receiver: Address,
    /// Accrual period length in seconds
    pub period: u64,
}

/// Pool accounting in real (non-interest) units
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WrapperState {
    pub total_shares: i128,
    /// Real underlying backing the pool, held as vault options + redeems
    /// until settlement
    pub real_underlying: i128,
    /// Real strike received from exercises, held as interest-bearing strike
    pub real_strike: i128,
    /// Vault position redeemed after expiry; both legs now held directly
    pub settled: bool,
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Config ===

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<WrapperConfig, OptionError> {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(OptionError::NotInitialized)
}

pub fn set_config(env: &Env, config: &WrapperConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === State ===

pub fn get_state(env: &Env) -> WrapperState {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_default()
}

pub fn set_state(env: &Env, state: &WrapperState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

// === Accrual period ===

pub fn get_last_period(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::LastPeriod)
}

pub fn set_last_period(env: &Env, period: u64) {
    env.storage().instance().set(&DataKey::LastPeriod, &period);
}

// === Shares ===

pub fn get_shares(env: &Env, writer: &Address) -> i128 {
    let key = DataKey::Shares(writer.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn set_shares(env: &Env, writer: &Address, shares: i128) {
    let key = DataKey::Shares(writer.clone());
    if shares == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &shares);
        extend_persistent_ttl(env, &key);
    }
}
