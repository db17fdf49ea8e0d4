use soroban_sdk::{contracttype, Address, BytesN};

use crate::OptionParams;

/// Vault configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug)]
pub struct VaultConfig {
    /// Registry that deployed this vault
    pub registry: Address,
    /// Defining parameters of the series
    pub params: OptionParams,
    /// Digest of `params`, the registry key of this vault
    pub option_id: BytesN<32>,
    /// Redeem claim token bound to this vault
    pub redeem_token: Address,
    /// Flash settlement fee in basis points
    pub flash_fee_bps: u32,
    /// Decimals of the option token (copied from the underlying)
    pub decimals: u32,
}

/// Vault accounting - stored in Instance storage
///
/// All quantities are in raw token units. Before expiry the vault keeps
/// `locked_underlying == option_supply` and
/// `redeem_supply == locked_underlying + exercised_units`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VaultState {
    /// Outstanding option tokens
    pub option_supply: i128,
    /// Outstanding redeem tokens
    pub redeem_supply: i128,
    /// Underlying held against unexercised options
    pub locked_underlying: i128,
    /// Strike proceeds received from exercises and not yet redeemed
    pub locked_strike: i128,
    /// Written units whose underlying was exercised and not yet redeemed
    pub exercised_units: i128,
    /// Underlying collected as flash fees, owed to redeem holders
    pub fee_underlying: i128,
}

impl VaultState {
    /// Underlying the vault must hold to cover every claim on it
    pub fn underlying_owed(&self) -> i128 {
        self.locked_underlying + self.fee_underlying
    }

    /// Strike the vault must hold to cover every claim on it
    pub fn strike_owed(&self) -> i128 {
        self.locked_strike
    }
}
