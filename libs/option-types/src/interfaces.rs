// ============================================================================
// CROSS-CONTRACT INTERFACES
// ============================================================================
//
// Contracts call each other through these generated clients instead of
// linking each other's crates, so no contract wasm carries another
// contract's exports.
//
// ============================================================================

use soroban_sdk::{contractclient, Address, Bytes, Env, String};

use crate::{OptionError, OptionParams};

/// Option vault surface used by the registry and the perpetual wrapper
#[contractclient(name = "VaultClient")]
pub trait VaultInterface {
    fn initialize(
        env: Env,
        registry: Address,
        params: OptionParams,
        redeem_token: Address,
        flash_fee_bps: u32,
    ) -> Result<(), OptionError>;

    fn mint(
        env: Env,
        amount: i128,
        from: Address,
        recipient: Address,
    ) -> Result<(i128, i128), OptionError>;

    fn redeem(env: Env, amount: i128, from: Address) -> Result<(i128, i128), OptionError>;

    fn close(env: Env, amount: i128, from: Address) -> Result<i128, OptionError>;

    fn balance(env: Env, id: Address) -> i128;

    fn params(env: Env) -> Result<OptionParams, OptionError>;

    fn redeem_token(env: Env) -> Result<Address, OptionError>;

    fn is_expired(env: Env) -> Result<bool, OptionError>;
}

/// Redeem claim surface; `mint`/`burn` succeed only for the owning vault
#[contractclient(name = "ClaimClient")]
pub trait ClaimInterface {
    fn initialize(
        env: Env,
        vault: Address,
        decimals: u32,
        name: String,
        symbol: String,
    ) -> Result<(), OptionError>;

    fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), OptionError>;

    fn burn(env: Env, caller: Address, from: Address, amount: i128) -> Result<(), OptionError>;

    fn balance(env: Env, id: Address) -> i128;
}

/// Callback implemented by flash settlement borrowers.
///
/// The receiver was sent `amount` of `asset`; by the time it returns it must
/// have paid the vault at least `owed` of `owed_asset`.
#[contractclient(name = "FlashReceiverClient")]
pub trait FlashReceiver {
    fn on_flash(
        env: Env,
        vault: Address,
        asset: Address,
        amount: i128,
        owed_asset: Address,
        owed: i128,
        data: Bytes,
    );
}

/// Interest-bearing collateral: a token whose units appreciate against the
/// asset they wrap
#[contractclient(name = "InterestBearingClient")]
pub trait InterestBearing {
    /// Real units per wrapped unit, scaled by `RATE_SCALE`
    fn exchange_rate(env: Env) -> i128;
}
