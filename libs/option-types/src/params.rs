use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::OptionError;

/// Domain tag mixed into the claim token's deployment salt
const CLAIM_SALT_TAG: &[u8] = b"redeem";

/// Defining parameters of an option series - immutable once deployed
///
/// One option token entitles its holder, before `expiry`, to receive one unit
/// of `underlying` for `price / base` units of `strike`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionParams {
    /// Asset received on exercise
    pub underlying: Address,
    /// Asset paid on exercise
    pub strike: Address,
    /// Underlying side of the strike ratio
    pub base: i128,
    /// Strike side of the strike ratio
    pub price: i128,
    /// Ledger timestamp at which exercise stops and redemption of the
    /// remaining underlying opens
    pub expiry: u64,
}

impl OptionParams {
    /// Structural checks that do not depend on the ledger clock
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.base <= 0 || self.price <= 0 {
            return Err(OptionError::InvalidParams);
        }
        if self.underlying == self.strike {
            return Err(OptionError::InvalidParams);
        }
        Ok(())
    }

    /// Exercise boundary is exclusive: at `now == expiry` the series is expired
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }
}

/// Deterministic option id: sha256 over the XDR encoding of the parameters.
///
/// The XDR encoding of a `contracttype` struct is canonical, so equal
/// parameters always hash to the same id and any differing field changes it.
pub fn option_id(env: &Env, params: &OptionParams) -> BytesN<32> {
    let encoded: Bytes = params.clone().to_xdr(env);
    env.crypto().sha256(&encoded).to_bytes()
}

/// Deployment salt for the redeem claim bound to option `id`
pub fn claim_salt(env: &Env, id: &BytesN<32>) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &id.to_array());
    preimage.append(&Bytes::from_slice(env, CLAIM_SALT_TAG));
    env.crypto().sha256(&preimage).to_bytes()
}
