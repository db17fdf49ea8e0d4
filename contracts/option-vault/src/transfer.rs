use option_types::OptionError;
use soroban_sdk::{token, Address, Env};

/// Pull `amount` of `asset` from `from` into the vault.
///
/// A failed token call is reported as `err` so each entry point can name
/// the leg that did not settle.
pub fn pull(
    env: &Env,
    asset: &Address,
    from: &Address,
    amount: i128,
    err: OptionError,
) -> Result<(), OptionError> {
    if amount == 0 {
        return Ok(());
    }
    let vault = env.current_contract_address();
    match token::Client::new(env, asset).try_transfer(from, &vault, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(err),
    }
}

/// Send `amount` of `asset` from the vault to `to`
pub fn push(env: &Env, asset: &Address, to: &Address, amount: i128) -> Result<(), OptionError> {
    if amount == 0 {
        return Ok(());
    }
    let vault = env.current_contract_address();
    match token::Client::new(env, asset).try_transfer(&vault, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(OptionError::TransferFailed),
    }
}

/// Vault's own balance of `asset`
pub fn held(env: &Env, asset: &Address) -> i128 {
    token::Client::new(env, asset).balance(&env.current_contract_address())
}
