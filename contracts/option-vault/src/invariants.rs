// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Predicates over the vault's accounting. Lifecycle entry points assert
// them in builds with debug assertions (tests and `release-with-logs`).
//
// 1. SIGN INVARIANTS
//    - No counter ever goes negative
//
// 2. BACKING INVARIANTS (before expiry)
//    - Every outstanding option is backed by one locked underlying unit
//    - Every outstanding redeem token is either still backed by underlying
//      or stands for an exercised unit
//
// 3. SOLVENCY INVARIANTS
//    - Actual token balances cover everything the vault owes
//
// ============================================================================

use option_types::VaultState;

/// Invariant: all counters are non-negative
pub fn non_negative(state: &VaultState) -> bool {
    state.option_supply >= 0
        && state.redeem_supply >= 0
        && state.locked_underlying >= 0
        && state.locked_strike >= 0
        && state.exercised_units >= 0
        && state.fee_underlying >= 0
}

/// Invariant: options and redeem tokens are fully backed
///
/// Property (before expiry):
///   locked_underlying == option_supply
///   redeem_supply == locked_underlying + exercised_units
pub fn backing_consistent(state: &VaultState) -> bool {
    state.locked_underlying == state.option_supply
        && state.redeem_supply == state.locked_underlying + state.exercised_units
}

/// Invariant: held balances cover every claim on the vault
pub fn solvent(state: &VaultState, underlying_held: i128, strike_held: i128) -> bool {
    underlying_held >= state.underlying_owed() && strike_held >= state.strike_owed()
}

/// Combined check for a freshly written state
pub fn holds(state: &VaultState, active: bool) -> bool {
    non_negative(state) && (!active || backing_consistent(state))
}
