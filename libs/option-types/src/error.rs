use soroban_sdk::contracterror;

/// Error taxonomy shared by the registry, vaults, claims and wrappers.
///
/// Any `Err` returned from a contract entry point aborts the invocation and
/// the host rolls back every storage write and nested transfer it made.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum OptionError {
    /// An option with the same id was already deployed
    AlreadyExists = 1,
    /// No option registered under the requested id
    NotFound = 2,
    /// Amount argument was zero
    ZeroAmount = 3,
    /// Operation requires `now < expiry`
    Expired = 4,
    /// Strike payment for an exercise did not settle
    InsufficientPayment = 5,
    /// Recorded proceeds cannot cover a redeem claim
    InsufficientProceeds = 6,
    /// Flash borrower did not restore the vault balance plus fee
    FlashRepaymentShortfall = 7,
    /// Collateral ledger rejected a movement
    TransferFailed = 8,
    /// Caller lacks the capability for this action
    Unauthorized = 9,
    AlreadyInitialized = 10,
    NotInitialized = 11,
    /// Malformed option parameters or configuration
    InvalidParams = 12,
    /// Amount argument was negative
    InvalidAmount = 13,
    InsufficientBalance = 14,
    InsufficientAllowance = 15,
    /// Entry point invoked while a flash settlement is in progress
    Reentrant = 16,
    MathOverflow = 17,
}
