use super::*;
use redeem_claim::{RedeemClaim, RedeemClaimClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::token::StellarAssetClient;
use soroban_sdk::{contract, contractimpl, token};

const NOW: u64 = 1_000;
const EXPIRY: u64 = 2_000;
const FEE_BPS: u32 = 30;

/// Borrower used by the flash tests. The first data byte picks its behavior:
/// 0 repays what is owed, 1 repays nothing, 2 repays one unit short.
#[contract]
pub struct Borrower;

#[contractimpl]
impl Borrower {
    pub fn on_flash(
        env: Env,
        vault: Address,
        _asset: Address,
        _amount: i128,
        owed_asset: Address,
        owed: i128,
        data: Bytes,
    ) {
        let repay = match data.get(0).unwrap_or(0) {
            0 => owed,
            1 => 0,
            _ => owed - 1,
        };
        if repay > 0 {
            token::Client::new(&env, &owed_asset).transfer(
                &env.current_contract_address(),
                &vault,
                &repay,
            );
        }
    }
}

struct Setup<'a> {
    env: Env,
    vault: OptionVaultClient<'a>,
    claim: RedeemClaimClient<'a>,
    underlying: token::Client<'a>,
    strike: token::Client<'a>,
    underlying_admin: StellarAssetClient<'a>,
    strike_admin: StellarAssetClient<'a>,
    params: OptionParams,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(NOW);

    let issuer = Address::generate(&env);
    let underlying_sac = env.register_stellar_asset_contract_v2(issuer.clone());
    let strike_sac = env.register_stellar_asset_contract_v2(issuer);

    // base = 100, price = 50: one option costs half a strike unit
    let params = OptionParams {
        underlying: underlying_sac.address(),
        strike: strike_sac.address(),
        base: 100,
        price: 50,
        expiry: EXPIRY,
    };

    let vault_id = env.register(OptionVault, ());
    let claim_id = env.register(RedeemClaim, ());

    let claim = RedeemClaimClient::new(&env, &claim_id);
    claim.initialize(
        &vault_id,
        &7,
        &String::from_str(&env, "Redeem"),
        &String::from_str(&env, "RDM"),
    );

    let vault = OptionVaultClient::new(&env, &vault_id);
    let registry = Address::generate(&env);
    vault.initialize(&registry, &params, &claim_id, &FEE_BPS);

    Setup {
        vault,
        claim,
        underlying: token::Client::new(&env, &underlying_sac.address()),
        strike: token::Client::new(&env, &strike_sac.address()),
        underlying_admin: StellarAssetClient::new(&env, &underlying_sac.address()),
        strike_admin: StellarAssetClient::new(&env, &strike_sac.address()),
        params,
        env,
    }
}

impl Setup<'_> {
    /// A writer holding `amount` options and redeem tokens
    fn writer(&self, amount: i128) -> Address {
        let writer = Address::generate(&self.env);
        self.underlying_admin.mint(&writer, &amount);
        self.vault.mint(&amount, &writer, &writer);
        writer
    }

    fn borrower(&self) -> Address {
        self.env.register(Borrower, ())
    }

    fn mode(&self, byte: u8) -> Bytes {
        Bytes::from_array(&self.env, &[byte])
    }
}

// === initialize ===

#[test]
fn test_initialize_once() {
    let s = setup();
    let registry = s.vault.registry();
    assert_eq!(
        s.vault.try_initialize(&registry, &s.params, &s.claim.address, &FEE_BPS),
        Err(Ok(OptionError::AlreadyInitialized))
    );
    assert_eq!(s.vault.params(), s.params);
    assert_eq!(s.vault.decimals(), 7);
    assert_eq!(s.vault.option_id(), option_id(&s.env, &s.params));
}

#[test]
fn test_initialize_rejects_bad_fee() {
    let s = setup();
    let other = s.env.register(OptionVault, ());
    let client = OptionVaultClient::new(&s.env, &other);
    let registry = Address::generate(&s.env);

    assert_eq!(
        client.try_initialize(&registry, &s.params, &s.claim.address, &(MAX_FLASH_FEE_BPS + 1)),
        Err(Ok(OptionError::InvalidParams))
    );
}

// === mint ===

#[test]
fn test_mint_issues_option_and_redeem() {
    let s = setup();
    let writer = Address::generate(&s.env);
    s.underlying_admin.mint(&writer, &100);

    assert_eq!(s.vault.mint(&100, &writer, &writer), (100, 100));

    assert_eq!(s.vault.balance(&writer), 100);
    assert_eq!(s.claim.balance(&writer), 100);
    assert_eq!(s.underlying.balance(&writer), 0);
    assert_eq!(s.underlying.balance(&s.vault.address), 100);

    let state = s.vault.state();
    assert_eq!(state.option_supply, 100);
    assert_eq!(state.redeem_supply, 100);
    assert_eq!(state.locked_underlying, 100);
}

#[test]
fn test_mint_zero_and_negative() {
    let s = setup();
    let writer = Address::generate(&s.env);

    assert_eq!(s.vault.try_mint(&0, &writer, &writer), Err(Ok(OptionError::ZeroAmount)));
    assert_eq!(s.vault.try_mint(&-5, &writer, &writer), Err(Ok(OptionError::InvalidAmount)));
}

#[test]
fn test_mint_without_collateral_reverts() {
    let s = setup();
    let writer = Address::generate(&s.env);
    s.underlying_admin.mint(&writer, &10);

    assert_eq!(
        s.vault.try_mint(&11, &writer, &writer),
        Err(Ok(OptionError::TransferFailed))
    );
    assert_eq!(s.vault.balance(&writer), 0);
    assert_eq!(s.claim.balance(&writer), 0);
    assert_eq!(s.vault.state(), VaultState::default());
}

#[test]
fn test_mint_at_expiry_rejected() {
    let s = setup();
    let writer = Address::generate(&s.env);
    s.underlying_admin.mint(&writer, &10);
    s.env.ledger().set_timestamp(EXPIRY);

    assert_eq!(s.vault.try_mint(&10, &writer, &writer), Err(Ok(OptionError::Expired)));
}

// === exercise ===

#[test]
fn test_exercise_then_redeem_strike() {
    let s = setup();
    let writer = s.writer(100);
    let buyer = Address::generate(&s.env);

    s.vault.transfer(&writer, &buyer, &100);
    s.strike_admin.mint(&buyer, &50);

    assert_eq!(s.vault.exercise(&100, &buyer), 100);
    assert_eq!(s.underlying.balance(&buyer), 100);
    assert_eq!(s.strike.balance(&buyer), 0);
    assert_eq!(s.strike.balance(&s.vault.address), 50);
    assert_eq!(s.vault.balance(&buyer), 0);

    assert_eq!(s.vault.redeem(&100, &writer), (50, 0));
    assert_eq!(s.strike.balance(&writer), 50);
    assert_eq!(s.claim.balance(&writer), 0);
    assert_eq!(s.vault.state(), VaultState::default());
}

#[test]
fn test_exercise_rounds_strike_up() {
    let s = setup();
    let writer = s.writer(3);
    s.strike_admin.mint(&writer, &2);

    // 3 × 50 / 100 = 1.5 → 2
    s.vault.exercise(&3, &writer);
    assert_eq!(s.strike.balance(&writer), 0);
    assert_eq!(s.vault.state().locked_strike, 2);
}

#[test]
fn test_exercise_boundary() {
    let s = setup();
    let writer = s.writer(10);
    s.strike_admin.mint(&writer, &10);

    s.env.ledger().set_timestamp(EXPIRY - 1);
    assert_eq!(s.vault.exercise(&4, &writer), 4);

    s.env.ledger().set_timestamp(EXPIRY);
    assert_eq!(s.vault.try_exercise(&4, &writer), Err(Ok(OptionError::Expired)));
    assert_eq!(s.vault.try_close(&4, &writer), Err(Ok(OptionError::Expired)));
}

#[test]
fn test_exercise_without_strike_reverts() {
    let s = setup();
    let writer = s.writer(100);
    s.strike_admin.mint(&writer, &49);

    assert_eq!(
        s.vault.try_exercise(&100, &writer),
        Err(Ok(OptionError::InsufficientPayment))
    );
    assert_eq!(s.vault.balance(&writer), 100);
    assert_eq!(s.strike.balance(&writer), 49);
    assert_eq!(s.vault.state().locked_underlying, 100);
}

#[test]
fn test_exercise_without_options() {
    let s = setup();
    let _writer = s.writer(100);
    let stranger = Address::generate(&s.env);
    s.strike_admin.mint(&stranger, &50);

    assert_eq!(
        s.vault.try_exercise(&10, &stranger),
        Err(Ok(OptionError::InsufficientBalance))
    );
}

// === redeem ===

#[test]
fn test_redeem_before_any_exercise() {
    let s = setup();
    let writer = s.writer(100);

    assert_eq!(
        s.vault.try_redeem(&1, &writer),
        Err(Ok(OptionError::InsufficientProceeds))
    );
}

#[test]
fn test_redeem_more_than_held() {
    let s = setup();
    let writer = s.writer(10);

    assert_eq!(
        s.vault.try_redeem(&11, &writer),
        Err(Ok(OptionError::InsufficientBalance))
    );
}

#[test]
fn test_redeem_after_expiry_splits_remainder() {
    let s = setup();
    let first = s.writer(60);
    let second = s.writer(40);

    // 50 of the 100 options get exercised for 25 strike
    s.strike_admin.mint(&first, &25);
    s.vault.exercise(&50, &first);

    s.env.ledger().set_timestamp(EXPIRY);

    assert_eq!(s.vault.redeem(&60, &first), (15, 30));
    assert_eq!(s.vault.redeem(&40, &second), (10, 20));

    assert_eq!(s.underlying.balance(&s.vault.address), 0);
    assert_eq!(s.strike.balance(&s.vault.address), 0);

    // unexercised options outlive expiry but no longer claim anything
    let state = s.vault.state();
    assert_eq!(state.option_supply, 10);
    assert_eq!(state.redeem_supply, 0);
    assert_eq!(state.locked_underlying, 0);
    assert_eq!(state.locked_strike, 0);
}

#[test]
fn test_redeem_is_transferable_claim() {
    let s = setup();
    let writer = s.writer(100);
    let buyer = Address::generate(&s.env);
    s.strike_admin.mint(&writer, &50);
    s.vault.exercise(&100, &writer);

    s.claim.transfer(&writer, &buyer, &40);
    assert_eq!(s.vault.redeem(&40, &buyer), (20, 0));
    assert_eq!(s.vault.redeem(&60, &writer), (30, 0));
}

// === close ===

#[test]
fn test_close_returns_underlying() {
    let s = setup();
    let writer = s.writer(100);

    assert_eq!(s.vault.close(&30, &writer), 30);
    assert_eq!(s.underlying.balance(&writer), 30);
    assert_eq!(s.vault.balance(&writer), 70);
    assert_eq!(s.claim.balance(&writer), 70);
    assert_eq!(s.strike.balance(&s.vault.address), 0);
}

#[test]
fn test_close_needs_both_legs() {
    let s = setup();
    let writer = s.writer(100);
    let buyer = Address::generate(&s.env);
    s.vault.transfer(&writer, &buyer, &60);

    assert_eq!(
        s.vault.try_close(&50, &writer),
        Err(Ok(OptionError::InsufficientBalance))
    );
    assert_eq!(
        s.vault.try_close(&10, &buyer),
        Err(Ok(OptionError::InsufficientBalance))
    );
    assert_eq!(s.vault.close(&40, &writer), 40);
}

// === option token ===

#[test]
fn test_option_allowance() {
    let s = setup();
    let writer = s.writer(10);
    let spender = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    s.vault.approve(&writer, &spender, &6, &1_000);
    s.vault.transfer_from(&spender, &writer, &buyer, &6);
    assert_eq!(s.vault.balance(&buyer), 6);
    assert_eq!(
        s.vault.try_transfer_from(&spender, &writer, &buyer, &1),
        Err(Ok(OptionError::InsufficientAllowance))
    );
    assert_eq!(s.vault.total_supply(), 10);
    assert_eq!(s.vault.symbol(), String::from_str(&s.env, "OPT"));
}

// === flash ===

#[test]
fn test_flash_repaid_with_fee() {
    let s = setup();
    let writer = s.writer(10_000);
    let borrower = s.borrower();
    // fee = ceil(10_000 × 30 / 10_000) = 30
    s.underlying_admin.mint(&borrower, &30);

    assert!(s.vault.flash(&10_000, &borrower, &s.mode(0)));
    assert_eq!(s.underlying.balance(&s.vault.address), 10_030);
    assert_eq!(s.vault.state().fee_underlying, 30);

    // the fee is shared by redeem holders after expiry
    s.env.ledger().set_timestamp(EXPIRY);
    assert_eq!(s.vault.redeem(&10_000, &writer), (0, 10_030));
}

#[test]
fn test_flash_default_reverts_everything() {
    let s = setup();
    let _writer = s.writer(1_000);
    let borrower = s.borrower();
    s.underlying_admin.mint(&borrower, &100);

    assert_eq!(
        s.vault.try_flash(&1_000, &borrower, &s.mode(1)),
        Err(Ok(OptionError::FlashRepaymentShortfall))
    );
    assert_eq!(s.underlying.balance(&s.vault.address), 1_000);
    assert_eq!(s.underlying.balance(&borrower), 100);
    assert_eq!(s.vault.state().fee_underlying, 0);
}

#[test]
fn test_flash_one_unit_short() {
    let s = setup();
    let _writer = s.writer(1_000);
    let borrower = s.borrower();
    s.underlying_admin.mint(&borrower, &100);

    assert_eq!(
        s.vault.try_flash(&1_000, &borrower, &s.mode(2)),
        Err(Ok(OptionError::FlashRepaymentShortfall))
    );
    assert_eq!(s.underlying.balance(&s.vault.address), 1_000);
}

#[test]
fn test_flash_more_than_held() {
    let s = setup();
    let _writer = s.writer(10);
    let borrower = s.borrower();

    assert_eq!(
        s.vault.try_flash(&11, &borrower, &s.mode(0)),
        Err(Ok(OptionError::InsufficientBalance))
    );
}

#[test]
fn test_flash_exercise_pays_from_callback() {
    let s = setup();
    let writer = s.writer(100);
    let borrower = s.borrower();
    // stands in for the strike the borrower raises by selling the underlying
    s.strike_admin.mint(&borrower, &50);

    assert_eq!(s.vault.flash_exercise(&writer, &100, &borrower, &s.mode(0)), 50);
    assert_eq!(s.vault.balance(&writer), 0);
    assert_eq!(s.underlying.balance(&borrower), 100);
    assert_eq!(s.strike.balance(&s.vault.address), 50);

    let state = s.vault.state();
    assert_eq!(state.locked_underlying, 0);
    assert_eq!(state.exercised_units, 100);
    assert_eq!(state.locked_strike, 50);
}

#[test]
fn test_flash_exercise_shortfall_restores_options() {
    let s = setup();
    let writer = s.writer(100);
    let borrower = s.borrower();
    s.strike_admin.mint(&borrower, &50);

    assert_eq!(
        s.vault.try_flash_exercise(&writer, &100, &borrower, &s.mode(2)),
        Err(Ok(OptionError::FlashRepaymentShortfall))
    );
    assert_eq!(s.vault.balance(&writer), 100);
    assert_eq!(s.underlying.balance(&s.vault.address), 100);
    assert_eq!(s.underlying.balance(&borrower), 0);
    assert_eq!(s.strike.balance(&borrower), 50);
    assert_eq!(s.vault.state().locked_underlying, 100);
}

#[test]
fn test_flash_exercise_after_expiry() {
    let s = setup();
    let writer = s.writer(100);
    let borrower = s.borrower();
    s.env.ledger().set_timestamp(EXPIRY);

    assert_eq!(
        s.vault.try_flash_exercise(&writer, &100, &borrower, &s.mode(0)),
        Err(Ok(OptionError::Expired))
    );
}

#[test]
fn test_solvent_after_mixed_lifecycle() {
    let s = setup();
    let a = s.writer(500);
    let b = s.writer(300);
    let borrower = s.borrower();
    s.underlying_admin.mint(&borrower, &10);
    s.strike_admin.mint(&a, &1_000);

    s.vault.exercise(&201, &a);
    s.vault.close(&100, &b);
    s.vault.flash(&400, &borrower, &s.mode(0));
    s.vault.redeem(&150, &a);

    let state = s.vault.state();
    assert!(invariants::holds(&state, true));
    assert!(invariants::solvent(
        &state,
        s.underlying.balance(&s.vault.address),
        s.strike.balance(&s.vault.address),
    ));
}

#[test]
fn test_flash_fee_split_across_redeemers() {
    let s = setup();
    let a = s.writer(6_000);
    let b = s.writer(4_000);
    let borrower = s.borrower();
    s.underlying_admin.mint(&borrower, &30);

    s.vault.flash(&10_000, &borrower, &s.mode(0));
    assert_eq!(s.underlying.balance(&borrower), 0);

    // no exercise yet: nothing is claimable before expiry
    assert_eq!(
        s.vault.try_redeem(&1, &a),
        Err(Ok(OptionError::InsufficientProceeds))
    );

    s.env.ledger().set_timestamp(EXPIRY);
    // a: 6_000 + floor(30 × 6_000 / 10_000); b takes the rest of the fee
    assert_eq!(s.vault.redeem(&6_000, &a), (0, 6_018));
    assert_eq!(s.vault.redeem(&4_000, &b), (0, 4_012));
    assert_eq!(s.underlying.balance(&a), 6_018);
    assert_eq!(s.underlying.balance(&b), 4_012);
    assert_eq!(s.underlying.balance(&s.vault.address), 0);
    assert_eq!(s.vault.state().fee_underlying, 0);
}

#[test]
fn test_entry_points_rejected_while_locked() {
    let s = setup();
    let writer = s.writer(100);
    let borrower = s.borrower();
    s.underlying_admin.mint(&writer, &10);
    s.strike_admin.mint(&writer, &50);

    s.env
        .as_contract(&s.vault.address, || storage::set_locked(&s.env, true));

    assert_eq!(
        s.vault.try_mint(&10, &writer, &writer),
        Err(Ok(OptionError::Reentrant))
    );
    assert_eq!(s.vault.try_exercise(&10, &writer), Err(Ok(OptionError::Reentrant)));
    assert_eq!(s.vault.try_redeem(&10, &writer), Err(Ok(OptionError::Reentrant)));
    assert_eq!(s.vault.try_close(&10, &writer), Err(Ok(OptionError::Reentrant)));
    assert_eq!(
        s.vault.try_transfer(&writer, &borrower, &10),
        Err(Ok(OptionError::Reentrant))
    );
    assert_eq!(
        s.vault.try_flash(&10, &borrower, &s.mode(0)),
        Err(Ok(OptionError::Reentrant))
    );

    s.env
        .as_contract(&s.vault.address, || storage::set_locked(&s.env, false));
    assert_eq!(s.vault.close(&10, &writer), 10);
}

#[test]
fn test_mint_payer_differs_from_recipient() {
    let s = setup();
    let payer = Address::generate(&s.env);
    let recipient = Address::generate(&s.env);
    s.underlying_admin.mint(&payer, &100);

    assert_eq!(s.vault.mint(&100, &payer, &recipient), (100, 100));
    assert_eq!(s.underlying.balance(&payer), 0);
    assert_eq!(s.vault.balance(&payer), 0);
    assert_eq!(s.claim.balance(&payer), 0);
    assert_eq!(s.vault.balance(&recipient), 100);
    assert_eq!(s.claim.balance(&recipient), 100);

    // the recipient has no collateral of its own to put up
    assert_eq!(
        s.vault.try_mint(&1, &recipient, &payer),
        Err(Ok(OptionError::TransferFailed))
    );
}
