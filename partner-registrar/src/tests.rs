use crate::mock::*;
use crate::traits::{Label, NameRegistry, TokenTransferNotify};
use crate::*;
use codec::Encode;
use frame_support::storage::with_transaction;
use frame_support::{assert_noop, assert_ok};
use partner_types::{Configuration, TokenCall, SECONDS_PER_YEAR};
use sp_runtime::{DispatchError, DispatchResult, TransactionOutcome};

const SECRET: [u8; 32] = [7; 32];

fn instant_configuration() -> Configuration<Balance, Moment> {
    Configuration {
        min_commitment_age: 0,
        ..default_configuration()
    }
}

fn node_of(name: &[u8], tld: Hash) -> Hash {
    let (label, _) = Label::<Hash>::new(name).unwrap();
    label.encode_with_node(&tld)
}

/// Drives the token-callback entry point the way the wired token pallet
/// would: inside its own storage layer.
fn registrar_token_fallback(from: AccountId, amount: Balance, data: &[u8]) -> DispatchResult {
    with_transaction(|| {
        let result = <Registrar as TokenTransferNotify>::token_fallback(&from, amount, data);
        if result.is_ok() {
            TransactionOutcome::Commit(result)
        } else {
            TransactionOutcome::Rollback(result)
        }
    })
}

fn renewer_token_fallback(from: AccountId, amount: Balance, data: &[u8]) -> DispatchResult {
    with_transaction(|| {
        let result = <Renewer as TokenTransferNotify>::token_fallback(&from, amount, data);
        if result.is_ok() {
            TransactionOutcome::Commit(result)
        } else {
            TransactionOutcome::Rollback(result)
        }
    })
}

// access control

#[test]
fn ownership_transfer_swaps_operator_membership() {
    new_test_ext().execute_with(|| {
        assert!(AccessControl::is_owner(&OWNER));
        // the owner qualifies as operator without being in the set
        assert!(AccessControl::is_operator(&OWNER));
        assert!(AccessControl::is_operator(&OPERATOR));

        // only the owner manages roles
        assert_noop!(
            AccessControl::add_operator(RuntimeOrigin::signed(OPERATOR), STRANGER),
            access_control::Error::<Test>::NotOwner
        );
        assert_noop!(
            AccessControl::transfer_ownership(RuntimeOrigin::signed(STRANGER), STRANGER),
            access_control::Error::<Test>::NotOwner
        );

        assert_ok!(AccessControl::transfer_ownership(
            RuntimeOrigin::signed(OWNER),
            STRANGER
        ));

        // old owner lost everything, new owner holds both roles
        assert!(!AccessControl::is_owner(&OWNER));
        assert!(!AccessControl::is_operator(&OWNER));
        assert!(AccessControl::is_owner(&STRANGER));
        assert!(AccessControl::is_operator(&STRANGER));
        // unrelated operators survive the transfer
        assert!(AccessControl::is_operator(&OPERATOR));

        assert_noop!(
            AccessControl::add_operator(RuntimeOrigin::signed(OWNER), OWNER),
            access_control::Error::<Test>::NotOwner
        );
    });
}

// partner configuration

#[test]
fn configuration_invariants_are_enforced() {
    new_test_ext().execute_with(|| {
        let mut bad = default_configuration();
        bad.min_length = 40;
        assert_noop!(
            PartnerConfigurations::create_configuration(RuntimeOrigin::signed(OWNER), bad),
            partner_configuration::Error::<Test>::InvalidConfiguration
        );

        let mut bad = default_configuration();
        bad.fee_percentage = PERCENT_100 + 1;
        assert_noop!(
            PartnerConfigurations::create_configuration(RuntimeOrigin::signed(OWNER), bad),
            partner_configuration::Error::<Test>::InvalidConfiguration
        );

        // gating: strangers are refused, operators are accepted
        assert_noop!(
            PartnerConfigurations::create_configuration(
                RuntimeOrigin::signed(STRANGER),
                default_configuration()
            ),
            DispatchError::BadOrigin
        );
        assert_ok!(PartnerConfigurations::create_configuration(
            RuntimeOrigin::signed(OPERATOR),
            default_configuration()
        ));
        let id = partner_configuration::NextConfigId::<Test>::get() - 1;

        // a setter may not break a cross-field invariant
        assert_noop!(
            PartnerConfigurations::set_min_length(RuntimeOrigin::signed(OWNER), id, 40),
            partner_configuration::Error::<Test>::InvalidConfiguration
        );
        assert_ok!(PartnerConfigurations::set_max_length(
            RuntimeOrigin::signed(OWNER),
            id,
            40
        ));
        assert_ok!(PartnerConfigurations::set_min_length(
            RuntimeOrigin::signed(OWNER),
            id,
            40
        ));

        assert_noop!(
            PartnerConfigurations::set_discount(RuntimeOrigin::signed(OWNER), id, PERCENT_100 + 1),
            partner_configuration::Error::<Test>::InvalidConfiguration
        );

        assert_noop!(
            PartnerConfigurations::set_min_length(RuntimeOrigin::signed(OWNER), 999, 5),
            partner_configuration::Error::<Test>::ConfigurationNotFound
        );
    });
}

#[test]
fn price_follows_the_tier_curve() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, default_configuration());

        assert_eq!(
            registrar::Pallet::<Test>::register_price(&PARTNER_1, 1),
            Some(2 * UNIT)
        );
        assert_eq!(
            registrar::Pallet::<Test>::register_price(&PARTNER_1, 2),
            Some(4 * UNIT)
        );
        // the volume tier kicks in after two years
        assert_eq!(
            registrar::Pallet::<Test>::register_price(&PARTNER_1, 3),
            Some(5 * UNIT)
        );

        // renewals are priced by the same curve
        assert_eq!(
            renewer::Pallet::<Test>::renew_price(&PARTNER_1, 3),
            Some(5 * UNIT)
        );

        let mut discounted = default_configuration();
        discounted.discount = PERCENT_100 / 2;
        setup_partner(PARTNER_2, discounted);
        assert_eq!(
            registrar::Pallet::<Test>::register_price(&PARTNER_2, 1),
            Some(UNIT)
        );

        assert_eq!(registrar::Pallet::<Test>::register_price(&STRANGER, 1), None);
    });
}

// partner manager

#[test]
fn partner_lifecycle() {
    new_test_ext().execute_with(|| {
        let id = setup_partner(PARTNER_1, default_configuration());

        assert_noop!(
            PartnerManager::add_partner(RuntimeOrigin::signed(OWNER), PARTNER_1, id),
            partner_manager::Error::<Test>::PartnerAlreadyExists
        );
        assert_noop!(
            PartnerManager::add_partner(RuntimeOrigin::signed(OWNER), PARTNER_2, 999),
            partner_manager::Error::<Test>::InvalidConfiguration
        );
        assert_noop!(
            PartnerManager::add_partner(RuntimeOrigin::signed(STRANGER), PARTNER_2, id),
            DispatchError::BadOrigin
        );

        // rebinding requires an existing partner and an existing record
        assert_noop!(
            PartnerManager::set_partner_configuration(RuntimeOrigin::signed(OWNER), PARTNER_2, id),
            partner_manager::Error::<Test>::InvalidPartner
        );
        assert_noop!(
            PartnerManager::set_partner_configuration(RuntimeOrigin::signed(OWNER), PARTNER_1, 999),
            partner_manager::Error::<Test>::InvalidConfiguration
        );

        let mut richer = default_configuration();
        richer.discount = PERCENT_100 / 2;
        assert_ok!(PartnerConfigurations::create_configuration(
            RuntimeOrigin::signed(OWNER),
            richer
        ));
        let richer_id = partner_configuration::NextConfigId::<Test>::get() - 1;
        assert_ok!(PartnerManager::set_partner_configuration(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1,
            richer_id
        ));
        assert_eq!(
            registrar::Pallet::<Test>::register_price(&PARTNER_1, 1),
            Some(UNIT)
        );

        // removal is idempotent
        assert_ok!(PartnerManager::remove_partner(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1
        ));
        assert_ok!(PartnerManager::remove_partner(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1
        ));
        assert!(!<PartnerManager as traits::PartnerRegistry>::is_partner(
            &PARTNER_1
        ));
    });
}

// fee manager

#[test]
fn deposit_requires_whitelisting() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            FeeManager::deposit(RuntimeOrigin::signed(STRANGER), PARTNER_1, UNIT),
            fee_manager::Error::<Test>::NotWhitelisted
        );

        let escrow_before = Balances::free_balance(ESCROW);
        assert_ok!(FeeManager::deposit(
            RuntimeOrigin::signed(WHITELISTED),
            PARTNER_1,
            UNIT
        ));
        assert_eq!(FeeManager::balance_of(PARTNER_1), UNIT);
        assert_eq!(Balances::free_balance(ESCROW), escrow_before + UNIT);

        // the owner can extend the whitelist
        assert_ok!(FeeManager::white_list_registrar_or_renewer(
            RuntimeOrigin::signed(OWNER),
            STRANGER
        ));
        assert_ok!(FeeManager::deposit(
            RuntimeOrigin::signed(STRANGER),
            PARTNER_1,
            UNIT
        ));
        assert_eq!(FeeManager::balance_of(PARTNER_1), 2 * UNIT);

        assert_noop!(
            FeeManager::white_list_registrar_or_renewer(RuntimeOrigin::signed(STRANGER), BUYER),
            DispatchError::BadOrigin
        );
    });
}

#[test]
fn withdraw_pays_the_exact_balance_once() {
    new_test_ext().execute_with(|| {
        assert_ok!(FeeManager::deposit(
            RuntimeOrigin::signed(WHITELISTED),
            PARTNER_1,
            3 * UNIT
        ));

        let before = Balances::free_balance(PARTNER_1);
        assert_ok!(FeeManager::withdraw(RuntimeOrigin::signed(PARTNER_1)));
        assert_eq!(Balances::free_balance(PARTNER_1), before + 3 * UNIT);
        assert_eq!(FeeManager::balance_of(PARTNER_1), 0);

        assert_noop!(
            FeeManager::withdraw(RuntimeOrigin::signed(PARTNER_1)),
            fee_manager::Error::<Test>::ZeroBalance
        );
    });
}

// registrar: commit-reveal

#[test]
fn commitment_ages_before_it_reveals() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, default_configuration());
        let name = b"hello-world";

        let commitment = registrar::Pallet::<Test>::make_commitment(
            name,
            &NAME_OWNER,
            &SECRET,
            1,
            None,
            &PARTNER_1,
            None,
        )
        .unwrap();

        assert_ok!(Registrar::commit(
            RuntimeOrigin::signed(BUYER),
            commitment,
            PARTNER_1
        ));
        // fresh commitments are not revealable
        assert!(!registrar::Pallet::<Test>::can_reveal(
            commitment, &PARTNER_1
        ));
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                name.to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::NoCommitmentFound
        );

        // one second short of the required age
        advance_secs(59);
        assert!(!registrar::Pallet::<Test>::can_reveal(
            commitment, &PARTNER_1
        ));

        advance_secs(1);
        assert!(registrar::Pallet::<Test>::can_reveal(commitment, &PARTNER_1));
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));

        let node = node_of(name, BaseNode::get());
        assert_eq!(MockRegistry::owner_of(node), Some(NAME_OWNER));

        // the commitment was consumed with the sale
        assert!(!registrar::Commitments::<Test>::contains_key(commitment));
        assert!(!registrar::Pallet::<Test>::can_reveal(
            commitment, &PARTNER_1
        ));
    });
}

#[test]
fn consumed_commitment_cannot_be_replayed() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, default_configuration());
        let name = b"replayable";

        let commitment = registrar::Pallet::<Test>::make_commitment(
            name,
            &NAME_OWNER,
            &SECRET,
            1,
            None,
            &PARTNER_1,
            None,
        )
        .unwrap();
        assert_ok!(Registrar::commit(
            RuntimeOrigin::signed(BUYER),
            commitment,
            PARTNER_1
        ));
        advance_secs(60);
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));

        // the age window cannot be exploited a second time: the commitment
        // check fires before availability is even consulted
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                name.to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::NoCommitmentFound
        );
    });
}

#[test]
fn one_step_partners_skip_the_commitment_machine() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        let commitment = registrar::Pallet::<Test>::make_commitment(
            b"direct",
            &NAME_OWNER,
            &SECRET,
            1,
            None,
            &PARTNER_1,
            None,
        )
        .unwrap();
        // commit always fails when the partner needs no commitments
        assert_noop!(
            Registrar::commit(RuntimeOrigin::signed(BUYER), commitment, PARTNER_1),
            registrar::Error::<Test>::CommitmentNotRequired
        );

        // and register never asks for one
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"direct".to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
    });
}

// registrar: policy validation

#[test]
fn register_validates_partner_name_and_duration() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"somename".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                STRANGER,
                None
            ),
            registrar::Error::<Test>::NotAPartner
        );

        // two codepoints, bound is three
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"ab".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::InvalidName
        );
        // labels with separators or spaces never parse
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"hello.world".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::InvalidName
        );

        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"somename".to_vec(),
                NAME_OWNER,
                SECRET,
                0,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::InvalidDuration
        );
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"somename".to_vec(),
                NAME_OWNER,
                SECRET,
                6,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::InvalidDuration
        );

        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"somename".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                Some(Hash::from([0x99; 32]))
            ),
            registrar::Error::<Test>::UnsupportedTld
        );
    });
}

#[test]
fn emoji_names_count_codepoints_not_bytes() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        // twelve bytes, three codepoints: inside [3, 32]
        let name = "🚀🚀🚀".as_bytes();
        assert_eq!(name.len(), 12);
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
        assert_eq!(
            MockRegistry::owner_of(node_of(name, BaseNode::get())),
            Some(NAME_OWNER)
        );
    });
}

#[test]
fn two_partners_two_length_policies() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());
        let mut strict = instant_configuration();
        strict.min_length = 10;
        setup_partner(PARTNER_2, strict);

        let name = b"probe";
        // five letters pass the loose policy
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
        // and fail the strict one on a different name
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"other".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_2,
                None
            ),
            registrar::Error::<Test>::InvalidName
        );
    });
}

// registrar: money flow

#[test]
fn sale_splits_between_partner_and_pool() {
    new_test_ext().execute_with(|| {
        // 10% commission, no discount
        setup_partner(PARTNER_1, instant_configuration());

        let buyer_before = Balances::free_balance(BUYER);
        let pool_before = Balances::free_balance(POOL);
        let escrow_before = Balances::free_balance(ESCROW);

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"split-me".to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));

        // one year costs two units; 0.2 commission, 1.8 pool
        let price = 2 * UNIT;
        let fee = price / 10;
        assert_eq!(Balances::free_balance(BUYER), buyer_before - price);
        assert_eq!(FeeManager::balance_of(PARTNER_1), fee);
        assert_eq!(Balances::free_balance(ESCROW), escrow_before + fee);
        assert_eq!(Balances::free_balance(POOL), pool_before + price - fee);
    });
}

#[test]
fn full_discount_registers_for_free() {
    new_test_ext().execute_with(|| {
        let mut free = instant_configuration();
        free.discount = PERCENT_100;
        setup_partner(PARTNER_1, free);

        let buyer_before = Balances::free_balance(BUYER);
        let pool_before = Balances::free_balance(POOL);

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"gratis".to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));

        assert_eq!(Balances::free_balance(BUYER), buyer_before);
        assert_eq!(Balances::free_balance(POOL), pool_before);
        assert_eq!(FeeManager::balance_of(PARTNER_1), 0);
        assert_eq!(
            MockRegistry::owner_of(node_of(b"gratis", BaseNode::get())),
            Some(NAME_OWNER)
        );
    });
}

#[test]
fn failed_registration_leaves_no_trace() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"taken".to_vec(),
            NAME_OWNER,
            SECRET,
            2,
            None,
            PARTNER_1,
            None
        ));
        let node = node_of(b"taken", BaseNode::get());
        let expire = MockRegistry::expiration_time(node).unwrap();

        let buyer_before = Balances::free_balance(BUYER);
        let pool_before = Balances::free_balance(POOL);
        let ledger_before = FeeManager::balance_of(PARTNER_1);

        // second sale of an occupied name dies before any money moves
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"taken".to_vec(),
                STRANGER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            registrar::Error::<Test>::Occupied
        );

        assert_eq!(MockRegistry::owner_of(node), Some(NAME_OWNER));
        assert_eq!(MockRegistry::expiration_time(node), Some(expire));
        assert_eq!(Balances::free_balance(BUYER), buyer_before);
        assert_eq!(Balances::free_balance(POOL), pool_before);
        assert_eq!(FeeManager::balance_of(PARTNER_1), ledger_before);

        // a buyer who cannot pay changes nothing either
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(POOR_BUYER),
                b"unaffordable".to_vec(),
                POOR_BUYER,
                SECRET,
                1,
                None,
                PARTNER_1,
                None
            ),
            pallet_balances::Error::<Test>::InsufficientBalance
        );
    });
}

#[test]
fn resolved_address_is_bound_on_registration() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"addressed".to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            Some(NAME_OWNER),
            PARTNER_1,
            None
        ));

        let node = node_of(b"addressed", BaseNode::get());
        assert_eq!(MockRegistry::resolved_addr(node), Some(NAME_OWNER));
    });
}

// registrar: multi-TLD

#[test]
fn same_label_registers_once_per_tld() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());
        let name = b"doubled";

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            STRANGER,
            SECRET,
            2,
            None,
            PARTNER_1,
            Some(ALT_TLD)
        ));

        let base_node = node_of(name, BaseNode::get());
        let alt_node = node_of(name, ALT_TLD);
        assert_ne!(base_node, alt_node);
        assert_eq!(MockRegistry::owner_of(base_node), Some(NAME_OWNER));
        assert_eq!(MockRegistry::owner_of(alt_node), Some(STRANGER));

        // but only once per TLD
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                name.to_vec(),
                BUYER,
                SECRET,
                1,
                None,
                PARTNER_1,
                Some(ALT_TLD)
            ),
            registrar::Error::<Test>::Occupied
        );
    });
}

#[test]
fn tld_whitelist_is_manager_gated() {
    new_test_ext().execute_with(|| {
        let tld = Hash::from([0x33; 32]);
        assert_noop!(
            Registrar::add_tld(RuntimeOrigin::signed(STRANGER), tld),
            DispatchError::BadOrigin
        );
        assert_ok!(Registrar::add_tld(RuntimeOrigin::signed(OPERATOR), tld));

        setup_partner(PARTNER_1, instant_configuration());
        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            b"fresh-tld".to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            Some(tld)
        ));

        assert_ok!(Registrar::remove_tld(RuntimeOrigin::signed(OPERATOR), tld));
        assert_noop!(
            Registrar::register(
                RuntimeOrigin::signed(BUYER),
                b"gone-tld".to_vec(),
                NAME_OWNER,
                SECRET,
                1,
                None,
                PARTNER_1,
                Some(tld)
            ),
            registrar::Error::<Test>::UnsupportedTld
        );
    });
}

// registrar: one-step path

#[test]
fn one_step_registration_via_token_callback() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        let data = TokenCall::<AccountId, Hash>::Register {
            name: b"one-step".to_vec(),
            owner: NAME_OWNER,
            secret: SECRET,
            duration: 1,
            resolved: None,
            partner: PARTNER_1,
            tld: None,
        }
        .encode();

        let buyer_before = Balances::free_balance(BUYER);

        // an announced amount below the price is refused outright
        assert_noop!(
            registrar_token_fallback(BUYER, UNIT, &data),
            registrar::Error::<Test>::InsufficientPayment
        );
        assert_eq!(Balances::free_balance(BUYER), buyer_before);

        // overpayment: only the effective price leaves the buyer
        assert_ok!(registrar_token_fallback(BUYER, 5 * UNIT, &data));
        assert_eq!(Balances::free_balance(BUYER), buyer_before - 2 * UNIT);
        assert_eq!(
            MockRegistry::owner_of(node_of(b"one-step", BaseNode::get())),
            Some(NAME_OWNER)
        );

        // undecodable payloads are invalid data
        assert_noop!(
            registrar_token_fallback(BUYER, 5 * UNIT, &[0xff, 0x00, 0x13]),
            registrar::Error::<Test>::InvalidData
        );

        // a renewal payload is the wrong shape for the registrar
        let renew_data = TokenCall::<AccountId, Hash>::Renew {
            name: b"one-step".to_vec(),
            duration: 1,
            partner: PARTNER_1,
            tld: None,
        }
        .encode();
        assert_noop!(
            registrar_token_fallback(BUYER, 5 * UNIT, &renew_data),
            registrar::Error::<Test>::InvalidData
        );
    });
}

// renewer

#[test]
fn renew_extends_expiry_and_splits_payment() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());
        let name = b"extend-me";

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
        let node = node_of(name, BaseNode::get());
        let expire = MockRegistry::expiration_time(node).unwrap();

        let buyer_before = Balances::free_balance(BUYER);
        let pool_before = Balances::free_balance(POOL);
        let ledger_before = FeeManager::balance_of(PARTNER_1);

        assert_ok!(Renewer::renew(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            2,
            PARTNER_1,
            None
        ));

        assert_eq!(
            MockRegistry::expiration_time(node),
            Some(expire + 2 * SECONDS_PER_YEAR)
        );
        // two years cost four units; same split as a registration
        let price = 4 * UNIT;
        let fee = price / 10;
        assert_eq!(Balances::free_balance(BUYER), buyer_before - price);
        assert_eq!(FeeManager::balance_of(PARTNER_1), ledger_before + fee);
        assert_eq!(Balances::free_balance(POOL), pool_before + price - fee);
    });
}

#[test]
fn renew_validates_like_a_registration() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());

        assert_noop!(
            Renewer::renew(
                RuntimeOrigin::signed(BUYER),
                b"whatever".to_vec(),
                1,
                STRANGER,
                None
            ),
            renewer::Error::<Test>::NotAPartner
        );
        assert_noop!(
            Renewer::renew(
                RuntimeOrigin::signed(BUYER),
                b"whatever".to_vec(),
                9,
                PARTNER_1,
                None
            ),
            renewer::Error::<Test>::InvalidDuration
        );
        assert_noop!(
            Renewer::renew(
                RuntimeOrigin::signed(BUYER),
                b"ab".to_vec(),
                1,
                PARTNER_1,
                None
            ),
            renewer::Error::<Test>::InvalidName
        );
        // a name nobody registered cannot be extended
        assert_noop!(
            Renewer::renew(
                RuntimeOrigin::signed(BUYER),
                b"nonexistent".to_vec(),
                1,
                PARTNER_1,
                None
            ),
            DispatchError::Other("name not registered")
        );
    });
}

#[test]
fn one_step_renewal_via_token_callback() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, instant_configuration());
        let name = b"top-up";

        assert_ok!(Registrar::register(
            RuntimeOrigin::signed(BUYER),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            PARTNER_1,
            None
        ));
        let node = node_of(name, BaseNode::get());
        let expire = MockRegistry::expiration_time(node).unwrap();

        let data = TokenCall::<AccountId, Hash>::Renew {
            name: name.to_vec(),
            duration: 1,
            partner: PARTNER_1,
            tld: None,
        }
        .encode();

        let buyer_before = Balances::free_balance(BUYER);
        // overpayment stays with the caller
        assert_ok!(renewer_token_fallback(BUYER, 10 * UNIT, &data));
        assert_eq!(Balances::free_balance(BUYER), buyer_before - 2 * UNIT);
        assert_eq!(
            MockRegistry::expiration_time(node),
            Some(expire + SECONDS_PER_YEAR)
        );

        // a registration payload is the wrong shape for the renewer
        let register_data = TokenCall::<AccountId, Hash>::Register {
            name: name.to_vec(),
            owner: NAME_OWNER,
            secret: SECRET,
            duration: 1,
            resolved: None,
            partner: PARTNER_1,
            tld: None,
        }
        .encode();
        assert_noop!(
            renewer_token_fallback(BUYER, 10 * UNIT, &register_data),
            renewer::Error::<Test>::InvalidData
        );
    });
}

// pool setters

#[test]
fn set_pool_rejects_the_stored_value() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            Registrar::set_pool(RuntimeOrigin::signed(STRANGER), STRANGER),
            DispatchError::BadOrigin
        );
        assert_noop!(
            Registrar::set_pool(RuntimeOrigin::signed(OPERATOR), POOL),
            registrar::Error::<Test>::ValueUnchanged
        );
        assert_ok!(Registrar::set_pool(RuntimeOrigin::signed(OPERATOR), STRANGER));
        assert_eq!(registrar::Pool::<Test>::get(), Some(STRANGER));

        assert_noop!(
            Renewer::set_pool(RuntimeOrigin::signed(OPERATOR), POOL),
            renewer::Error::<Test>::ValueUnchanged
        );
        assert_ok!(Renewer::set_pool(RuntimeOrigin::signed(OPERATOR), STRANGER));
    });
}

// partner proxies

#[test]
fn proxy_keys_are_unique_per_partner_and_name() {
    new_test_ext().execute_with(|| {
        assert_noop!(
            PartnerProxy::create_partner_proxy(
                RuntimeOrigin::signed(STRANGER),
                PARTNER_1,
                b"mall".to_vec()
            ),
            DispatchError::BadOrigin
        );

        assert_ok!(PartnerProxy::create_partner_proxy(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1,
            b"mall".to_vec()
        ));
        assert_noop!(
            PartnerProxy::create_partner_proxy(
                RuntimeOrigin::signed(OWNER),
                PARTNER_1,
                b"mall".to_vec()
            ),
            proxy::Error::<Test>::ProxyAlreadyExists
        );

        // one partner may run several named front-ends
        assert_ok!(PartnerProxy::create_partner_proxy(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1,
            b"kiosk".to_vec()
        ));
        // and the same name is free under another partner
        assert_ok!(PartnerProxy::create_partner_proxy(
            RuntimeOrigin::signed(OWNER),
            PARTNER_2,
            b"mall".to_vec()
        ));

        let record = proxy::Pallet::<Test>::get_partner_proxy(&PARTNER_1, b"mall").unwrap();
        assert_eq!(record.owner, PARTNER_1);
    });
}

#[test]
fn proxy_routes_with_the_bound_partner_identity() {
    new_test_ext().execute_with(|| {
        setup_partner(PARTNER_1, default_configuration());
        assert_ok!(PartnerProxy::create_partner_proxy(
            RuntimeOrigin::signed(OWNER),
            PARTNER_1,
            b"mall".to_vec()
        ));

        let name = b"proxied";
        let commitment = registrar::Pallet::<Test>::make_commitment(
            name,
            &NAME_OWNER,
            &SECRET,
            1,
            None,
            &PARTNER_1,
            None,
        )
        .unwrap();

        // only the proxy owner may route calls
        assert_noop!(
            PartnerProxy::proxy_commit(
                RuntimeOrigin::signed(STRANGER),
                PARTNER_1,
                b"mall".to_vec(),
                commitment
            ),
            proxy::Error::<Test>::NotProxyOwner
        );
        assert_noop!(
            PartnerProxy::proxy_commit(
                RuntimeOrigin::signed(PARTNER_1),
                PARTNER_1,
                b"unknown".to_vec(),
                commitment
            ),
            proxy::Error::<Test>::ProxyNotFound
        );

        assert_ok!(PartnerProxy::proxy_commit(
            RuntimeOrigin::signed(PARTNER_1),
            PARTNER_1,
            b"mall".to_vec(),
            commitment
        ));
        advance_secs(60);

        let partner_before = Balances::free_balance(PARTNER_1);
        assert_ok!(PartnerProxy::proxy_register(
            RuntimeOrigin::signed(PARTNER_1),
            PARTNER_1,
            b"mall".to_vec(),
            name.to_vec(),
            NAME_OWNER,
            SECRET,
            1,
            None,
            None
        ));

        // the caller paid, the sale ran under the bound partner's policy
        let node = node_of(name, BaseNode::get());
        assert_eq!(MockRegistry::owner_of(node), Some(NAME_OWNER));
        assert_eq!(Balances::free_balance(PARTNER_1), partner_before - 2 * UNIT);
        assert_eq!(FeeManager::balance_of(PARTNER_1), 2 * UNIT / 10);

        assert_ok!(PartnerProxy::proxy_renew(
            RuntimeOrigin::signed(PARTNER_1),
            PARTNER_1,
            b"mall".to_vec(),
            name.to_vec(),
            1,
            None
        ));
        assert_eq!(
            MockRegistry::expiration_time(node),
            Some(now_secs() + 2 * SECONDS_PER_YEAR)
        );
    });
}

// labels

#[test]
fn label_parsing_counts_codepoints() {
    assert!(Label::<Hash>::new(b"").is_none());
    assert!(Label::<Hash>::new(b"hello world").is_none());
    assert!(Label::<Hash>::new(b"hello.world").is_none());
    assert!(Label::<Hash>::new(b"tab\there").is_none());
    assert!(Label::<Hash>::new(&[0xff, 0xfe]).is_none());

    let (_, len) = Label::<Hash>::new(b"hello").unwrap();
    assert_eq!(len, 5);

    // multi-byte characters count once
    let (_, len) = Label::<Hash>::new("中文测试".as_bytes()).unwrap();
    assert_eq!(len, 4);
    let (_, len) = Label::<Hash>::new("🚀🚀🚀".as_bytes()).unwrap();
    assert_eq!(len, 3);

    // case folds into one node
    let (upper, _) = Label::<Hash>::new(b"HELLO").unwrap();
    let (lower, _) = Label::<Hash>::new(b"hello").unwrap();
    assert_eq!(upper.node, lower.node);
}
