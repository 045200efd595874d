use frame_support::{parameter_types, traits::GenesisBuild};
use sp_core::H256;
use sp_runtime::{
    testing::Header,
    traits::{BlakeTwo256, IdentityLookup},
    DispatchError, DispatchResult,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::traits::NameRegistry;
use partner_types::{Configuration, SECONDS_PER_YEAR};

pub type UncheckedExtrinsic = frame_system::mocking::MockUncheckedExtrinsic<Test>;
pub type Block = frame_system::mocking::MockBlock<Test>;
pub type Hash = H256;
pub type Balance = u128;
pub type AccountId = u64;
/// Registrar timestamps are unix seconds; the timestamp pallet feeds it
/// milliseconds through `UnixTime`.
pub type Moment = u64;

pub const OWNER: AccountId = 1;
pub const OPERATOR: AccountId = 2;
pub const PARTNER_1: AccountId = 10;
pub const PARTNER_2: AccountId = 11;
pub const BUYER: AccountId = 20;
pub const POOR_BUYER: AccountId = 21;
pub const NAME_OWNER: AccountId = 22;
pub const POOL: AccountId = 30;
pub const ESCROW: AccountId = 31;
pub const WHITELISTED: AccountId = 32;
pub const STRANGER: AccountId = 40;

/// 1 payment token in smallest units.
pub const UNIT: Balance = 1_000_000_000_000_000_000;
/// Fixed-point denominator: this value is 100%.
pub const PERCENT_100: Balance = 1_000_000_000_000_000_000;

pub const INIT_TIMESTAMP_SECS: u64 = 1_700_000_000;

frame_support::construct_runtime!(
    pub enum Test where
        Block = Block,
        NodeBlock = Block,
        UncheckedExtrinsic = UncheckedExtrinsic,
    {
        System: frame_system,
        Balances: pallet_balances,
        Timestamp: pallet_timestamp,
        AccessControl: crate::access_control,
        PartnerConfigurations: crate::partner_configuration,
        PartnerManager: crate::partner_manager,
        FeeManager: crate::fee_manager,
        Registrar: crate::registrar,
        Renewer: crate::renewer,
        PartnerProxy: crate::proxy,
    }
);

parameter_types! {
    pub const BlockHashCount: u64 = 250;
    pub const SS58Prefix: u8 = 42;
}

impl frame_system::Config for Test {
    type BaseCallFilter = frame_support::traits::Everything;
    type BlockWeights = ();
    type BlockLength = ();
    type DbWeight = ();
    type RuntimeOrigin = RuntimeOrigin;
    type RuntimeCall = RuntimeCall;
    type Index = u64;
    type BlockNumber = u64;
    type Hash = H256;
    type Hashing = BlakeTwo256;
    type AccountId = AccountId;
    type Lookup = IdentityLookup<Self::AccountId>;
    type Header = Header;
    type RuntimeEvent = RuntimeEvent;
    type BlockHashCount = BlockHashCount;
    type Version = ();
    type PalletInfo = PalletInfo;
    type AccountData = pallet_balances::AccountData<Balance>;
    type OnNewAccount = ();
    type OnKilledAccount = ();
    type SystemWeightInfo = ();
    type SS58Prefix = SS58Prefix;
    type OnSetCode = ();
    type MaxConsumers = frame_support::traits::ConstU32<16>;
}

parameter_types! {
    pub const ExistentialDeposit: Balance = 1;
    pub const MaxLocks: u32 = 50;
}

impl pallet_balances::Config for Test {
    type MaxLocks = MaxLocks;
    type MaxReserves = ();
    type ReserveIdentifier = [u8; 8];
    type Balance = Balance;
    type RuntimeEvent = RuntimeEvent;
    type DustRemoval = ();
    type ExistentialDeposit = ExistentialDeposit;
    type AccountStore = System;
    type WeightInfo = ();
}

parameter_types! {
    pub const MinimumPeriod: u64 = 3000;
}

impl pallet_timestamp::Config for Test {
    /// A timestamp: milliseconds since the unix epoch.
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = MinimumPeriod;
    type WeightInfo = ();
}

impl crate::access_control::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type WeightInfo = ();
}

parameter_types! {
    pub const UnitPrice: Balance = UNIT;
    pub const PercentScale: Balance = PERCENT_100;
}

impl crate::partner_configuration::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Currency = Balances;
    type Moment = Moment;
    type UnitPrice = UnitPrice;
    type PercentScale = PercentScale;
    type ManagerOrigin = AccessControl;
    type WeightInfo = ();
}

impl crate::partner_manager::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Configurations = PartnerConfigurations;
    type ManagerOrigin = AccessControl;
    type WeightInfo = ();
}

parameter_types! {
    pub const EscrowAccount: AccountId = ESCROW;
}

impl crate::fee_manager::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Currency = Balances;
    type EscrowAccount = EscrowAccount;
    type ManagerOrigin = AccessControl;
    type WeightInfo = ();
}

parameter_types! {
    pub const BaseNode: Hash = sp_core::H256([0x11; 32]);
}

/// A second TLD used by the multi-TLD tests.
pub const ALT_TLD: Hash = sp_core::H256([0x22; 32]);

impl crate::registrar::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Currency = Balances;
    type Moment = Moment;
    type NowProvider = Timestamp;
    type Partners = PartnerManager;
    type Configurations = PartnerConfigurations;
    type Fees = FeeManager;
    type Registry = MockRegistry;
    type ManagerOrigin = AccessControl;
    type BaseNode = BaseNode;
    type WeightInfo = ();
}

impl crate::renewer::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Currency = Balances;
    type Moment = Moment;
    type Partners = PartnerManager;
    type Configurations = PartnerConfigurations;
    type Fees = FeeManager;
    type Registry = MockRegistry;
    type Tlds = Registrar;
    type ManagerOrigin = AccessControl;
    type WeightInfo = ();
}

parameter_types! {
    pub const MaxProxyNameLength: u32 = 64;
}

impl crate::proxy::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Registrar = Registrar;
    type Renewer = Renewer;
    type ManagerOrigin = AccessControl;
    type MaxProxyNameLength = MaxProxyNameLength;
    type WeightInfo = ();
}

thread_local! {
    static REGISTRY: RefCell<BTreeMap<Hash, (AccountId, Moment)>> = RefCell::new(BTreeMap::new());
    static ADDRESSES: RefCell<BTreeMap<Hash, AccountId>> = RefCell::new(BTreeMap::new());
}

pub fn now_secs() -> Moment {
    Timestamp::get() / 1000
}

/// In-memory stand-in for the external name-ownership registry.
pub struct MockRegistry;

impl MockRegistry {
    pub fn resolved_addr(node: Hash) -> Option<AccountId> {
        ADDRESSES.with(|a| a.borrow().get(&node).copied())
    }
}

impl NameRegistry for MockRegistry {
    type AccountId = AccountId;
    type Hash = Hash;
    type Moment = Moment;

    fn available(node: Hash) -> bool {
        REGISTRY.with(|r| match r.borrow().get(&node) {
            None => true,
            Some((_, expire)) => now_secs() > *expire,
        })
    }

    fn register(node: Hash, owner: &AccountId, duration_years: u32) -> Result<Moment, DispatchError> {
        REGISTRY.with(|r| {
            let mut map = r.borrow_mut();
            if let Some((_, expire)) = map.get(&node) {
                if now_secs() <= *expire {
                    return Err(DispatchError::Other("name already registered"));
                }
            }
            let expire = now_secs() + duration_years as u64 * SECONDS_PER_YEAR;
            map.insert(node, (*owner, expire));
            Ok(expire)
        })
    }

    fn renew(node: Hash, duration_years: u32) -> Result<Moment, DispatchError> {
        REGISTRY.with(|r| {
            let mut map = r.borrow_mut();
            match map.get_mut(&node) {
                Some((_, expire)) => {
                    *expire += duration_years as u64 * SECONDS_PER_YEAR;
                    Ok(*expire)
                }
                None => Err(DispatchError::Other("name not registered")),
            }
        })
    }

    fn expiration_time(node: Hash) -> Option<Moment> {
        REGISTRY.with(|r| r.borrow().get(&node).map(|(_, expire)| *expire))
    }

    fn owner_of(node: Hash) -> Option<AccountId> {
        REGISTRY.with(|r| r.borrow().get(&node).map(|(owner, _)| *owner))
    }

    fn set_addr(node: Hash, addr: &AccountId) -> DispatchResult {
        ADDRESSES.with(|a| {
            a.borrow_mut().insert(node, *addr);
        });
        Ok(())
    }
}

/// A policy most tests start from: 10% commission, no discount, one minute
/// commitment age.
pub fn default_configuration() -> Configuration<Balance, Moment> {
    Configuration {
        min_length: 3,
        max_length: 32,
        min_duration: 1,
        max_duration: 5,
        fee_percentage: PERCENT_100 / 10,
        discount: 0,
        min_commitment_age: 60,
    }
}

/// Stores `config` and binds `partner` to it, returning the new config id.
pub fn setup_partner(
    partner: AccountId,
    config: Configuration<Balance, Moment>,
) -> partner_types::ConfigId {
    let id = crate::partner_configuration::NextConfigId::<Test>::get();
    frame_support::assert_ok!(PartnerConfigurations::create_configuration(
        RuntimeOrigin::signed(OWNER),
        config
    ));
    frame_support::assert_ok!(PartnerManager::add_partner(
        RuntimeOrigin::signed(OWNER),
        partner,
        id
    ));
    id
}

pub fn advance_secs(secs: u64) {
    Timestamp::set_timestamp(Timestamp::get() + secs * 1000);
}

// Build genesis storage according to the mock Test.
pub fn new_test_ext() -> sp_io::TestExternalities {
    REGISTRY.with(|r| r.borrow_mut().clear());
    ADDRESSES.with(|a| a.borrow_mut().clear());

    let mut t = frame_system::GenesisConfig::default()
        .build_storage::<Test>()
        .unwrap();

    pallet_balances::GenesisConfig::<Test> {
        balances: vec![
            (OWNER, 10 * UNIT),
            (OPERATOR, 10 * UNIT),
            (PARTNER_1, 10 * UNIT),
            (PARTNER_2, 10 * UNIT),
            (BUYER, 1_000 * UNIT),
            (POOR_BUYER, 1),
            (WHITELISTED, 100 * UNIT),
            (STRANGER, 10 * UNIT),
            (POOL, 1),
            (ESCROW, 1),
        ],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    crate::access_control::GenesisConfig::<Test> {
        owner: Some(OWNER),
        operators: vec![OPERATOR],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    crate::fee_manager::GenesisConfig::<Test> {
        whitelist: vec![WHITELISTED],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    crate::registrar::GenesisConfig::<Test> {
        pool: Some(POOL),
        tlds: vec![ALT_TLD],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    crate::renewer::GenesisConfig::<Test> { pool: Some(POOL) }
        .assimilate_storage(&mut t)
        .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        Timestamp::set_timestamp(INIT_TIMESTAMP_SECS * 1000);
    });
    ext
}
