//! # Fee manager
//!
//! Escrow ledger for partner commissions. Whitelisted registrar/renewer
//! accounts (and the compiled-in pallets) deposit the commission leg of every
//! sale here; partners withdraw their accumulated balance in full.
//!
//! Tokens move into a designated escrow account while the claim is tracked
//! per partner in storage. `withdraw` zeroes the claim before transferring
//! out, so no re-entered call can observe a stale balance.

pub use pallet::*;

type BalanceOf<T> = <<T as Config>::Currency as frame_support::traits::Currency<
    <T as frame_system::Config>::AccountId,
>>::Balance;

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use frame_support::{
        pallet_prelude::*,
        traits::{Currency, EnsureOrigin, ExistenceRequirement},
    };
    use frame_system::pallet_prelude::*;
    use sp_runtime::traits::{CheckedAdd, Zero};
    use sp_runtime::ArithmeticError;
    use sp_std::vec::Vec;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type Currency: Currency<Self::AccountId>;

        /// Account holding escrowed commissions until withdrawal.
        #[pallet::constant]
        type EscrowAccount: Get<Self::AccountId>;

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    /// `partner` -> accumulated, not yet withdrawn commission.
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, BalanceOf<T>, ValueQuery>;

    /// Accounts entitled to call `deposit`.
    #[pallet::storage]
    pub type WhiteList<T: Config> = StorageMap<_, Twox64Concat, T::AccountId, ()>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub whitelist: Vec<T::AccountId>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig {
                whitelist: Vec::with_capacity(0),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            for who in self.whitelist.iter() {
                WhiteList::<T>::insert(who, ());
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        DepositSuccessful {
            partner: T::AccountId,
            amount: BalanceOf<T>,
        },
        WithdrawalSuccessful {
            partner: T::AccountId,
            amount: BalanceOf<T>,
        },
        DepositorWhitelisted {
            who: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// The caller has no deposit rights.
        NotWhitelisted,
        /// Nothing to withdraw.
        ZeroBalance,
    }

    impl<T: Config> Pallet<T> {
        /// Pulls `amount` from `payer` into escrow and credits `partner`.
        /// A zero amount is a no-op: nothing moves, nothing is logged.
        pub(crate) fn do_deposit(
            payer: &T::AccountId,
            partner: &T::AccountId,
            amount: BalanceOf<T>,
        ) -> DispatchResult {
            if amount.is_zero() {
                return Ok(());
            }

            T::Currency::transfer(
                payer,
                &T::EscrowAccount::get(),
                amount,
                ExistenceRequirement::KeepAlive,
            )?;
            Balances::<T>::try_mutate(partner, |balance| -> DispatchResult {
                *balance = balance
                    .checked_add(&amount)
                    .ok_or(ArithmeticError::Overflow)?;
                Ok(())
            })?;

            Self::deposit_event(Event::<T>::DepositSuccessful {
                partner: partner.clone(),
                amount,
            });
            Ok(())
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Credits `partner` with `amount` pulled from the caller, which must
        /// hold deposit rights.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::deposit())]
        #[frame_support::transactional]
        pub fn deposit(
            origin: OriginFor<T>,
            partner: T::AccountId,
            amount: BalanceOf<T>,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;

            ensure!(
                WhiteList::<T>::contains_key(&who),
                Error::<T>::NotWhitelisted
            );

            Self::do_deposit(&who, &partner, amount)
        }

        /// Pays the caller its whole accumulated commission. The ledger entry
        /// is zeroed before the tokens move.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::withdraw())]
        #[frame_support::transactional]
        pub fn withdraw(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;

            let amount = Balances::<T>::take(&who);
            ensure!(!amount.is_zero(), Error::<T>::ZeroBalance);

            T::Currency::transfer(
                &T::EscrowAccount::get(),
                &who,
                amount,
                ExistenceRequirement::AllowDeath,
            )?;

            Self::deposit_event(Event::<T>::WithdrawalSuccessful {
                partner: who,
                amount,
            });
            Ok(())
        }

        /// Grants deposit rights to a registrar or renewer account.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::white_list_registrar_or_renewer())]
        pub fn white_list_registrar_or_renewer(
            origin: OriginFor<T>,
            who: T::AccountId,
        ) -> DispatchResult {
            let _caller = T::ManagerOrigin::ensure_origin(origin)?;

            WhiteList::<T>::insert(&who, ());

            Self::deposit_event(Event::<T>::DepositorWhitelisted { who });
            Ok(())
        }
    }
}

use crate::traits::FeeCollector;
use frame_support::dispatch::Weight;

pub trait WeightInfo {
    fn deposit() -> Weight;
    fn withdraw() -> Weight;
    fn white_list_registrar_or_renewer() -> Weight;
}

impl WeightInfo for () {
    fn deposit() -> Weight {
        Weight::zero()
    }

    fn withdraw() -> Weight {
        Weight::zero()
    }

    fn white_list_registrar_or_renewer() -> Weight {
        Weight::zero()
    }
}

impl<T: Config> FeeCollector for Pallet<T> {
    type AccountId = T::AccountId;
    type Balance = BalanceOf<T>;

    #[frame_support::require_transactional]
    fn deposit(
        payer: &Self::AccountId,
        partner: &Self::AccountId,
        amount: Self::Balance,
    ) -> frame_support::dispatch::DispatchResult {
        Self::do_deposit(payer, partner, amount)
    }
}
