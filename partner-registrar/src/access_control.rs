//! # Access control
//!
//! This module holds the two roles consulted by every gated mutator in the
//! workspace: a single transferable owner and a set of high-level operators
//! managed by that owner.
//!
//! ## Introduction
//!
//! The owner is always implicitly an operator. Transferring ownership also
//! swaps operator membership in the same call, so the outgoing owner keeps no
//! residual authority.
//!
//! ### Module functions
//!
//! - `transfer_ownership` - hands the owner role to another account
//! - `add_operator` - grants high-level operator membership (owner only)
//! - `remove_operator` - revokes high-level operator membership (owner only)

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use super::WeightInfo;
    use frame_support::pallet_prelude::*;
    use frame_system::pallet_prelude::*;
    use sp_std::vec::Vec;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    #[pallet::storage]
    pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// High-level operators, owner excluded (the owner qualifies implicitly).
    #[pallet::storage]
    pub type Operators<T: Config> = StorageMap<_, Twox64Concat, T::AccountId, ()>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub owner: Option<T::AccountId>,
        pub operators: Vec<T::AccountId>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig {
                owner: None,
                operators: Vec::with_capacity(0),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            if let Some(owner) = self.owner.as_ref() {
                Owner::<T>::put(owner);
            }
            for operator in self.operators.iter() {
                Operators::<T>::insert(operator, ());
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        OwnershipTransferred {
            old: T::AccountId,
            new: T::AccountId,
        },
        OperatorAdded {
            operator: T::AccountId,
        },
        OperatorRemoved {
            operator: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// The caller does not hold the owner role.
        NotOwner,
    }

    impl<T: Config> Pallet<T> {
        pub fn is_owner(who: &T::AccountId) -> bool {
            Owner::<T>::get().map_or(false, |owner| &owner == who)
        }

        pub fn is_operator(who: &T::AccountId) -> bool {
            Self::is_owner(who) || Operators::<T>::contains_key(who)
        }

        fn ensure_owner(who: &T::AccountId) -> DispatchResult {
            ensure!(Self::is_owner(who), Error::<T>::NotOwner);
            Ok(())
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Hands the owner role to `new_owner`. The outgoing owner loses its
        /// operator membership and the incoming owner gains it, atomically.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::transfer_ownership())]
        pub fn transfer_ownership(origin: OriginFor<T>, new_owner: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_owner(&who)?;

            Operators::<T>::remove(&who);
            Operators::<T>::insert(&new_owner, ());
            Owner::<T>::put(&new_owner);

            Self::deposit_event(Event::<T>::OwnershipTransferred {
                old: who,
                new: new_owner,
            });
            Ok(())
        }

        /// Grants high-level operator membership. Idempotent.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::add_operator())]
        pub fn add_operator(origin: OriginFor<T>, operator: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_owner(&who)?;

            Operators::<T>::insert(&operator, ());

            Self::deposit_event(Event::<T>::OperatorAdded { operator });
            Ok(())
        }

        /// Revokes high-level operator membership. Removing a non-member
        /// succeeds without effect.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::remove_operator())]
        pub fn remove_operator(origin: OriginFor<T>, operator: T::AccountId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::ensure_owner(&who)?;

            Operators::<T>::remove(&operator);

            Self::deposit_event(Event::<T>::OperatorRemoved { operator });
            Ok(())
        }
    }
}

use frame_support::traits::EnsureOrigin;
use frame_system::RawOrigin;

impl<T: Config> EnsureOrigin<T::RuntimeOrigin> for Pallet<T> {
    type Success = T::AccountId;
    fn try_origin(o: T::RuntimeOrigin) -> Result<Self::Success, T::RuntimeOrigin> {
        o.into().and_then(|o| match o {
            RawOrigin::<T::AccountId>::Signed(who) if Pallet::<T>::is_operator(&who) => Ok(who),
            r => Err(T::RuntimeOrigin::from(r)),
        })
    }

    #[cfg(feature = "runtime-benchmarks")]
    fn successful_origin() -> T::RuntimeOrigin {
        use codec::Decode;

        if let Some(owner) = Owner::<T>::get() {
            return T::RuntimeOrigin::from(RawOrigin::Signed(owner));
        }

        let zero_account_id =
            T::AccountId::decode(&mut sp_runtime::traits::TrailingZeroInput::zeroes())
                .expect("infinite length input; no invalid inputs for type; qed");

        T::RuntimeOrigin::from(RawOrigin::Signed(zero_account_id))
    }
}

use frame_support::dispatch::Weight;

pub trait WeightInfo {
    fn transfer_ownership() -> Weight;
    fn add_operator() -> Weight;
    fn remove_operator() -> Weight;
}

impl WeightInfo for () {
    fn transfer_ownership() -> Weight {
        Weight::zero()
    }

    fn add_operator() -> Weight {
        Weight::zero()
    }

    fn remove_operator() -> Weight {
        Weight::zero()
    }
}
