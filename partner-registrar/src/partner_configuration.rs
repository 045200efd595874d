//! # Partner configuration
//!
//! Stores the policy records partners are bound to and owns all pricing
//! arithmetic. A record can be shared by several partners; every mutation
//! revalidates the whole record, so an invariant-breaking value can never be
//! observed by the registrar or the renewer.

pub use pallet::*;

type BalanceOf<T> = <<T as Config>::Currency as frame_support::traits::Currency<
    <T as frame_system::Config>::AccountId,
>>::Balance;

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use frame_support::{
        pallet_prelude::*,
        traits::{Currency, EnsureOrigin},
    };
    use frame_system::pallet_prelude::*;
    use partner_types::{ConfigId, Configuration};
    use scale_info::TypeInfo;
    use sp_runtime::traits::{AtLeast32BitUnsigned, MaybeSerializeDeserialize};
    use sp_runtime::ArithmeticError;
    use sp_std::vec::Vec;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type Currency: Currency<Self::AccountId>;

        type Moment: Clone
            + Copy
            + Decode
            + Encode
            + Eq
            + PartialEq
            + core::fmt::Debug
            + Default
            + TypeInfo
            + AtLeast32BitUnsigned
            + MaybeSerializeDeserialize
            + MaxEncodedLen;

        /// Price of one registration-year before tiering.
        #[pallet::constant]
        type UnitPrice: Get<BalanceOf<Self>>;

        /// Fixed-point denominator: this value means 100%.
        #[pallet::constant]
        type PercentScale: Get<BalanceOf<Self>>;

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    pub type ConfigurationOf<T> = Configuration<BalanceOf<T>, <T as Config>::Moment>;

    #[pallet::storage]
    pub type Configurations<T: Config> =
        StorageMap<_, Twox64Concat, ConfigId, ConfigurationOf<T>>;

    #[pallet::storage]
    pub type NextConfigId<T: Config> = StorageValue<_, ConfigId, ValueQuery>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub configurations: Vec<ConfigurationOf<T>>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig {
                configurations: Vec::with_capacity(0),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            let scale = T::PercentScale::get();
            for (id, config) in self.configurations.iter().enumerate() {
                assert!(
                    config.validate(scale),
                    "genesis partner configuration violates its invariants"
                );
                Configurations::<T>::insert(id as ConfigId, config);
            }
            NextConfigId::<T>::put(self.configurations.len() as ConfigId);
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        ConfigurationCreated {
            id: ConfigId,
        },
        MinLengthChanged {
            id: ConfigId,
            old: u32,
            new: u32,
        },
        MaxLengthChanged {
            id: ConfigId,
            old: u32,
            new: u32,
        },
        MinDurationChanged {
            id: ConfigId,
            old: u32,
            new: u32,
        },
        MaxDurationChanged {
            id: ConfigId,
            old: u32,
            new: u32,
        },
        FeePercentageChanged {
            id: ConfigId,
            old: BalanceOf<T>,
            new: BalanceOf<T>,
        },
        DiscountChanged {
            id: ConfigId,
            old: BalanceOf<T>,
            new: BalanceOf<T>,
        },
        MinCommitmentAgeChanged {
            id: ConfigId,
            old: T::Moment,
            new: T::Moment,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// No configuration is stored under this id.
        ConfigurationNotFound,
        /// The value would break a cross-field invariant of the record.
        InvalidConfiguration,
    }

    impl<T: Config> Pallet<T> {
        /// Applies `mutate` to the stored record, then revalidates it. The
        /// write is discarded when the mutated record is inconsistent.
        fn update_configuration(
            id: ConfigId,
            mutate: impl FnOnce(&mut ConfigurationOf<T>),
        ) -> DispatchResult {
            Configurations::<T>::try_mutate(id, |maybe| -> DispatchResult {
                let config = maybe.as_mut().ok_or(Error::<T>::ConfigurationNotFound)?;
                mutate(config);
                ensure!(
                    config.validate(T::PercentScale::get()),
                    Error::<T>::InvalidConfiguration
                );
                Ok(())
            })
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Stores a new configuration record under the next free id.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::create_configuration())]
        pub fn create_configuration(
            origin: OriginFor<T>,
            config: ConfigurationOf<T>,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            ensure!(
                config.validate(T::PercentScale::get()),
                Error::<T>::InvalidConfiguration
            );

            let id = NextConfigId::<T>::get();
            let next = id.checked_add(1).ok_or(ArithmeticError::Overflow)?;

            Configurations::<T>::insert(id, config);
            NextConfigId::<T>::put(next);

            Self::deposit_event(Event::<T>::ConfigurationCreated { id });
            Ok(())
        }

        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_min_length(origin: OriginFor<T>, id: ConfigId, new: u32) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = 0;
            Self::update_configuration(id, |config| {
                old = config.min_length;
                config.min_length = new;
            })?;

            Self::deposit_event(Event::<T>::MinLengthChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_max_length(origin: OriginFor<T>, id: ConfigId, new: u32) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = 0;
            Self::update_configuration(id, |config| {
                old = config.max_length;
                config.max_length = new;
            })?;

            Self::deposit_event(Event::<T>::MaxLengthChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_min_duration(origin: OriginFor<T>, id: ConfigId, new: u32) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = 0;
            Self::update_configuration(id, |config| {
                old = config.min_duration;
                config.min_duration = new;
            })?;

            Self::deposit_event(Event::<T>::MinDurationChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_max_duration(origin: OriginFor<T>, id: ConfigId, new: u32) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = 0;
            Self::update_configuration(id, |config| {
                old = config.max_duration;
                config.max_duration = new;
            })?;

            Self::deposit_event(Event::<T>::MaxDurationChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_fee_percentage(
            origin: OriginFor<T>,
            id: ConfigId,
            new: BalanceOf<T>,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = BalanceOf::<T>::default();
            Self::update_configuration(id, |config| {
                old = config.fee_percentage;
                config.fee_percentage = new;
            })?;

            Self::deposit_event(Event::<T>::FeePercentageChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_discount(
            origin: OriginFor<T>,
            id: ConfigId,
            new: BalanceOf<T>,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = BalanceOf::<T>::default();
            Self::update_configuration(id, |config| {
                old = config.discount;
                config.discount = new;
            })?;

            Self::deposit_event(Event::<T>::DiscountChanged { id, old, new });
            Ok(())
        }

        #[pallet::call_index(7)]
        #[pallet::weight(T::WeightInfo::set_field())]
        pub fn set_min_commitment_age(
            origin: OriginFor<T>,
            id: ConfigId,
            new: T::Moment,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let mut old = T::Moment::default();
            Self::update_configuration(id, |config| {
                old = config.min_commitment_age;
                config.min_commitment_age = new;
            })?;

            Self::deposit_event(Event::<T>::MinCommitmentAgeChanged { id, old, new });
            Ok(())
        }
    }
}

use crate::traits::ConfigurationManager;
use frame_support::dispatch::Weight;
use frame_support::traits::Get;
use partner_types::{ConfigId, Configuration};

pub trait WeightInfo {
    fn create_configuration() -> Weight;
    fn set_field() -> Weight;
}

impl WeightInfo for () {
    fn create_configuration() -> Weight {
        Weight::zero()
    }

    fn set_field() -> Weight {
        Weight::zero()
    }
}

impl<T: Config> ConfigurationManager for Pallet<T> {
    type Balance = BalanceOf<T>;
    type Moment = T::Moment;

    fn configuration(id: ConfigId) -> Option<Configuration<Self::Balance, Self::Moment>> {
        Configurations::<T>::get(id)
    }

    fn exists(id: ConfigId) -> bool {
        Configurations::<T>::contains_key(id)
    }

    fn effective_price(
        config: &Configuration<Self::Balance, Self::Moment>,
        duration: u32,
    ) -> Option<Self::Balance> {
        config.effective_price(duration, T::UnitPrice::get(), T::PercentScale::get())
    }

    fn commission_split(
        config: &Configuration<Self::Balance, Self::Moment>,
        price: Self::Balance,
    ) -> Option<(Self::Balance, Self::Balance)> {
        config.commission_split(price, T::PercentScale::get())
    }
}
