//! # Partner manager
//!
//! Binds reseller accounts to configuration records. A partner exists exactly
//! while a binding is stored; the registrar and the renewer consult this map
//! on every sale.

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use crate::traits::ConfigurationManager;
    use frame_support::{pallet_prelude::*, traits::EnsureOrigin};
    use frame_system::pallet_prelude::*;
    use partner_types::ConfigId;
    use sp_std::vec::Vec;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type Configurations: ConfigurationManager;

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    /// `partner` -> the configuration record it sells under.
    #[pallet::storage]
    pub type Partners<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, ConfigId>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub partners: Vec<(T::AccountId, ConfigId)>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig {
                partners: Vec::with_capacity(0),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            for (partner, id) in self.partners.iter() {
                assert!(
                    T::Configurations::exists(*id),
                    "genesis partner bound to an unknown configuration"
                );
                Partners::<T>::insert(partner, id);
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        PartnerAdded {
            partner: T::AccountId,
            configuration: ConfigId,
        },
        PartnerRemoved {
            partner: T::AccountId,
        },
        PartnerConfigurationChanged {
            partner: T::AccountId,
            configuration: ConfigId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// The account is already registered as a partner.
        PartnerAlreadyExists,
        /// The account is not a registered partner.
        InvalidPartner,
        /// The configuration id does not name a stored record.
        InvalidConfiguration,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Registers `partner` under an existing configuration record.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::add_partner())]
        pub fn add_partner(
            origin: OriginFor<T>,
            partner: T::AccountId,
            configuration: ConfigId,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            ensure!(
                !Partners::<T>::contains_key(&partner),
                Error::<T>::PartnerAlreadyExists
            );
            ensure!(
                T::Configurations::exists(configuration),
                Error::<T>::InvalidConfiguration
            );

            Partners::<T>::insert(&partner, configuration);

            Self::deposit_event(Event::<T>::PartnerAdded {
                partner,
                configuration,
            });
            Ok(())
        }

        /// Clears a partner binding. Succeeds even when the account was never
        /// a partner.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::remove_partner())]
        pub fn remove_partner(origin: OriginFor<T>, partner: T::AccountId) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            Partners::<T>::remove(&partner);

            Self::deposit_event(Event::<T>::PartnerRemoved { partner });
            Ok(())
        }

        /// Rebinds an existing partner to another configuration record.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::set_partner_configuration())]
        pub fn set_partner_configuration(
            origin: OriginFor<T>,
            partner: T::AccountId,
            configuration: ConfigId,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            ensure!(
                Partners::<T>::contains_key(&partner),
                Error::<T>::InvalidPartner
            );
            ensure!(
                T::Configurations::exists(configuration),
                Error::<T>::InvalidConfiguration
            );

            Partners::<T>::insert(&partner, configuration);

            Self::deposit_event(Event::<T>::PartnerConfigurationChanged {
                partner,
                configuration,
            });
            Ok(())
        }
    }
}

use crate::traits::{ConfigurationManager, PartnerRegistry};
use frame_support::dispatch::Weight;
use partner_types::Configuration;

pub trait WeightInfo {
    fn add_partner() -> Weight;
    fn remove_partner() -> Weight;
    fn set_partner_configuration() -> Weight;
}

impl WeightInfo for () {
    fn add_partner() -> Weight {
        Weight::zero()
    }

    fn remove_partner() -> Weight {
        Weight::zero()
    }

    fn set_partner_configuration() -> Weight {
        Weight::zero()
    }
}

impl<T: Config> PartnerRegistry for Pallet<T> {
    type AccountId = T::AccountId;
    type Balance = <T::Configurations as ConfigurationManager>::Balance;
    type Moment = <T::Configurations as ConfigurationManager>::Moment;

    fn is_partner(who: &Self::AccountId) -> bool {
        Partners::<T>::contains_key(who)
    }

    fn partner_configuration(
        who: &Self::AccountId,
    ) -> Option<Configuration<Self::Balance, Self::Moment>> {
        Partners::<T>::get(who).and_then(T::Configurations::configuration)
    }
}
