//! # Partner proxy
//!
//! Lets one partner operate several named front-ends against the same
//! registrar and renewer. Instead of one forwarding contract per front-end,
//! a `(partner, name)`-keyed record carries the ownership binding and a
//! single dispatch path supplies the partner identity to the backends.

pub use pallet::*;

#[frame_support::pallet]
pub mod pallet {
    use super::WeightInfo;
    use crate::traits::{RegistrarCall, RenewerCall};
    use frame_support::{pallet_prelude::*, traits::EnsureOrigin};
    use frame_system::pallet_prelude::*;
    use scale_info::TypeInfo;
    use sp_std::vec::Vec;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        type Registrar: RegistrarCall<AccountId = Self::AccountId, Hash = Self::Hash>;

        type Renewer: RenewerCall<AccountId = Self::AccountId, Hash = Self::Hash>;

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        /// Longest accepted proxy display name, in bytes.
        #[pallet::constant]
        type MaxProxyNameLength: Get<u32>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    pub type ProxyNameOf<T> = BoundedVec<u8, <T as Config>::MaxProxyNameLength>;

    /// Immutable binding of a proxy instance. The partner and display name
    /// live in the storage key.
    #[derive(Encode, Decode, PartialEq, Eq, RuntimeDebug, Clone, TypeInfo, MaxEncodedLen)]
    pub struct ProxyRecord<AccountId> {
        /// Account entitled to route calls through this proxy.
        pub owner: AccountId,
    }

    /// `(partner, proxy name)` -> record.
    #[pallet::storage]
    pub type Proxies<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        ProxyNameOf<T>,
        ProxyRecord<T::AccountId>,
    >;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        PartnerProxyCreated {
            partner: T::AccountId,
            name: Vec<u8>,
            owner: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// A proxy with this partner and name already exists.
        ProxyAlreadyExists,
        /// No proxy is stored under this partner and name.
        ProxyNotFound,
        /// Only the proxy owner may route calls through it.
        NotProxyOwner,
        /// The display name exceeds the length bound.
        ProxyNameTooLong,
    }

    impl<T: Config> Pallet<T> {
        pub fn get_partner_proxy(
            partner: &T::AccountId,
            name: &[u8],
        ) -> Option<ProxyRecord<T::AccountId>> {
            let key = ProxyNameOf::<T>::try_from(name.to_vec()).ok()?;
            Proxies::<T>::get(partner, key)
        }

        /// Loads the record and checks the caller against its owner.
        fn authorised(
            caller: &T::AccountId,
            partner: &T::AccountId,
            name: &[u8],
        ) -> Result<ProxyRecord<T::AccountId>, DispatchError> {
            let key = ProxyNameOf::<T>::try_from(name.to_vec())
                .map_err(|_| Error::<T>::ProxyNameTooLong)?;
            let record = Proxies::<T>::get(partner, key).ok_or(Error::<T>::ProxyNotFound)?;
            ensure!(caller == &record.owner, Error::<T>::NotProxyOwner);
            Ok(record)
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Creates a proxy owned by `partner` under `(partner, name)`.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::create_partner_proxy())]
        pub fn create_partner_proxy(
            origin: OriginFor<T>,
            partner: T::AccountId,
            name: Vec<u8>,
        ) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let key = ProxyNameOf::<T>::try_from(name.clone())
                .map_err(|_| Error::<T>::ProxyNameTooLong)?;
            ensure!(
                !Proxies::<T>::contains_key(&partner, &key),
                Error::<T>::ProxyAlreadyExists
            );

            Proxies::<T>::insert(
                &partner,
                &key,
                ProxyRecord {
                    owner: partner.clone(),
                },
            );

            Self::deposit_event(Event::<T>::PartnerProxyCreated {
                partner: partner.clone(),
                name,
                owner: partner,
            });
            Ok(())
        }

        /// Forwards a commitment to the registrar under the bound partner.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::proxy_commit())]
        pub fn proxy_commit(
            origin: OriginFor<T>,
            partner: T::AccountId,
            proxy_name: Vec<u8>,
            commitment: T::Hash,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::authorised(&caller, &partner, &proxy_name)?;

            T::Registrar::commit(&partner, commitment)
        }

        /// Forwards a registration to the registrar with the bound partner
        /// identity auto-supplied; the caller pays.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::proxy_register(name.len() as u32))]
        #[frame_support::transactional]
        #[allow(clippy::too_many_arguments)]
        pub fn proxy_register(
            origin: OriginFor<T>,
            partner: T::AccountId,
            proxy_name: Vec<u8>,
            name: Vec<u8>,
            owner: T::AccountId,
            secret: [u8; 32],
            duration: u32,
            resolved: Option<T::AccountId>,
            tld: Option<T::Hash>,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::authorised(&caller, &partner, &proxy_name)?;

            T::Registrar::register(
                &caller, &name, owner, secret, duration, resolved, partner, tld,
            )
        }

        /// Forwards a renewal to the renewer with the bound partner identity
        /// auto-supplied; the caller pays.
        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::proxy_renew(name.len() as u32))]
        #[frame_support::transactional]
        pub fn proxy_renew(
            origin: OriginFor<T>,
            partner: T::AccountId,
            proxy_name: Vec<u8>,
            name: Vec<u8>,
            duration: u32,
            tld: Option<T::Hash>,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::authorised(&caller, &partner, &proxy_name)?;

            T::Renewer::renew(&caller, &name, duration, partner, tld)
        }
    }
}

use frame_support::dispatch::Weight;

pub trait WeightInfo {
    fn create_partner_proxy() -> Weight;
    fn proxy_commit() -> Weight;
    fn proxy_register(len: u32) -> Weight;
    fn proxy_renew(len: u32) -> Weight;
}

impl WeightInfo for () {
    fn create_partner_proxy() -> Weight {
        Weight::zero()
    }

    fn proxy_commit() -> Weight {
        Weight::zero()
    }

    fn proxy_register(_len: u32) -> Weight {
        Weight::zero()
    }

    fn proxy_renew(_len: u32) -> Weight {
        Weight::zero()
    }
}
