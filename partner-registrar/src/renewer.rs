//! # Renewer
//!
//! Extends existing registrations on behalf of partners. Renewal shares the
//! registrar's policy validation and commission split but has no commitment
//! step: the name is already owned, so there is nothing to front-run.

pub use pallet::*;

type BalanceOf<T> = <<T as Config>::Currency as frame_support::traits::Currency<
    <T as frame_system::Config>::AccountId,
>>::Balance;

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use crate::traits::{
        ConfigurationManager, FeeCollector, Label, NameRegistry, PartnerRegistry, TldSet,
    };
    use frame_support::{
        pallet_prelude::*,
        traits::{Currency, EnsureOrigin, ExistenceRequirement},
    };
    use frame_system::{ensure_signed, pallet_prelude::*};
    use scale_info::TypeInfo;
    use sp_runtime::traits::{AtLeast32BitUnsigned, MaybeSerializeDeserialize, Zero};
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

        type Partners: PartnerRegistry<
            AccountId = Self::AccountId,
            Balance = BalanceOf<Self>,
            Moment = Self::Moment,
        >;

        type Configurations: ConfigurationManager<Balance = BalanceOf<Self>, Moment = Self::Moment>;

        type Fees: FeeCollector<AccountId = Self::AccountId, Balance = BalanceOf<Self>>;

        type Registry: NameRegistry<
            AccountId = Self::AccountId,
            Hash = Self::Hash,
            Moment = Self::Moment,
        >;

        /// TLD whitelist shared with the registrar.
        type Tlds: TldSet<Hash = Self::Hash>;

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    /// Recipient of the non-commission share of every renewal.
    #[pallet::storage]
    pub type Pool<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub pool: Option<T::AccountId>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig { pool: None }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            if let Some(pool) = self.pool.as_ref() {
                Pool::<T>::put(pool);
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// An expiration was pushed out and the payment split.
        NameRenewed {
            name: Vec<u8>,
            node: T::Hash,
            partner: T::AccountId,
            duration: u32,
            expire: T::Moment,
            cost: BalanceOf<T>,
        },
        PoolChanged {
            old: Option<T::AccountId>,
            new: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// The named account is not a registered partner.
        NotAPartner,
        /// The label failed to parse or its codepoint length is outside the
        /// partner's bounds.
        InvalidName,
        /// The duration is outside the partner's bounds.
        InvalidDuration,
        /// The TLD node is neither the base node nor whitelisted.
        UnsupportedTld,
        /// No pool account has been configured.
        PoolNotConfigured,
        /// The setter would write the value already stored.
        ValueUnchanged,
        /// The transferred amount does not cover the effective price.
        InsufficientPayment,
        /// The token-callback payload is not a renewal payload.
        InvalidData,
    }

    impl<T: Config> Pallet<T> {
        /// Quote for extending a name `duration` years under `partner`'s
        /// policy. Renewals price exactly like registrations.
        pub fn renew_price(partner: &T::AccountId, duration: u32) -> Option<BalanceOf<T>> {
            let config = T::Partners::partner_configuration(partner)?;
            T::Configurations::effective_price(&config, duration)
        }

        #[frame_support::require_transactional]
        pub(crate) fn do_renew(
            payer: &T::AccountId,
            name: &[u8],
            duration: u32,
            partner: T::AccountId,
            tld: Option<T::Hash>,
            max_payment: Option<BalanceOf<T>>,
        ) -> DispatchResult {
            let config =
                T::Partners::partner_configuration(&partner).ok_or(Error::<T>::NotAPartner)?;

            let (label, label_len) = Label::<T::Hash>::new(name).ok_or(Error::<T>::InvalidName)?;
            ensure!(
                label_len >= config.min_length && label_len <= config.max_length,
                Error::<T>::InvalidName
            );
            ensure!(
                duration >= config.min_duration && duration <= config.max_duration,
                Error::<T>::InvalidDuration
            );

            let tld_node = match tld {
                None => T::Tlds::base_node(),
                Some(node) => {
                    ensure!(T::Tlds::is_supported(&node), Error::<T>::UnsupportedTld);
                    node
                }
            };
            let node = label.encode_with_node(&tld_node);

            let price = T::Configurations::effective_price(&config, duration)
                .ok_or(ArithmeticError::Overflow)?;
            if let Some(limit) = max_payment {
                ensure!(limit >= price, Error::<T>::InsufficientPayment);
            }
            let (fee, remainder) = T::Configurations::commission_split(&config, price)
                .ok_or(ArithmeticError::Overflow)?;

            if !fee.is_zero() {
                T::Fees::deposit(payer, &partner, fee)?;
            }
            if !remainder.is_zero() {
                let pool = Pool::<T>::get().ok_or(Error::<T>::PoolNotConfigured)?;
                T::Currency::transfer(payer, &pool, remainder, ExistenceRequirement::KeepAlive)?;
            }

            let expire = T::Registry::renew(node, duration)?;

            Self::deposit_event(Event::<T>::NameRenewed {
                name: name.to_vec(),
                node,
                partner,
                duration,
                expire,
                cost: price,
            });
            Ok(())
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Extends `name` by `duration` years, paying from the caller's
        /// account.
        ///
        /// Note: there is no fixed relationship between the caller and the
        /// name; whoever pays, renews.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::renew(name.len() as u32))]
        #[frame_support::transactional]
        pub fn renew(
            origin: OriginFor<T>,
            name: Vec<u8>,
            duration: u32,
            partner: T::AccountId,
            tld: Option<T::Hash>,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;

            Self::do_renew(&caller, &name, duration, partner, tld, None)
        }

        /// Points the pool at another account. Writing the stored value back
        /// is rejected so a misdirected call cannot pass silently.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::set_pool())]
        pub fn set_pool(origin: OriginFor<T>, pool: T::AccountId) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let old = Pool::<T>::get();
            ensure!(old.as_ref() != Some(&pool), Error::<T>::ValueUnchanged);
            Pool::<T>::put(&pool);

            Self::deposit_event(Event::<T>::PoolChanged { old, new: pool });
            Ok(())
        }
    }
}

use crate::traits::{RenewerCall, TokenTransferNotify};
use codec::Decode;
use frame_support::dispatch::{DispatchResult, Weight};
use partner_types::TokenCall;

pub trait WeightInfo {
    fn renew(len: u32) -> Weight;
    fn set_pool() -> Weight;
}

impl WeightInfo for () {
    fn renew(_len: u32) -> Weight {
        Weight::zero()
    }

    fn set_pool() -> Weight {
        Weight::zero()
    }
}

impl<T: Config> TokenTransferNotify for Pallet<T> {
    type AccountId = T::AccountId;
    type Balance = BalanceOf<T>;

    fn token_fallback(
        from: &Self::AccountId,
        amount: Self::Balance,
        mut data: &[u8],
    ) -> DispatchResult {
        let call = TokenCall::<T::AccountId, T::Hash>::decode(&mut data)
            .map_err(|_| Error::<T>::InvalidData)?;
        match call {
            TokenCall::Renew {
                name,
                duration,
                partner,
                tld,
            } => Self::do_renew(from, &name, duration, partner, tld, Some(amount)),
            TokenCall::Register { .. } => Err(Error::<T>::InvalidData.into()),
        }
    }
}

impl<T: Config> RenewerCall for Pallet<T> {
    type AccountId = T::AccountId;
    type Hash = T::Hash;

    fn renew(
        payer: &Self::AccountId,
        name: &[u8],
        duration: u32,
        partner: Self::AccountId,
        tld: Option<Self::Hash>,
    ) -> DispatchResult {
        Self::do_renew(payer, name, duration, partner, tld, None)
    }
}
