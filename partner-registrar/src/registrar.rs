//! # Registrar
//!
//! Orchestrates the commit-reveal-register flow on behalf of partners. The
//! registrar never owns names itself: it validates the sale against the
//! partner's policy, moves the payment (commission to the fee manager, the
//! remainder to the pool account) and finalizes ownership in the external
//! registry.
//!
//! ## Introduction
//!
//! A commitment key walks absent -> committed -> revealable -> consumed.
//! "Revealable" is a timestamp comparison made at call time, never a wait.
//! Partners whose configuration carries `min_commitment_age == 0` skip the
//! commitment step entirely; for them `commit` is an error, not a no-op.
//!
//! Some of the methods in this module move money, so review them with care:
//! every policy check runs before the first token transfer, and the whole
//! call is transactional.
//!
//! ### Module functions
//!
//! - `commit` - stores a commitment hash for a later reveal
//! - `register` - validates, collects payment and mints ownership
//! - `set_pool` - changes the pool account, requires manager privileges
//! - `add_tld` / `remove_tld` - maintains the extra-TLD whitelist

pub use pallet::*;

type BalanceOf<T> = <<T as Config>::Currency as frame_support::traits::Currency<
    <T as frame_system::Config>::AccountId,
>>::Balance;

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use crate::traits::{
        ConfigurationManager, FeeCollector, IntoMoment, Label, NameRegistry, PartnerRegistry,
    };
    use frame_support::{
        pallet_prelude::*,
        traits::{Currency, EnsureOrigin, ExistenceRequirement, UnixTime},
        Twox64Concat,
    };
    use frame_system::{ensure_signed, pallet_prelude::*};
    use scale_info::TypeInfo;
    use sp_io::hashing::keccak_256;
    use sp_runtime::traits::{AtLeast32BitUnsigned, CheckedAdd, MaybeSerializeDeserialize, Zero};
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

        type NowProvider: UnixTime;

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

        type ManagerOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        /// Node of the default TLD every registration lands under when no
        /// explicit TLD is given.
        #[pallet::constant]
        type BaseNode: Get<Self::Hash>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    #[pallet::generate_store(pub(super) trait Store)]
    pub struct Pallet<T>(_);

    /// `commitment hash` -> the moment it was stored.
    #[pallet::storage]
    pub type Commitments<T: Config> = StorageMap<_, Blake2_128Concat, T::Hash, T::Moment>;

    /// Recipient of the non-commission share of every sale.
    #[pallet::storage]
    pub type Pool<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Additional TLD nodes accepted besides `BaseNode`.
    #[pallet::storage]
    pub type Tlds<T: Config> = StorageMap<_, Twox64Concat, T::Hash, (), ValueQuery>;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub pool: Option<T::AccountId>,
        pub tlds: Vec<T::Hash>,
    }

    #[cfg(feature = "std")]
    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            GenesisConfig {
                pool: None,
                tlds: Vec::with_capacity(0),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> GenesisBuild<T> for GenesisConfig<T> {
        fn build(&self) {
            if let Some(pool) = self.pool.as_ref() {
                Pool::<T>::put(pool);
            }
            for tld in self.tlds.iter() {
                Tlds::<T>::insert(tld, ());
            }
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A sale went through: ownership minted, payment split.
        NameRegistered {
            name: Vec<u8>,
            node: T::Hash,
            owner: T::AccountId,
            partner: T::AccountId,
            duration: u32,
            expire: T::Moment,
            cost: BalanceOf<T>,
        },
        PoolChanged {
            old: Option<T::AccountId>,
            new: T::AccountId,
        },
        TldAdded {
            tld: T::Hash,
        },
        TldRemoved {
            tld: T::Hash,
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
        /// This partner registers in one step; commitments are not accepted.
        CommitmentNotRequired,
        /// No matching commitment is revealable yet.
        NoCommitmentFound,
        /// The name is already registered.
        Occupied,
        /// No pool account has been configured.
        PoolNotConfigured,
        /// The setter would write the value already stored.
        ValueUnchanged,
        /// The transferred amount does not cover the effective price.
        InsufficientPayment,
        /// The token-callback payload is not a registration payload.
        InvalidData,
    }

    impl<T: Config> Pallet<T> {
        pub fn now() -> T::Moment {
            IntoMoment::<T>::into_moment(T::NowProvider::now())
        }

        /// Resolves the caller-supplied TLD to a node, defaulting to
        /// `BaseNode`.
        pub fn resolve_tld(tld: Option<T::Hash>) -> Result<T::Hash, DispatchError> {
            match tld {
                None => Ok(T::BaseNode::get()),
                Some(node) => {
                    ensure!(
                        node == T::BaseNode::get() || Tlds::<T>::contains_key(node),
                        Error::<T>::UnsupportedTld
                    );
                    Ok(node)
                }
            }
        }

        /// Content hash binding every parameter of a future registration,
        /// TLD included, so the same label commits independently per TLD.
        pub fn commitment_hash(
            label_node: &T::Hash,
            owner: &T::AccountId,
            secret: &[u8; 32],
            duration: u32,
            resolved: Option<&T::AccountId>,
            partner: &T::AccountId,
            tld_node: &T::Hash,
        ) -> T::Hash {
            let encoded =
                (label_node, owner, secret, duration, resolved, partner, tld_node).encode();
            sp_core::convert_hash::<T::Hash, [u8; 32]>(&keccak_256(&encoded))
        }

        /// Pure commitment builder for clients. `None` when the label does
        /// not parse or the TLD is unknown.
        pub fn make_commitment(
            name: &[u8],
            owner: &T::AccountId,
            secret: &[u8; 32],
            duration: u32,
            resolved: Option<&T::AccountId>,
            partner: &T::AccountId,
            tld: Option<T::Hash>,
        ) -> Option<T::Hash> {
            let (label, _) = Label::<T::Hash>::new(name)?;
            let tld_node = Self::resolve_tld(tld).ok()?;
            Some(Self::commitment_hash(
                &label.node,
                owner,
                secret,
                duration,
                resolved,
                partner,
                &tld_node,
            ))
        }

        /// Whether `commitment` exists and has aged past the partner's
        /// minimum. Always false for unknown partners or commitments.
        pub fn can_reveal(commitment: T::Hash, partner: &T::AccountId) -> bool {
            let config = match T::Partners::partner_configuration(partner) {
                Some(config) => config,
                None => return false,
            };
            match Commitments::<T>::get(commitment) {
                Some(committed_at) => match committed_at.checked_add(&config.min_commitment_age) {
                    Some(revealable_at) => Self::now() >= revealable_at,
                    None => false,
                },
                None => false,
            }
        }

        /// Quote for registering `duration` years under `partner`'s policy.
        pub fn register_price(partner: &T::AccountId, duration: u32) -> Option<BalanceOf<T>> {
            let config = T::Partners::partner_configuration(partner)?;
            T::Configurations::effective_price(&config, duration)
        }

        pub(crate) fn do_commit(partner: &T::AccountId, commitment: T::Hash) -> DispatchResult {
            let config =
                T::Partners::partner_configuration(partner).ok_or(Error::<T>::NotAPartner)?;
            ensure!(
                !config.min_commitment_age.is_zero(),
                Error::<T>::CommitmentNotRequired
            );

            Commitments::<T>::insert(commitment, Self::now());
            Ok(())
        }

        /// Shared body of the two- and one-step registration paths.
        ///
        /// `max_payment` carries the amount announced by a token transfer in
        /// the one-step path; only the effective price is ever pulled from
        /// the payer, so an overpayment never leaves the buyer's account.
        #[allow(clippy::too_many_arguments)]
        #[frame_support::require_transactional]
        pub(crate) fn do_register(
            payer: &T::AccountId,
            name: &[u8],
            owner: T::AccountId,
            secret: [u8; 32],
            duration: u32,
            resolved: Option<T::AccountId>,
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

            let tld_node = Self::resolve_tld(tld)?;
            let node = label.encode_with_node(&tld_node);

            if !config.min_commitment_age.is_zero() {
                let commitment = Self::commitment_hash(
                    &label.node,
                    &owner,
                    &secret,
                    duration,
                    resolved.as_ref(),
                    &partner,
                    &tld_node,
                );
                let committed_at =
                    Commitments::<T>::get(commitment).ok_or(Error::<T>::NoCommitmentFound)?;
                let revealable_at = committed_at
                    .checked_add(&config.min_commitment_age)
                    .ok_or(ArithmeticError::Overflow)?;
                ensure!(Self::now() >= revealable_at, Error::<T>::NoCommitmentFound);
                // consume it, the same parameters cannot be replayed
                Commitments::<T>::remove(commitment);
            }

            ensure!(T::Registry::available(node), Error::<T>::Occupied);

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

            let expire = T::Registry::register(node, &owner, duration)?;
            if let Some(addr) = resolved.as_ref() {
                T::Registry::set_addr(node, addr)?;
            }

            Self::deposit_event(Event::<T>::NameRegistered {
                name: name.to_vec(),
                node,
                owner,
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
        /// Stores a commitment for a later `register`. Re-committing the
        /// same hash restarts its age.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::commit())]
        pub fn commit(
            origin: OriginFor<T>,
            commitment: T::Hash,
            partner: T::AccountId,
        ) -> DispatchResult {
            let _who = ensure_signed(origin)?;

            Self::do_commit(&partner, commitment)
        }

        /// Registers `name` for `owner` under `partner`'s policy, paying from
        /// the caller's account.
        ///
        /// Ensure: when the partner requires commitments, a revealable
        /// commitment over exactly these parameters must exist.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::register(name.len() as u32))]
        #[frame_support::transactional]
        #[allow(clippy::too_many_arguments)]
        pub fn register(
            origin: OriginFor<T>,
            name: Vec<u8>,
            owner: T::AccountId,
            secret: [u8; 32],
            duration: u32,
            resolved: Option<T::AccountId>,
            partner: T::AccountId,
            tld: Option<T::Hash>,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;

            Self::do_register(
                &caller, &name, owner, secret, duration, resolved, partner, tld, None,
            )
        }

        /// Points the pool at another account. Writing the stored value back
        /// is rejected so a misdirected call cannot pass silently.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::set_pool())]
        pub fn set_pool(origin: OriginFor<T>, pool: T::AccountId) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            let old = Pool::<T>::get();
            ensure!(old.as_ref() != Some(&pool), Error::<T>::ValueUnchanged);
            Pool::<T>::put(&pool);

            Self::deposit_event(Event::<T>::PoolChanged { old, new: pool });
            Ok(())
        }

        /// Whitelists an additional TLD node.
        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::add_tld())]
        pub fn add_tld(origin: OriginFor<T>, tld: T::Hash) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            Tlds::<T>::insert(tld, ());

            Self::deposit_event(Event::<T>::TldAdded { tld });
            Ok(())
        }

        /// Drops a TLD node from the whitelist.
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::remove_tld())]
        pub fn remove_tld(origin: OriginFor<T>, tld: T::Hash) -> DispatchResult {
            let _who = T::ManagerOrigin::ensure_origin(origin)?;

            Tlds::<T>::remove(tld);

            Self::deposit_event(Event::<T>::TldRemoved { tld });
            Ok(())
        }
    }
}

use crate::traits::{IntoMoment, RegistrarCall, TldSet, TokenTransferNotify};
use codec::Decode;
use frame_support::dispatch::{DispatchResult, Weight};
use frame_support::traits::Get;
use partner_types::TokenCall;
use sp_runtime::traits::SaturatedConversion;

pub trait WeightInfo {
    fn commit() -> Weight;
    fn register(len: u32) -> Weight;
    fn set_pool() -> Weight;
    fn add_tld() -> Weight;
    fn remove_tld() -> Weight;
}

impl WeightInfo for () {
    fn commit() -> Weight {
        Weight::zero()
    }

    fn register(_len: u32) -> Weight {
        Weight::zero()
    }

    fn set_pool() -> Weight {
        Weight::zero()
    }

    fn add_tld() -> Weight {
        Weight::zero()
    }

    fn remove_tld() -> Weight {
        Weight::zero()
    }
}

impl<T: Config> IntoMoment<T> for core::time::Duration {
    type Moment = T::Moment;

    fn into_moment(self) -> Self::Moment {
        let seconds = self.as_secs();
        SaturatedConversion::saturated_from(seconds)
    }
}

impl<T: Config> TldSet for Pallet<T> {
    type Hash = T::Hash;

    fn is_supported(tld: &Self::Hash) -> bool {
        *tld == T::BaseNode::get() || Tlds::<T>::contains_key(tld)
    }

    fn base_node() -> Self::Hash {
        T::BaseNode::get()
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
            TokenCall::Register {
                name,
                owner,
                secret,
                duration,
                resolved,
                partner,
                tld,
            } => Self::do_register(
                from,
                &name,
                owner,
                secret,
                duration,
                resolved,
                partner,
                tld,
                Some(amount),
            ),
            TokenCall::Renew { .. } => Err(Error::<T>::InvalidData.into()),
        }
    }
}

impl<T: Config> RegistrarCall for Pallet<T> {
    type AccountId = T::AccountId;
    type Hash = T::Hash;

    fn commit(partner: &Self::AccountId, commitment: Self::Hash) -> DispatchResult {
        Self::do_commit(partner, commitment)
    }

    fn register(
        payer: &Self::AccountId,
        name: &[u8],
        owner: Self::AccountId,
        secret: [u8; 32],
        duration: u32,
        resolved: Option<Self::AccountId>,
        partner: Self::AccountId,
        tld: Option<Self::Hash>,
    ) -> DispatchResult {
        Self::do_register(
            payer, name, owner, secret, duration, resolved, partner, tld, None,
        )
    }
}
