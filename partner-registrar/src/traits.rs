use codec::Encode;
use partner_types::{ConfigId, Configuration};
use sp_io::hashing::keccak_256;
use sp_runtime::{DispatchError, DispatchResult};

/// A single name label, held as the keccak-256 hash of its lowercased form.
pub struct Label<Hash> {
    pub node: Hash,
}

impl<Hash> Label<Hash>
where
    Hash: Default + AsMut<[u8]> + Encode + Clone,
{
    /// Parses a raw label. The label must be valid UTF-8 and free of
    /// separators, whitespace and control characters; everything else is a
    /// per-partner policy decision. The returned length is counted in
    /// codepoints, so a multi-byte or emoji character counts as one.
    pub fn new(data: &[u8]) -> Option<(Self, u32)> {
        let label = core::str::from_utf8(data).ok()?;
        if label.is_empty() {
            return None;
        }
        let mut len: u32 = 0;
        for c in label.chars() {
            if c == '.' || c.is_whitespace() || c.is_control() {
                return None;
            }
            len = len.checked_add(1)?;
        }
        let lowered = label.to_lowercase();
        let node = sp_core::convert_hash::<Hash, [u8; 32]>(&keccak_256(lowered.as_bytes()));
        Some((Self { node }, len))
    }

    /// Derives the registry node of this label under a parent (TLD) node.
    pub fn encode_with_node(&self, node: &Hash) -> Hash {
        let encoded = (node, &self.node).encode();
        sp_core::convert_hash::<Hash, [u8; 32]>(&keccak_256(&encoded))
    }
}

/// Partner whitelist plus the policy attached to each member.
pub trait PartnerRegistry {
    type AccountId;
    type Balance;
    type Moment;

    fn is_partner(who: &Self::AccountId) -> bool;
    fn partner_configuration(
        who: &Self::AccountId,
    ) -> Option<Configuration<Self::Balance, Self::Moment>>;
}

/// Access to stored configuration records and the pricing arithmetic bound
/// to the runtime's unit price and percentage scale.
pub trait ConfigurationManager {
    type Balance;
    type Moment;

    fn configuration(id: ConfigId) -> Option<Configuration<Self::Balance, Self::Moment>>;
    fn exists(id: ConfigId) -> bool;
    fn effective_price(
        config: &Configuration<Self::Balance, Self::Moment>,
        duration: u32,
    ) -> Option<Self::Balance>;
    fn commission_split(
        config: &Configuration<Self::Balance, Self::Moment>,
        price: Self::Balance,
    ) -> Option<(Self::Balance, Self::Balance)>;
}

/// Commission sink: moves the fee leg of a sale out of the payer's account
/// and credits it to the partner's withdrawable ledger balance.
pub trait FeeCollector {
    type AccountId;
    type Balance;

    fn deposit(
        payer: &Self::AccountId,
        partner: &Self::AccountId,
        amount: Self::Balance,
    ) -> DispatchResult;
}

/// The external name-ownership registry. Registration and renewal are
/// finalized here; this system only orchestrates payment and policy.
pub trait NameRegistry {
    type AccountId;
    type Hash;
    type Moment;

    fn available(node: Self::Hash) -> bool;
    /// Mints ownership and returns the new expiration time.
    fn register(
        node: Self::Hash,
        owner: &Self::AccountId,
        duration_years: u32,
    ) -> Result<Self::Moment, DispatchError>;
    /// Extends an existing registration, returning the new expiration time.
    fn renew(node: Self::Hash, duration_years: u32) -> Result<Self::Moment, DispatchError>;
    fn expiration_time(node: Self::Hash) -> Option<Self::Moment>;
    fn owner_of(node: Self::Hash) -> Option<Self::AccountId>;
    /// Binds a resolved address to a freshly registered node.
    fn set_addr(node: Self::Hash, addr: &Self::AccountId) -> DispatchResult;
}

/// Receiver half of the payment token's transfer-with-callback entry point.
/// Only the runtime-wired token implementation can reach this, which is the
/// static equivalent of checking the calling token address.
pub trait TokenTransferNotify {
    type AccountId;
    type Balance;

    fn token_fallback(
        from: &Self::AccountId,
        amount: Self::Balance,
        data: &[u8],
    ) -> DispatchResult;
}

/// The TLD whitelist of the registrar, shared with the renewer.
pub trait TldSet {
    type Hash;

    fn is_supported(tld: &Self::Hash) -> bool;
    fn base_node() -> Self::Hash;
}

/// Registrar entry points available to partner proxies.
pub trait RegistrarCall {
    type AccountId;
    type Hash;

    fn commit(partner: &Self::AccountId, commitment: Self::Hash) -> DispatchResult;
    #[allow(clippy::too_many_arguments)]
    fn register(
        payer: &Self::AccountId,
        name: &[u8],
        owner: Self::AccountId,
        secret: [u8; 32],
        duration: u32,
        resolved: Option<Self::AccountId>,
        partner: Self::AccountId,
        tld: Option<Self::Hash>,
    ) -> DispatchResult;
}

/// Renewer entry point available to partner proxies.
pub trait RenewerCall {
    type AccountId;
    type Hash;

    fn renew(
        payer: &Self::AccountId,
        name: &[u8],
        duration: u32,
        partner: Self::AccountId,
        tld: Option<Self::Hash>,
    ) -> DispatchResult;
}

pub trait IntoMoment<T> {
    type Moment;
    fn into_moment(self) -> Self::Moment;
}
