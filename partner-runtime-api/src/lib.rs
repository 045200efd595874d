#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::unnecessary_mut_passed)]

use codec::Codec;
use partner_types::DomainHash;
use sp_runtime::traits::MaybeDisplay;
use sp_std::vec::Vec;

sp_api::decl_runtime_apis! {
    /// Off-chain query surface of the partner registrar: commitment hashing
    /// so clients never reimplement the scheme, the reveal predicate, and
    /// price quotes per partner policy.
    pub trait PartnerRegistrarApi<AccountId, Balance>
    where
        AccountId: Codec + MaybeDisplay,
        Balance: Codec + MaybeDisplay,
    {
        fn make_commitment(
            name: Vec<u8>,
            owner: AccountId,
            secret: [u8; 32],
            duration: u32,
            resolved: Option<AccountId>,
            partner: AccountId,
            tld: Option<DomainHash>,
        ) -> Option<DomainHash>;
        fn can_reveal(commitment: DomainHash, partner: AccountId) -> bool;
        fn register_price(partner: AccountId, duration: u32) -> Option<Balance>;
        fn renew_price(partner: AccountId, duration: u32) -> Option<Balance>;
    }
}
