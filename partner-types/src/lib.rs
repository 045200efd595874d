#![cfg_attr(not(feature = "std"), no_std)]

use codec::{Decode, Encode, MaxEncodedLen};
use frame_support::pallet_prelude::RuntimeDebug;
use scale_info::TypeInfo;
use sp_runtime::traits::AtLeast32BitUnsigned;
use sp_std::vec::Vec;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Node hash identifying a name (or a TLD) in the external ownership registry.
pub type DomainHash = sp_core::H256;

/// Identifier of a stored partner configuration.
pub type ConfigId = u32;

/// Registration durations are whole years; expiries are unix seconds.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Per-partner policy record: name and duration bounds, commission split
/// parameters and the commit-reveal age requirement.
///
/// Percentages (`fee_percentage`, `discount`) are fixed-point values against
/// a scale where `scale` itself means 100%.
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Encode, Decode, PartialEq, Eq, RuntimeDebug, Clone, TypeInfo, MaxEncodedLen)]
pub struct Configuration<Balance, Moment> {
    /// Shortest registrable name, counted in unicode codepoints.
    pub min_length: u32,
    /// Longest registrable name, counted in unicode codepoints.
    pub max_length: u32,
    /// Shortest registration term, whole years.
    pub min_duration: u32,
    /// Longest registration term, whole years.
    pub max_duration: u32,
    /// Partner commission share of every sale.
    pub fee_percentage: Balance,
    /// Price reduction applied before the split.
    pub discount: Balance,
    /// Seconds a commitment must age before it becomes revealable.
    /// Zero disables the commit-reveal step for this partner entirely.
    pub min_commitment_age: Moment,
}

impl<Balance, Moment> Configuration<Balance, Moment>
where
    Balance: AtLeast32BitUnsigned + Copy,
{
    /// Cross-field invariants, checked on creation and after every mutation.
    pub fn validate(&self, scale: Balance) -> bool {
        self.min_length >= 1
            && self.min_length <= self.max_length
            && self.min_duration >= 1
            && self.min_duration <= self.max_duration
            && self.fee_percentage <= scale
            && self.discount <= scale
    }

    /// Tiered base price: short terms pay `2 * unit` per year, terms beyond
    /// two years pay `unit * (years + 2)`.
    pub fn base_price(&self, duration: u32, unit: Balance) -> Option<Balance> {
        let years = Balance::from(duration);
        if duration <= 2 {
            unit.checked_mul(&years)?.checked_mul(&Balance::from(2u32))
        } else {
            unit.checked_mul(&years.checked_add(&Balance::from(2u32))?)
        }
    }

    /// Base price minus the discount share, truncating division.
    pub fn effective_price(&self, duration: u32, unit: Balance, scale: Balance) -> Option<Balance> {
        let base = self.base_price(duration, unit)?;
        let rebate = base.checked_mul(&self.discount)?.checked_div(&scale)?;
        base.checked_sub(&rebate)
    }

    /// Splits an effective price into `(commission, pool remainder)`.
    /// The two halves always sum to the input exactly.
    pub fn commission_split(&self, price: Balance, scale: Balance) -> Option<(Balance, Balance)> {
        let fee = price.checked_mul(&self.fee_percentage)?.checked_div(&scale)?;
        let remainder = price.checked_sub(&fee)?;
        Some((fee, remainder))
    }
}

/// Payload delivered by the payment token's transfer-with-callback entry
/// point. The SCALE discriminant plays the role of the call selector; a
/// payload that decodes to the wrong variant for the receiving pallet is
/// rejected as invalid data.
#[derive(Encode, Decode, PartialEq, Eq, RuntimeDebug, Clone, TypeInfo)]
pub enum TokenCall<AccountId, Hash> {
    /// One-step registration: pay and register within one token transfer.
    Register {
        name: Vec<u8>,
        owner: AccountId,
        secret: [u8; 32],
        duration: u32,
        resolved: Option<AccountId>,
        partner: AccountId,
        tld: Option<Hash>,
    },
    /// One-step renewal.
    Renew {
        name: Vec<u8>,
        duration: u32,
        partner: AccountId,
        tld: Option<Hash>,
    },
}
