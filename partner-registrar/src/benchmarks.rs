//! Benchmarking setup for the partner pallets.
//!
//! The gated calls assume the benchmarking runtime routes `ManagerOrigin`
//! through the access-control pallet, like the mock runtime does.
#![cfg(feature = "runtime-benchmarks")]

use frame_benchmarking::account;

pub const SEED: u32 = 996;

pub fn bench_account<T: frame_system::Config>(idx: u32) -> T::AccountId {
    let caller: T::AccountId = account("caller", idx, SEED);
    caller
}

fn seed_owner<T: crate::access_control::Config>() -> T::AccountId {
    let owner = bench_account::<T>(0);
    crate::access_control::Owner::<T>::put(&owner);
    owner
}

mod access_control {
    use super::{bench_account, seed_owner};
    use crate::access_control::{Call, Config, Operators, Pallet};
    use frame_benchmarking::benchmarks;
    use frame_system::RawOrigin;

    benchmarks! {
        transfer_ownership {
            let owner = seed_owner::<T>();
            let new_owner = bench_account::<T>(1);
        }: _(RawOrigin::Signed(owner), new_owner.clone())
        verify {
            assert!(Pallet::<T>::is_owner(&new_owner));
        }

        add_operator {
            let owner = seed_owner::<T>();
            let operator = bench_account::<T>(1);
        }: _(RawOrigin::Signed(owner), operator.clone())
        verify {
            assert!(Operators::<T>::contains_key(&operator));
        }

        remove_operator {
            let owner = seed_owner::<T>();
            let operator = bench_account::<T>(1);
            Operators::<T>::insert(&operator, ());
        }: _(RawOrigin::Signed(owner), operator.clone())
        verify {
            assert!(!Operators::<T>::contains_key(&operator));
        }
    }
}

mod partner_configuration {
    use super::seed_owner;
    use crate::partner_configuration::{Call, Config, ConfigurationOf, Configurations};
    use frame_benchmarking::benchmarks;
    use frame_system::RawOrigin;
    use partner_types::Configuration;
    use sp_runtime::traits::Zero;

    fn sample_configuration<T: Config>() -> ConfigurationOf<T> {
        Configuration {
            min_length: 3,
            max_length: 32,
            min_duration: 1,
            max_duration: 5,
            fee_percentage: Zero::zero(),
            discount: Zero::zero(),
            min_commitment_age: Zero::zero(),
        }
    }

    benchmarks! {
        where_clause {
            where
            T: crate::access_control::Config,
        }

        create_configuration {
            let owner = seed_owner::<T>();
            let config = sample_configuration::<T>();
        }: _(RawOrigin::Signed(owner), config)
        verify {
            assert!(Configurations::<T>::contains_key(0));
        }

        set_field {
            let owner = seed_owner::<T>();
            Configurations::<T>::insert(0, sample_configuration::<T>());
        }: set_max_length(RawOrigin::Signed(owner), 0, 40)
        verify {
            assert_eq!(Configurations::<T>::get(0).map(|config| config.max_length), Some(40));
        }
    }
}

mod partner_manager {
    use super::{bench_account, seed_owner};
    use crate::partner_manager::{Call, Config, Partners};
    use crate::traits::ConfigurationManager;
    use frame_benchmarking::benchmarks;
    use frame_system::RawOrigin;

    benchmarks! {
        where_clause {
            where
            T: crate::access_control::Config
                + crate::partner_configuration::Config
                + Config<Configurations = crate::partner_configuration::Pallet<T>>,
        }

        add_partner {
            let owner = seed_owner::<T>();
            let partner = bench_account::<T>(1);
            crate::partner_configuration::Configurations::<T>::insert(
                0,
                partner_types::Configuration {
                    min_length: 3,
                    max_length: 32,
                    min_duration: 1,
                    max_duration: 5,
                    fee_percentage: sp_runtime::traits::Zero::zero(),
                    discount: sp_runtime::traits::Zero::zero(),
                    min_commitment_age: sp_runtime::traits::Zero::zero(),
                },
            );
            assert!(<T as Config>::Configurations::exists(0));
        }: _(RawOrigin::Signed(owner), partner.clone(), 0)
        verify {
            assert!(Partners::<T>::contains_key(&partner));
        }

        remove_partner {
            let owner = seed_owner::<T>();
            let partner = bench_account::<T>(1);
            Partners::<T>::insert(&partner, 0);
        }: _(RawOrigin::Signed(owner), partner.clone())
        verify {
            assert!(!Partners::<T>::contains_key(&partner));
        }
    }
}
