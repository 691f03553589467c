use proptest::prelude::*;
use shamir_backup::shamir::{recover_secret, split_secret};
use shamir_backup::Share;

proptest! {
    #[test]
    fn roundtrip_random_secret(
        threshold in 1u8..=5,
        extra in 0u8..=3,
        secret in proptest::collection::vec(any::<u8>(), 16..=40)
    ) {
        let share_count = threshold + extra;
        let shares = split_secret(threshold, share_count, &secret).unwrap();
        prop_assert_eq!(shares.len(), usize::from(share_count));

        // first `threshold` shares
        let head: Vec<_> = shares.iter().take(usize::from(threshold)).cloned().collect();
        let recovered = recover_secret(threshold, &head).unwrap();
        prop_assert_eq!(&recovered, &secret);

        // last `threshold` shares
        let tail: Vec<_> = shares.iter().rev().take(usize::from(threshold)).cloned().collect();
        let recovered = recover_secret(threshold, &tail).unwrap();
        prop_assert_eq!(&recovered, &secret);
    }

    #[test]
    fn mnemonic_codec_roundtrip(
        identifier in 0u16..=0x7fff,
        extendable in any::<bool>(),
        iteration_exponent in 0u8..=15,
        group_index in 0u8..=15,
        group_threshold in 1u8..=16,
        member_index in 0u8..=15,
        member_threshold in 1u8..=16,
        half_len in 8usize..=20,
        fill in any::<u8>(),
    ) {
        let share = Share {
            identifier,
            extendable,
            iteration_exponent,
            group_index,
            group_threshold,
            // keep the encoded pair decodable
            group_count: group_threshold,
            member_index,
            member_threshold,
            value: vec![fill; half_len * 2],
        };
        let decoded = Share::from_mnemonic(&share.to_mnemonic()).unwrap();
        prop_assert_eq!(decoded, share);
    }
}
