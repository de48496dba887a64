use proptest::prelude::*;

use jury_types::{CaseId, RewardAmount, Side, Timestamp, UserId, VoteTally};

proptest! {
    /// CaseId text form parses back to the same id.
    #[test]
    fn case_id_text_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = CaseId::new(bytes);
        prop_assert_eq!(id.to_string().parse::<CaseId>().unwrap(), id);
    }

    /// CaseId bincode serialization roundtrip.
    #[test]
    fn case_id_bincode_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = CaseId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: CaseId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    /// Derived ids are stable for identical input.
    #[test]
    fn case_id_derive_is_deterministic(title in "[a-z ]{10,40}", secs in 0u64..u64::MAX, nonce in 0u64..1000) {
        let owner = UserId::new("owner");
        prop_assert_eq!(
            CaseId::derive(&owner, &title, Timestamp::new(secs), nonce),
            CaseId::derive(&owner, &title, Timestamp::new(secs), nonce)
        );
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Display percentages are within range and add up to about 100.
    #[test]
    fn display_percentages_sum_to_about_100(a in 0u64..100_000, b in 0u64..100_000) {
        let tally = VoteTally::new(a, b);
        let pa = tally.display_percent(Side::SideA) as u32;
        let pb = tally.display_percent(Side::SideB) as u32;
        prop_assert!(pa <= 100 && pb <= 100);
        prop_assert!((99..=101).contains(&(pa + pb)));
    }

    /// Rounding micros to cents never moves by more than half a cent.
    #[test]
    fn micros_rounding_is_within_half_a_cent(micros in 0u64..10_000_000_000) {
        let cents = RewardAmount::from_micros_rounded(micros).cents();
        let back = cents * 10_000;
        prop_assert!(back.abs_diff(micros) <= 5_000);
    }
}
