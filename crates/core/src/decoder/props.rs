//! Property-based tests for the payload decoder.

use std::collections::BTreeMap;

use proptest::prelude::*;

use super::decode_json_payload;

fn payload_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<i64>>> {
    prop::collection::btree_map("[a-z_]{1,12}", prop::collection::vec(any::<i64>(), 0..5), 0..6)
}

proptest! {
    /// Encoding a structure as fenced JSON and decoding it yields the same structure.
    #[test]
    fn prop_fenced_round_trip(payload in payload_strategy()) {
        let encoded = serde_json::to_string_pretty(&payload).unwrap();
        let raw = format!("```json\n{encoded}\n```");

        let decoded: BTreeMap<String, Vec<i64>> = decode_json_payload(&raw).unwrap();
        prop_assert_eq!(decoded, payload);
    }

    /// Prose before and after a single fenced block does not disturb decoding.
    #[test]
    fn prop_prose_is_ignored(
        payload in payload_strategy(),
        before in "[A-Za-z0-9 .,:!?\n]{0,80}",
        after in "[A-Za-z0-9 .,:!?\n]{0,80}",
    ) {
        let encoded = serde_json::to_string(&payload).unwrap();
        let raw = format!("{before}\n```json\n{encoded}\n```\n{after}");

        let decoded: BTreeMap<String, Vec<i64>> = decode_json_payload(&raw).unwrap();
        prop_assert_eq!(decoded, payload);
    }

    /// Unfenced payloads decode verbatim regardless of surrounding whitespace.
    #[test]
    fn prop_verbatim_round_trip(payload in payload_strategy(), pad in "[ \n\t]{0,6}") {
        let raw = format!("{pad}{}{pad}", serde_json::to_string(&payload).unwrap());

        let decoded: BTreeMap<String, Vec<i64>> = decode_json_payload(&raw).unwrap();
        prop_assert_eq!(decoded, payload);
    }
}
