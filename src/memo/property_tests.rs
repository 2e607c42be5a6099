//! Property-Based Tests for the Memo Module
//!
//! Uses proptest to check key derivation and codec round-trip properties.

use proptest::prelude::*;
use std::collections::BTreeMap;

use crate::codec::{decode, encode, Value};
use crate::memo::{derive_key, Args};

// == Strategies ==
/// Scalars that survive an encode/decode round trip unchanged.
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-zA-Z0-9 _:,\\-]{0,32}".prop_map(Value::Text),
    ]
}

/// Flat mappings and lists of scalars.
fn flat_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar_strategy(),
        prop::collection::vec(scalar_strategy(), 0..8).prop_map(Value::List),
        prop::collection::btree_map("[a-z_]{1,12}", scalar_strategy(), 0..8)
            .prop_map(|m: BTreeMap<String, Value>| Value::Map(m)),
    ]
}

fn identity_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,12}(::[a-z_]{1,12}){0,3}".prop_map(|s| s)
}

fn args_strategy() -> impl Strategy<Value = Args> {
    (
        prop::collection::vec(flat_value_strategy(), 0..4),
        prop::collection::vec(("[a-z]{1,8}", flat_value_strategy()), 0..4),
    )
        .prop_map(|(positional, named)| {
            let args = positional.into_iter().fold(Args::new(), Args::arg);
            named
                .into_iter()
                .fold(args, |args, (name, value)| args.named(name, value))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Deterministic keys: identical identity and arguments always yield the same key.
    #[test]
    fn prop_key_is_deterministic(identity in identity_strategy(), args in args_strategy()) {
        let first = derive_key(&identity, &args);
        let second = derive_key(&identity, &args.clone());
        prop_assert_eq!(first, second);
    }

    // Distinct integer arguments never collide.
    #[test]
    fn prop_distinct_ints_distinct_keys(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            derive_key("m::f", &Args::new().arg(a)),
            derive_key("m::f", &Args::new().arg(b))
        );
    }

    // A number and its text form stringify alike but differ in type.
    #[test]
    fn prop_int_and_text_keys_differ(n in any::<i64>()) {
        prop_assert_ne!(
            derive_key("m::f", &Args::new().arg(n)),
            derive_key("m::f", &Args::new().arg(n.to_string()))
        );
    }

    // Changing any one positional argument changes the key.
    #[test]
    fn prop_changed_argument_changes_key(
        values in prop::collection::vec(scalar_strategy(), 1..5),
        index in any::<prop::sample::Index>(),
        replacement in scalar_strategy(),
    ) {
        let i = index.index(values.len());
        prop_assume!(values[i] != replacement);

        let mut changed = values.clone();
        changed[i] = replacement;

        let original = values.into_iter().fold(Args::new(), Args::arg);
        let changed = changed.into_iter().fold(Args::new(), Args::arg);
        prop_assert_ne!(derive_key("m::f", &original), derive_key("m::f", &changed));
    }

    // Argument lists of different shapes never share a key, even when text
    // values contain the separator.
    #[test]
    fn prop_different_argument_lists_differ(
        left in prop::collection::vec(scalar_strategy(), 0..5),
        right in prop::collection::vec(scalar_strategy(), 0..5),
    ) {
        prop_assume!(left != right);
        let left = left.into_iter().fold(Args::new(), Args::arg);
        let right = right.into_iter().fold(Args::new(), Args::arg);
        prop_assert_ne!(derive_key("m::f", &left), derive_key("m::f", &right));
    }

    // Named arguments never pass for positional text.
    #[test]
    fn prop_named_and_positional_differ(
        name in "[a-z:]{1,8}",
        value in scalar_strategy(),
        positional in prop::collection::vec(scalar_strategy(), 0..4),
    ) {
        let named = Args::new().named(name, value);
        let positional = positional.into_iter().fold(Args::new(), Args::arg);
        prop_assert_ne!(derive_key("m::f", &named), derive_key("m::f", &positional));
    }

    // Round trip: decode(encode(v)) == v for primitives and flat containers.
    #[test]
    fn prop_codec_roundtrip(value in flat_value_strategy()) {
        let text = encode(&value).unwrap();
        prop_assert_eq!(decode(&text).unwrap(), value);
    }
}
