//! Property tests: serialize then deserialize reconstructs the instance.

mod common;

use chrono::{DateTime, Utc};
use polymodel_codec::serialize;
use polymodel_core::{FieldValue, ModelInstance};
use proptest::prelude::*;

use common::fish_codec;

fn birthday() -> impl Strategy<Value = DateTime<Utc>> {
    // 1900-01-01 .. 2100-01-01, whole seconds.
    (-2_208_988_800i64..4_102_444_800i64)
        .prop_map(|secs| DateTime::from_timestamp(secs, 0).expect("in range"))
}

fn length() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::ZERO
}

proptest! {
    /// Sharks of any leaf variant survive a round trip with the same
    /// discriminator and field values.
    #[test]
    fn shark_family_round_trips(
        leaf in prop::sample::select(vec!["shark", "sawshark", "goblin", "cookiecuttershark"]),
        species in proptest::option::of("[a-z ]{0,16}"),
        length in length(),
        age in proptest::option::of(any::<i64>()),
        birthday in birthday(),
        picture in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let (codec, _) = fish_codec();
        let variant = codec.registry().resolve(leaf).unwrap();
        let mut instance = ModelInstance::new(variant)
            .with("length", length)
            .with("birthday", birthday);
        if let Some(species) = species {
            instance.set("species", species);
        }
        if let Some(age) = age {
            instance.set("age", age);
        }
        if leaf == "sawshark" {
            instance.set("picture", picture);
        }

        let doc = serialize(&instance);
        prop_assert_eq!(doc["fishtype"].as_str(), Some(leaf));

        let decoded = codec.deserialize(&doc).unwrap();
        prop_assert_eq!(decoded.discriminator(), leaf);
        prop_assert_eq!(&decoded, &instance);
    }

    /// Salmon with nested shark siblings round-trips through JSON text.
    #[test]
    fn salmon_with_siblings_round_trips_through_text(
        wild in any::<bool>(),
        ages in proptest::collection::vec(0i64..200, 0..4),
        birthday in birthday(),
    ) {
        let (codec, _) = fish_codec();
        let shark = codec.registry().resolve("shark").unwrap();
        let siblings: Vec<FieldValue> = ages
            .iter()
            .map(|age| {
                ModelInstance::new(shark.clone())
                    .with("length", 2.5)
                    .with("age", *age)
                    .with("birthday", birthday)
                    .into()
            })
            .collect();
        let salmon = ModelInstance::new(codec.registry().resolve("salmon").unwrap())
            .with("length", 1.0)
            .with("is_wild", wild)
            .with("siblings", siblings);

        let text = codec.serialize_string(&salmon);
        let decoded = codec.deserialize_str(&text).unwrap();
        prop_assert_eq!(&decoded, &salmon);
        prop_assert!(decoded.validate().is_ok());
    }
}
