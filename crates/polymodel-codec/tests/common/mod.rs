//! The body-complex fish family shared by the codec integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use polymodel_codec::Codec;
use polymodel_core::{
    FieldDescriptor, FieldKind, FieldValue, ScalarKind, TypeRegistry, VariantDescriptor,
};

/// Codec over fish / salmon / shark / sawshark / goblin / cookiecuttershark,
/// plus the number of times the shark hook has run.
pub fn fish_codec() -> (Codec, Arc<AtomicUsize>) {
    let shark_hook_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&shark_hook_calls);

    let fish = VariantDescriptor::root("fish", "fishtype")
        .field(FieldDescriptor::new("species", ScalarKind::String))
        .field(FieldDescriptor::new("length", ScalarKind::Number).required())
        .field(FieldDescriptor::new(
            "siblings",
            FieldKind::list(FieldKind::nested("fish")),
        ))
        .build();
    let salmon = VariantDescriptor::extends("salmon", &fish)
        .field(FieldDescriptor::new("location", ScalarKind::String))
        .field(FieldDescriptor::new("is_wild", ScalarKind::Boolean).wire_name("iswild"))
        .build();
    let shark = VariantDescriptor::extends("shark", &fish)
        .field(FieldDescriptor::new("age", ScalarKind::Integer))
        .field(FieldDescriptor::new("birthday", ScalarKind::DateTime).required())
        .hook(move |instance| {
            calls.fetch_add(1, Ordering::SeqCst);
            match instance.get("age").and_then(FieldValue::as_i64) {
                Some(age) if age < 0 => Err(format!("age {age} is negative")),
                _ => Ok(()),
            }
        })
        .build();
    let sawshark = VariantDescriptor::extends("sawshark", &shark)
        .field(FieldDescriptor::new("picture", ScalarKind::ByteArray))
        .build();
    let goblin = VariantDescriptor::extends("goblin", &shark)
        .field(FieldDescriptor::new("jawsize", ScalarKind::Integer))
        .build();
    let cookiecutter = VariantDescriptor::extends("cookiecuttershark", &shark).build();

    let mut builder = TypeRegistry::builder();
    builder
        .register_all([fish, salmon, shark, sawshark, goblin, cookiecutter])
        .expect("fish family registers cleanly");
    (Codec::new(builder.publish()), shark_hook_calls)
}

/// The polymorphic salmon document served by the body-complex test server.
pub fn salmon_document() -> serde_json::Value {
    serde_json::json!({
        "fishtype": "salmon",
        "location": "alaska",
        "iswild": true,
        "species": "king",
        "length": 1.0,
        "siblings": [
            {
                "fishtype": "shark",
                "age": 6,
                "birthday": "2012-01-05T01:00:00Z",
                "length": 20.0,
                "species": "predator"
            },
            {
                "fishtype": "sawshark",
                "age": 105,
                "birthday": "1900-01-05T01:00:00Z",
                "length": 10.0,
                "picture": "//////4=",
                "species": "dangerous"
            },
            {
                "fishtype": "goblin",
                "age": 1,
                "birthday": "2015-08-08T00:00:00Z",
                "length": 30.0,
                "species": "scary",
                "jawsize": 5
            }
        ]
    })
}
