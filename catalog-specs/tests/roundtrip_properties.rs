//! Property tests for the canonical schema encoding.

use catalog_specs::{decode_fields, encode_fields, FieldDefinition, FieldKind};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        Just(FieldKind::Text),
        Just(FieldKind::Textarea),
        Just(FieldKind::Number),
        Just(FieldKind::Boolean),
        prop::collection::vec("[A-Za-z0-9 -]{0,8}", 0..5)
            .prop_map(|options| FieldKind::Select { options }),
    ]
}

/// Display text, including empty, blank and space-padded values.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 .]{0,14}").unwrap()
}

fn field_strategy() -> impl Strategy<Value = FieldDefinition> {
    (
        "[ ]{0,2}[a-z][a-z0-9_]{0,10}",
        text_strategy(),
        kind_strategy(),
        any::<bool>(),
        prop::option::of(text_strategy()),
        prop::option::of(text_strategy()),
        prop::option::of(text_strategy()),
    )
        .prop_map(
            |(key, label, kind, required, unit, placeholder, description)| FieldDefinition {
                key,
                label,
                kind,
                required,
                unit,
                placeholder,
                description,
            },
        )
}

fn fields_strategy() -> impl Strategy<Value = Vec<FieldDefinition>> {
    let fields = prop::collection::vec((field_strategy(), "[ ]{0,2}"), 0..8);
    fields.prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (mut field, trailing))| {
                field.key = format!("{}_{i}{trailing}", field.key);
                field
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(fields in fields_strategy()) {
        let text = encode_fields(&fields).unwrap();
        prop_assert_eq!(decode_fields(&text), fields);
    }

    #[test]
    fn encode_is_idempotent_after_decode(fields in fields_strategy()) {
        let once = encode_fields(&fields).unwrap();
        let twice = encode_fields(&decode_fields(&once)).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn decode_never_panics(text in ".{0,64}") {
        let _ = decode_fields(&text);
    }
}
