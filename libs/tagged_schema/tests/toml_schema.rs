#![allow(unused_crate_dependencies)]
// schemas are usually loaded from configuration, so check the TOML shape
// end to end against real payloads

use serde_tagged::Limits;
use tagged_schema::{Error, FieldKind, Range, Reason, Schema, UnknownKeys, parse};

const INVENTORY: &str = r#"
max_nodes = 64
max_depth = 2

[fields.sku]
kind = "string"
max_len = 16

[fields.quantity]
kind = "int"
range = "non_negative"

[fields.price]
kind = "number"
range = { min = 0.01, max = 10000.0 }

[fields.tags]
kind = "array"
required = false
"#;

fn schema() -> Schema {
    toml::from_str(INVENTORY).expect("schema must deserialize")
}

#[test]
fn deserialize_schema() {
    let schema = schema();

    assert_eq!(schema.max_nodes, 64);
    assert_eq!(schema.max_depth, 2);
    assert_eq!(schema.unknown_keys, UnknownKeys::Reject);

    let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
    assert_eq!(names, ["sku", "quantity", "price", "tags"]);

    let price = &schema.fields["price"];
    assert_eq!(price.kind, FieldKind::Number);
    assert!(price.required, "fields are required by default");
    assert_eq!(
        price.range,
        Some(Range::Between {
            min: Some(0.01),
            max: Some(10000.0),
        })
    );

    assert_eq!(schema.fields["quantity"].range, Some(Range::NonNegative));
    assert!(!schema.fields["tags"].required, "tags are optional");
}

#[test]
fn defaults_apply() {
    let schema: Schema = toml::from_str("").expect("empty schema must deserialize");
    assert_eq!(schema, Schema::new());
}

#[test]
fn reject_unknown_settings() {
    let res = toml::from_str::<Schema>("[fields.a]\nkind = \"int\"\nmin = 1\n");
    assert!(res.is_err(), "misspelled field rules must not be ignored");

    let res = toml::from_str::<Schema>("[fields.a]\nkind = \"object\"\n");
    assert!(res.is_err(), "unknown kinds must not deserialize");
}

#[test]
fn reject_misspelled_bounds() {
    let res = toml::from_str::<Schema>("[fields.quantity]\nkind = \"int\"\nrange = { mni = 0 }\n");
    assert!(res.is_err(), "a misspelled bound must not leave the range open");

    let res = toml::from_str::<Schema>("[fields.quantity]\nkind = \"int\"\nrange = \"nonnegative\"\n");
    assert!(res.is_err(), "unknown range names must not deserialize");

    let schema: Schema =
        toml::from_str("[fields.quantity]\nkind = \"int\"\nrange = { min = 0 }\n")
            .expect("a single bound is enough");
    assert_eq!(
        schema.fields["quantity"].range,
        Some(Range::Between {
            min: Some(0.0),
            max: None,
        })
    );

    let err = parse(br#"a:1:{s:8:"quantity";i:-5;}"#, Limits::new(), &schema)
        .expect_err("below the minimum");
    assert!(
        matches!(&err, Error::ValidationFailed(e) if e.reason == Reason::BelowMinimum),
        "{err:?}"
    );
}

#[test]
fn parse_with_loaded_schema() {
    let schema = schema();

    let ok = br#"a:4:{s:3:"sku";s:2:"A1";s:8:"quantity";i:2;s:5:"price";i:5;s:4:"tags";a:1:{i:0;s:3:"new";}}"#;
    let record = parse(ok, Limits::new(), &schema).expect("valid payload");
    assert_eq!(record.text("sku"), Some("A1"));
    assert_eq!(record.float("price"), Some(5.0));
    assert!(record.array("tags").is_some(), "tags must be kept");

    let cheap = br#"a:3:{s:3:"sku";s:2:"A1";s:8:"quantity";i:2;s:5:"price";d:0.001;}"#;
    match parse(cheap, Limits::new(), &schema) {
        Err(Error::ValidationFailed(err)) => {
            assert_eq!(err.field, "price");
            assert_eq!(err.reason, Reason::BelowMinimum);
        },
        other => panic!("expected validation failure, got {other:?}"),
    }

    // one level deeper than the schema allows, but fine for the decoder
    let deep = br#"a:4:{s:3:"sku";s:2:"A1";s:8:"quantity";i:2;s:5:"price";i:1;s:4:"tags";a:1:{i:0;a:0:{}}}"#;
    match parse(deep, Limits::new(), &schema) {
        Err(Error::ValidationFailed(err)) => {
            assert_eq!(err.field, tagged_schema::ROOT);
            assert_eq!(err.reason, Reason::TooDeep);
        },
        other => panic!("expected validation failure, got {other:?}"),
    }

    let truncated = br#"a:4:{s:3:"sku";"#;
    assert!(
        matches!(parse(truncated, Limits::new(), &schema), Err(Error::Decode(_))),
        "truncated input must fail to decode"
    );
}
