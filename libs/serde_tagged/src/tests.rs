// round-trip tests: encoding a value and decoding it again must give back an
// equal value, and the encoded form must be exactly what the grammar expects
use super::*;

fn round_trip(value: &Value) -> Vec<u8> {
    let buf = encode(value);
    let rev = decode(&buf, Limits::new()).expect("decoding encoded value must work");
    assert_eq!(*value, rev, "encoding messed up data");
    buf
}

fn pairs<const N: usize>(pairs: [(Key, Value); N]) -> Value {
    Value::from_iter(pairs)
}

#[test]
fn round_trip_scalars() {
    assert_eq!(round_trip(&Value::Null), b"N;");
    assert_eq!(round_trip(&Value::Bool(true)), b"b:1;");
    assert_eq!(round_trip(&Value::Bool(false)), b"b:0;");
    assert_eq!(round_trip(&Value::Int(-7)), b"i:-7;");
    assert_eq!(round_trip(&Value::Int(0)), b"i:0;");
    round_trip(&Value::Int(i64::MAX));
    round_trip(&Value::Int(i64::MIN));
}

#[test]
fn round_trip_floats() {
    for v in [0.0, -0.0, 0.1, -2.5, 1.0, 1e300, 1e-7, f64::MAX, f64::MIN_POSITIVE] {
        round_trip(&Value::Float(v));
    }

    assert_eq!(round_trip(&Value::Float(0.5)), b"d:0.5;");
}

#[test]
fn round_trip_strings() {
    assert_eq!(round_trip(&Value::from("hello")), b"s:5:\"hello\";");
    assert_eq!(round_trip(&Value::from("")), b"s:0:\"\";");

    // quotes, semicolons and braces inside the content are just bytes
    round_trip(&Value::from("a\";b:1;}{"));
    // multi-byte utf-8 counts bytes, not chars
    assert_eq!(round_trip(&Value::from("\u{e9}")), "s:2:\"\u{e9}\";".as_bytes());
    // and non-utf-8 data is fine too
    round_trip(&Value::from(&[0xff_u8, 0x00, 0xfe][..]));
}

#[test]
fn round_trip_arrays() {
    let list = pairs([
        (Key::Int(0), Value::from("foo")),
        (Key::Int(1), Value::from("bar")),
    ]);
    assert_eq!(
        round_trip(&list),
        b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}"
    );

    assert_eq!(round_trip(&Value::Array(Vec::new())), b"a:0:{}");

    let nested = pairs([
        (Key::from("sku"), Value::from("AB-1")),
        (Key::from("tags"), list),
        (Key::Int(-3), Value::Null),
        (Key::from("price"), Value::Float(9.99)),
        (Key::from("on_sale"), Value::Bool(false)),
        (
            Key::from("deep"),
            pairs([(Key::Int(0), pairs([(Key::Int(0), Value::Array(Vec::new()))]))]),
        ),
    ]);
    round_trip(&nested);
}

#[test]
fn round_trip_duplicate_keys() {
    // duplicates are preserved in order, it's up to later stages to decide
    let dup = pairs([
        (Key::from("a"), Value::Int(1)),
        (Key::from("a"), Value::Int(2)),
    ]);
    round_trip(&dup);
}

#[test]
fn encode_non_finite_floats() {
    assert_eq!(encode(&Value::Float(f64::INFINITY)), b"d:INF;");
    assert_eq!(encode(&Value::Float(f64::NEG_INFINITY)), b"d:-INF;");
    assert_eq!(encode(&Value::Float(f64::NAN)), b"d:NAN;");

    for buf in [b"d:INF;".as_slice(), b"d:-INF;", b"d:NAN;"] {
        assert_eq!(
            decode(buf, Limits::new()),
            Err(DecodeError::InvalidNumber),
            "non-finite floats must not decode"
        );
    }
}

#[test]
fn encode_into_writer() {
    let value = pairs([(Key::Int(5), Value::Bool(true))]);
    let mut out = Vec::new();
    encode_into(&mut out, &value).expect("writing to a vec must work");
    assert_eq!(out, encode(&value), "writer output must match encode");
}

/// Accepts up to `room` bytes, then fails. Records the largest single write.
struct Capped {
    out: Vec<u8>,
    room: usize,
    largest: usize,
}

impl std::io::Write for Capped {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.largest = self.largest.max(buf.len());
        let take = buf.len().min(self.room - self.out.len());
        if take == 0 && !buf.is_empty() {
            return Err(std::io::ErrorKind::WriteZero.into());
        }

        self.out.extend_from_slice(&buf[..take]);
        Ok(take)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn encode_into_streams() {
    let big = vec![b'x'; 1000];
    let value = Value::from_iter((0..50).map(|i| (Key::Int(i), Value::from(big.clone()))));
    let full = encode(&value);

    let mut sink = Capped {
        out: Vec::new(),
        room: usize::MAX,
        largest: 0,
    };
    encode_into(&mut sink, &value).expect("unbounded writer must accept everything");
    assert_eq!(sink.out, full, "writer output must match encode");
    assert!(
        sink.largest <= big.len(),
        "no write may carry more than one token, got {}",
        sink.largest
    );

    let mut sink = Capped {
        out: Vec::new(),
        room: 2500,
        largest: 0,
    };
    let err = encode_into(&mut sink, &value).expect_err("full writer must fail the encode");
    assert_eq!(err.kind(), std::io::ErrorKind::WriteZero, "writer error must pass through");
    assert_eq!(sink.out, full[..2500], "bytes before the failure stay written");
}

#[test]
fn value_helpers() {
    let value = pairs([
        (Key::from("qty"), Value::Int(3)),
        (Key::Int(7), pairs([(Key::Int(0), Value::Null)])),
        (Key::from("qty"), Value::Int(4)),
    ]);

    assert_eq!(value.get("qty"), Some(&Value::Int(3)), "first match wins");
    assert_eq!(value.get_key(&Key::Int(7)).map(Value::depth), Some(1));
    assert_eq!(value.get("missing"), None);
    assert_eq!(Value::Int(1).get("qty"), None, "scalars have no keys");

    assert_eq!(value.depth(), 2);
    // root + 3 keys + 3 values + 1 nested key + 1 nested value
    assert_eq!(value.node_count(), 9);
    assert_eq!(value.kind(), Kind::Array);
    assert_eq!(Value::from("x").as_str(), Some("x"));
    assert_eq!(Value::from(&[0xff_u8][..]).as_str(), None);
    assert_eq!(Key::from("k").to_string(), "k");
    assert_eq!(Key::Int(-2).to_string(), "-2");
}

#[test]
fn serialize_as_json() {
    let value = pairs([
        (Key::from("name"), Value::from("x")),
        (Key::Int(1), Value::Float(1.5)),
        (Key::from("none"), Value::Null),
    ]);

    let json = serde_json::to_string(&value).expect("json serialization must work");
    assert_eq!(json, r#"[["name","x"],[1,1.5],["none",null]]"#);
}
