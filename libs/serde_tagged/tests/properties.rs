#![allow(unused_crate_dependencies)]
// generated-input checks for the round-trip law and for rejecting disallowed
// tags wherever they are spliced into an otherwise valid payload

use serde_tagged::{DecodeError, Key, Limits, Value, decode, encode};

/// Tiny deterministic xorshift generator so failures are reproducible.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    #[allow(clippy::cast_possible_wrap)]
    fn int(&mut self) -> i64 {
        match self.below(4) {
            0 => i64::MIN,
            1 => i64::MAX,
            _ => self.next_u64() as i64,
        }
    }

    fn bytes(&mut self) -> Vec<u8> {
        let len = self.below(12);
        (0..len).map(|_| b"ab\";:{}\0\xff"[self.below(9) as usize]).collect()
    }

    fn key(&mut self) -> Key {
        if self.below(2) == 0 {
            Key::Int(self.int())
        } else {
            Key::String(self.bytes())
        }
    }

    fn value(&mut self, depth: u32) -> Value {
        let kinds = if depth == 0 { 5 } else { 6 };
        match self.below(kinds) {
            0 => Value::Null,
            1 => Value::Bool(self.below(2) == 1),
            2 => Value::Int(self.int()),
            3 => {
                let v = f64::from_bits(self.next_u64());
                Value::Float(if v.is_finite() { v } else { 0.25 })
            },
            4 => Value::String(self.bytes()),
            _ => {
                let len = self.below(5);
                (0..len).map(|_| (self.key(), self.value(depth - 1))).collect()
            },
        }
    }
}

#[test]
fn round_trip_generated() {
    let mut rng = Rng(0x9e37_79b9_7f4a_7c15);

    for _ in 0..2000 {
        let value = rng.value(4);
        let buf = encode(&value);
        let rev = decode(&buf, Limits::new()).expect("encoded values must decode");
        assert_eq!(value, rev, "round trip failed for {:?}", String::from_utf8_lossy(&buf));
    }
}

#[test]
fn disallowed_tag_at_any_value_position() {
    const INJECTED: &[&[u8]] = &[
        br#"O:8:"stdClass":0:{}"#,
        br#"C:3:"Foo":0:{}"#,
        b"R:1;",
        b"r:1;",
    ];

    let mut rng = Rng(0x0123_4567_89ab_cdef);

    for round in 0..500 {
        let value = rng.value(3);
        let buf = encode(&value);

        // every `N;` token sits at a value position, swap one for an object
        let Some(pos) = buf.windows(2).position(|w| w == b"N;") else {
            continue;
        };

        let injected = INJECTED[round % INJECTED.len()];
        let mut evil = buf[..pos].to_vec();
        evil.extend_from_slice(injected);
        evil.extend_from_slice(&buf[pos + 2..]);

        assert_eq!(
            decode(&evil, Limits::new()),
            Err(DecodeError::DisallowedType),
            "input: {:?}",
            String::from_utf8_lossy(&evil)
        );

        // a top-level count that no longer fits the input must not mask it
        if let Some(inflated) = inflate_count(&evil, 1000) {
            assert_eq!(
                decode(&inflated, Limits::new()),
                Err(DecodeError::DisallowedType),
                "input: {:?}",
                String::from_utf8_lossy(&inflated)
            );
        }
    }
}

/// Adds `extra` to the declared count of a top-level array.
fn inflate_count(buf: &[u8], extra: usize) -> Option<Vec<u8>> {
    let rest = buf.strip_prefix(b"a:")?;
    let digits = rest.iter().position(|b| !b.is_ascii_digit())?;
    let count: usize = std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()?;

    let mut out = format!("a:{}", count + extra).into_bytes();
    out.extend_from_slice(&rest[digits..]);
    Some(out)
}

#[test]
fn truncated_input_never_decodes() {
    let mut rng = Rng(0xdead_beef_cafe_f00d);

    for _ in 0..300 {
        let buf = encode(&rng.value(3));
        for end in 0..buf.len() {
            assert!(
                decode(&buf[..end], Limits::new()).is_err(),
                "prefix of length {end} must not decode: {:?}",
                String::from_utf8_lossy(&buf)
            );
        }
    }
}
