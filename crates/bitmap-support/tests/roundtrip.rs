use bitmap_support::{decode_all, Value};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_cbor::Value as Cbor;
use std::collections::BTreeMap;

fn encode(value: &Cbor) -> Vec<u8> {
    serde_cbor::to_vec(value).expect("fixture encodes")
}

fn decode(bytes: &[u8]) -> Value {
    let decoded = decode_all(bytes).expect("fixture decodes");
    assert_eq!(decoded.trailing, 0, "decoder must consume the whole fixture");
    assert!(decoded.is_clean());
    decoded.value
}

#[test]
fn test_scalar_fixtures_round_trip() {
    let cases = vec![
        (Cbor::Integer(0), Value::UnsignedInt(0)),
        (Cbor::Integer(1), Value::UnsignedInt(1)),
        (Cbor::Integer(23), Value::UnsignedInt(23)),
        (Cbor::Integer(24), Value::UnsignedInt(24)),
        (Cbor::Integer(1000), Value::UnsignedInt(1000)),
        (Cbor::Integer(-1), Value::NegativeInt(-1)),
        (Cbor::Integer(-24), Value::NegativeInt(-24)),
        (Cbor::Bool(true), Value::Bool(true)),
        (Cbor::Bool(false), Value::Bool(false)),
        (Cbor::Null, Value::Null),
        (
            Cbor::Bytes(vec![0x01, 0xab, 0xff]),
            Value::ByteString("01abff".to_string()),
        ),
        (Cbor::Text("bitmap".to_string()), Value::text("bitmap")),
    ];

    for (fixture, expected) in cases {
        let bytes = encode(&fixture);
        assert_eq!(decode(&bytes), expected, "fixture {fixture:?}");
    }
}

#[test]
fn test_array_fixture_round_trips() {
    let fixture = Cbor::Array(vec![Cbor::Integer(840_000), Cbor::Text("sat".to_string())]);
    assert_eq!(
        decode(&encode(&fixture)),
        Value::Array(vec![Value::UnsignedInt(840_000), Value::text("sat")])
    );
}

#[test]
fn test_map_fixture_round_trips() {
    let mut map = BTreeMap::new();
    map.insert(Cbor::Text("block".to_string()), Cbor::Integer(792_435));
    map.insert(Cbor::Text("name".to_string()), Cbor::Text("0.bitmap".to_string()));
    let fixture = Cbor::Map(map);

    let mut expected = IndexMap::new();
    expected.insert("block".to_string(), Value::UnsignedInt(792_435));
    expected.insert("name".to_string(), Value::text("0.bitmap"));
    assert_eq!(decode(&encode(&fixture)), Value::Map(expected));
}

#[test]
fn test_tagged_fixture_round_trips() {
    // tag 24 (embedded encoded item) around the byte string 0x01 0x02
    let bytes = [0xd8, 0x18, 0x42, 0x01, 0x02];
    assert_eq!(
        decode(&bytes),
        Value::tagged(24, Value::ByteString("0102".to_string()))
    );
}

#[test]
fn test_nested_document_round_trips() {
    let mut inner = BTreeMap::new();
    inner.insert(Cbor::Text("k".to_string()), Cbor::Array(vec![Cbor::Null, Cbor::Bool(false)]));
    let fixture = Cbor::Array(vec![Cbor::Map(inner), Cbor::Integer(-1000)]);

    let mut expected_inner = IndexMap::new();
    expected_inner.insert(
        "k".to_string(),
        Value::Array(vec![Value::Null, Value::Bool(false)]),
    );
    assert_eq!(
        decode(&encode(&fixture)),
        Value::Array(vec![Value::Map(expected_inner), Value::NegativeInt(-1000)])
    );
}
