use param_qs::{EncodeInput, Error, FlatParamsEncoder, Mapping, ParamValue, ParamsEncoder};
use pretty_assertions::assert_eq;

/// Builds a `ParamValue::Mapping` from a list of `(key, value)` entries.
macro_rules! map {
    ($($key:expr => $value:expr),* $(,)?) => {
        ParamValue::Mapping(Mapping::from_iter([
            $(($key.to_string(), ParamValue::from($value))),*
        ]))
    };
}

fn decode(query: &str) -> ParamValue {
    ParamValue::Mapping(FlatParamsEncoder::default().decode_str(query))
}

fn encode(input: impl Into<EncodeInput>) -> Option<String> {
    FlatParamsEncoder::default().encode(input).unwrap()
}

#[test]
fn null_passthrough() {
    let encoder = FlatParamsEncoder::default();
    assert_eq!(encoder.decode(None), None);
    assert_eq!(encoder.encode(None::<Mapping>).unwrap(), None);
}

#[test]
fn decode_plus_as_space() {
    assert_eq!(decode("a=b+c+d"), map! { "a" => "b c d" });
    let query = encode(map! { "a" => "b c d" }).unwrap();
    assert_eq!(query, "a=b+c+d");
    assert_eq!(decode(&query), map! { "a" => "b c d" });
}

#[test]
fn decode_brackets_are_literal() {
    assert_eq!(
        decode("a[b][c]=d&a[b][e]=f"),
        map! { "a[b][c]" => "d", "a[b][e]" => "f" }
    );
}

#[test]
fn decode_empty_and_blank_values() {
    assert_eq!(
        decode("a=b&empty=&blank"),
        map! { "a" => "b", "empty" => "", "blank" => ParamValue::Null }
    );
}

#[test]
fn decode_repeated_keys_collect() {
    assert_eq!(
        decode("a=1&b=x&a=2&a=3"),
        map! { "a" => vec!["1", "2", "3"], "b" => "x" }
    );
}

#[test]
fn decode_keeps_first_appearance_order() {
    let params = FlatParamsEncoder::default().decode_str("z=1&a=2&z=3");
    let keys: Vec<_> = params.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a"]);
}

#[test]
fn decode_empty_string() {
    assert_eq!(decode(""), map! {});
    assert_eq!(decode("&&;"), map! {});
}

#[test]
fn decode_is_repeatable() {
    let encoder = FlatParamsEncoder::default();
    for query in [
        "a=1&a=2&a=3",
        "a&a=1&a",
        "a[b]=1&a[b]=2;;  c=%zz&=x",
    ] {
        let first = encoder.decode_str(query);
        let second = encoder.decode_str(query);
        assert_eq!(first, second, "query: {query}");
        let keys: Vec<_> = first.keys().collect();
        assert_eq!(keys, second.keys().collect::<Vec<_>>(), "query: {query}");
    }
}

#[test]
fn encode_repeats_key_for_sequences() {
    let input = map! { "tag" => vec!["b", "a"], "q" => "x y" };
    assert_eq!(encode(input).as_deref(), Some("q=x+y&tag=b&tag=a"));
}

#[test]
fn encode_scalars() {
    let input = vec![
        ("t", ParamValue::from(true)),
        ("n", ParamValue::Null),
        ("s", ParamValue::from("1")),
    ];
    assert_eq!(encode(input).as_deref(), Some("t=true&n&s=1"));
}

#[test]
fn encode_escapes_keys_and_values() {
    let input = map! { "a[b]" => "c&d=e" };
    assert_eq!(encode(input).as_deref(), Some("a%5Bb%5D=c%26d%3De"));
}

#[test]
fn encode_rejects_nested_mapping() {
    let err = FlatParamsEncoder::default()
        .encode(map! { "a" => map! { "b" => "c" } })
        .unwrap_err();
    assert!(matches!(err, Error::TypeConversion(_)));
    insta::assert_snapshot!(err, @"type conversion error: can't convert mapping under `a` into a scalar");
}

#[test]
fn encode_rejects_scalar_input() {
    let err = FlatParamsEncoder::default()
        .encode(ParamValue::from(true))
        .unwrap_err();
    assert!(matches!(err, Error::TypeConversion(_)));
}

#[test]
fn encode_then_decode_repeated_keys() {
    let input = map! { "id" => vec!["1", "2"], "name" => "a b", "flag" => ParamValue::Null };
    let query = encode(input.clone()).unwrap();
    assert_eq!(query, "flag&id=1&id=2&name=a+b");
    assert_eq!(decode(&query), input);
}
