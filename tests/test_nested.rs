use param_qs::{Config, Error, Mapping, NestedParamsEncoder, ParamValue, ParamsEncoder};
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
    ParamValue::Mapping(NestedParamsEncoder::default().decode_str(query))
}

fn encode(input: impl Into<param_qs::EncodeInput>) -> Option<String> {
    NestedParamsEncoder::default().encode(input).unwrap()
}

#[test]
fn null_passthrough() {
    let encoder = NestedParamsEncoder::default();
    assert_eq!(encoder.decode(None), None);
    assert_eq!(encoder.encode(None::<Mapping>).unwrap(), None);
    assert_eq!(encoder.encode(ParamValue::Null).unwrap(), None);
}

#[test]
fn decode_nested_mappings() {
    assert_eq!(
        decode("a[b][c]=d&a[b][e]=f"),
        map! { "a" => map! { "b" => map! { "c" => "d", "e" => "f" } } }
    );
}

#[test]
fn decode_array_notation() {
    assert_eq!(decode("a[]=b&a[]=c"), map! { "a" => vec!["b", "c"] });
}

#[test]
fn decode_numeric_keys_sorted_by_value() {
    assert_eq!(decode("a[2]=c&a[1]=b"), map! { "a" => vec!["b", "c"] });
    assert_eq!(
        decode("a[10]=c&a[9]=b&a[0]=a"),
        map! { "a" => vec!["a", "b", "c"] }
    );
}

#[test]
fn decode_nested_numeric_keys() {
    assert_eq!(
        decode("a[1][1]=b&a[2][1]=d&a[1][2]=c"),
        map! { "a" => vec![vec!["b", "c"], vec!["d"]] }
    );
}

#[test]
fn decode_mixed_keys_block_coercion() {
    assert_eq!(
        decode("a[1]=b&a[2]=c&a[d]=e"),
        map! { "a" => map! { "1" => "b", "2" => "c", "d" => "e" } }
    );
}

#[test]
fn decode_repeated_empty_brackets_overwrite() {
    assert_eq!(decode("a[][b]=c&a[][b]=d"), map! { "a" => map! { "b" => "d" } });
}

#[test]
fn decode_top_level_is_never_coerced() {
    assert_eq!(decode("0=a&1=b"), map! { "0" => "a", "1" => "b" });
}

#[test]
fn decode_bare_key_is_null() {
    assert_eq!(
        decode("a=b&empty=&blank"),
        map! { "a" => "b", "empty" => "", "blank" => ParamValue::Null }
    );
}

#[test]
fn decode_escaped_brackets() {
    assert_eq!(
        decode("a%5Bb%5D%5B%5D=1&a%5Bb%5D%5B%5D=2"),
        map! { "a" => map! { "b" => vec!["1", "2"] } }
    );
}

#[test]
fn decode_plain_key_overwrites() {
    assert_eq!(decode("a=1&a=2"), map! { "a" => "2" });
}

#[test]
fn decode_malformed_brackets() {
    assert_eq!(decode("[a]=1"), map! { "" => map! { "a" => "1" } });
    assert_eq!(decode("a[b=1"), map! { "a" => map! { "b" => "1" } });
    assert_eq!(decode("a]]b=1"), map! { "a" => map! { "b" => "1" } });
    assert_eq!(decode("[]=1"), map! { "" => vec!["1"] });
}

#[test]
fn decode_separators() {
    assert_eq!(
        decode("a=1;b=2& c=3&&;d=4"),
        map! { "a" => "1", "b" => "2", "c" => "3", "d" => "4" }
    );
}

#[test]
fn decode_custom_separator() {
    let separator = regex::Regex::new(r"\|").unwrap();
    let encoder = NestedParamsEncoder::default().with_config(Config::new().separator(separator));
    let params = encoder.decode_str("a[]=1|a[]=2&b=3");
    assert_eq!(
        ParamValue::Mapping(params),
        map! { "a" => vec!["1", "2&b=3"] }
    );
}

#[test]
fn decode_depth_limit_keeps_remainder() {
    let encoder = NestedParamsEncoder::default().with_config(Config::new().max_depth(2));
    let params = encoder.decode_str("a[b][c][d][e]=1");
    assert_eq!(
        ParamValue::Mapping(params),
        map! { "a" => map! { "b" => map! { "c" => map! { "[d][e]" => "1" } } } }
    );
}

#[test]
fn decode_zero_depth_disables_nesting() {
    let encoder = NestedParamsEncoder::default().with_config(Config::new().max_depth(0));
    let params = encoder.decode_str("a[b]=1&a[]=2");
    assert_eq!(
        ParamValue::Mapping(params),
        map! { "a[b]" => "1", "a[]" => "2" }
    );
}

#[test]
fn decode_is_repeatable() {
    let encoder = NestedParamsEncoder::default();
    for query in [
        "a[1][1]=b&a[2][1]=d&a[1][2]=c",
        "a[][b]=c&a[][b]=d",
        "x[y]=1&x=2&[]=3&a]]b[[=4",
        "a=1&a[]=2&a[]=3&blank&a[9]=z",
    ] {
        let first = encoder.decode_str(query);
        let second = encoder.decode_str(query);
        assert_eq!(first, second, "query: {query}");
        let keys: Vec<_> = first.keys().collect();
        assert_eq!(keys, second.keys().collect::<Vec<_>>(), "query: {query}");
    }
}

#[test]
fn encode_sorts_mapping_keys() {
    let input = map! { "b" => "2", "a" => "1", "c" => map! { "z" => "3", "y" => "4" } };
    assert_eq!(
        encode(input).as_deref(),
        Some("a=1&b=2&c%5By%5D=4&c%5Bz%5D=3")
    );
}

#[test]
fn encode_keeps_pair_order() {
    let input = vec![("b", ParamValue::from("2")), ("a", ParamValue::from("1"))];
    assert_eq!(encode(input).as_deref(), Some("b=2&a=1"));
}

#[test]
fn encode_sequence_order_is_preserved() {
    let input = map! { "a" => vec!["z", "a", "m"] };
    assert_eq!(
        encode(input).as_deref(),
        Some("a%5B%5D=z&a%5B%5D=a&a%5B%5D=m")
    );
}

#[test]
fn encode_scalars() {
    let input = map! { "t" => true, "f" => false, "n" => ParamValue::Null, "s" => "a b/c" };
    assert_eq!(
        encode(input).as_deref(),
        Some("f=false&n=&s=a+b%2Fc&t=true")
    );
}

#[test]
fn encode_escapes_keys() {
    let input = map! { "a b" => map! { "c&d" => "e" } };
    assert_eq!(encode(input).as_deref(), Some("a+b%5Bc%26d%5D=e"));
}

#[test]
fn encode_sequence_of_mappings() {
    let input = map! { "a" => vec![map! { "b" => "1" }, map! { "b" => "2" }] };
    assert_eq!(
        encode(input).as_deref(),
        Some("a%5B%5D%5Bb%5D=1&a%5B%5D%5Bb%5D=2")
    );
}

#[test]
fn encode_skips_empty_containers() {
    let input = map! {
        "a" => Vec::<ParamValue>::new(),
        "b" => "1",
        "c" => Mapping::new(),
    };
    assert_eq!(encode(input).as_deref(), Some("b=1"));
}

#[test]
fn encode_empty_mapping_is_empty_string() {
    assert_eq!(encode(Mapping::new()).as_deref(), Some(""));
}

#[test]
fn encode_rejects_scalar_input() {
    let err = NestedParamsEncoder::default()
        .encode(ParamValue::from("42"))
        .unwrap_err();
    assert!(matches!(err, Error::TypeConversion(_)));
    insta::assert_snapshot!(err, @"type conversion error: can't convert string into a mapping");
}

#[test]
fn encode_then_decode_preserves_structure() {
    let input = map! {
        "user" => map! {
            "name" => "Mr & Mrs [Smith]",
            "tags" => vec!["a=b", "c;d"],
        },
        "page" => "2",
    };
    let query = encode(input.clone()).unwrap();
    assert_eq!(decode(&query), input);
}

#[test]
fn integer_keyed_mapping_becomes_sequence() {
    let input = map! { "a" => map! { "0" => "x", "1" => "y" } };
    let query = encode(input).unwrap();
    assert_eq!(decode(&query), map! { "a" => vec!["x", "y"] });
}
