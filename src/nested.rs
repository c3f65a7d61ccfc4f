//! The nested dialect: `a[b][c]=1&a[d][]=2&a[d][]=3`.
//!
//! ### Encoding
//!
//! Mappings are written with their keys in brackets, sorted by escaped key.
//! Sequences are written with an empty bracket pair per element, in their
//! original order (no index is embedded in the key). The brackets are always
//! emitted as the literal escapes `%5B` / `%5D`, independent of the escaper.
//!
//! Empty sequences and mappings produce no segment and no separator, so
//! `{a: [], b: "1"}` encodes to `b=1` rather than `&b=1`.
//!
//! ### Decoding
//!
//! Decoding is total: any string produces a mapping. Each raw key is split on
//! runs of `[` and `]`; every segment but the last names a nested mapping,
//! created on demand, and the last segment receives the value. A key ending
//! in `[]` appends to a sequence instead of overwriting.
//!
//! Because there is no explicit index for `[]`, the grammar cannot tell
//! `a[][b]=1&a[][b]=2` apart from a single object written twice: the second
//! value overwrites the first, giving `{a: {b: "2"}}`.
//!
//! Once every pair is applied, [`coerce_arrays`] turns mappings whose keys are
//! all decimal integers into sequences ordered by numeric key.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::config::Config;
use crate::encoder::ParamsEncoder;
use crate::error::Result;
use crate::escape::{Escaper, FormEscaper};
use crate::pairs::PairSplitter;
use crate::value::{Mapping, ParamValue};

/// Encoder for the bracket-nested dialect.
///
/// ```
/// use param_qs::{NestedParamsEncoder, ParamValue, ParamsEncoder};
///
/// let encoder = NestedParamsEncoder::default();
/// let params: ParamValue = [
///     ("name", ParamValue::from("Acme Inc")),
///     ("ids", ParamValue::from(vec!["1", "2"])),
/// ]
/// .into_iter()
/// .collect();
///
/// let query = encoder.encode(params).unwrap().unwrap();
/// assert_eq!(query, "ids%5B%5D=1&ids%5B%5D=2&name=Acme+Inc");
///
/// let decoded = encoder.decode_str(&query);
/// assert_eq!(decoded["ids"], ParamValue::from(vec!["1", "2"]));
/// ```
#[derive(Clone, Debug)]
pub struct NestedParamsEncoder<E = FormEscaper> {
    escaper: E,
    config: Config,
}

impl Default for NestedParamsEncoder {
    fn default() -> Self {
        Self::new(FormEscaper)
    }
}

impl<E: Escaper> NestedParamsEncoder<E> {
    pub fn new(escaper: E) -> Self {
        Self {
            escaper,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Appends the encoded form of `value`, nested under `parent`, to
    /// `buffer`.
    fn to_query(&self, parent: &str, value: &ParamValue, buffer: &mut String) {
        match value {
            ParamValue::Mapping(map) => {
                let mut entries: Vec<(Cow<'_, str>, &ParamValue)> = map
                    .iter()
                    .map(|(key, val)| (self.escaper.escape(key), val))
                    .collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                for (key, val) in entries {
                    let child = format!("{parent}%5B{key}%5D");
                    self.to_query(&child, val, buffer);
                }
            }
            ParamValue::Sequence(seq) => {
                let child = format!("{parent}%5B%5D");
                for val in seq {
                    self.to_query(&child, val, buffer);
                }
            }
            ParamValue::Null | ParamValue::Bool(_) | ParamValue::String(_) => {
                let text = value.scalar_text().unwrap_or_default();
                if !buffer.is_empty() {
                    buffer.push('&');
                }
                buffer.push_str(parent);
                buffer.push('=');
                buffer.push_str(&self.escaper.escape(text));
            }
        }
    }
}

impl<E: Escaper> ParamsEncoder for NestedParamsEncoder<E> {
    fn encode_pairs(&self, pairs: &[(String, ParamValue)]) -> Result<String> {
        let mut buffer = String::with_capacity(128);
        for (key, value) in pairs {
            let parent = self.escaper.escape(key);
            self.to_query(&parent, value, &mut buffer);
        }
        Ok(buffer)
    }

    fn decode_str(&self, query: &str) -> Mapping {
        tracing::trace!(len = query.len(), "decoding nested params");
        let splitter = PairSplitter::new(&self.config.separator, &self.escaper);
        let mut params = Mapping::new();
        for (key, value) in splitter.split(query) {
            let path = KeyPath::parse(&key, self.config.max_depth);
            let value = value.map_or(ParamValue::Null, ParamValue::String);
            path.insert(&mut params, value);
        }

        params
            .into_iter()
            .map(|(key, value)| match value {
                ParamValue::Mapping(map) => (key, coerce_arrays(map)),
                other => (key, other),
            })
            .collect()
    }
}

/// The parsed form of a raw nested key such as `a[b][]`.
#[derive(Debug, PartialEq)]
struct KeyPath<'k> {
    /// Segments naming the nested mappings to walk through.
    parents: Vec<&'k str>,
    /// The segment that receives the value.
    last: &'k str,
    /// Whether the raw key ended in `[]`.
    array_notation: bool,
}

impl<'k> KeyPath<'k> {
    /// Splits `key` on runs of `[` / `]`.
    ///
    /// A leading empty segment is kept (`[a]` has parents `[""]`); trailing
    /// empty segments are dropped. Past `max_depth` nested segments, the rest
    /// of the key is kept verbatim as the last segment.
    fn parse(key: &'k str, max_depth: usize) -> Self {
        let array_notation = key.ends_with("[]");
        if max_depth == 0 {
            return KeyPath {
                parents: Vec::new(),
                last: key,
                array_notation: false,
            };
        }

        let bytes = key.as_bytes();
        let is_bracket = |b: u8| b == b'[' || b == b']';
        let mut segments = Vec::new();
        let mut start = 0;
        let mut idx = 0;
        while idx < bytes.len() {
            if is_bracket(bytes[idx]) {
                // only the first segment can be empty, every later one
                // sits between two maximal bracket runs
                segments.push((start, idx));
                while idx < bytes.len() && is_bracket(bytes[idx]) {
                    idx += 1;
                }
                start = idx;
            } else {
                idx += 1;
            }
        }
        if start < bytes.len() {
            segments.push((start, bytes.len()));
        }
        if segments.len() == 1 && segments[0].0 == segments[0].1 {
            // e.g. `[]`: the only segment is both leading and trailing
            segments.clear();
        }

        if segments.len() > max_depth + 1 {
            let (_, end) = segments[max_depth];
            let rest = &key[end..];
            let rest = rest.strip_prefix(']').unwrap_or(rest);
            tracing::debug!(key, max_depth, "nested key exceeds max depth, keeping remainder literally");
            return KeyPath {
                parents: segments[..=max_depth].iter().map(|&(s, e)| &key[s..e]).collect(),
                last: rest,
                array_notation: false,
            };
        }

        let mut parents: Vec<&str> = segments.iter().map(|&(s, e)| &key[s..e]).collect();
        let last = parents.pop().unwrap_or("");
        KeyPath {
            parents,
            last,
            array_notation,
        }
    }

    /// Materializes the path under `root` and stores `value` at its end.
    fn insert(&self, root: &mut Mapping, value: ParamValue) {
        let mut current = root;
        for segment in &self.parents {
            let node = current
                .entry((*segment).to_owned())
                .or_insert_with(|| ParamValue::Mapping(Mapping::new()));
            current = expect_mapping(node);
        }

        if !self.array_notation {
            current.insert(self.last.to_owned(), value);
            return;
        }

        let node = current
            .entry(self.last.to_owned())
            .or_insert_with(|| ParamValue::Sequence(Vec::new()));
        match node {
            ParamValue::Sequence(seq) => seq.push(value),
            ParamValue::Null | ParamValue::Mapping(_) => {
                *node = ParamValue::Sequence(vec![value]);
            }
            ParamValue::Bool(_) | ParamValue::String(_) => {
                // `a=1&a[]=2`: keep the earlier scalar as the first element
                let existing = std::mem::take(node);
                *node = ParamValue::Sequence(vec![existing, value]);
            }
        }
    }
}

/// Returns the mapping stored in `node`, replacing any other value with an
/// empty mapping first.
fn expect_mapping(node: &mut ParamValue) -> &mut Mapping {
    if !matches!(node, ParamValue::Mapping(_)) {
        *node = ParamValue::Mapping(Mapping::new());
    }
    match node {
        ParamValue::Mapping(map) => map,
        _ => unreachable!("node was just replaced with a mapping"),
    }
}

/// Converts mappings whose keys are all decimal integers into sequences.
///
/// Nested mappings are coerced first, so the rule applies bottom-up. A
/// non-empty mapping whose every key matches `^[0-9]+$` becomes a sequence of
/// its values ordered by the numeric value of the keys. Any other mapping,
/// including the empty one, is returned unchanged.
///
/// ```
/// use param_qs::{coerce_arrays, Mapping, ParamValue};
///
/// let map: Mapping = [("2", "c"), ("10", "d"), ("1", "b")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), ParamValue::from(v)))
///     .collect();
/// assert_eq!(coerce_arrays(map), ParamValue::from(vec!["b", "c", "d"]));
/// ```
pub fn coerce_arrays(map: Mapping) -> ParamValue {
    let map: Mapping = map
        .into_iter()
        .map(|(key, value)| match value {
            ParamValue::Mapping(inner) => (key, coerce_arrays(inner)),
            other => (key, other),
        })
        .collect();

    if map.is_empty() || !map.keys().all(|k| is_index(k)) {
        return ParamValue::Mapping(map);
    }

    let mut entries: Vec<(String, ParamValue)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| cmp_index(a, b));
    ParamValue::Sequence(entries.into_iter().map(|(_, value)| value).collect())
}

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Compares two decimal strings by numeric value without parsing them, so
/// arbitrarily long indices cannot overflow.
fn cmp_index(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{cmp_index, coerce_arrays, KeyPath};
    use crate::value::{Mapping, ParamValue};

    fn path<'k>(parents: &[&'k str], last: &'k str, array_notation: bool) -> KeyPath<'k> {
        KeyPath {
            parents: parents.to_vec(),
            last,
            array_notation,
        }
    }

    fn map(entries: Vec<(&str, ParamValue)>) -> Mapping {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn parse_plain_key() {
        assert_eq!(KeyPath::parse("abc", 32), path(&[], "abc", false));
        assert_eq!(KeyPath::parse("", 32), path(&[], "", false));
    }

    #[test]
    fn parse_nested_key() {
        assert_eq!(KeyPath::parse("a[b][c]", 32), path(&["a", "b"], "c", false));
    }

    #[test]
    fn parse_array_key() {
        assert_eq!(KeyPath::parse("a[]", 32), path(&[], "a", true));
        assert_eq!(KeyPath::parse("a[b][]", 32), path(&["a"], "b", true));
        assert_eq!(KeyPath::parse("a[][b]", 32), path(&["a"], "b", false));
    }

    #[test]
    fn parse_malformed_brackets() {
        assert_eq!(KeyPath::parse("[a]", 32), path(&[""], "a", false));
        assert_eq!(KeyPath::parse("[]", 32), path(&[], "", true));
        assert_eq!(KeyPath::parse("a]b[[c", 32), path(&["a", "b"], "c", false));
        assert_eq!(KeyPath::parse("a[b", 32), path(&["a"], "b", false));
    }

    #[test]
    fn parse_max_depth() {
        assert_eq!(
            KeyPath::parse("a[b][c][d][e][f][g][h]", 5),
            path(&["a", "b", "c", "d", "e", "f"], "[g][h]", false)
        );
        assert_eq!(KeyPath::parse("a[b][c][]", 1), path(&["a", "b"], "[c][]", false));
        assert_eq!(KeyPath::parse("a[b][c]", 2), path(&["a", "b"], "c", false));
    }

    #[test]
    fn parse_no_nesting() {
        assert_eq!(KeyPath::parse("a[b][]", 0), path(&[], "a[b][]", false));
    }

    #[test]
    fn insert_replaces_scalar_parent() {
        let mut root = Mapping::new();
        KeyPath::parse("a", 32).insert(&mut root, "1".into());
        KeyPath::parse("a[b]", 32).insert(&mut root, "2".into());
        assert_eq!(root, map(vec![("a", ParamValue::Mapping(map(vec![("b", "2".into())])))]));
    }

    #[test]
    fn insert_array_after_scalar() {
        let mut root = Mapping::new();
        KeyPath::parse("a", 32).insert(&mut root, "1".into());
        KeyPath::parse("a[]", 32).insert(&mut root, "2".into());
        assert_eq!(root, map(vec![("a", vec!["1", "2"].into())]));
    }

    #[test]
    fn coerce_leaves_empty_and_mixed_maps() {
        assert_eq!(coerce_arrays(Mapping::new()), ParamValue::Mapping(Mapping::new()));
        let mixed = map(vec![("1", "b".into()), ("x", "c".into())]);
        assert_eq!(coerce_arrays(mixed.clone()), ParamValue::Mapping(mixed));
    }

    #[test]
    fn coerce_nested_bottom_up() {
        let inner = map(vec![("0", "x".into())]);
        let outer = map(vec![("k", ParamValue::Mapping(inner))]);
        assert_eq!(
            coerce_arrays(outer),
            ParamValue::Mapping(map(vec![("k", vec!["x"].into())]))
        );
    }

    #[test]
    fn coerce_sorts_numerically() {
        let m = map(vec![("10", "c".into()), ("9", "b".into()), ("007", "a".into())]);
        assert_eq!(coerce_arrays(m), ParamValue::from(vec!["a", "b", "c"]));
    }

    #[test]
    fn cmp_index_handles_long_keys() {
        use std::cmp::Ordering;
        assert_eq!(cmp_index("99999999999999999999999", "100000000000000000000000"), Ordering::Less);
        assert_eq!(cmp_index("01", "1"), Ordering::Equal);
        assert_eq!(cmp_index("0", "00"), Ordering::Equal);
    }
}
