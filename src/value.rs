//! The parameter tree produced by `decode` and consumed by `encode`.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// An ordered mapping of unique string keys to parameter values.
pub type Mapping = IndexMap<String, ParamValue>;

/// Any value that can appear in a parameter tree.
///
/// - `Null`: a key with no value at all, e.g. `blank` in `a=b&blank`
/// - `Bool`: encoded as `true` / `false`
/// - `String`: the opaque scalar value
/// - `Sequence`: an ordered list, encoded without indices (`a[]=1&a[]=2`)
/// - `Mapping`: nested key-value pairs (`a[b]=1`)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    String(String),
    Sequence(Vec<ParamValue>),
    Mapping(Mapping),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ParamValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the text used when this value is written as a scalar, or
    /// `None` for sequences and mappings.
    ///
    /// `Null` is written as an empty string.
    pub(crate) fn scalar_text(&self) -> Option<&str> {
        match self {
            ParamValue::Null => Some(""),
            ParamValue::Bool(true) => Some("true"),
            ParamValue::Bool(false) => Some("false"),
            ParamValue::String(s) => Some(s),
            ParamValue::Sequence(_) | ParamValue::Mapping(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "bool",
            ParamValue::String(_) => "string",
            ParamValue::Sequence(_) => "sequence",
            ParamValue::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<Mapping> for ParamValue {
    fn from(map: Mapping) -> Self {
        ParamValue::Mapping(map)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(seq: Vec<T>) -> Self {
        ParamValue::Sequence(seq.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParamValue::Mapping(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ParamValue::Null => serializer.serialize_none(),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Sequence(seq) => {
                let mut state = serializer.serialize_seq(Some(seq.len()))?;
                for value in seq {
                    state.serialize_element(value)?;
                }
                state.end()
            }
            ParamValue::Mapping(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

/// The top-level input to `encode`.
///
/// Ordered pairs are encoded as given, which matters when the caller
/// controls ordering (e.g. for OAuth signatures). A mapping value has its
/// pairs sorted by key first so that the output is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeInput {
    /// No input; `encode` returns `None`.
    Null,
    /// Ordered `(key, value)` pairs, encoded in the given order.
    Pairs(Vec<(String, ParamValue)>),
    /// A value that must be a mapping (or `Null`).
    Value(ParamValue),
}

impl EncodeInput {
    /// Converts any serializable value into encoder input.
    ///
    /// The value must serialize to a map or struct, or to a sequence of
    /// `(key, value)` tuples whose order is kept. Anything else is a
    /// [`Error::TypeConversion`].
    pub fn from_serialize<T: Serialize + ?Sized>(input: &T) -> Result<Self> {
        let value = crate::ser::to_value(input)?;
        match value {
            ParamValue::Mapping(_) | ParamValue::Null => Ok(EncodeInput::Value(value)),
            ParamValue::Sequence(seq) => seq
                .into_iter()
                .map(into_pair)
                .collect::<Option<Vec<_>>>()
                .map(EncodeInput::Pairs)
                .ok_or_else(|| not_a_mapping("sequence")),
            other => Err(not_a_mapping(other.kind())),
        }
    }

    /// Normalizes the input into the list of pairs to encode.
    ///
    /// Returns `Ok(None)` for null input. Mapping pairs are sorted by key
    /// (byte order); explicit pairs keep their order.
    pub(crate) fn into_pairs(self) -> Result<Option<Vec<(String, ParamValue)>>> {
        match self {
            EncodeInput::Null | EncodeInput::Value(ParamValue::Null) => Ok(None),
            EncodeInput::Pairs(pairs) => Ok(Some(pairs)),
            EncodeInput::Value(ParamValue::Mapping(map)) => {
                let mut pairs: Vec<_> = map.into_iter().collect();
                pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
                Ok(Some(pairs))
            }
            EncodeInput::Value(other) => Err(not_a_mapping(other.kind())),
        }
    }
}

/// Splits a serialized `(key, value)` tuple. The key must be a string.
fn into_pair(value: ParamValue) -> Option<(String, ParamValue)> {
    let ParamValue::Sequence(mut pair) = value else {
        return None;
    };
    if pair.len() != 2 {
        return None;
    }
    let value = pair.pop()?;
    match pair.pop()? {
        ParamValue::String(key) => Some((key, value)),
        _ => None,
    }
}

fn not_a_mapping(kind: &str) -> Error {
    tracing::debug!(kind, "rejecting non-mapping encode input");
    Error::type_conversion(format_args!("can't convert {kind} into a mapping"))
}

impl From<ParamValue> for EncodeInput {
    fn from(value: ParamValue) -> Self {
        EncodeInput::Value(value)
    }
}

impl From<Mapping> for EncodeInput {
    fn from(map: Mapping) -> Self {
        EncodeInput::Value(ParamValue::Mapping(map))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> From<Vec<(K, V)>> for EncodeInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        EncodeInput::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<T: Into<EncodeInput>> From<Option<T>> for EncodeInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(EncodeInput::Null, Into::into)
    }
}
