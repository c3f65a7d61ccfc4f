//! Deserializing typed values out of a decoded [`ParamValue`] tree.
//!
//! Query strings carry no type information, so every scalar arrives as a
//! string. Scalars are parsed on demand into whatever primitive the target
//! type asks for; if parsing fails the string is handed to the visitor as-is
//! and the visitor reports the mismatch.
//!
//! A few shape conversions smooth over what the dialects can express:
//!
//! - a mapping can be read as a sequence of its values, in key order
//! - a single scalar can be read as a one-element sequence, so `ids=1` in
//!   the flat dialect still fills a `Vec`
//! - `Null` reads as `None`, unit, an empty string, an empty sequence or an
//!   empty map
//! - an empty string reads as `None`, so optional fields survive the nested
//!   dialect, which has no bare-key form

use serde::de::{self, IntoDeserializer, Unexpected};
use serde::forward_to_deserialize_any;

use crate::error::{Error, Result};
use crate::value::{Mapping, ParamValue};

/// Deserializes a `T` from a [`ParamValue`].
///
/// ```
/// # use serde::Deserialize;
/// use param_qs::{from_value, NestedParamsEncoder, ParamValue, ParamsEncoder};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Query {
///     id: u32,
///     tags: Vec<String>,
/// }
///
/// let params = NestedParamsEncoder::default().decode_str("id=7&tags[]=a&tags[]=b");
/// let query: Query = from_value(ParamValue::Mapping(params)).unwrap();
/// assert_eq!(query, Query { id: 7, tags: vec!["a".into(), "b".into()] });
/// ```
pub fn from_value<T: de::DeserializeOwned>(value: ParamValue) -> Result<T> {
    T::deserialize(value)
}

impl ParamValue {
    fn invalid_type<E: de::Error>(&self, exp: &dyn de::Expected) -> E {
        de::Error::invalid_type(self.unexpected(), exp)
    }

    fn unexpected(&self) -> Unexpected<'_> {
        match self {
            ParamValue::Null => Unexpected::Unit,
            ParamValue::Bool(b) => Unexpected::Bool(*b),
            ParamValue::String(s) => Unexpected::Str(s),
            ParamValue::Sequence(_) => Unexpected::Seq,
            ParamValue::Mapping(_) => Unexpected::Map,
        }
    }
}

fn visit_sequence<'de, V>(seq: Vec<ParamValue>, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    let mut deserializer: de::value::SeqDeserializer<_, Error> =
        de::value::SeqDeserializer::new(seq.into_iter());
    let value = visitor.visit_seq(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

fn visit_mapping<'de, V>(map: Mapping, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    // keys go through `ParamValue` too, so that integer keys parse on demand
    let mut deserializer: de::value::MapDeserializer<'de, _, Error> =
        de::value::MapDeserializer::new(map.into_iter().map(|(k, v)| (ParamValue::String(k), v)));
    let value = visitor.visit_map(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

macro_rules! deserialize_primitive {
    ($ty:ident, $method:ident, $visit_method:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self {
                ParamValue::String(s) => match s.parse::<$ty>() {
                    Ok(val) => visitor.$visit_method(val),
                    // hand the raw string to the visitor so it can report
                    // the mismatch
                    Err(_) => visitor.visit_string(s),
                },
                other => other.deserialize_any(visitor),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for ParamValue {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::Null => visitor.visit_unit(),
            ParamValue::Bool(b) => visitor.visit_bool(b),
            ParamValue::String(s) => visitor.visit_string(s),
            ParamValue::Sequence(seq) => visit_sequence(seq, visitor),
            ParamValue::Mapping(map) => visit_mapping(map, visitor),
        }
    }

    deserialize_primitive!(bool, deserialize_bool, visit_bool);
    deserialize_primitive!(i8, deserialize_i8, visit_i8);
    deserialize_primitive!(i16, deserialize_i16, visit_i16);
    deserialize_primitive!(i32, deserialize_i32, visit_i32);
    deserialize_primitive!(i64, deserialize_i64, visit_i64);
    deserialize_primitive!(u8, deserialize_u8, visit_u8);
    deserialize_primitive!(u16, deserialize_u16, visit_u16);
    deserialize_primitive!(u32, deserialize_u32, visit_u32);
    deserialize_primitive!(u64, deserialize_u64, visit_u64);
    deserialize_primitive!(f32, deserialize_f32, visit_f32);
    deserialize_primitive!(f64, deserialize_f64, visit_f64);

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            // the nested dialect writes `None` as `key=`
            ParamValue::Null => visitor.visit_none(),
            ParamValue::String(ref s) if s.is_empty() => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::Null => visitor.visit_unit(),
            ParamValue::String(s) if s.is_empty() => visitor.visit_unit(),
            other => Err(other.invalid_type(&visitor)),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::Null => visitor.visit_str(""),
            ParamValue::Bool(b) => visitor.visit_str(if b { "true" } else { "false" }),
            ParamValue::String(s) => visitor.visit_string(s),
            other => Err(other.invalid_type(&visitor)),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::Null => visit_sequence(Vec::new(), visitor),
            ParamValue::Sequence(seq) => visit_sequence(seq, visitor),
            ParamValue::Mapping(map) => visit_sequence(map.into_values().collect(), visitor),
            scalar => visit_sequence(vec![scalar], visitor),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::Null => visit_mapping(Mapping::new(), visitor),
            ParamValue::Mapping(map) => visit_mapping(map, visitor),
            other => Err(other.invalid_type(&visitor)),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            ParamValue::String(variant) => visitor.visit_enum(variant.into_deserializer()),
            ParamValue::Mapping(map) if map.len() == 1 => {
                let Some((variant, value)) = map.into_iter().next() else {
                    return Err(Error::Custom("expected a single enum variant".to_string()));
                };
                visitor.visit_enum(EnumDeserializer { variant, value })
            }
            other => Err(other.invalid_type(&"a variant name or a single-entry map")),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        char
        bytes
        byte_buf
        identifier
    }
}

impl<'de> IntoDeserializer<'de, Error> for ParamValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

struct EnumDeserializer {
    variant: String,
    value: ParamValue,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ParamValue::String(self.variant))?;
        Ok((variant, VariantDeserializer(self.value)))
    }
}

struct VariantDeserializer(ParamValue);

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.0)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self.0, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.0, visitor)
    }
}
