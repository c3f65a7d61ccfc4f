//! Encoding and decoding of URL query parameters.
//!
//! Two query-string dialects are supported, both behind the
//! [`ParamsEncoder`] trait:
//!
//! - the **nested** dialect ([`NestedParamsEncoder`]), in the style of
//!   [`Rack::Utils::parse_nested_query`](http://www.rubydoc.info/github/rack/rack/Rack/Utils#parse_nested_query-class_method),
//!   where brackets express nesting: `user[name]=a&user[tags][]=x`
//! - the **flat** dialect ([`FlatParamsEncoder`]), where a sequence is a
//!   repeated key: `tag=x&tag=y`
//!
//! Both work on an untyped [`ParamValue`] tree. Decoding never fails: any
//! string produces a [`Mapping`], and malformed keys are interpreted on a
//! best-effort basis. Encoding fails only when the input has no key-value
//! shape.
//!
//! ## Typed usage
//!
//! With serde, structs and maps go through the same encoders:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Address {
//!     city: String,
//!     postcode: String,
//! }
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct QueryParams {
//!     id: u8,
//!     name: String,
//!     address: Address,
//!     user_ids: Vec<u8>,
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     name: "Acme".to_string(),
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     user_ids: vec![1, 2, 3, 4],
//! };
//! let rec_params: QueryParams = param_qs::from_str(
//!     "name=Acme&id=42&address[postcode]=12345&\
//!      address[city]=Carrot+City&user_ids[]=1&user_ids[]=2&\
//!      user_ids[]=3&user_ids[]=4",
//! )
//! .unwrap();
//! assert_eq!(rec_params, params);
//!
//! let encoded = param_qs::to_string(&params).unwrap();
//! assert_eq!(
//!     encoded,
//!     "address%5Bcity%5D=Carrot+City&address%5Bpostcode%5D=12345&id=42&name=Acme&\
//!      user_ids%5B%5D=1&user_ids%5B%5D=2&user_ids%5B%5D=3&user_ids%5B%5D=4"
//! );
//! ```
//!
//! Every scalar travels as text: numbers are formatted on the way out and
//! parsed on demand on the way in.

mod config;
mod de;
mod encoder;
mod error;
mod escape;
mod flat;
mod nested;
mod pairs;
mod ser;
mod value;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use config::Config;
pub use de::from_value;
pub use encoder::ParamsEncoder;
pub use error::{Error, Result};
pub use escape::{Escaper, FORM_ENCODE_SET, FormEscaper};
pub use flat::FlatParamsEncoder;
pub use nested::{NestedParamsEncoder, coerce_arrays};
pub use pairs::{PairSplitter, Pairs};
pub use ser::{ValueSerializer, to_value};
pub use value::{EncodeInput, Mapping, ParamValue};

fn encode_serialize<P, T>(encoder: &P, input: &T) -> Result<String>
where
    P: ParamsEncoder,
    T: Serialize + ?Sized,
{
    let input = EncodeInput::from_serialize(input)?;
    Ok(encoder.encode(input)?.unwrap_or_default())
}

/// Serializes a value into a nested-dialect query string.
///
/// The value must serialize as a struct or map. Keys are sorted at every
/// level. A value serializing to nothing (e.g. `None`) gives an empty string.
///
/// ```
/// # use std::collections::BTreeMap;
/// let mut map = BTreeMap::new();
/// map.insert("q", vec!["a b", "c"]);
/// assert_eq!(param_qs::to_string(&map).unwrap(), "q%5B%5D=a+b&q%5B%5D=c");
/// ```
pub fn to_string<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    encode_serialize(&NestedParamsEncoder::default(), input)
}

/// Serializes a value into a flat-dialect query string.
///
/// Nested structs and maps cannot be expressed in this dialect and give
/// [`Error::TypeConversion`].
pub fn to_flat_string<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    encode_serialize(&FlatParamsEncoder::default(), input)
}

/// Deserializes a nested-dialect query string into a `T`.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    let params = NestedParamsEncoder::default().decode_str(input);
    from_value(ParamValue::Mapping(params))
}

/// Deserializes a flat-dialect query string into a `T`.
///
/// ```
/// # use serde::Deserialize;
/// #[derive(Deserialize)]
/// struct Search {
///     tag: Vec<String>,
///     page: Option<u32>,
/// }
///
/// let search: Search = param_qs::from_flat_str("tag=a&tag=b").unwrap();
/// assert_eq!(search.tag, ["a", "b"]);
/// assert_eq!(search.page, None);
/// ```
pub fn from_flat_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    let params = FlatParamsEncoder::default().decode_str(input);
    from_value(ParamValue::Mapping(params))
}
