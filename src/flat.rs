//! The flat dialect: `a=1&a=2&b=3`.
//!
//! There is no nesting. A sequence is written as the same key repeated once
//! per element, and on decode a repeated key collects its values into a
//! sequence. Brackets in keys have no meaning and are kept literally.

use indexmap::map::Entry;

use crate::config::Config;
use crate::encoder::ParamsEncoder;
use crate::error::{Error, Result};
use crate::escape::{Escaper, FormEscaper};
use crate::pairs::PairSplitter;
use crate::value::{Mapping, ParamValue};

/// Encoder for the flat dialect.
///
/// ```
/// use param_qs::{FlatParamsEncoder, ParamValue, ParamsEncoder};
///
/// let encoder = FlatParamsEncoder::default();
/// let query = encoder
///     .encode(vec![("q", ParamValue::from("rust lang")), ("tag", vec!["a", "b"].into())])
///     .unwrap();
/// assert_eq!(query.as_deref(), Some("q=rust+lang&tag=a&tag=b"));
///
/// let decoded = encoder.decode_str("tag=a&tag=b&q=rust+lang");
/// assert_eq!(decoded["tag"], ParamValue::from(vec!["a", "b"]));
/// ```
#[derive(Clone, Debug)]
pub struct FlatParamsEncoder<E = FormEscaper> {
    escaper: E,
    config: Config,
}

impl Default for FlatParamsEncoder {
    fn default() -> Self {
        Self::new(FormEscaper)
    }
}

impl<E: Escaper> FlatParamsEncoder<E> {
    pub fn new(escaper: E) -> Self {
        Self {
            escaper,
            config: Config::default(),
        }
    }

    /// Only the separator of `config` applies to the flat dialect.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn push_segment(&self, buffer: &mut String, key: &str, value: Option<&str>) {
        if !buffer.is_empty() {
            buffer.push('&');
        }
        buffer.push_str(key);
        if let Some(value) = value {
            buffer.push('=');
            buffer.push_str(&self.escaper.escape(value));
        }
    }
}

impl<E: Escaper> ParamsEncoder for FlatParamsEncoder<E> {
    fn encode_pairs(&self, pairs: &[(String, ParamValue)]) -> Result<String> {
        let mut buffer = String::with_capacity(128);
        for (key, value) in pairs {
            let encoded_key = self.escaper.escape(key);
            match value {
                ParamValue::Null => self.push_segment(&mut buffer, &encoded_key, None),
                ParamValue::Sequence(seq) => {
                    for element in seq {
                        let text = element.scalar_text().ok_or_else(|| {
                            Error::type_conversion(format_args!(
                                "can't convert nested {} under `{key}` into a scalar",
                                element.kind()
                            ))
                        })?;
                        self.push_segment(&mut buffer, &encoded_key, Some(text));
                    }
                }
                ParamValue::Mapping(_) => {
                    tracing::debug!(key = key.as_str(), "flat params cannot hold a mapping");
                    return Err(Error::type_conversion(format_args!(
                        "can't convert mapping under `{key}` into a scalar"
                    )));
                }
                ParamValue::Bool(_) | ParamValue::String(_) => {
                    self.push_segment(&mut buffer, &encoded_key, value.scalar_text());
                }
            }
        }
        Ok(buffer)
    }

    fn decode_str(&self, query: &str) -> Mapping {
        tracing::trace!(len = query.len(), "decoding flat params");
        let splitter = PairSplitter::new(&self.config.separator, &self.escaper);
        let mut params = Mapping::new();
        for (key, value) in splitter.split(query) {
            let value = value.map_or(ParamValue::Null, ParamValue::String);
            match params.entry(key) {
                Entry::Vacant(v) => {
                    v.insert(value);
                }
                Entry::Occupied(mut o) => {
                    let prior = o.get_mut();
                    match prior {
                        ParamValue::Sequence(seq) => seq.push(value),
                        // a bare key holds no value to keep
                        ParamValue::Null => *prior = value,
                        _ => {
                            let existing = std::mem::take(prior);
                            *prior = ParamValue::Sequence(vec![existing, value]);
                        }
                    }
                }
            }
        }
        params
    }
}
