use crate::error::Result;
use crate::value::{EncodeInput, Mapping, ParamValue};

/// A query-string dialect.
///
/// Implemented by [`NestedParamsEncoder`](crate::NestedParamsEncoder) and
/// [`FlatParamsEncoder`](crate::FlatParamsEncoder), so that request builders
/// can be generic over the dialect they emit.
pub trait ParamsEncoder {
    /// Encodes already-normalized pairs in the given order.
    fn encode_pairs(&self, pairs: &[(String, ParamValue)]) -> Result<String>;

    /// Decodes a query string. Never fails.
    fn decode_str(&self, query: &str) -> Mapping;

    /// Encodes `input`, returning `None` for null input.
    ///
    /// Mapping input is sorted by key before encoding; explicit pairs keep
    /// their order.
    fn encode<I>(&self, input: I) -> Result<Option<String>>
    where
        I: Into<EncodeInput>,
        Self: Sized,
    {
        let Some(pairs) = input.into().into_pairs()? else {
            return Ok(None);
        };
        tracing::trace!(pairs = pairs.len(), "encoding params");
        self.encode_pairs(&pairs).map(Some)
    }

    /// Decodes `query`, passing `None` through.
    fn decode(&self, query: Option<&str>) -> Option<Mapping> {
        query.map(|q| self.decode_str(q))
    }
}
