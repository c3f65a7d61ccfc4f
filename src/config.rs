use std::sync::LazyLock;

use regex::Regex;

static DEFAULT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[&;]+ *").expect("default separator is a valid regex"));

/// Configuration shared by both parameter encoders.
///
/// ## Separator
///
/// Query strings are split into `key=value` segments on the `separator`
/// pattern. The default matches one or more `&` or `;` characters followed
/// by any number of spaces, so `a=1; b=2&&c=3` yields three pairs.
///
/// ## Nesting Depth
///
/// The `max_depth` parameter controls how many bracket segments the nested
/// decoder will materialize below a root key. This protects against
/// maliciously crafted inputs with excessive nesting. Anything past the limit
/// is kept as a single literal key.
///
/// Default value: `max_depth = 32`
///
/// ```
/// use param_qs::{Config, NestedParamsEncoder, ParamValue, ParamsEncoder};
///
/// let encoder = NestedParamsEncoder::default().with_config(Config::new().max_depth(1));
/// let params = encoder.decode_str("a[b][c][d]=1");
/// let b = params["a"].as_mapping().unwrap()["b"].as_mapping().unwrap();
/// assert_eq!(b["[c][d]"], ParamValue::from("1"));
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) max_depth: usize,
    pub(crate) separator: Regex,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_depth: 32,
            separator: DEFAULT_SEPARATOR.clone(),
        }
    }

    /// Specifies the maximum depth of nested keys the decoder will build.
    /// Default is 32.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Specifies the pattern used to split a query string into pairs.
    ///
    /// Empty segments between matches are skipped.
    pub fn separator(mut self, separator: Regex) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator_pattern(&self) -> &Regex {
        &self.separator
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }
}
