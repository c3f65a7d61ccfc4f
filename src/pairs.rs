//! Splitting a raw query string into unescaped `(key, value)` pairs.

use regex::{Regex, Split};

use crate::escape::Escaper;

/// Splits query strings on a separator pattern.
///
/// The splitter borrows its separator and escaper, so it is cheap to build
/// on every call to `decode`.
#[derive(Clone, Copy, Debug)]
pub struct PairSplitter<'a, E> {
    separator: &'a Regex,
    escaper: &'a E,
}

impl<'a, E: Escaper> PairSplitter<'a, E> {
    pub fn new(separator: &'a Regex, escaper: &'a E) -> Self {
        PairSplitter { separator, escaper }
    }

    /// Returns a lazy iterator over the pairs in `query`.
    ///
    /// Each segment is split at the first `=`; a segment without `=` yields a
    /// `None` value. Both sides are unescaped. Empty segments are skipped.
    ///
    /// ```
    /// use param_qs::{Config, FormEscaper, PairSplitter};
    ///
    /// let config = Config::default();
    /// let splitter = PairSplitter::new(config.separator_pattern(), &FormEscaper);
    /// let pairs: Vec<_> = splitter.split("a=b+c&;blank; x=%3D=").collect();
    /// assert_eq!(
    ///     pairs,
    ///     [
    ///         ("a".to_string(), Some("b c".to_string())),
    ///         ("blank".to_string(), None),
    ///         ("x".to_string(), Some("==".to_string())),
    ///     ]
    /// );
    /// ```
    pub fn split<'q>(&self, query: &'q str) -> Pairs<'a, 'q, E> {
        Pairs {
            segments: self.separator.split(query),
            escaper: self.escaper,
        }
    }
}

/// Iterator returned by [`PairSplitter::split`].
pub struct Pairs<'a, 'q, E> {
    segments: Split<'a, 'q>,
    escaper: &'a E,
}

impl<E: Escaper> Iterator for Pairs<'_, '_, E> {
    type Item = (String, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.segments.by_ref().find(|s| !s.is_empty())?;
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (segment, None),
        };
        let key = self.escaper.unescape(key).into_owned();
        let value = value.map(|v| self.escaper.unescape(v).into_owned());
        Some((key, value))
    }
}
