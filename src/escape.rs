//! Percent-encoding primitives used by both parameter encoders.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// The `application/x-www-form-urlencoded` percent-encode set, minus the
/// space character which is written as `+` instead.
///
/// As defined in https://url.spec.whatwg.org/#application-x-www-form-urlencoded-percent-encode-set
/// this contains all code points except the ASCII alphanumerics,
/// U+002A (*), U+002D (-), U+002E (.), and U+005F (_).
pub const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// A percent-encode/decode pair injected into the parameter encoders.
///
/// Implementations must be pure: `unescape(escape(s)) == s` for every `s`,
/// and neither method may keep state between calls.
pub trait Escaper {
    /// Encodes a key or value for inclusion in a query string.
    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str>;

    /// Decodes a key or value taken from a query string. `+` decodes to a
    /// space.
    fn unescape<'a>(&self, value: &'a str) -> Cow<'a, str>;
}

impl<E: Escaper + ?Sized> Escaper for &E {
    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        (**self).escape(value)
    }

    fn unescape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        (**self).unescape(value)
    }
}

/// Form-urlencoded escaping with `+` for spaces.
///
/// ```
/// use param_qs::{Escaper, FormEscaper};
///
/// assert_eq!(FormEscaper.escape("a b&c"), "a+b%26c");
/// assert_eq!(FormEscaper.unescape("a+b%26c"), "a b&c");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormEscaper;

impl Escaper for FormEscaper {
    fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let encoded: Cow<'a, str> = percent_encoding::utf8_percent_encode(value, FORM_ENCODE_SET).into();
        match encoded {
            Cow::Borrowed(s) => replace_space(s),
            Cow::Owned(s) => Cow::Owned(replace_space(&s).into_owned()),
        }
    }

    fn unescape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match decode(value.as_bytes()) {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }
}

fn replace_space(input: &str) -> Cow<'_, str> {
    if input.contains(' ') {
        Cow::Owned(input.replace(' ', "+"))
    } else {
        Cow::Borrowed(input)
    }
}

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Decodes the input bytes, applying the following:
/// - Replaces `+` with a space
/// - Decodes percent-encoded bytes
///
/// Malformed escapes (`%` not followed by two hex digits) are left as-is.
/// Avoids allocating when neither `%` nor `+` is present.
pub fn decode(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.iter().any(|&b| b == b'+' || b == b'%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        match input[idx] {
            b'+' => {
                decoded.push(b' ');
                idx += 1;
            }
            b'%' => {
                let hex = input
                    .get(idx + 1)
                    .and_then(|h| char_to_digit(*h))
                    .zip(input.get(idx + 2).and_then(|l| char_to_digit(*l)));
                match hex {
                    Some((h, l)) => {
                        decoded.push(h * 0x10 + l);
                        idx += 3;
                    }
                    None => {
                        // not a valid escape, keep the `%` literally
                        decoded.push(b'%');
                        idx += 1;
                    }
                }
            }
            b => {
                decoded.push(b);
                idx += 1;
            }
        }
    }
    Cow::Owned(decoded)
}
