//! URL-safe base64 buffers for compact tokens and JSON Web Keys
//!
//! The [`jwtkit_base64`][] crate provides the two base64 shapes that
//! [`jwtkit`][] needs on the wire:
//!
//! * [`Base64Url`][] wraps an owned byte buffer that is serialized using the
//!   URL-safe alphabet with no padding, as used by every segment of a
//!   compact token.
//! * [`Base64UrlUint`][] wraps an unsigned big-endian integer, as used by
//!   the numeric members of a JSON Web Key (`n`, `e`, `d`, `x`, `y`, …).
//!   Values are held in canonical form, without leading zero octets.
//!
//! Underlying data is stored as raw bytes. Costs of conversions between
//! base64 and raw bytes only occur for calls to `from_encoded()` or
//! conversions to strings via debug or display formatting.
//!
//! The underlying encoding/decoding mechanism is provided by the [`base64`][]
//! crate.
//!
//!   [`jwtkit`]: https://docs.rs/jwtkit
//!   [`jwtkit_base64`]: https://docs.rs/jwtkit_base64
//!   [`base64`]: https://docs.rs/base64
//!
//! # Example
//!
//! ```
//! use jwtkit_base64::Base64Url;
//!
//! let data = Base64Url::from_raw(r#"{"sub":"1234567890"}"#.as_bytes());
//! assert_eq!(data.to_string(), "eyJzdWIiOiIxMjM0NTY3ODkwIn0");
//! assert_eq!(format!("{:?}", data), "`eyJzdWIiOiIxMjM0NTY3ODkwIn0`");
//! ```
//!
//! Big-endian integers drop their leading zero octets:
//!
//! ```
//! use jwtkit_base64::Base64UrlUint;
//!
//! let e = Base64UrlUint::from_encoded("AAEAAQ").unwrap();
//! assert_eq!(e.as_be_bytes(), &[0x01, 0x00, 0x01]);
//! assert_eq!(e.to_u64(), Some(65537));
//! assert_eq!(e.to_string(), "AQAB");
//! ```
//!
//! # Serde
//!
//! With the `serde` feature enabled, both types serialize as base64url
//! strings.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{error::Error, fmt};

use base64::engine::{general_purpose::URL_SAFE_NO_PAD, Engine as _};

mod uint;

pub use uint::Base64UrlUint;

/// An error while decoding a value which is not properly formatted
/// base64 data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: base64::DecodeError,
}

impl From<base64::DecodeError> for InvalidBase64Data {
    fn from(err: base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64 data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// The destination slice does not have exactly the length required by
/// the encoded form of the source data
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncodedLengthMismatch {
    expected: usize,
    actual: usize,
}

impl EncodedLengthMismatch {
    /// The length the destination slice should have had
    #[must_use]
    pub const fn expected(&self) -> usize {
        self.expected
    }

    /// The length of the destination slice provided
    #[must_use]
    pub const fn actual(&self) -> usize {
        self.actual
    }
}

impl fmt::Display for EncodedLengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "destination has length {}, but encoding requires exactly {}",
            self.actual, self.expected
        )
    }
}

impl Error for EncodedLengthMismatch {}

/// Owned data to be encoded as URL-safe base64 (no padding)
///
/// Encoding alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
///
/// Data is held in memory in its raw form. Costs of serialization
/// are only incurred when serializing or displaying the value in
/// its base64 representation.
///
/// Implementations of the [`From`] trait assume that the
/// underlying structure is in raw form.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
#[repr(transparent)]
#[must_use]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Creates an empty buffer
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a new buffer from an owned value
    ///
    /// This function has no cost for [`Vec<u8>`]. Other types incur
    /// the cost of copying into a buffer.
    ///
    /// To decode a base64-encoded buffer, use [`from_encoded()`][Self::from_encoded()].
    #[inline]
    pub fn from_raw<T: Into<Vec<u8>>>(raw: T) -> Self {
        Self(raw.into())
    }

    /// Constructs a new buffer from a base64-encoded slice
    ///
    /// This function will decode the slice into a new owned buffer.
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        let data = URL_SAFE_NO_PAD.decode(enc)?;
        Ok(Self(data))
    }

    /// Encodes `raw` directly into `dst`
    ///
    /// `dst` must be exactly [`calc_encoded_len(raw.len())`][Self::calc_encoded_len()]
    /// bytes long. No intermediate buffer is allocated.
    pub fn encode_to_slice(raw: &[u8], dst: &mut [u8]) -> Result<(), EncodedLengthMismatch> {
        let expected = Self::calc_encoded_len(raw.len());
        if dst.len() != expected {
            return Err(EncodedLengthMismatch {
                expected,
                actual: dst.len(),
            });
        }

        match URL_SAFE_NO_PAD.encode_slice(raw, dst) {
            Ok(written) if written == expected => Ok(()),
            Ok(written) => Err(EncodedLengthMismatch {
                expected,
                actual: written,
            }),
            Err(_) => Err(EncodedLengthMismatch {
                expected,
                actual: dst.len(),
            }),
        }
    }

    /// Unwraps the underlying buffer
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Provides access to the underlying slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Calculates the expected length of the base64-encoding of this buffer
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::calc_encoded_len(self.0.len())
    }

    /// Calculates the expected length of the base64-encoding for a buffer of size `len`
    #[inline]
    #[must_use]
    pub const fn calc_encoded_len(len: usize) -> usize {
        let d = len / 3 * 4;
        let m = len % 3;
        if m > 0 {
            d + m + 1
        } else {
            d
        }
    }
}

impl From<Vec<u8>> for Base64Url {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self(buf)
    }
}

impl From<&'_ [u8]> for Base64Url {
    #[inline]
    fn from(slice: &[u8]) -> Self {
        Self::from_raw(slice)
    }
}

impl From<Base64Url> for Vec<u8> {
    #[inline]
    fn from(val: Base64Url) -> Self {
        val.0
    }
}

impl AsRef<[u8]> for Base64Url {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", URL_SAFE_NO_PAD.encode(&self.0))
    }
}

/// Serialize the underlying byte array as a base64 string
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Base64Url {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

/// Deserialize a base64 string and decode it into a byte array
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Base64Url {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let enc: std::borrow::Cow<'de, str> = serde::Deserialize::deserialize(deserializer)?;
        Self::from_encoded(enc.as_bytes()).map_err(serde::de::Error::custom)
    }
}
