use std::{borrow::Cow, fmt, str::FromStr};

use base64::engine::{general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::InvalidBase64Data;

/// An unsigned big-endian integer encoded as URL-safe base64 (no padding)
///
/// This is the text form used by the numeric members of a JSON Web Key.
/// The value is always held in canonical form: leading zero octets are
/// removed on construction, and zero is held as an empty buffer.
///
/// When formatted, zero is rendered as a single zero-valued octet (`AA`),
/// and every other value uses the minimal number of octets.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
#[must_use]
pub struct Base64UrlUint(Vec<u8>);

impl Base64UrlUint {
    /// The value zero
    #[inline]
    pub const fn zero() -> Self {
        Self(Vec::new())
    }

    /// Constructs a value from big-endian octets, dropping any leading zeros
    pub fn from_be_bytes<T: Into<Vec<u8>>>(raw: T) -> Self {
        let mut raw = raw.into();
        let leading = raw.iter().take_while(|&&b| b == 0).count();
        raw.drain(..leading);
        Self(raw)
    }

    /// Decodes a base64url string into a canonical value
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        let raw = URL_SAFE_NO_PAD.decode(enc)?;
        Ok(Self::from_be_bytes(raw))
    }

    /// The minimal big-endian octets of the value
    ///
    /// Zero is represented by an empty slice.
    #[inline]
    #[must_use]
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwraps the minimal big-endian octets of the value
    #[inline]
    #[must_use]
    pub fn into_be_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Whether the value is zero
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of significant bits in the value
    #[must_use]
    pub fn bit_len(&self) -> usize {
        match self.0.first() {
            Some(&top) => (self.0.len() - 1) * 8 + (8 - top.leading_zeros() as usize),
            None => 0,
        }
    }

    /// Left-pads the value with zero octets to exactly `width` octets
    ///
    /// Returns `None` if the value does not fit.
    #[must_use]
    pub fn to_be_bytes_padded(&self, width: usize) -> Option<Vec<u8>> {
        let pad = width.checked_sub(self.0.len())?;
        let mut out = vec![0u8; width];
        out[pad..].copy_from_slice(&self.0);
        Some(out)
    }

    /// Converts the value to a native integer, if it fits
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None;
        }

        Some(self.0.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }
}

impl From<u64> for Base64UrlUint {
    fn from(value: u64) -> Self {
        Self::from_be_bytes(value.to_be_bytes().to_vec())
    }
}

impl FromStr for Base64UrlUint {
    type Err = InvalidBase64Data;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(s)
    }
}

impl fmt::Display for Base64UrlUint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(&URL_SAFE_NO_PAD.encode([0u8]))
        } else {
            f.write_str(&URL_SAFE_NO_PAD.encode(&self.0))
        }
    }
}

impl fmt::Debug for Base64UrlUint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", self)
    }
}

/// Serialize the value as a base64url string
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Base64UrlUint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialize a base64url string into a canonical value
#[cfg(any(feature = "serde", docsrs))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Base64UrlUint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let enc: Cow<'de, str> = serde::Deserialize::deserialize(deserializer)?;
        Self::from_encoded(enc.as_bytes()).map_err(serde::de::Error::custom)
    }
}
