//! Implementations of the JSON Web Keys (JWK) standard
//!
//! A JWK is read in two steps. The envelope members (`kty`, `kid`,
//! `key_ops`, `alg`) are read first, and `key_ops` must grant the requested
//! operation. The document is then handed to the [`KeyParser`] registered
//! for its `kty`, which decodes the type-specific members into native key
//! material.
//!
//! The specifications for JSON Web Keys can be found in [RFC7517][].
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use std::{convert::TryFrom, fmt};

use aliri_braid::braid;
use jwtkit_base64::Base64UrlUint;
use serde::Deserialize;

use crate::{error, jwa};

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
pub mod ec;
#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
pub mod rsa;

/// An identifier for a JWK
#[braid(serde, ref_doc = "A borrowed reference to JWK identifier ([`KeyId`])")]
pub struct KeyId;

/// A JWK key type, as named by the `kty` member
///
/// Like [`jwa::Algorithm`], each key type has a small dense id used to
/// index the key parser table of a [`Registry`][crate::Registry].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum KeyType {
    /// Elliptic curve (`EC`)
    Ec = 1,
    /// RSA (`RSA`)
    Rsa = 2,
    /// Octet sequence (`oct`)
    Oct = 3,
}

impl KeyType {
    /// Every key type, in id order
    pub const ALL: [KeyType; 3] = [Self::Ec, Self::Rsa, Self::Oct];

    /// The number of key types, which is also the largest id
    pub const COUNT: usize = Self::ALL.len();

    /// The dense numeric id of the key type
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// The name of the key type as used by the `kty` member
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ec => "EC",
            Self::Rsa => "RSA",
            Self::Oct => "oct",
        }
    }

    /// Looks up a key type by its `kty` name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kty| kty.name() == name)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation a JWK may be used for, as listed in `key_ops`
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum KeyOperation {
    /// Compute signatures (`sign`)
    Sign,
    /// Verify signatures (`verify`)
    Verify,
}

impl KeyOperation {
    /// The name of the operation as used by the `key_ops` member
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sign => "sign",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for KeyOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The envelope metadata shared by every key type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyDescriptor {
    key_id: Option<KeyId>,
    algorithm: Option<jwa::Algorithm>,
}

impl KeyDescriptor {
    /// Creates a descriptor
    #[must_use]
    pub fn new(key_id: Option<KeyId>, algorithm: Option<jwa::Algorithm>) -> Self {
        Self { key_id, algorithm }
    }

    /// The key ID from the `kid` member, if present and non-empty
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.key_id.as_deref()
    }

    /// The algorithm from the `alg` member, if present
    #[must_use]
    pub fn algorithm(&self) -> Option<jwa::Algorithm> {
        self.algorithm
    }

    pub(crate) fn into_key_id(self) -> Option<KeyId> {
        self.key_id
    }
}

/// Decodes the type-specific members of a JWK into native key material
///
/// Parsers are registered with a [`Registry`][crate::Registry] under the
/// key type they report. The envelope has already been checked when a
/// parser is invoked.
pub trait KeyParser: fmt::Debug + Send + Sync {
    /// The key type handled by this parser
    fn key_type(&self) -> KeyType;

    /// Reads a private key, returning it with the algorithm it is bound to
    fn parse_private(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PrivateKey), error::KeyError>;

    /// Reads a public key, returning it with the algorithm it is bound to
    fn parse_public(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PublicKey), error::KeyError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    kty: String,
    #[serde(default)]
    kid: Option<KeyId>,
    #[serde(default)]
    key_ops: Vec<String>,
    #[serde(default)]
    alg: Option<String>,
}

/// Reads the envelope of a JWK and checks that it grants `op`
pub(crate) fn read_envelope(
    jwk: &[u8],
    op: KeyOperation,
) -> Result<(KeyType, KeyDescriptor), error::KeyError> {
    let envelope: Envelope = serde_json::from_slice(jwk).map_err(error::malformed_jwk)?;

    if !envelope.key_ops.iter().any(|o| o == op.name()) {
        return Err(error::capability_mismatch(op).into());
    }

    let kty = KeyType::from_name(&envelope.kty)
        .ok_or_else(|| error::unknown_key_type(envelope.kty.as_str()))?;

    let algorithm = envelope
        .alg
        .as_deref()
        .map(jwa::Algorithm::try_from)
        .transpose()?;

    let key_id = envelope.kid.filter(|kid| !kid.as_str().is_empty());

    Ok((kty, KeyDescriptor::new(key_id, algorithm)))
}

/// Decodes a required big-integer member
#[cfg_attr(not(any(feature = "ec", feature = "rsa")), allow(dead_code))]
pub(crate) fn required_uint(
    field: &'static str,
    value: Option<&str>,
) -> Result<Base64UrlUint, error::InvalidKeyField> {
    let value = value.ok_or_else(|| error::missing_key_field(field))?;
    Base64UrlUint::from_encoded(value).map_err(|e| error::invalid_key_field(field, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod envelope {
        use super::*;

        #[test]
        fn requires_the_requested_operation() {
            let jwk = br#"{"kty":"EC","key_ops":["verify"]}"#;
            let err = read_envelope(jwk, KeyOperation::Sign).unwrap_err();
            assert!(err.is_capability_mismatch());

            let (kty, desc) = read_envelope(jwk, KeyOperation::Verify).unwrap();
            assert_eq!(kty, KeyType::Ec);
            assert_eq!(desc, KeyDescriptor::default());
        }

        #[test]
        fn missing_key_ops_grants_nothing() {
            let jwk = br#"{"kty":"RSA","kid":"abc"}"#;
            assert!(read_envelope(jwk, KeyOperation::Sign)
                .unwrap_err()
                .is_capability_mismatch());
            assert!(read_envelope(jwk, KeyOperation::Verify)
                .unwrap_err()
                .is_capability_mismatch());
        }

        #[test]
        fn reads_key_id_and_algorithm() {
            let jwk = br#"{"kty":"RSA","kid":"abc","alg":"RS384","key_ops":["sign","verify"]}"#;
            let (kty, desc) = read_envelope(jwk, KeyOperation::Sign).unwrap();
            assert_eq!(kty, KeyType::Rsa);
            assert_eq!(desc.key_id().map(KeyIdRef::as_str), Some("abc"));
            assert_eq!(desc.algorithm(), Some(jwa::Algorithm::RS384));
        }

        #[test]
        fn empty_key_id_is_absent() {
            let jwk = br#"{"kty":"oct","kid":"","key_ops":["sign"]}"#;
            let (kty, desc) = read_envelope(jwk, KeyOperation::Sign).unwrap();
            assert_eq!(kty, KeyType::Oct);
            assert_eq!(desc.key_id(), None);
        }

        #[test]
        fn rejects_unknown_key_type() {
            let jwk = br#"{"kty":"OKP","key_ops":["sign"]}"#;
            let err = read_envelope(jwk, KeyOperation::Sign).unwrap_err();
            assert!(err.is_unknown_key_type());
        }

        #[test]
        fn rejects_unknown_algorithm() {
            let jwk = br#"{"kty":"EC","alg":"HS256","key_ops":["sign"]}"#;
            let err = read_envelope(jwk, KeyOperation::Sign).unwrap_err();
            assert!(err.is_unknown_algorithm());
        }

        #[test]
        fn rejects_non_object() {
            let err = read_envelope(b"[1,2,3]", KeyOperation::Sign).unwrap_err();
            assert!(matches!(err, error::KeyError::MalformedJwk(_)));
        }
    }

    mod members {
        use super::*;

        #[test]
        fn names_missing_member() {
            let err = required_uint("d", None).unwrap_err();
            assert_eq!(err.field(), "d");
        }

        #[test]
        fn names_undecodable_member() {
            let err = required_uint("qi", Some("not base64!")).unwrap_err();
            assert_eq!(err.field(), "qi");
        }

        #[test]
        fn decodes_canonical_value() {
            let e = required_uint("e", Some("AQAB")).unwrap();
            assert_eq!(e.to_u64(), Some(65537));
        }
    }
}
