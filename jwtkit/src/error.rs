//! Common errors

#![allow(missing_copy_implementations)]

use std::error::Error as StdError;

use thiserror::Error;

use crate::{jwa, jwk};

/// The token does not consist of exactly three dot-separated segments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("malformed token")]
pub struct MalformedToken {
    _p: (),
}

pub(crate) const fn malformed_token() -> MalformedToken {
    MalformedToken { _p: () }
}

/// The token header is malformed
#[derive(Debug, Error)]
#[error("malformed header")]
pub struct MalformedHeader {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_header(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedHeader {
    MalformedHeader {
        source: source.into(),
    }
}

/// The token header declares a type other than `JWT`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("invalid header type '{typ}'")]
pub struct InvalidHeaderType {
    typ: String,
}

pub(crate) fn invalid_header_type(typ: impl Into<String>) -> InvalidHeaderType {
    InvalidHeaderType { typ: typ.into() }
}

/// The token payload is malformed
#[derive(Debug, Error)]
#[error("malformed payload")]
pub struct MalformedPayload {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_payload(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedPayload {
    MalformedPayload {
        source: source.into(),
    }
}

/// The signature cannot be decoded or has the wrong length for its algorithm
#[derive(Debug, Error)]
#[error("malformed signature")]
pub struct MalformedSignature {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_signature(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedSignature {
    MalformedSignature {
        source: source.into(),
    }
}

/// The signature length does not match the fixed width of its algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("expected signature of {expected} bytes, got {actual}")]
pub struct SignatureLength {
    expected: usize,
    actual: usize,
}

pub(crate) const fn signature_length(expected: usize, actual: usize) -> SignatureLength {
    SignatureLength { expected, actual }
}

/// The provided name could not be matched with any known algorithm
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("'{alg}' does not match known algorithms")]
pub struct UnknownAlgorithm {
    alg: String,
}

impl UnknownAlgorithm {
    /// The unrecognized algorithm name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.alg
    }
}

#[inline]
pub(crate) fn unknown_algorithm(alg: impl Into<String>) -> UnknownAlgorithm {
    UnknownAlgorithm { alg: alg.into() }
}

/// The algorithm is known, but no implementation is registered or its
/// primitives are unavailable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("algorithm '{alg}' is not available")]
pub struct UnavailableAlgorithm {
    alg: jwa::Algorithm,
}

impl UnavailableAlgorithm {
    /// The unavailable algorithm
    #[must_use]
    pub const fn algorithm(&self) -> jwa::Algorithm {
        self.alg
    }
}

#[inline]
pub(crate) const fn unavailable_algorithm(alg: jwa::Algorithm) -> UnavailableAlgorithm {
    UnavailableAlgorithm { alg }
}

/// The key cannot be used with the requested algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("key incompatible with algorithm '{alg}'")]
pub struct IncompatibleAlgorithm {
    alg: jwa::Algorithm,
}

#[inline]
pub(crate) fn incompatible_algorithm(alg: impl Into<jwa::Algorithm>) -> IncompatibleAlgorithm {
    IncompatibleAlgorithm { alg: alg.into() }
}

/// The JWK `kty` does not name a known key type
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("'{kty}' does not match known key types")]
pub struct UnknownKeyType {
    kty: String,
}

#[inline]
pub(crate) fn unknown_key_type(kty: impl Into<String>) -> UnknownKeyType {
    UnknownKeyType { kty: kty.into() }
}

/// The key type is known, but no parser is registered for it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("key type '{kty}' is not available")]
pub struct UnavailableKeyType {
    kty: jwk::KeyType,
}

impl UnavailableKeyType {
    /// The unavailable key type
    #[must_use]
    pub const fn key_type(&self) -> jwk::KeyType {
        self.kty
    }
}

#[inline]
pub(crate) const fn unavailable_key_type(kty: jwk::KeyType) -> UnavailableKeyType {
    UnavailableKeyType { kty }
}

/// A required JWK member is missing or could not be decoded
#[derive(Debug, Error)]
#[error("missing or invalid JWK member '{field}'")]
pub struct InvalidKeyField {
    field: &'static str,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl InvalidKeyField {
    /// The name of the offending JWK member
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }
}

pub(crate) const fn missing_key_field(field: &'static str) -> InvalidKeyField {
    InvalidKeyField {
        field,
        source: None,
    }
}

pub(crate) fn invalid_key_field(
    field: &'static str,
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> InvalidKeyField {
    InvalidKeyField {
        field,
        source: Some(source.into()),
    }
}

/// The JWK `key_ops` do not permit the requested operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("JWK is not a {op}er")]
pub struct CapabilityMismatch {
    op: jwk::KeyOperation,
}

impl CapabilityMismatch {
    /// The operation that was requested
    #[must_use]
    pub const fn operation(&self) -> jwk::KeyOperation {
        self.op
    }
}

pub(crate) const fn capability_mismatch(op: jwk::KeyOperation) -> CapabilityMismatch {
    CapabilityMismatch { op }
}

/// The JWK document is not a JSON object with the expected envelope
#[derive(Debug, Error)]
#[error("malformed JWK")]
pub struct MalformedJwk {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_jwk(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedJwk {
    MalformedJwk {
        source: source.into(),
    }
}

/// The key material was rejected as inconsistent or unsuitable
#[derive(Debug, Error)]
#[error("key rejected")]
pub struct InvalidKey {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn invalid_key(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> InvalidKey {
    InvalidKey {
        source: source.into(),
    }
}

/// The signature did not verify
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("signature is invalid")]
pub struct SignatureInvalid {
    _p: (),
}

pub(crate) const fn signature_invalid() -> SignatureInvalid {
    SignatureInvalid { _p: () }
}

/// No verifier is registered under the key ID suggested by the token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("no verifier for key ID")]
pub struct NoVerifierForKeyId {
    _p: (),
}

pub(crate) const fn no_verifier_for_key_id() -> NoVerifierForKeyId {
    NoVerifierForKeyId { _p: () }
}

/// Unexpected error (possibly a bug)
#[derive(Debug, Error)]
#[error("unexpected error")]
pub struct Unexpected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn unexpected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> Unexpected {
    Unexpected {
        source: source.into(),
    }
}

/// An error occurring while creating a signature
#[derive(Debug, Error)]
pub enum SigningError {
    /// The key cannot be used with this algorithm
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

/// An error occurring while verifying a signature
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The signature has the wrong shape for the algorithm
    #[error(transparent)]
    MalformedSignature(#[from] MalformedSignature),

    /// The signature did not verify
    #[error(transparent)]
    SignatureInvalid(#[from] SignatureInvalid),

    /// The key cannot be used with this algorithm
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

impl VerifyError {
    /// Whether the error is due to a malformed signature
    #[must_use]
    pub fn is_malformed_signature(&self) -> bool {
        matches!(self, Self::MalformedSignature(_))
    }

    /// Whether the error is due to a signature that failed to verify
    #[must_use]
    pub fn is_signature_invalid(&self) -> bool {
        matches!(self, Self::SignatureInvalid(_))
    }
}

/// An error occurring while binding key material to an algorithm, either
/// directly through the registry or by parsing a JWK
#[derive(Debug, Error)]
pub enum KeyError {
    /// The algorithm name is not recognized
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The algorithm has no available implementation
    #[error(transparent)]
    UnavailableAlgorithm(#[from] UnavailableAlgorithm),

    /// The key type is not recognized
    #[error(transparent)]
    UnknownKeyType(#[from] UnknownKeyType),

    /// The key type has no registered parser
    #[error(transparent)]
    UnavailableKeyType(#[from] UnavailableKeyType),

    /// A JWK member is missing or invalid
    #[error(transparent)]
    InvalidKeyField(#[from] InvalidKeyField),

    /// The JWK does not permit the requested operation
    #[error(transparent)]
    CapabilityMismatch(#[from] CapabilityMismatch),

    /// The JWK document could not be read
    #[error(transparent)]
    MalformedJwk(#[from] MalformedJwk),

    /// The key material was rejected
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),
}

impl KeyError {
    /// Whether the error is due to an unrecognized algorithm name
    #[must_use]
    pub fn is_unknown_algorithm(&self) -> bool {
        matches!(self, Self::UnknownAlgorithm(_))
    }

    /// Whether the error is due to an algorithm without an implementation
    #[must_use]
    pub fn is_unavailable_algorithm(&self) -> bool {
        matches!(self, Self::UnavailableAlgorithm(_))
    }

    /// Whether the error is due to an unrecognized key type
    #[must_use]
    pub fn is_unknown_key_type(&self) -> bool {
        matches!(self, Self::UnknownKeyType(_))
    }

    /// Whether the error is due to a key type without a parser
    #[must_use]
    pub fn is_unavailable_key_type(&self) -> bool {
        matches!(self, Self::UnavailableKeyType(_))
    }

    /// Whether the error is due to a missing or invalid JWK member
    #[must_use]
    pub fn is_invalid_key_field(&self) -> bool {
        matches!(self, Self::InvalidKeyField(_))
    }

    /// Whether the error is due to the JWK `key_ops`
    #[must_use]
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(self, Self::CapabilityMismatch(_))
    }

    /// Whether the error is due to rejected key material
    #[must_use]
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

/// An error occurring while producing a token
#[derive(Debug, Error)]
pub enum JwtSigningError {
    /// The signer failed to produce a signature
    #[error(transparent)]
    SigningError(#[from] SigningError),

    /// The header could not be serialized
    #[error(transparent)]
    MalformedHeader(#[from] MalformedHeader),

    /// The payload could not be serialized
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

/// An error occurring while verifying a token
#[derive(Debug, Error)]
pub enum JwtVerifyError {
    /// The token does not have exactly three segments
    #[error(transparent)]
    MalformedToken(#[from] MalformedToken),

    /// The token header is malformed or does not declare a JWT
    #[error(transparent)]
    MalformedHeader(#[from] MalformedHeader),

    /// The token payload is malformed
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),

    /// The token signature is malformed
    #[error(transparent)]
    MalformedSignature(#[from] MalformedSignature),

    /// The token header names an unknown algorithm
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The token signature did not verify
    #[error(transparent)]
    SignatureInvalid(#[from] SignatureInvalid),

    /// No verifier is registered under the key ID named by the token
    #[error(transparent)]
    NoVerifierForKeyId(#[from] NoVerifierForKeyId),

    /// The verifier rejected its own key
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

impl From<VerifyError> for JwtVerifyError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::MalformedSignature(e) => Self::MalformedSignature(e),
            VerifyError::SignatureInvalid(e) => Self::SignatureInvalid(e),
            VerifyError::InvalidKey(e) => Self::InvalidKey(e),
            VerifyError::Unexpected(e) => Self::Unexpected(e),
        }
    }
}

impl JwtVerifyError {
    /// Whether the error is due to the token structure
    #[must_use]
    pub fn is_malformed_token(&self) -> bool {
        matches!(self, Self::MalformedToken(_))
    }

    /// Whether the error is due to the token header
    #[must_use]
    pub fn is_malformed_header(&self) -> bool {
        matches!(self, Self::MalformedHeader(_))
    }

    /// Whether the error is due to the token payload
    #[must_use]
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }

    /// Whether the error is due to a malformed signature
    #[must_use]
    pub fn is_malformed_signature(&self) -> bool {
        matches!(self, Self::MalformedSignature(_))
    }

    /// Whether the error is due to an unknown algorithm
    #[must_use]
    pub fn is_unknown_algorithm(&self) -> bool {
        matches!(self, Self::UnknownAlgorithm(_))
    }

    /// Whether the error is due to a signature that failed to verify
    #[must_use]
    pub fn is_signature_invalid(&self) -> bool {
        matches!(self, Self::SignatureInvalid(_))
    }

    /// Whether the error is due to a key ID with no registered verifier
    #[must_use]
    pub fn is_no_verifier_for_key_id(&self) -> bool {
        matches!(self, Self::NoVerifierForKeyId(_))
    }
}
