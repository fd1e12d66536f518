//! Implementations of the JSON Web Signature (JWS) standard
//!
//! Every signature algorithm is implemented as an [`Engine`]: an
//! incremental hash accumulator that is fed the signing input through
//! [`Engine::write()`] and then asked to [`sign`][Engine::sign()] or
//! [`verify`][Engine::verify()]. Engines are produced on demand by an
//! [`EngineFactory`] registered with a [`Registry`][crate::Registry].
//!
//! [`Signer`] and [`Verifier`] bind a key, an algorithm, and an optional
//! key ID together, and create a fresh engine for each message.
//!
//! The specifications for this standard can be found in [RFC7515][].
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515

use std::{fmt, sync::Arc};

use rand_core::CryptoRngCore;

use crate::{error, jwa, jwk};

/// A per-message signature computation for a single algorithm
///
/// An engine carries mutable hash state and must not be shared between
/// messages without a call to [`reset()`][Engine::reset()].
pub trait Engine {
    /// The algorithm implemented by this engine
    fn algorithm(&self) -> jwa::Algorithm;

    /// Feeds signing input into the hash accumulator, returning the
    /// number of bytes consumed
    fn write(&mut self, data: &[u8]) -> usize;

    /// Clears the hash accumulator
    fn reset(&mut self);

    /// The block size of the underlying hash function
    fn block_size(&self) -> usize;

    /// The length in bytes of signatures produced with `key`
    ///
    /// Fixed for ECDSA, the modulus length for RSA, and zero for `none`.
    fn size(&self, key: &jwa::PrivateKey) -> usize;

    /// Checks that the private key is structurally compatible with the algorithm
    fn validate(&self, key: &jwa::PrivateKey) -> Result<(), error::InvalidKey>;

    /// Checks that the public key is structurally compatible with the algorithm
    fn validate_public(&self, key: &jwa::PublicKey) -> Result<(), error::InvalidKey>;

    /// Signs everything written so far
    fn sign(
        &self,
        rng: &mut dyn CryptoRngCore,
        key: &jwa::PrivateKey,
    ) -> Result<Vec<u8>, error::SigningError>;

    /// Verifies `signature` over everything written so far
    fn verify(&self, signature: &[u8], key: &jwa::PublicKey) -> Result<(), error::VerifyError>;
}

/// Produces fresh [`Engine`]s for one algorithm
pub trait EngineFactory: fmt::Debug + Send + Sync {
    /// The algorithm of the engines produced
    fn algorithm(&self) -> jwa::Algorithm;

    /// Whether the primitives required by the engine are available
    fn is_available(&self) -> bool {
        true
    }

    /// Creates a new engine with an empty hash accumulator
    fn new_engine(&self) -> Box<dyn Engine>;
}

/// An incremental hash shared by the hashing engines
#[derive(Clone)]
#[cfg_attr(not(any(feature = "ec", feature = "rsa")), allow(dead_code))]
pub(crate) struct Digester {
    ctx: ring::digest::Context,
}

#[cfg_attr(not(any(feature = "ec", feature = "rsa")), allow(dead_code))]
impl Digester {
    pub(crate) fn new(alg: &'static ring::digest::Algorithm) -> Self {
        Self {
            ctx: ring::digest::Context::new(alg),
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> usize {
        self.ctx.update(data);
        data.len()
    }

    pub(crate) fn reset(&mut self) {
        self.ctx = ring::digest::Context::new(self.ctx.algorithm());
    }

    pub(crate) fn block_size(&self) -> usize {
        self.ctx.algorithm().block_len()
    }

    /// Digest of everything written so far, leaving the accumulator intact
    pub(crate) fn digest(&self) -> ring::digest::Digest {
        self.ctx.clone().finish()
    }
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Digester")
            .field("algorithm", self.ctx.algorithm())
            .finish()
    }
}

/// A private key bound to an algorithm and an optional key ID
///
/// Created through [`Registry::new_signer()`][crate::Registry::new_signer()]
/// or [`Registry::parse_signer()`][crate::Registry::parse_signer()], which
/// validate the key against the algorithm.
#[derive(Clone, Debug)]
pub struct Signer {
    alg: jwa::Algorithm,
    key_id: Option<jwk::KeyId>,
    key: jwa::PrivateKey,
    signature_size: usize,
    factory: Arc<dyn EngineFactory>,
}

impl Signer {
    pub(crate) fn new(
        key_id: Option<jwk::KeyId>,
        key: jwa::PrivateKey,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self, error::InvalidKey> {
        let engine = factory.new_engine();
        engine.validate(&key)?;

        Ok(Self {
            alg: factory.algorithm(),
            key_id,
            signature_size: engine.size(&key),
            key,
            factory,
        })
    }

    /// The algorithm used to sign
    #[inline]
    #[must_use]
    pub fn algorithm(&self) -> jwa::Algorithm {
        self.alg
    }

    /// The key ID, if any
    #[inline]
    #[must_use]
    pub fn key_id(&self) -> Option<&jwk::KeyIdRef> {
        self.key_id.as_deref()
    }

    /// Whether the algorithm's primitives are available
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.factory.is_available()
    }

    /// The exact length in bytes of the signatures this signer produces
    #[inline]
    #[must_use]
    pub fn signature_size(&self) -> usize {
        self.signature_size
    }

    /// Signs `data` with a freshly created engine
    pub fn sign(
        &self,
        rng: &mut dyn CryptoRngCore,
        data: &[u8],
    ) -> Result<Vec<u8>, error::SigningError> {
        let mut engine = self.factory.new_engine();
        engine.write(data);
        engine.sign(rng, &self.key)
    }

    /// Creates a verifier for signatures made by this signer
    #[must_use]
    pub fn verifier(&self) -> Verifier {
        Verifier {
            alg: self.alg,
            key_id: self.key_id.clone(),
            key: self.key.public_key(),
            factory: Arc::clone(&self.factory),
        }
    }
}

/// A public key bound to an algorithm and an optional key ID
///
/// Created through [`Registry::new_verifier()`][crate::Registry::new_verifier()],
/// [`Registry::parse_verifier()`][crate::Registry::parse_verifier()], or
/// [`Signer::verifier()`].
#[derive(Clone, Debug)]
pub struct Verifier {
    alg: jwa::Algorithm,
    key_id: Option<jwk::KeyId>,
    key: jwa::PublicKey,
    factory: Arc<dyn EngineFactory>,
}

impl Verifier {
    pub(crate) fn new(
        key_id: Option<jwk::KeyId>,
        key: jwa::PublicKey,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self, error::InvalidKey> {
        factory.new_engine().validate_public(&key)?;

        Ok(Self {
            alg: factory.algorithm(),
            key_id,
            key,
            factory,
        })
    }

    /// The algorithm accepted by this verifier
    #[inline]
    #[must_use]
    pub fn algorithm(&self) -> jwa::Algorithm {
        self.alg
    }

    /// The key ID, if any
    #[inline]
    #[must_use]
    pub fn key_id(&self) -> Option<&jwk::KeyIdRef> {
        self.key_id.as_deref()
    }

    /// Whether the algorithm's primitives are available
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.factory.is_available()
    }

    /// Verifies `signature` over `data`
    ///
    /// A signature claiming any algorithm other than the verifier's own is
    /// rejected as invalid.
    pub fn verify(
        &self,
        alg: jwa::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::VerifyError> {
        if alg != self.alg {
            return Err(error::signature_invalid().into());
        }

        let mut engine = self.factory.new_engine();
        engine.write(data);
        engine.verify(signature, &self.key)
    }
}
