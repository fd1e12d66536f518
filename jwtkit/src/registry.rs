use std::{mem, sync::Arc};

use crate::{
    error, jwa,
    jwk::{self, KeyOperation, KeyParser, KeyType},
    jws::{Engine, EngineFactory, Signer, Verifier},
};

/// A table of signature algorithms and JWK key parsers
///
/// Both tables are indexed by the dense id of the algorithm or key type, so
/// lookups are a single array read. A registry is populated once at
/// startup and then shared by reference; cloning it is cheap.
///
/// The `none` algorithm is never registered by default. It must be enabled
/// explicitly with [`allow_unsecured()`][Registry::allow_unsecured()].
///
/// ```
/// use jwtkit::{jwa, Registry};
///
/// let registry = Registry::with_defaults();
/// assert!(registry.is_available(jwa::Algorithm::ES256));
/// assert!(!registry.is_available(jwa::Algorithm::None));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    algorithms: [Option<Arc<dyn EngineFactory>>; jwa::Algorithm::COUNT + 1],
    key_parsers: [Option<Arc<dyn KeyParser>>; KeyType::COUNT + 1],
}

impl Registry {
    /// Creates a registry with nothing registered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every compiled-in signature algorithm and key
    /// parser, except for `none`
    #[must_use]
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "ec")]
        {
            for alg in jwa::ec::SigningAlgorithm::ALL.iter() {
                registry.register(Arc::new(*alg));
            }
            registry.register_key_parser(Arc::new(jwk::ec::EcKeyParser));
        }

        #[cfg(feature = "rsa")]
        {
            for alg in jwa::rsa::SigningAlgorithm::ALL.iter() {
                registry.register(Arc::new(*alg));
            }
            registry.register_key_parser(Arc::new(jwk::rsa::RsaKeyParser));
        }

        registry
    }

    /// Registers the `none` algorithm, which produces and accepts only
    /// empty signatures
    pub fn allow_unsecured(&mut self) -> &mut Self {
        self.register(Arc::new(jwa::none::Unsecured));
        self
    }

    /// Registers an algorithm implementation under the algorithm it reports
    ///
    /// A later registration for the same algorithm replaces the earlier one,
    /// which is returned.
    pub fn register(&mut self, factory: Arc<dyn EngineFactory>) -> Option<Arc<dyn EngineFactory>> {
        let slot = &mut self.algorithms[usize::from(factory.algorithm().id())];

        #[cfg(feature = "tracing")]
        tracing::trace!(alg = %factory.algorithm(), replaced = slot.is_some(), "registered algorithm");

        mem::replace(slot, Some(factory))
    }

    /// Registers a key parser under the key type it reports
    ///
    /// A later registration for the same key type replaces the earlier one,
    /// which is returned.
    pub fn register_key_parser(&mut self, parser: Arc<dyn KeyParser>) -> Option<Arc<dyn KeyParser>> {
        let slot = &mut self.key_parsers[usize::from(parser.key_type().id())];

        #[cfg(feature = "tracing")]
        tracing::trace!(kty = %parser.key_type(), replaced = slot.is_some(), "registered key parser");

        mem::replace(slot, Some(parser))
    }

    /// Whether `alg` is registered and its primitives are available
    #[must_use]
    pub fn is_available(&self, alg: jwa::Algorithm) -> bool {
        self.factory(alg).is_ok()
    }

    /// Whether a parser is registered for `kty`
    #[must_use]
    pub fn is_key_type_available(&self, kty: KeyType) -> bool {
        self.key_parser(kty).is_ok()
    }

    /// Creates a fresh engine for `alg`
    ///
    /// # Errors
    ///
    /// The algorithm is not registered or its primitives are unavailable.
    pub fn new_engine(
        &self,
        alg: jwa::Algorithm,
    ) -> Result<Box<dyn Engine>, error::UnavailableAlgorithm> {
        Ok(self.factory(alg)?.new_engine())
    }

    /// Binds a private key to `alg`
    ///
    /// # Errors
    ///
    /// The algorithm is unavailable, or the key is not usable with it.
    pub fn new_signer(
        &self,
        alg: jwa::Algorithm,
        key_id: Option<jwk::KeyId>,
        key: jwa::PrivateKey,
    ) -> Result<Signer, error::KeyError> {
        let factory = self.factory(alg)?;
        Ok(Signer::new(key_id, key, Arc::clone(factory))?)
    }

    /// Binds a public key to `alg`
    ///
    /// # Errors
    ///
    /// The algorithm is unavailable, or the key is not usable with it.
    pub fn new_verifier(
        &self,
        alg: jwa::Algorithm,
        key_id: Option<jwk::KeyId>,
        key: jwa::PublicKey,
    ) -> Result<Verifier, error::KeyError> {
        let factory = self.factory(alg)?;
        Ok(Verifier::new(key_id, key, Arc::clone(factory))?)
    }

    /// Reads a JWK whose `key_ops` include `sign` into a [`Signer`]
    ///
    /// # Errors
    ///
    /// The JWK does not permit signing, names an unknown or unavailable key
    /// type or algorithm, or carries invalid key material.
    pub fn parse_signer(&self, jwk: &[u8]) -> Result<Signer, error::KeyError> {
        let (kty, descriptor) = jwk::read_envelope(jwk, KeyOperation::Sign)?;
        let parser = self.key_parser(kty)?;
        let (alg, key) = parser.parse_private(jwk, &descriptor)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%kty, %alg, kid = ?descriptor.key_id(), "parsed signing key");

        self.new_signer(alg, descriptor.into_key_id(), key)
    }

    /// Reads a JWK whose `key_ops` include `verify` into a [`Verifier`]
    ///
    /// # Errors
    ///
    /// The JWK does not permit verification, names an unknown or unavailable
    /// key type or algorithm, or carries invalid key material.
    pub fn parse_verifier(&self, jwk: &[u8]) -> Result<Verifier, error::KeyError> {
        let (kty, descriptor) = jwk::read_envelope(jwk, KeyOperation::Verify)?;
        let parser = self.key_parser(kty)?;
        let (alg, key) = parser.parse_public(jwk, &descriptor)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%kty, %alg, kid = ?descriptor.key_id(), "parsed verification key");

        self.new_verifier(alg, descriptor.into_key_id(), key)
    }

    fn factory(
        &self,
        alg: jwa::Algorithm,
    ) -> Result<&Arc<dyn EngineFactory>, error::UnavailableAlgorithm> {
        match &self.algorithms[usize::from(alg.id())] {
            Some(factory) if factory.is_available() => Ok(factory),
            _ => Err(error::unavailable_algorithm(alg)),
        }
    }

    fn key_parser(&self, kty: KeyType) -> Result<&Arc<dyn KeyParser>, error::UnavailableKeyType> {
        self.key_parsers[usize::from(kty.id())]
            .as_ref()
            .ok_or_else(|| error::unavailable_key_type(kty))
    }
}
