//! The `none` algorithm for unsecured tokens
//!
//! Signatures are always empty. A [`Registry`][crate::Registry] only
//! provides this algorithm after an explicit call to
//! [`allow_unsecured()`][crate::Registry::allow_unsecured()].

use rand_core::CryptoRngCore;

use crate::{error, jwa, jws};

/// Factory for the `none` algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unsecured;

impl jws::EngineFactory for Unsecured {
    fn algorithm(&self) -> jwa::Algorithm {
        jwa::Algorithm::None
    }

    fn new_engine(&self) -> Box<dyn jws::Engine> {
        Box::new(UnsecuredEngine)
    }
}

#[derive(Clone, Copy, Debug)]
struct UnsecuredEngine;

impl jws::Engine for UnsecuredEngine {
    fn algorithm(&self) -> jwa::Algorithm {
        jwa::Algorithm::None
    }

    fn write(&mut self, data: &[u8]) -> usize {
        data.len()
    }

    fn reset(&mut self) {}

    fn block_size(&self) -> usize {
        256
    }

    fn size(&self, _key: &jwa::PrivateKey) -> usize {
        0
    }

    fn validate(&self, key: &jwa::PrivateKey) -> Result<(), error::InvalidKey> {
        match key {
            jwa::PrivateKey::Unsecured => Ok(()),
            #[allow(unreachable_patterns)]
            _ => Err(error::invalid_key(error::incompatible_algorithm(
                jwa::Algorithm::None,
            ))),
        }
    }

    fn validate_public(&self, key: &jwa::PublicKey) -> Result<(), error::InvalidKey> {
        match key {
            jwa::PublicKey::Unsecured => Ok(()),
            #[allow(unreachable_patterns)]
            _ => Err(error::invalid_key(error::incompatible_algorithm(
                jwa::Algorithm::None,
            ))),
        }
    }

    fn sign(
        &self,
        _rng: &mut dyn CryptoRngCore,
        _key: &jwa::PrivateKey,
    ) -> Result<Vec<u8>, error::SigningError> {
        Ok(Vec::new())
    }

    fn verify(&self, signature: &[u8], _key: &jwa::PublicKey) -> Result<(), error::VerifyError> {
        if signature.is_empty() {
            Ok(())
        } else {
            Err(error::signature_invalid().into())
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::{jws::EngineFactory, test::ZeroRng};

    #[test]
    fn signs_empty() -> Result<()> {
        let mut engine = Unsecured.new_engine();
        assert_eq!(engine.write(b"header.payload"), 14);
        let sig = engine.sign(&mut ZeroRng, &jwa::PrivateKey::Unsecured)?;
        assert!(sig.is_empty());
        assert_eq!(engine.size(&jwa::PrivateKey::Unsecured), 0);
        Ok(())
    }

    #[test]
    fn verifies_only_empty_signature() {
        let mut engine = Unsecured.new_engine();
        engine.write(b"header.payload");
        assert!(engine.verify(&[], &jwa::PublicKey::Unsecured).is_ok());

        let err = engine
            .verify(&[0], &jwa::PublicKey::Unsecured)
            .unwrap_err();
        assert!(err.is_signature_invalid());
    }
}
