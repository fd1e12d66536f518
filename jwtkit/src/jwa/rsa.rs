//! RSA JSON Web Algorithm implementations
//!
//! Only RSASSA-PKCS1-v1_5 is provided. Keys with a modulus shorter than
//! 2048 bits are rejected.

use std::{convert::TryFrom, fmt};

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{error, jwa, jws};

mod private;
mod public;

pub use private::{PrivateKey, PrivateKeyParameters};
pub use public::PublicKey;

pub(crate) const MIN_MODULUS_BITS: u32 = 2048;

/// RSA signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

impl SigningAlgorithm {
    /// Every RSASSA-PKCS1-v1_5 algorithm
    pub const ALL: [SigningAlgorithm; 3] = [Self::RS256, Self::RS384, Self::RS512];

    fn digest(self) -> &'static ring::digest::Algorithm {
        match self {
            Self::RS256 => &ring::digest::SHA256,
            Self::RS384 => &ring::digest::SHA384,
            Self::RS512 => &ring::digest::SHA512,
        }
    }

    fn message_digest(self) -> &'static openssl::md::MdRef {
        match self {
            Self::RS256 => openssl::md::Md::sha256(),
            Self::RS384 => openssl::md::Md::sha384(),
            Self::RS512 => openssl::md::Md::sha512(),
        }
    }
}

impl From<SigningAlgorithm> for jwa::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::RS256 => Self::RS256,
            SigningAlgorithm::RS384 => Self::RS384,
            SigningAlgorithm::RS512 => Self::RS512,
        }
    }
}

impl TryFrom<jwa::Algorithm> for SigningAlgorithm {
    type Error = error::IncompatibleAlgorithm;

    fn try_from(alg: jwa::Algorithm) -> Result<Self, Self::Error> {
        match alg {
            jwa::Algorithm::RS256 => Ok(Self::RS256),
            jwa::Algorithm::RS384 => Ok(Self::RS384),
            jwa::Algorithm::RS512 => Ok(Self::RS512),
            _ => Err(error::incompatible_algorithm(alg)),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&jwa::Algorithm::from(*self), f)
    }
}

impl jws::EngineFactory for SigningAlgorithm {
    fn algorithm(&self) -> jwa::Algorithm {
        jwa::Algorithm::from(*self)
    }

    fn new_engine(&self) -> Box<dyn jws::Engine> {
        Box::new(Pkcs1::new(*self))
    }
}

/// RSASSA-PKCS1-v1_5 signature engine for a single hash
#[derive(Debug, Clone)]
pub struct Pkcs1 {
    alg: SigningAlgorithm,
    digester: jws::Digester,
}

impl Pkcs1 {
    /// Creates an engine with an empty hash accumulator
    #[must_use]
    pub fn new(alg: SigningAlgorithm) -> Self {
        Self {
            alg,
            digester: jws::Digester::new(alg.digest()),
        }
    }

    fn private_key<'a>(&self, key: &'a jwa::PrivateKey) -> Result<&'a PrivateKey, error::InvalidKey> {
        match key {
            jwa::PrivateKey::Rsa(key) => Ok(key),
            #[allow(unreachable_patterns)]
            _ => Err(error::invalid_key(error::incompatible_algorithm(self.alg))),
        }
    }

    fn public_key<'a>(&self, key: &'a jwa::PublicKey) -> Result<&'a PublicKey, error::InvalidKey> {
        match key {
            jwa::PublicKey::Rsa(key) => Ok(key),
            #[allow(unreachable_patterns)]
            _ => Err(error::invalid_key(error::incompatible_algorithm(self.alg))),
        }
    }
}

impl jws::Engine for Pkcs1 {
    fn algorithm(&self) -> jwa::Algorithm {
        self.alg.into()
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.digester.write(data)
    }

    fn reset(&mut self) {
        self.digester.reset()
    }

    fn block_size(&self) -> usize {
        self.digester.block_size()
    }

    fn size(&self, key: &jwa::PrivateKey) -> usize {
        self.private_key(key)
            .map(|key| key.public_key().modulus_len())
            .unwrap_or_default()
    }

    fn validate(&self, key: &jwa::PrivateKey) -> Result<(), error::InvalidKey> {
        self.private_key(key)?.check()
    }

    fn validate_public(&self, key: &jwa::PublicKey) -> Result<(), error::InvalidKey> {
        self.public_key(key).map(|_| ())
    }

    fn sign(
        &self,
        _rng: &mut dyn CryptoRngCore,
        key: &jwa::PrivateKey,
    ) -> Result<Vec<u8>, error::SigningError> {
        let key = self.private_key(key)?;
        let digest = self.digester.digest();
        Ok(key.sign_digest(self.alg.message_digest(), digest.as_ref())?)
    }

    fn verify(&self, signature: &[u8], key: &jwa::PublicKey) -> Result<(), error::VerifyError> {
        let key = self.public_key(key)?;
        let digest = self.digester.digest();
        key.verify_digest(self.alg.message_digest(), digest.as_ref(), signature)
    }
}
