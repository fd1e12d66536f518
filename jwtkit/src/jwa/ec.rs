//! ECDSA JSON Web Algorithm implementations
//!
//! Signatures are the fixed-width concatenation `r ‖ s` required by
//! [RFC7518 §3.4][], not ASN.1 DER.
//!
//! [RFC7518 §3.4]: https://tools.ietf.org/html/rfc7518#section-3.4

use std::{convert::TryFrom, fmt};

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{error, jwa, jws};

mod private;
mod public;

pub use private::PrivateKey;
pub use public::PublicKey;

/// A named ECC curve
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Curve {
    /// The P-256 curve (prime256v1/secp256r1)
    #[serde(rename = "P-256")]
    P256,

    /// The P-384 curve (secp384r1)
    #[serde(rename = "P-384")]
    P384,

    /// The P-521 curve (secp521r1)
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    const ALL: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

    /// The curve name as used by the JWK `crv` member
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Looks up a curve by its JWK `crv` name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|crv| crv.name() == name)
    }

    /// The width in bytes of a field element, and of each half of a signature
    #[must_use]
    pub const fn field_size(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Elliptic curve cryptography signing algorithms
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    /// Elliptic curve cryptography using the P-256 curve and SHA-256
    ES256,
    /// Elliptic curve cryptography using the P-384 curve and SHA-384
    ES384,
    /// Elliptic curve cryptography using the P-521 curve and SHA-512
    ES512,
}

impl SigningAlgorithm {
    /// Every ECDSA algorithm
    pub const ALL: [SigningAlgorithm; 3] = [Self::ES256, Self::ES384, Self::ES512];

    /// Size in bytes of an ECDSA signature
    #[must_use]
    pub const fn signature_size(self) -> usize {
        2 * self.curve().field_size()
    }

    /// The curve used by this algorithm
    #[must_use]
    pub const fn curve(self) -> Curve {
        match self {
            Self::ES256 => Curve::P256,
            Self::ES384 => Curve::P384,
            Self::ES512 => Curve::P521,
        }
    }

    fn digest(self) -> &'static ring::digest::Algorithm {
        match self {
            Self::ES256 => &ring::digest::SHA256,
            Self::ES384 => &ring::digest::SHA384,
            Self::ES512 => &ring::digest::SHA512,
        }
    }
}

impl From<SigningAlgorithm> for jwa::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::ES256 => Self::ES256,
            SigningAlgorithm::ES384 => Self::ES384,
            SigningAlgorithm::ES512 => Self::ES512,
        }
    }
}

impl TryFrom<jwa::Algorithm> for SigningAlgorithm {
    type Error = error::IncompatibleAlgorithm;

    fn try_from(alg: jwa::Algorithm) -> Result<Self, Self::Error> {
        match alg {
            jwa::Algorithm::ES256 => Ok(Self::ES256),
            jwa::Algorithm::ES384 => Ok(Self::ES384),
            jwa::Algorithm::ES512 => Ok(Self::ES512),
            _ => Err(error::incompatible_algorithm(alg)),
        }
    }
}

impl From<SigningAlgorithm> for Curve {
    fn from(alg: SigningAlgorithm) -> Self {
        alg.curve()
    }
}

impl From<Curve> for SigningAlgorithm {
    fn from(crv: Curve) -> Self {
        match crv {
            Curve::P256 => Self::ES256,
            Curve::P384 => Self::ES384,
            Curve::P521 => Self::ES512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&jwa::Algorithm::from(*self), f)
    }
}

/// Packs `r` and `s` as two big-endian fields of exactly `width` bytes
///
/// Leading zeros are stripped or added as needed. Returns `None` if either
/// value is wider than `width` once stripped.
pub(crate) fn pack_fixed(width: usize, r: &[u8], s: &[u8]) -> Option<Vec<u8>> {
    fn strip(v: &[u8]) -> &[u8] {
        let leading = v.iter().take_while(|&&b| b == 0).count();
        &v[leading..]
    }

    let (r, s) = (strip(r), strip(s));
    if r.len() > width || s.len() > width {
        return None;
    }

    let mut out = vec![0u8; 2 * width];
    out[width - r.len()..width].copy_from_slice(r);
    out[2 * width - s.len()..].copy_from_slice(s);
    Some(out)
}

impl jws::EngineFactory for SigningAlgorithm {
    fn algorithm(&self) -> jwa::Algorithm {
        jwa::Algorithm::from(*self)
    }

    fn new_engine(&self) -> Box<dyn jws::Engine> {
        Box::new(Ecdsa::new(*self))
    }
}

/// ECDSA signature engine for a single curve and hash
#[derive(Debug, Clone)]
pub struct Ecdsa {
    alg: SigningAlgorithm,
    digester: jws::Digester,
}

impl Ecdsa {
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
            jwa::PrivateKey::Ec(key) if key.curve() == self.alg.curve() => Ok(key),
            _ => Err(error::invalid_key(error::incompatible_algorithm(self.alg))),
        }
    }

    fn public_key<'a>(&self, key: &'a jwa::PublicKey) -> Result<&'a PublicKey, error::InvalidKey> {
        match key {
            jwa::PublicKey::Ec(key) if key.curve() == self.alg.curve() => Ok(key),
            _ => Err(error::invalid_key(error::incompatible_algorithm(self.alg))),
        }
    }
}

impl jws::Engine for Ecdsa {
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

    fn size(&self, _key: &jwa::PrivateKey) -> usize {
        self.alg.signature_size()
    }

    fn validate(&self, key: &jwa::PrivateKey) -> Result<(), error::InvalidKey> {
        self.private_key(key).map(|_| ())
    }

    fn validate_public(&self, key: &jwa::PublicKey) -> Result<(), error::InvalidKey> {
        self.public_key(key).map(|_| ())
    }

    fn sign(
        &self,
        rng: &mut dyn CryptoRngCore,
        key: &jwa::PrivateKey,
    ) -> Result<Vec<u8>, error::SigningError> {
        let key = self.private_key(key)?;
        let digest = self.digester.digest();
        Ok(key.sign_digest(rng, digest.as_ref())?)
    }

    fn verify(&self, signature: &[u8], key: &jwa::PublicKey) -> Result<(), error::VerifyError> {
        let key = self.public_key(key)?;
        let digest = self.digester.digest();
        key.verify_digest(digest.as_ref(), signature)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use color_eyre::Result;

    use super::*;
    use crate::{jws::Engine, test::ZeroRng};

    #[test]
    fn curve_table_maps_every_curve() {
        for crv in Curve::ALL.iter() {
            assert_eq!(Curve::from_name(crv.name()), Some(*crv));
            let alg = SigningAlgorithm::from(*crv);
            assert_eq!(alg.curve(), *crv);
            assert_eq!(alg.signature_size(), 2 * crv.field_size());
        }

        assert_eq!(Curve::from_name("P-192"), None);
        assert_eq!(Curve::from_name("secp256k1"), None);
    }

    #[test]
    fn only_ecdsa_algorithms_convert() {
        assert_eq!(
            SigningAlgorithm::try_from(jwa::Algorithm::ES384).unwrap(),
            SigningAlgorithm::ES384
        );
        assert!(SigningAlgorithm::try_from(jwa::Algorithm::RS256).is_err());
        assert!(SigningAlgorithm::try_from(jwa::Algorithm::None).is_err());
    }

    #[test]
    fn packs_short_values_with_left_padding() {
        let packed = pack_fixed(4, &[0x01], &[0x00, 0x00, 0x02, 0x03]).unwrap();
        assert_eq!(packed, vec![0, 0, 0, 1, 0, 0, 2, 3]);
    }

    #[test]
    fn refuses_to_truncate_wide_values() {
        assert!(pack_fixed(2, &[1, 2, 3], &[1]).is_none());
        assert_eq!(pack_fixed(2, &[0, 1, 2], &[1]).unwrap(), vec![1, 2, 0, 1]);
    }

    #[test]
    fn rejects_key_from_other_curve() -> Result<()> {
        let key = jwa::PrivateKey::Ec(crate::test::ec::p384_private_key()?);
        let engine = Ecdsa::new(SigningAlgorithm::ES256);
        assert!(engine.validate(&key).is_err());
        assert!(engine.validate_public(&key.public_key()).is_err());

        let engine = Ecdsa::new(SigningAlgorithm::ES384);
        assert!(engine.validate(&key).is_ok());
        Ok(())
    }

    #[test]
    fn signatures_have_fixed_width_for_every_curve() -> Result<()> {
        let keys = [
            (SigningAlgorithm::ES256, crate::test::ec::p256_private_key()?),
            (SigningAlgorithm::ES384, crate::test::ec::p384_private_key()?),
            (SigningAlgorithm::ES512, crate::test::ec::p521_private_key()?),
        ];

        for (alg, key) in keys.iter() {
            let key = jwa::PrivateKey::Ec(key.clone());
            let public_key = key.public_key();

            for msg in 0u8..16 {
                let mut engine = Ecdsa::new(*alg);
                engine.write(&[msg; 37]);
                let sig = engine.sign(&mut rand_core::OsRng, &key)?;
                assert_eq!(sig.len(), alg.signature_size());
                assert_eq!(engine.size(&key), alg.signature_size());
                engine.verify(&sig, &public_key)?;
            }
        }

        Ok(())
    }

    #[test]
    fn golden_es256_signature() -> Result<()> {
        let key = jwa::PrivateKey::Ec(crate::test::ec::p256_private_key()?);
        let mut engine = Ecdsa::new(SigningAlgorithm::ES256);
        engine.write(crate::test::ec::GOLDEN_SIGNING_INPUT.as_bytes());

        let sig = engine.sign(&mut ZeroRng, &key)?;
        let expected =
            jwtkit_base64::Base64Url::from_encoded(crate::test::ec::GOLDEN_ES256_SIGNATURE)?;
        assert_eq!(sig, expected.as_slice());
        Ok(())
    }

    #[test]
    fn wrong_length_is_malformed_before_crypto() -> Result<()> {
        let key = crate::test::ec::p256_private_key()?;
        let public_key = jwa::PublicKey::Ec(key.public_key().clone());

        let mut engine = Ecdsa::new(SigningAlgorithm::ES256);
        engine.write(b"abc");

        let err = engine.verify(&[0u8; 63], &public_key).unwrap_err();
        assert!(err.is_malformed_signature());

        let err = engine.verify(&[0u8; 65], &public_key).unwrap_err();
        assert!(err.is_malformed_signature());

        let err = engine.verify(&[1u8; 64], &public_key).unwrap_err();
        assert!(err.is_signature_invalid());
        Ok(())
    }

    #[test]
    fn reset_clears_accumulated_input() -> Result<()> {
        let key = jwa::PrivateKey::Ec(crate::test::ec::p256_private_key()?);

        let mut engine = Ecdsa::new(SigningAlgorithm::ES256);
        engine.write(b"something else");
        engine.reset();
        engine.write(crate::test::ec::GOLDEN_SIGNING_INPUT.as_bytes());
        let sig = engine.sign(&mut ZeroRng, &key)?;

        let expected =
            jwtkit_base64::Base64Url::from_encoded(crate::test::ec::GOLDEN_ES256_SIGNATURE)?;
        assert_eq!(sig, expected.as_slice());
        assert_eq!(engine.block_size(), 64);
        Ok(())
    }
}
