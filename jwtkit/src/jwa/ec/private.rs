use std::fmt;

use jwtkit_base64::Base64UrlUint;
use p256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use rand_core::CryptoRngCore;

use crate::{
    error,
    jwa::ec::{pack_fixed, Curve, PublicKey},
};

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

/// ECC private key
#[derive(Clone)]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Constructs a private key from the private scalar `d`
    ///
    /// The public point is derived from the scalar.
    ///
    /// # Errors
    ///
    /// The scalar is zero, or is not less than the order of the curve.
    pub fn from_scalar(curve: Curve, d: &Base64UrlUint) -> Result<Self, error::InvalidKey> {
        let d = d
            .to_be_bytes_padded(curve.field_size())
            .ok_or_else(|| error::invalid_key("private scalar is wider than the curve"))?;

        let (signing_key, public_key) = match curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::from_slice(&d).map_err(error::invalid_key)?;
                let pk = PublicKey::from(*sk.verifying_key());
                (SigningKey::P256(sk), pk)
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::from_slice(&d).map_err(error::invalid_key)?;
                let pk = PublicKey::from(*sk.verifying_key());
                (SigningKey::P384(sk), pk)
            }
            Curve::P521 => {
                let sk = p521::ecdsa::SigningKey::from_slice(&d).map_err(error::invalid_key)?;
                let pk = PublicKey::from(p521::ecdsa::VerifyingKey::from(&sk));
                (SigningKey::P521(sk), pk)
            }
        };

        Ok(Self {
            public_key,
            signing_key,
        })
    }

    /// The curve of the key
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.public_key.curve()
    }

    /// Provides access to the public key parameters
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Extracts the public key
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }

    /// Signs a message digest, producing the fixed-width `r ‖ s` form
    pub(crate) fn sign_digest(
        &self,
        mut rng: &mut dyn CryptoRngCore,
        digest: &[u8],
    ) -> Result<Vec<u8>, error::Unexpected> {
        let (r, s) = match &self.signing_key {
            SigningKey::P256(sk) => {
                let sig: p256::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(error::unexpected)?;
                let (r, s) = sig.split_bytes();
                (r.to_vec(), s.to_vec())
            }
            SigningKey::P384(sk) => {
                let sig: p384::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(error::unexpected)?;
                let (r, s) = sig.split_bytes();
                (r.to_vec(), s.to_vec())
            }
            SigningKey::P521(sk) => {
                let sig: p521::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(error::unexpected)?;
                let (r, s) = sig.split_bytes();
                (r.to_vec(), s.to_vec())
            }
        };

        pack_fixed(self.curve().field_size(), &r, &s)
            .ok_or_else(|| error::unexpected("signature component wider than the curve"))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
