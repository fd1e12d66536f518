use std::fmt;

use jwtkit_base64::Base64UrlUint;
use p256::ecdsa::signature::hazmat::PrehashVerifier;

use crate::{error, jwa::ec::Curve};

#[derive(Clone)]
enum VerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

/// ECC public key
#[derive(Clone)]
#[must_use]
pub struct PublicKey {
    curve: Curve,
    x: Base64UrlUint,
    y: Base64UrlUint,
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Constructs a public key from its affine coordinates
    ///
    /// # Errors
    ///
    /// The coordinates are wider than the curve or do not describe a point
    /// on the curve.
    pub fn from_coordinates(
        curve: Curve,
        x: &Base64UrlUint,
        y: &Base64UrlUint,
    ) -> Result<Self, error::InvalidKey> {
        let width = curve.field_size();
        let x = x
            .to_be_bytes_padded(width)
            .ok_or_else(|| error::invalid_key("x coordinate is wider than the curve"))?;
        let y = y
            .to_be_bytes_padded(width)
            .ok_or_else(|| error::invalid_key("y coordinate is wider than the curve"))?;

        let key = match curve {
            Curve::P256 => {
                let point = p256::EncodedPoint::from_affine_coordinates(
                    &p256::FieldBytes::clone_from_slice(&x),
                    &p256::FieldBytes::clone_from_slice(&y),
                    false,
                );
                Self::from(
                    p256::ecdsa::VerifyingKey::from_encoded_point(&point)
                        .map_err(error::invalid_key)?,
                )
            }
            Curve::P384 => {
                let point = p384::EncodedPoint::from_affine_coordinates(
                    &p384::FieldBytes::clone_from_slice(&x),
                    &p384::FieldBytes::clone_from_slice(&y),
                    false,
                );
                Self::from(
                    p384::ecdsa::VerifyingKey::from_encoded_point(&point)
                        .map_err(error::invalid_key)?,
                )
            }
            Curve::P521 => {
                let point = p521::EncodedPoint::from_affine_coordinates(
                    &p521::FieldBytes::clone_from_slice(&x),
                    &p521::FieldBytes::clone_from_slice(&y),
                    false,
                );
                Self::from(
                    p521::ecdsa::VerifyingKey::from_encoded_point(&point)
                        .map_err(error::invalid_key)?,
                )
            }
        };

        Ok(key)
    }

    /// The curve of the key
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The affine x coordinate
    #[must_use]
    pub fn x(&self) -> &Base64UrlUint {
        &self.x
    }

    /// The affine y coordinate
    #[must_use]
    pub fn y(&self) -> &Base64UrlUint {
        &self.y
    }

    /// Verifies a fixed-width `r ‖ s` signature over a message digest
    ///
    /// The length is checked before any cryptographic work is done.
    pub(crate) fn verify_digest(
        &self,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<(), error::VerifyError> {
        let expected = 2 * self.curve.field_size();
        if signature.len() != expected {
            return Err(error::malformed_signature(error::signature_length(
                expected,
                signature.len(),
            ))
            .into());
        }

        let verified = match &self.verifying_key {
            VerifyingKey::P256(vk) => p256::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| vk.verify_prehash(digest, &sig)),
            VerifyingKey::P384(vk) => p384::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| vk.verify_prehash(digest, &sig)),
            VerifyingKey::P521(vk) => p521::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| vk.verify_prehash(digest, &sig)),
        };

        verified.map_err(|_| error::signature_invalid().into())
    }
}

macro_rules! from_verifying_key {
    ($($curve:ident => $variant:ident,)*) => {
        $(
            impl From<$curve::ecdsa::VerifyingKey> for PublicKey {
                fn from(key: $curve::ecdsa::VerifyingKey) -> Self {
                    let point = key.to_encoded_point(false);
                    let coordinate = |c: Option<&$curve::FieldBytes>| {
                        c.map(|c| Base64UrlUint::from_be_bytes(c.to_vec()))
                            .unwrap_or_default()
                    };

                    Self {
                        curve: Curve::$variant,
                        x: coordinate(point.x()),
                        y: coordinate(point.y()),
                        verifying_key: VerifyingKey::$variant(key),
                    }
                }
            }
        )*
    };
}

from_verifying_key! {
    p256 => P256,
    p384 => P384,
    p521 => P521,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.x == other.x && self.y == other.y
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("curve", &self.curve)
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}
