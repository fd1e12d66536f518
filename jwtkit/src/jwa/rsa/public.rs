use std::fmt;

use jwtkit_base64::Base64UrlUint;
use openssl::{
    bn::BigNum,
    md::MdRef,
    pkey::{PKey, Public},
    pkey_ctx::PkeyCtx,
    rsa::{Padding, Rsa},
};

use crate::{error, jwa::rsa::MIN_MODULUS_BITS};

/// RSA public key
#[derive(Clone)]
#[must_use]
pub struct PublicKey {
    modulus: Base64UrlUint,
    exponent: Base64UrlUint,
    pkey: PKey<Public>,
}

impl PublicKey {
    /// Constructs a public key from its modulus and public exponent
    ///
    /// # Errors
    ///
    /// The modulus is shorter than 2048 bits, or the parameters are
    /// rejected by the RSA backend.
    pub fn from_components(n: &Base64UrlUint, e: &Base64UrlUint) -> Result<Self, error::InvalidKey> {
        if (n.bit_len() as u64) < u64::from(MIN_MODULUS_BITS) {
            return Err(error::invalid_key("RSA modulus is shorter than 2048 bits"));
        }

        let rsa = Rsa::from_public_components(
            BigNum::from_slice(n.as_be_bytes()).map_err(error::invalid_key)?,
            BigNum::from_slice(e.as_be_bytes()).map_err(error::invalid_key)?,
        )
        .map_err(error::invalid_key)?;

        Ok(Self {
            modulus: n.clone(),
            exponent: e.clone(),
            pkey: PKey::from_rsa(rsa).map_err(error::invalid_key)?,
        })
    }

    /// The modulus `n`
    #[must_use]
    pub fn modulus(&self) -> &Base64UrlUint {
        &self.modulus
    }

    /// The public exponent `e`
    #[must_use]
    pub fn exponent(&self) -> &Base64UrlUint {
        &self.exponent
    }

    /// The length of the modulus in bytes, which is also the length of
    /// every signature
    #[must_use]
    pub fn modulus_len(&self) -> usize {
        self.modulus.as_be_bytes().len()
    }

    pub(crate) fn verify_digest(
        &self,
        md: &MdRef,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<(), error::VerifyError> {
        let mut ctx = PkeyCtx::new(&self.pkey).map_err(error::unexpected)?;
        ctx.verify_init().map_err(error::unexpected)?;
        ctx.set_rsa_padding(Padding::PKCS1)
            .map_err(error::unexpected)?;
        ctx.set_signature_md(md).map_err(error::unexpected)?;

        match ctx.verify(digest, signature) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(error::signature_invalid().into()),
        }
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus && self.exponent == other.exponent
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("modulus", &self.modulus)
            .field("exponent", &self.exponent)
            .finish()
    }
}
