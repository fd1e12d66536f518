use std::fmt;

use jwtkit_base64::Base64UrlUint;
use openssl::{
    bn::BigNum,
    md::MdRef,
    pkey::{PKey, Private},
    pkey_ctx::PkeyCtx,
    rsa::{Padding, RsaPrivateKeyBuilder},
};

use crate::{
    error,
    jwa::rsa::{PublicKey, MIN_MODULUS_BITS},
};

/// The integers that make up an RSA private key, including the CRT
/// parameters
#[derive(Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PrivateKeyParameters {
    pub n: Base64UrlUint,
    pub e: Base64UrlUint,
    pub d: Base64UrlUint,
    pub p: Base64UrlUint,
    pub q: Base64UrlUint,
    pub dp: Base64UrlUint,
    pub dq: Base64UrlUint,
    pub qi: Base64UrlUint,
}

impl fmt::Debug for PrivateKeyParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKeyParameters")
            .field("n", &self.n)
            .field("e", &self.e)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// RSA private key
#[derive(Clone)]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    pkey: PKey<Private>,
}

fn bignum(v: &Base64UrlUint) -> Result<BigNum, error::InvalidKey> {
    BigNum::from_slice(v.as_be_bytes()).map_err(error::invalid_key)
}

impl PrivateKey {
    /// Constructs a private key from its parameters
    ///
    /// # Errors
    ///
    /// The modulus is shorter than 2048 bits, or the parameters are not
    /// mutually consistent (including the CRT parameters).
    pub fn from_parameters(params: &PrivateKeyParameters) -> Result<Self, error::InvalidKey> {
        let public_key = PublicKey::from_components(&params.n, &params.e)?;

        let rsa = RsaPrivateKeyBuilder::new(
            bignum(&params.n)?,
            bignum(&params.e)?,
            bignum(&params.d)?,
        )
        .map_err(error::invalid_key)?
        .set_factors(bignum(&params.p)?, bignum(&params.q)?)
        .map_err(error::invalid_key)?
        .set_crt_params(
            bignum(&params.dp)?,
            bignum(&params.dq)?,
            bignum(&params.qi)?,
        )
        .map_err(error::invalid_key)?
        .build();

        let pkey = PKey::from_rsa(rsa).map_err(error::invalid_key)?;
        let key = Self { public_key, pkey };
        key.check()?;

        Ok(key)
    }

    /// Provides access to the public key parameters
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Extracts the public key
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }

    /// Runs the structural consistency check over every parameter
    pub(crate) fn check(&self) -> Result<(), error::InvalidKey> {
        let rsa = self.pkey.rsa().map_err(error::invalid_key)?;
        if rsa.size() * 8 < MIN_MODULUS_BITS {
            return Err(error::invalid_key("RSA modulus is shorter than 2048 bits"));
        }

        match rsa.check_key() {
            Ok(true) => Ok(()),
            Ok(false) => Err(error::invalid_key("RSA key parameters are inconsistent")),
            Err(err) => Err(error::invalid_key(err)),
        }
    }

    pub(crate) fn sign_digest(
        &self,
        md: &MdRef,
        digest: &[u8],
    ) -> Result<Vec<u8>, error::Unexpected> {
        let mut ctx = PkeyCtx::new(&self.pkey).map_err(error::unexpected)?;
        ctx.sign_init().map_err(error::unexpected)?;
        ctx.set_rsa_padding(Padding::PKCS1)
            .map_err(error::unexpected)?;
        ctx.set_signature_md(md).map_err(error::unexpected)?;

        let mut signature = Vec::with_capacity(self.public_key.modulus_len());
        ctx.sign_to_vec(digest, &mut signature)
            .map_err(error::unexpected)?;
        Ok(signature)
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
