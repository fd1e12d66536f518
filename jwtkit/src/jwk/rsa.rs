//! RSA JWK members (`n`, `e`, `d`, `p`, `q`, `dp`, `dq`, `qi`)

use std::convert::TryFrom;

use jwtkit_base64::Base64UrlUint;
use serde::Deserialize;

use crate::{
    error, jwa,
    jwk::{required_uint, KeyDescriptor, KeyParser, KeyType},
};

#[derive(Debug, Default, Deserialize)]
struct Members {
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    d: Option<String>,
    #[serde(default)]
    p: Option<String>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    dp: Option<String>,
    #[serde(default)]
    dq: Option<String>,
    #[serde(default)]
    qi: Option<String>,
}

impl Members {
    fn read(jwk: &[u8]) -> Result<Self, error::KeyError> {
        Ok(serde_json::from_slice(jwk).map_err(error::malformed_jwk)?)
    }

    fn modulus(&self) -> Result<Base64UrlUint, error::InvalidKeyField> {
        required_uint("n", self.n.as_deref())
    }

    /// The public exponent, which must also fit a native signed integer
    fn exponent(&self) -> Result<Base64UrlUint, error::InvalidKeyField> {
        let e = required_uint("e", self.e.as_deref())?;
        match e.to_u64().map(i64::try_from) {
            Some(Ok(_)) => Ok(e),
            _ => Err(error::invalid_key_field(
                "e",
                "public exponent does not fit a native integer",
            )),
        }
    }
}

/// RSA keys do not imply an algorithm, so `alg` is required
fn declared_algorithm(descriptor: &KeyDescriptor) -> Result<jwa::Algorithm, error::KeyError> {
    let alg = descriptor
        .algorithm()
        .ok_or_else(|| error::missing_key_field("alg"))?;
    jwa::rsa::SigningAlgorithm::try_from(alg).map_err(error::invalid_key)?;
    Ok(alg)
}

/// Parser for JWKs with `"kty": "RSA"`
///
/// Private keys must carry every CRT parameter, and are checked for
/// consistency before use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RsaKeyParser;

impl KeyParser for RsaKeyParser {
    fn key_type(&self) -> KeyType {
        KeyType::Rsa
    }

    fn parse_private(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PrivateKey), error::KeyError> {
        let alg = declared_algorithm(descriptor)?;
        let members = Members::read(jwk)?;

        let params = jwa::rsa::PrivateKeyParameters {
            n: members.modulus()?,
            e: members.exponent()?,
            d: required_uint("d", members.d.as_deref())?,
            p: required_uint("p", members.p.as_deref())?,
            q: required_uint("q", members.q.as_deref())?,
            dp: required_uint("dp", members.dp.as_deref())?,
            dq: required_uint("dq", members.dq.as_deref())?,
            qi: required_uint("qi", members.qi.as_deref())?,
        };

        let key = jwa::rsa::PrivateKey::from_parameters(&params)?;
        Ok((alg, key.into()))
    }

    fn parse_public(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PublicKey), error::KeyError> {
        let alg = declared_algorithm(descriptor)?;
        let members = Members::read(jwk)?;

        let key = jwa::rsa::PublicKey::from_components(&members.modulus()?, &members.exponent()?)?;
        Ok((alg, key.into()))
    }
}
