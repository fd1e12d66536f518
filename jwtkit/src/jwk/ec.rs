//! Elliptic curve JWK members (`crv`, `x`, `y`, `d`)

use serde::Deserialize;

use crate::{
    error, jwa,
    jwk::{required_uint, KeyDescriptor, KeyParser, KeyType},
};

#[derive(Debug, Default, Deserialize)]
struct Members {
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
    #[serde(default)]
    d: Option<String>,
}

impl Members {
    fn read(jwk: &[u8]) -> Result<Self, error::KeyError> {
        Ok(serde_json::from_slice(jwk).map_err(error::malformed_jwk)?)
    }

    fn curve(&self) -> Result<jwa::ec::Curve, error::InvalidKeyField> {
        let crv = self
            .crv
            .as_deref()
            .ok_or_else(|| error::missing_key_field("crv"))?;
        jwa::ec::Curve::from_name(crv).ok_or_else(|| {
            error::invalid_key_field("crv", format!("unsupported curve '{}'", crv))
        })
    }
}

/// The algorithm for `curve`, which must agree with any declared `alg`
fn curve_algorithm(
    curve: jwa::ec::Curve,
    descriptor: &KeyDescriptor,
) -> Result<jwa::Algorithm, error::InvalidKey> {
    let alg = jwa::Algorithm::from(jwa::ec::SigningAlgorithm::from(curve));
    match descriptor.algorithm() {
        Some(declared) if declared != alg => {
            Err(error::invalid_key(error::incompatible_algorithm(declared)))
        }
        _ => Ok(alg),
    }
}

/// Parser for JWKs with `"kty": "EC"`
///
/// The public point of a private key is derived from `d`. If `x` and `y`
/// are also present, they must match the derived point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EcKeyParser;

impl KeyParser for EcKeyParser {
    fn key_type(&self) -> KeyType {
        KeyType::Ec
    }

    fn parse_private(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PrivateKey), error::KeyError> {
        let members = Members::read(jwk)?;
        let curve = members.curve()?;
        let alg = curve_algorithm(curve, descriptor)?;

        let d = required_uint("d", members.d.as_deref())?;
        let key = jwa::ec::PrivateKey::from_scalar(curve, &d)?;

        if members.x.is_some() || members.y.is_some() {
            let x = required_uint("x", members.x.as_deref())?;
            let y = required_uint("y", members.y.as_deref())?;
            if key.public_key().x() != &x || key.public_key().y() != &y {
                return Err(error::invalid_key("public point does not match private scalar").into());
            }
        }

        Ok((alg, key.into()))
    }

    fn parse_public(
        &self,
        jwk: &[u8],
        descriptor: &KeyDescriptor,
    ) -> Result<(jwa::Algorithm, jwa::PublicKey), error::KeyError> {
        let members = Members::read(jwk)?;
        let curve = members.curve()?;
        let alg = curve_algorithm(curve, descriptor)?;

        let x = required_uint("x", members.x.as_deref())?;
        let y = required_uint("y", members.y.as_deref())?;
        let key = jwa::ec::PublicKey::from_coordinates(curve, &x, &y)?;

        Ok((alg, key.into()))
    }
}
