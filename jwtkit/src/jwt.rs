//! Implementations of the JSON Web Tokens (JWT) standard
//!
//! The specifications for this standard can be found in [RFC7519][].
//!
//! A JWT in compact serialization is three base64url-encoded segments
//! separated by a `.`.
//!
//! ```text
//! eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0.jjRXoUvu…
//! ```
//!
//! The first segment is the header in JSON format. It declares the token
//! type, which must be `JWT`, the signing algorithm, and optionally the ID
//! of the signing key.
//!
//! The second segment is the payload in JSON format. Its contents are
//! opaque here. Nothing in it should be trusted before the signature has
//! been verified, and [`unmarshal()`] never decodes it before then.
//!
//! The third segment is the signature over the first two segments and the
//! `.` between them.
//!
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! ```
//! use jwtkit::{jwt, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let jwk = include_str!("../data/ec/jwk-p256-priv.json");
//! let registry = Registry::with_defaults();
//! let signer = registry.parse_signer(jwk.as_bytes())?;
//! let verifiers = jwt::VerifierSet::new(true, vec![signer.verifier()]);
//!
//! let payload = serde_json::json!({ "sub": "1234567890" });
//! let token = jwt::marshal(&mut rand_core::OsRng, &payload, &signer)?;
//!
//! let verified: jwt::Verified<serde_json::Value> =
//!     jwt::unmarshal(token.as_str(), &verifiers)?;
//! assert_eq!(verified.payload(), &payload);
//! assert_eq!(verified.key_id(), signer.key_id());
//! # Ok(())
//! # }
//! ```

use std::{convert::TryFrom, error::Error as StdError, fmt};

use aliri_braid::braid;
use jwtkit_base64::Base64Url;
use rand_core::CryptoRngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error, jwa, jwk, jws};

mod token;
mod verifiers;

use token::TokenBuffer;
pub use verifiers::{VerifierSet, Verifiers};

/// The only header type accepted
pub const TYPE: &str = "JWT";

/// Values common to every JWT header
///
/// Custom header types implement this trait to be used with
/// [`marshal_with_header()`] and [`unmarshal_with_header()`].
pub trait CoreHeaders {
    /// Type (`typ`)
    fn typ(&self) -> &str;

    /// Algorithm (`alg`), as named in the header
    ///
    /// The name is only resolved to a [`jwa::Algorithm`] while verifying, so
    /// that an unknown name is reported as such.
    fn alg(&self) -> &str;

    /// Key ID (`kid`)
    ///
    /// Only a suggestion for which key should verify the token. An empty key
    /// ID is reported as absent.
    fn kid(&self) -> Option<&jwk::KeyIdRef>;

    /// Sets the algorithm
    fn set_alg(&mut self, alg: jwa::Algorithm);

    /// Sets or clears the key ID
    fn set_kid(&mut self, kid: Option<jwk::KeyId>);

    /// Checks the header before any signature verification is attempted
    ///
    /// # Errors
    ///
    /// The header declares a type other than `JWT`.
    fn validate(&self) -> Result<(), error::InvalidHeaderType> {
        if self.typ() == TYPE {
            Ok(())
        } else {
            Err(error::invalid_header_type(self.typ()))
        }
    }
}

/// Minimal set of headers for common JWTs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct BasicHeaders {
    #[serde(default)]
    typ: String,
    #[serde(default)]
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<jwk::KeyId>,
}

impl BasicHeaders {
    /// Constructs a `JWT` header with the algorithm and key ID left to the
    /// signer
    pub fn new() -> Self {
        Self {
            typ: TYPE.to_owned(),
            alg: String::new(),
            kid: None,
        }
    }
}

impl Default for BasicHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreHeaders for BasicHeaders {
    fn typ(&self) -> &str {
        &self.typ
    }

    fn alg(&self) -> &str {
        &self.alg
    }

    fn kid(&self) -> Option<&jwk::KeyIdRef> {
        self.kid.as_deref().filter(|kid| !kid.as_str().is_empty())
    }

    fn set_alg(&mut self, alg: jwa::Algorithm) {
        self.alg = alg.name().to_owned();
    }

    fn set_kid(&mut self, kid: Option<jwk::KeyId>) {
        self.kid = kid;
    }
}

/// A JSON Web Token in compact serialization
///
/// The [`Debug`][JwtRef#impl-Debug] implementation omits the signature.
#[braid(
    serde,
    debug = "owned",
    ref_doc = "A borrowed reference to a JSON Web Token ([`Jwt`])"
)]
#[must_use]
pub struct Jwt;

/// Prints the header and payload segments, but not the signature
///
/// ```
/// # use jwtkit::jwt::JwtRef;
/// let token = JwtRef::from_str("eyJ0eXAiOiJKV1QifQ.e30.c2lnbmF0dXJl");
/// assert_eq!(format!("{:?}", token), "\"eyJ0eXAiOiJKV1QifQ.e30.…\"");
/// ```
impl fmt::Debug for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_str().rfind('.') {
            Some(idx) => write!(f, "\"{}…\"", &self.as_str()[..=idx]),
            None => f.write_str("\"…\""),
        }
    }
}

/// A payload whose signature has been verified, along with its header
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Verified<P, H = BasicHeaders> {
    header: H,
    payload: P,
    key_id: Option<jwk::KeyId>,
}

impl<P, H> Verified<P, H> {
    /// The verified header
    pub fn header(&self) -> &H {
        &self.header
    }

    /// The verified payload
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The ID of the key that accepted the signature
    ///
    /// This may differ from the key ID in the header if the verifier set
    /// does not require the key ID to match.
    #[must_use]
    pub fn key_id(&self) -> Option<&jwk::KeyIdRef> {
        self.key_id.as_deref()
    }

    /// Takes the verified payload
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Splits into the header and the payload
    pub fn extract(self) -> (H, P) {
        (self.header, self.payload)
    }
}

/// Signs `payload` under a basic `JWT` header
///
/// # Errors
///
/// The payload cannot be serialized, or the signer fails.
pub fn marshal<P>(
    rng: &mut dyn CryptoRngCore,
    payload: &P,
    signer: &jws::Signer,
) -> Result<Jwt, error::JwtSigningError>
where
    P: Serialize + ?Sized,
{
    marshal_with_header(rng, payload, &mut BasicHeaders::new(), signer)
}

/// Signs `payload` under a custom header
///
/// The header's algorithm and key ID are overwritten with the signer's.
/// The token is written into a single buffer sized up front.
///
/// # Errors
///
/// The header or payload cannot be serialized, or the signer fails.
pub fn marshal_with_header<P, H>(
    rng: &mut dyn CryptoRngCore,
    payload: &P,
    header: &mut H,
    signer: &jws::Signer,
) -> Result<Jwt, error::JwtSigningError>
where
    P: Serialize + ?Sized,
    H: Serialize + CoreHeaders + ?Sized,
{
    header.set_alg(signer.algorithm());
    header.set_kid(signer.key_id().map(ToOwned::to_owned));

    let header_json = serde_json::to_vec(header).map_err(error::malformed_header)?;
    let payload_json = serde_json::to_vec(payload).map_err(error::malformed_payload)?;

    let mut token = TokenBuffer::with_segment_lengths(
        header_json.len(),
        payload_json.len(),
        signer.signature_size(),
    );

    Base64Url::encode_to_slice(&header_json, token.header_mut()).map_err(error::unexpected)?;
    Base64Url::encode_to_slice(&payload_json, token.payload_mut()).map_err(error::unexpected)?;

    let signature = signer.sign(rng, token.signed())?;
    if signature.len() != signer.signature_size() {
        return Err(error::unexpected(error::signature_length(
            signer.signature_size(),
            signature.len(),
        ))
        .into());
    }

    Base64Url::encode_to_slice(&signature, token.signature_mut()).map_err(error::unexpected)?;

    let token = String::from_utf8(token.into_inner()).map_err(error::unexpected)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(alg = %signer.algorithm(), kid = ?signer.key_id(), len = token.len(), "signed token");

    Ok(Jwt::new(token))
}

/// Verifies a token with a basic header and decodes its payload
///
/// # Errors
///
/// The token is malformed, no verifier accepts its signature, or the
/// payload cannot be decoded.
pub fn unmarshal<P, T, V>(token: &T, verifiers: &V) -> Result<Verified<P>, error::JwtVerifyError>
where
    P: DeserializeOwned,
    T: AsRef<[u8]> + ?Sized,
    V: Verifiers + ?Sized,
{
    unmarshal_with_header(token, verifiers)
}

/// Verifies a token with a custom header and decodes its payload
///
/// The header is decoded and checked first. The payload is only decoded
/// once a verifier has accepted the signature.
///
/// # Errors
///
/// The token is malformed, no verifier accepts its signature, or the
/// payload cannot be decoded.
pub fn unmarshal_with_header<P, H, T, V>(
    token: &T,
    verifiers: &V,
) -> Result<Verified<P, H>, error::JwtVerifyError>
where
    P: DeserializeOwned,
    H: DeserializeOwned + CoreHeaders,
    T: AsRef<[u8]> + ?Sized,
    V: Verifiers + ?Sized,
{
    let token = TokenBuffer::parse(token.as_ref())?;

    let header: H = decode_segment(token.header()).map_err(error::malformed_header)?;
    header.validate().map_err(error::malformed_header)?;
    let alg = jwa::Algorithm::try_from(header.alg())?;

    let signature = Base64Url::from_encoded(token.signature()).map_err(error::malformed_signature)?;
    let key_id = verifiers.verify(alg, header.kid(), token.signed(), signature.as_slice())?;

    let payload: P = decode_segment(token.payload()).map_err(error::malformed_payload)?;

    Ok(Verified {
        header,
        payload,
        key_id,
    })
}

/// Decodes the payload of a token without verifying anything
///
/// **WARNING:** *The payload has not been verified and should not be trusted.*
/// An adversary can place arbitrary data into the payload of a JWT.
///
/// # Errors
///
/// The token is malformed, or the payload cannot be decoded.
pub fn unmarshal_unverified<P, T>(token: &T) -> Result<P, error::JwtVerifyError>
where
    P: DeserializeOwned,
    T: AsRef<[u8]> + ?Sized,
{
    let token = TokenBuffer::parse(token.as_ref())?;
    Ok(decode_segment(token.payload()).map_err(error::malformed_payload)?)
}

fn decode_segment<T: DeserializeOwned>(
    segment: &[u8],
) -> Result<T, Box<dyn StdError + Send + Sync + 'static>> {
    let raw = Base64Url::from_encoded(segment)?;
    Ok(serde_json::from_slice(raw.as_slice())?)
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    #[cfg(any(feature = "ec", feature = "rsa"))]
    use serde_json::json;
    #[cfg(feature = "tracing")]
    use tracing_test::traced_test;

    use super::*;
    use crate::{test::ZeroRng, Registry};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Claims {
        sub: String,
        n: u32,
    }

    fn claims() -> Claims {
        Claims {
            sub: "1234567890".to_owned(),
            n: 42,
        }
    }

    fn kid(s: &str) -> Option<jwk::KeyId> {
        Some(jwk::KeyId::new(s.to_owned()))
    }

    fn unsecured() -> Result<(jws::Signer, jws::Verifier)> {
        let mut registry = Registry::new();
        registry.allow_unsecured();
        let signer = registry.new_signer(jwa::Algorithm::None, kid("plain"), jwa::PrivateKey::Unsecured)?;
        let verifier = signer.verifier();
        Ok((signer, verifier))
    }

    fn encode(json: &str) -> String {
        Base64Url::from_raw(json.as_bytes()).to_string()
    }

    #[test]
    fn basic_header_serialization() -> Result<()> {
        let mut header = BasicHeaders::new();
        header.set_alg(jwa::Algorithm::ES256);
        assert_eq!(serde_json::to_string(&header)?, r#"{"typ":"JWT","alg":"ES256"}"#);

        header.set_kid(kid("k1"));
        assert_eq!(
            serde_json::to_string(&header)?,
            r#"{"typ":"JWT","alg":"ES256","kid":"k1"}"#
        );
        Ok(())
    }

    #[test]
    fn rejects_wrong_separator_count_before_parsing() -> Result<()> {
        let (_, verifier) = unsecured()?;
        for token in ["", "abc", "abc.def", "a.b.c.d", "e30.e30.."].iter() {
            let err = unmarshal::<Claims, _, _>(*token, &verifier).unwrap_err();
            assert!(err.is_malformed_token(), "{:?}: {}", token, err);
        }
        Ok(())
    }

    #[test]
    fn rejects_header_of_other_type() -> Result<()> {
        let (_, verifier) = unsecured()?;
        let token = format!(
            "{}.{}.",
            encode(r#"{"typ":"JOSE","alg":"none"}"#),
            encode(r#"{"sub":"x","n":1}"#)
        );

        let err = unmarshal::<Claims, _, _>(token.as_str(), &verifier).unwrap_err();
        assert!(err.is_malformed_header());
        Ok(())
    }

    #[test]
    fn rejects_undecodable_header() -> Result<()> {
        let (_, verifier) = unsecured()?;
        let token = format!("{}.{}.", encode("not json"), encode(r#"{"sub":"x","n":1}"#));

        let err = unmarshal::<Claims, _, _>(token.as_str(), &verifier).unwrap_err();
        assert!(err.is_malformed_header());
        Ok(())
    }

    #[test]
    fn rejects_unknown_algorithm() -> Result<()> {
        let (_, verifier) = unsecured()?;
        let token = format!(
            "{}.{}.",
            encode(r#"{"typ":"JWT","alg":"HS256"}"#),
            encode(r#"{"sub":"x","n":1}"#)
        );

        let err = unmarshal::<Claims, _, _>(token.as_str(), &verifier).unwrap_err();
        assert!(err.is_unknown_algorithm());
        Ok(())
    }

    #[test]
    fn rejects_undecodable_signature() -> Result<()> {
        let (_, verifier) = unsecured()?;
        let token = format!(
            "{}.{}.!!",
            encode(r#"{"typ":"JWT","alg":"none"}"#),
            encode(r#"{"sub":"x","n":1}"#)
        );

        let err = unmarshal::<Claims, _, _>(token.as_str(), &verifier).unwrap_err();
        assert!(err.is_malformed_signature());
        Ok(())
    }

    #[test]
    fn verifies_before_decoding_payload() -> Result<()> {
        let (_, verifier) = unsecured()?;
        let header = encode(r#"{"typ":"JWT","alg":"none"}"#);

        let unsigned = format!("{}.{}.", header, encode("not json"));
        let err = unmarshal::<Claims, _, _>(unsigned.as_str(), &verifier).unwrap_err();
        assert!(err.is_malformed_payload());

        let signed = format!("{}.{}.c2ln", header, encode("not json"));
        let err = unmarshal::<Claims, _, _>(signed.as_str(), &verifier).unwrap_err();
        assert!(err.is_signature_invalid());
        Ok(())
    }

    #[test]
    fn unsecured_round_trip() -> Result<()> {
        let (signer, verifier) = unsecured()?;
        let token = marshal(&mut ZeroRng, &claims(), &signer)?;
        assert!(token.as_str().ends_with('.'));

        let verified: Verified<Claims> = unmarshal(token.as_str(), &verifier)?;
        assert_eq!(verified.payload(), &claims());
        assert_eq!(verified.header().alg(), "none");
        assert_eq!(verified.key_id(), signer.key_id());
        Ok(())
    }

    #[test]
    fn peeks_at_payload_without_verifying() -> Result<()> {
        let token = format!(
            "{}.{}.c2lnbmF0dXJl",
            encode(r#"{"typ":"JWT","alg":"ES256"}"#),
            encode(r#"{"sub":"x","n":7}"#)
        );

        let payload: Claims = unmarshal_unverified(token.as_str())?;
        assert_eq!(payload.n, 7);

        let err = unmarshal_unverified::<Claims, _>("e30.e30").unwrap_err();
        assert!(err.is_malformed_token());
        Ok(())
    }

    #[test]
    fn debug_omits_signature() {
        let token = Jwt::new("aGVhZGVy.cGF5bG9hZA.c2lnbmF0dXJl".to_owned());
        assert_eq!(format!("{:?}", token), "\"aGVhZGVy.cGF5bG9hZA.…\"");
        assert_eq!(format!("{:?}", JwtRef::from_str("opaque")), "\"…\"");
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct ContentHeaders {
        #[serde(flatten)]
        basic: BasicHeaders,
        cty: String,
    }

    impl CoreHeaders for ContentHeaders {
        fn typ(&self) -> &str {
            self.basic.typ()
        }

        fn alg(&self) -> &str {
            self.basic.alg()
        }

        fn kid(&self) -> Option<&jwk::KeyIdRef> {
            self.basic.kid()
        }

        fn set_alg(&mut self, alg: jwa::Algorithm) {
            self.basic.set_alg(alg);
        }

        fn set_kid(&mut self, kid: Option<jwk::KeyId>) {
            self.basic.set_kid(kid);
        }
    }

    #[test]
    fn custom_header_round_trip() -> Result<()> {
        let (signer, verifier) = unsecured()?;
        let mut header = ContentHeaders {
            basic: BasicHeaders::new(),
            cty: "example".to_owned(),
        };

        let token = marshal_with_header(&mut ZeroRng, &claims(), &mut header, &signer)?;
        assert_eq!(header.alg(), "none");
        assert_eq!(header.kid().map(jwk::KeyIdRef::as_str), Some("plain"));

        let verified: Verified<Claims, ContentHeaders> =
            unmarshal_with_header(token.as_str(), &verifier)?;
        assert_eq!(verified.header().cty, "example");
        assert_eq!(verified.into_payload(), claims());
        Ok(())
    }

    #[cfg(feature = "ec")]
    mod ec {
        use super::*;
        use crate::test::ec::*;

        fn ec_signer(registry: &Registry, key: jwa::ec::PrivateKey, id: &str) -> Result<jws::Signer> {
            let alg = jwa::ec::SigningAlgorithm::from(key.curve());
            Ok(registry.new_signer(alg.into(), kid(id), key.into())?)
        }

        #[test]
        #[cfg_attr(feature = "tracing", traced_test)]
        fn round_trip_every_curve() -> Result<()> {
            let registry = Registry::with_defaults();
            let keys = [p256_private_key()?, p384_private_key()?, p521_private_key()?];

            for key in keys.iter() {
                let signer = ec_signer(&registry, key.clone(), "ec")?;
                let verifiers = VerifierSet::new(true, vec![signer.verifier()]);

                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;
                let verified: Verified<Claims> = unmarshal(token.as_str(), &verifiers)?;

                assert_eq!(verified.payload(), &claims());
                assert_eq!(verified.key_id(), signer.key_id());
            }

            Ok(())
        }

        #[test]
        fn golden_es256_token() -> Result<()> {
            let registry = Registry::with_defaults();
            let signer = registry.new_signer(
                jwa::Algorithm::ES256,
                None,
                jwa::PrivateKey::Ec(p256_private_key()?),
            )?;

            let token = marshal(&mut ZeroRng, &json!({ "sub": "1234567890" }), &signer)?;
            assert_eq!(
                token.as_str(),
                format!("{}.{}", GOLDEN_SIGNING_INPUT, GOLDEN_ES256_SIGNATURE)
            );
            Ok(())
        }

        #[test]
        fn verifies_tokens_with_leading_zero_in_r() -> Result<()> {
            let registry = Registry::with_defaults();
            let cases = [
                (JWK_P256, ES256_TOKEN),
                (JWK_P384, ES384_TOKEN),
                (JWK_P521, ES512_TOKEN),
            ];

            for (jwk, token) in cases.iter() {
                let verifiers = VerifierSet::new(true, vec![registry.parse_verifier(jwk.as_bytes())?]);
                let verified: Verified<serde_json::Value> = unmarshal(*token, &verifiers)?;
                assert_eq!(verified.payload(), &json!({ "sub": "1234567890" }));
            }

            Ok(())
        }

        #[test]
        fn any_payload_bit_flip_invalidates_signature() -> Result<()> {
            let registry = Registry::with_defaults();
            let signer = ec_signer(&registry, p256_private_key()?, "ec")?;
            let verifier = signer.verifier();

            let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;
            let bytes = token.as_str().as_bytes();
            let start = bytes.iter().position(|&b| b == b'.').unwrap() + 1;
            let end = bytes.iter().rposition(|&b| b == b'.').unwrap();

            for idx in start..end {
                for bit in 0..8 {
                    let mut tampered = bytes.to_vec();
                    tampered[idx] ^= 1 << bit;
                    if tampered[idx] == b'.' {
                        continue;
                    }

                    let err = unmarshal::<Claims, _, _>(tampered.as_slice(), &verifier).unwrap_err();
                    assert!(err.is_signature_invalid(), "byte {} bit {}: {}", idx, bit, err);
                }
            }

            Ok(())
        }

        #[test]
        fn rejects_token_from_other_algorithm() -> Result<()> {
            let registry = Registry::with_defaults();
            let es256 = ec_signer(&registry, p256_private_key()?, "a")?;
            let es384 = ec_signer(&registry, p384_private_key()?, "a")?;

            let token = marshal(&mut rand_core::OsRng, &claims(), &es384)?;
            let verifiers = VerifierSet::new(false, vec![es256.verifier()]);

            let err = unmarshal::<Claims, _, _>(token.as_str(), &verifiers).unwrap_err();
            assert!(err.is_signature_invalid());
            Ok(())
        }

        mod key_id {
            use super::*;

            fn setup() -> Result<(jws::Signer, jws::Verifier, jws::Verifier)> {
                let registry = Registry::with_defaults();
                let key = p256_private_key()?;

                let signer = ec_signer(&registry, key.clone(), "a")?;
                let same_key_other_id = ec_signer(&registry, key, "b")?.verifier();
                let other_key = ec_signer(&registry, p256_private_key_other()?, "a")?.verifier();

                Ok((signer, same_key_other_id, other_key))
            }

            fn p256_private_key_other() -> Result<jwa::ec::PrivateKey> {
                let d = jwtkit_base64::Base64UrlUint::from(0x0123_4567_89ab_cdef_u64);
                Ok(jwa::ec::PrivateKey::from_scalar(jwa::ec::Curve::P256, &d)?)
            }

            #[test]
            #[cfg_attr(feature = "tracing", traced_test)]
            fn strict_set_refuses_unknown_key_id() -> Result<()> {
                let (signer, same_key_other_id, _) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;

                let strict = VerifierSet::new(true, vec![same_key_other_id.clone()]);
                let err = unmarshal::<Claims, _, _>(token.as_str(), &strict).unwrap_err();
                assert!(err.is_no_verifier_for_key_id());

                let lenient = VerifierSet::new(false, vec![same_key_other_id]);
                let verified: Verified<Claims> = unmarshal(token.as_str(), &lenient)?;
                assert_eq!(verified.key_id().map(jwk::KeyIdRef::as_str), Some("b"));
                assert_eq!(verified.header().kid().map(jwk::KeyIdRef::as_str), Some("a"));
                Ok(())
            }

            #[test]
            fn strict_set_requires_matching_algorithm_for_key_id() -> Result<()> {
                let (signer, _, _) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;

                let registry = Registry::with_defaults();
                let es384 = ec_signer(&registry, p384_private_key()?, "a")?.verifier();

                let strict = VerifierSet::new(true, vec![es384.clone()]);
                let err = unmarshal::<Claims, _, _>(token.as_str(), &strict).unwrap_err();
                assert!(err.is_no_verifier_for_key_id());

                let lenient = VerifierSet::new(false, vec![es384]);
                let err = unmarshal::<Claims, _, _>(token.as_str(), &lenient).unwrap_err();
                assert!(err.is_signature_invalid());
                Ok(())
            }

            #[test]
            fn strict_set_does_not_fall_back() -> Result<()> {
                let (signer, same_key_other_id, other_key) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;

                let strict = VerifierSet::new(true, vec![other_key.clone(), same_key_other_id.clone()]);
                let err = unmarshal::<Claims, _, _>(token.as_str(), &strict).unwrap_err();
                assert!(err.is_signature_invalid());

                let lenient = VerifierSet::new(false, vec![other_key, same_key_other_id]);
                let verified: Verified<Claims> = unmarshal(token.as_str(), &lenient)?;
                assert_eq!(verified.key_id().map(jwk::KeyIdRef::as_str), Some("b"));
                Ok(())
            }

            #[test]
            fn matching_key_id_is_used() -> Result<()> {
                let (signer, same_key_other_id, _) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;

                let set: VerifierSet = vec![same_key_other_id, signer.verifier()]
                    .into_iter()
                    .collect();
                assert!(!set.key_id_must_match());
                assert_eq!(set.len(), 2);

                let verified: Verified<Claims> = unmarshal(token.as_str(), &set)?;
                assert_eq!(verified.key_id().map(jwk::KeyIdRef::as_str), Some("a"));
                Ok(())
            }

            #[test]
            fn token_without_key_id() -> Result<()> {
                let registry = Registry::with_defaults();
                let anonymous = registry.new_signer(
                    jwa::Algorithm::ES256,
                    None,
                    jwa::PrivateKey::Ec(p256_private_key()?),
                )?;
                let (_, same_key_other_id, other_key) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &anonymous)?;

                let strict = VerifierSet::new(true, vec![same_key_other_id.clone()]);
                let err = unmarshal::<Claims, _, _>(token.as_str(), &strict).unwrap_err();
                assert!(err.is_no_verifier_for_key_id());

                let lenient = VerifierSet::new(false, vec![other_key, same_key_other_id]);
                let verified: Verified<Claims> = unmarshal(token.as_str(), &lenient)?;
                assert_eq!(verified.key_id().map(jwk::KeyIdRef::as_str), Some("b"));
                Ok(())
            }

            #[test]
            fn empty_set_rejects_everything() -> Result<()> {
                let (signer, _, _) = setup()?;
                let token = marshal(&mut rand_core::OsRng, &claims(), &signer)?;

                let set = VerifierSet::default();
                assert!(set.is_empty());
                let err = unmarshal::<Claims, _, _>(token.as_str(), &set).unwrap_err();
                assert!(err.is_signature_invalid());
                Ok(())
            }
        }
    }

    #[cfg(feature = "rsa")]
    mod rsa {
        use super::*;
        use crate::test::rsa::*;

        #[test]
        fn golden_tokens_for_every_hash() -> Result<()> {
            let registry = Registry::with_defaults();
            let cases = [
                (jwa::Algorithm::RS256, RS256_TOKEN),
                (jwa::Algorithm::RS384, RS384_TOKEN),
                (jwa::Algorithm::RS512, RS512_TOKEN),
            ];

            for (alg, expected) in cases.iter() {
                let signer = registry.new_signer(
                    *alg,
                    kid(KEY_ID),
                    jwa::PrivateKey::Rsa(private_key()?),
                )?;

                let token = marshal(&mut ZeroRng, &json!({ "sub": "1234567890" }), &signer)?;
                assert_eq!(token.as_str(), *expected);

                let verified: Verified<serde_json::Value> = unmarshal(*expected, &signer.verifier())?;
                assert_eq!(verified.key_id().map(jwk::KeyIdRef::as_str), Some(KEY_ID));
            }

            Ok(())
        }

        #[test]
        fn verifies_with_parsed_public_key() -> Result<()> {
            let registry = Registry::with_defaults();
            let verifiers = VerifierSet::new(true, vec![registry.parse_verifier(JWK.as_bytes())?]);

            let verified: Verified<serde_json::Value> = unmarshal(RS256_TOKEN, &verifiers)?;
            assert_eq!(verified.payload()["sub"], "1234567890");

            let err = unmarshal::<serde_json::Value, _, _>(RS384_TOKEN, &verifiers).unwrap_err();
            assert!(err.is_no_verifier_for_key_id());
            Ok(())
        }
    }
}
