use std::{collections::HashMap, iter::FromIterator};

use crate::{error, jwa, jwk, jws};

/// Selects a key to verify a token signature with
pub trait Verifiers {
    /// Verifies `signature` over `signed`, returning the ID of the key that
    /// accepted it
    ///
    /// `kid` is the key ID suggested by the token header, and is not
    /// trusted.
    ///
    /// # Errors
    ///
    /// No key accepts the signature.
    fn verify(
        &self,
        alg: jwa::Algorithm,
        kid: Option<&jwk::KeyIdRef>,
        signed: &[u8],
        signature: &[u8],
    ) -> Result<Option<jwk::KeyId>, error::JwtVerifyError>;
}

/// A single verifier ignores the suggested key ID
impl Verifiers for jws::Verifier {
    fn verify(
        &self,
        alg: jwa::Algorithm,
        _kid: Option<&jwk::KeyIdRef>,
        signed: &[u8],
        signature: &[u8],
    ) -> Result<Option<jwk::KeyId>, error::JwtVerifyError> {
        jws::Verifier::verify(self, alg, signed, signature)?;
        Ok(self.key_id().map(ToOwned::to_owned))
    }
}

impl<T: Verifiers + ?Sized> Verifiers for &'_ T {
    fn verify(
        &self,
        alg: jwa::Algorithm,
        kid: Option<&jwk::KeyIdRef>,
        signed: &[u8],
        signature: &[u8],
    ) -> Result<Option<jwk::KeyId>, error::JwtVerifyError> {
        T::verify(self, alg, kid, signed, signature)
    }
}

/// A fixed collection of verifiers, indexed by key ID
///
/// When the token header names a key ID held by the set, and that key
/// accepts the header's algorithm, that key is tried first. What happens
/// next depends on whether the key ID must match:
///
/// * If it must, the outcome of that one attempt is final, and a token
///   naming an unknown key ID fails with `NoVerifierForKeyId`.
/// * Otherwise, every other verifier for the algorithm is tried in
///   insertion order until one accepts the signature.
///
/// If several verifiers share a key ID, the last one is indexed under it.
/// All of them are still tried when the key ID need not match.
#[derive(Clone, Debug, Default)]
pub struct VerifierSet {
    verifiers: Vec<jws::Verifier>,
    by_key_id: HashMap<jwk::KeyId, usize>,
    key_id_must_match: bool,
}

impl VerifierSet {
    /// Builds a verifier set
    #[must_use]
    pub fn new<I>(key_id_must_match: bool, verifiers: I) -> Self
    where
        I: IntoIterator<Item = jws::Verifier>,
    {
        let verifiers: Vec<_> = verifiers.into_iter().collect();
        let by_key_id = verifiers
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.key_id().map(|kid| (kid.to_owned(), idx)))
            .collect();

        Self {
            verifiers,
            by_key_id,
            key_id_must_match,
        }
    }

    /// Whether only the verifier named by the token may be used
    #[must_use]
    pub fn key_id_must_match(&self) -> bool {
        self.key_id_must_match
    }

    /// The verifiers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &jws::Verifier> {
        self.verifiers.iter()
    }

    /// The number of verifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }

    /// The verifier indexed under `kid`, if it accepts `alg`
    fn suggested(&self, alg: jwa::Algorithm, kid: Option<&jwk::KeyIdRef>) -> Option<usize> {
        let idx = *self.by_key_id.get(kid?)?;
        if self.verifiers[idx].algorithm() == alg {
            Some(idx)
        } else {
            None
        }
    }
}

impl Verifiers for VerifierSet {
    fn verify(
        &self,
        alg: jwa::Algorithm,
        kid: Option<&jwk::KeyIdRef>,
        signed: &[u8],
        signature: &[u8],
    ) -> Result<Option<jwk::KeyId>, error::JwtVerifyError> {
        let suggested = self.suggested(alg, kid);

        if let Some(idx) = suggested {
            let verifier = &self.verifiers[idx];
            match verifier.verify(alg, signed, signature) {
                Ok(()) => return Ok(verifier.key_id().map(ToOwned::to_owned)),
                Err(err) if self.key_id_must_match => return Err(err.into()),
                Err(_) => {}
            }
        } else if self.key_id_must_match {
            #[cfg(feature = "tracing")]
            tracing::debug!(?kid, %alg, "no verifier for key ID");

            return Err(error::no_verifier_for_key_id().into());
        }

        let accepted = self
            .verifiers
            .iter()
            .enumerate()
            .filter(|&(idx, v)| Some(idx) != suggested && v.algorithm() == alg)
            .find(|&(_, v)| v.verify(alg, signed, signature).is_ok());

        match accepted {
            Some((_, verifier)) => Ok(verifier.key_id().map(ToOwned::to_owned)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(?kid, %alg, "no verifier accepted the signature");

                Err(error::signature_invalid().into())
            }
        }
    }
}

impl FromIterator<jws::Verifier> for VerifierSet {
    /// Collects verifiers into a set that does not require the key ID to
    /// match
    fn from_iter<I: IntoIterator<Item = jws::Verifier>>(iter: I) -> Self {
        Self::new(false, iter)
    }
}
