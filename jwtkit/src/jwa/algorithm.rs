use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error;

/// A JSON Web Signature algorithm identifier
///
/// Each identifier has a small, dense numeric id in `1..=Algorithm::COUNT`
/// which the [`Registry`][crate::Registry] uses as an array index. The id
/// `0` is reserved and never assigned.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Algorithm {
    /// Unsecured, with an empty signature
    ///
    /// Must be opted into explicitly through
    /// [`Registry::allow_unsecured()`][crate::Registry::allow_unsecured()].
    #[serde(rename = "none")]
    None = 1,
    /// ECDSA using P-256 and SHA-256
    ES256 = 2,
    /// ECDSA using P-384 and SHA-384
    ES384 = 3,
    /// ECDSA using P-521 and SHA-512
    ES512 = 4,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256 = 5,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384 = 6,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512 = 7,
}

impl Algorithm {
    /// Every algorithm, in id order
    pub const ALL: [Algorithm; 7] = [
        Self::None,
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
    ];

    /// The number of algorithm identifiers, which is also the largest id
    pub const COUNT: usize = Self::ALL.len();

    /// The dense numeric id of the algorithm
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up an algorithm by its numeric id
    ///
    /// Returns `None` for `0` and for ids past [`COUNT`][Self::COUNT].
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|alg| alg.id() == id)
    }

    /// The name of the algorithm as it appears in the `alg` header
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
        }
    }

    /// The digest used to hash the signing input, if any
    #[must_use]
    pub fn digest(self) -> Option<&'static ring::digest::Algorithm> {
        match self {
            Self::None => None,
            Self::ES256 | Self::RS256 => Some(&ring::digest::SHA256),
            Self::ES384 | Self::RS384 => Some(&ring::digest::SHA384),
            Self::ES512 | Self::RS512 => Some(&ring::digest::SHA512),
        }
    }
}

impl TryFrom<&'_ str> for Algorithm {
    type Error = error::UnknownAlgorithm;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| error::unknown_algorithm(s))
    }
}

impl FromStr for Algorithm {
    type Err = error::UnknownAlgorithm;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn ids_are_dense_from_one() {
        for (idx, alg) in Algorithm::ALL.iter().enumerate() {
            assert_eq!(usize::from(alg.id()), idx + 1);
            assert_eq!(Algorithm::from_id(alg.id()), Some(*alg));
        }

        assert_eq!(Algorithm::from_id(0), None);
        assert_eq!(Algorithm::from_id(8), None);
        assert_eq!(Algorithm::COUNT, 7);
    }

    #[test]
    fn names_round_trip() {
        for alg in Algorithm::ALL.iter() {
            assert_eq!(Algorithm::try_from(alg.name()).unwrap(), *alg);
            assert_eq!(alg.to_string(), alg.name());
        }
    }

    #[test]
    fn rejects_unknown_and_miscased_names() {
        assert!("HS256".parse::<Algorithm>().is_err());
        assert!("NONE".parse::<Algorithm>().is_err());
        assert!("es256".parse::<Algorithm>().is_err());
        let err = "PS256".parse::<Algorithm>().unwrap_err();
        assert_eq!(err.name(), "PS256");
    }

    #[test]
    fn serializes_as_header_name() {
        assert_eq!(serde_json::to_string(&Algorithm::None).unwrap(), r#""none""#);
        assert_eq!(serde_json::to_string(&Algorithm::RS384).unwrap(), r#""RS384""#);
        let alg: Algorithm = serde_json::from_str(r#""ES512""#).unwrap();
        assert_eq!(alg, Algorithm::ES512);
    }
}
