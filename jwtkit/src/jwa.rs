//! Implementations of the JSON Web Algorithms (JWA) standard
//!
//! The specifications for these algorithms can be found in [RFC7518][].
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
pub mod ec;
pub mod none;
#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
pub mod rsa;

mod algorithm;

pub use algorithm::Algorithm;

/// Private key material for any supported key type
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum PrivateKey {
    /// An elliptic curve private key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    Ec(ec::PrivateKey),

    /// An RSA private key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    Rsa(rsa::PrivateKey),

    /// The empty key used with the `none` algorithm
    Unsecured,
}

impl PrivateKey {
    /// The public half of the key
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        match self {
            #[cfg(feature = "ec")]
            Self::Ec(key) => PublicKey::Ec(key.public_key().clone()),
            #[cfg(feature = "rsa")]
            Self::Rsa(key) => PublicKey::Rsa(key.public_key().clone()),
            Self::Unsecured => PublicKey::Unsecured,
        }
    }
}

#[cfg(feature = "ec")]
impl From<ec::PrivateKey> for PrivateKey {
    fn from(key: ec::PrivateKey) -> Self {
        Self::Ec(key)
    }
}

#[cfg(feature = "rsa")]
impl From<rsa::PrivateKey> for PrivateKey {
    fn from(key: rsa::PrivateKey) -> Self {
        Self::Rsa(key)
    }
}

/// Public key material for any supported key type
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PublicKey {
    /// An elliptic curve public key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    Ec(ec::PublicKey),

    /// An RSA public key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    Rsa(rsa::PublicKey),

    /// The empty key used with the `none` algorithm
    Unsecured,
}

#[cfg(feature = "ec")]
impl From<ec::PublicKey> for PublicKey {
    fn from(key: ec::PublicKey) -> Self {
        Self::Ec(key)
    }
}

#[cfg(feature = "rsa")]
impl From<rsa::PublicKey> for PublicKey {
    fn from(key: rsa::PublicKey) -> Self {
        Self::Rsa(key)
    }
}
