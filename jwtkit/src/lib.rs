//! This crate signs and verifies JSON Web Tokens in compact serialization,
//! drawing on the Javascript/JSON Object Signing and Encryption (JOSE)
//! standards:
//!
//! * JSON Web Signature (JWS): [RFC7515][]
//! * JSON Web Key (JWK): [RFC7517][]
//! * JSON Web Algorithms (JWA): [RFC7518][]
//! * JSON Web Token (JWT): [RFC7519][]
//!
//! Signature algorithms and JWK key types are looked up through an explicit
//! [`Registry`]. The default registry provides ECDSA (`ES256`, `ES384`,
//! `ES512`) and RSASSA-PKCS1-v1_5 (`RS256`, `RS384`, `RS512`), subject to the
//! `ec` and `rsa` features. Unsecured tokens (`none`) are only accepted by a
//! registry that opts into them.
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use jwtkit::{jwt, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let jwk = br#"{
//!     "kty": "EC",
//!     "kid": "lWO8xx5sDL",
//!     "key_ops": ["verify"],
//!     "crv": "P-256",
//!     "x": "QtzrCrtATAQI_MYPzmUN9Ccc3LVWKL4z6Lq7q1X1c5I",
//!     "y": "9oJLWqJTuVnJU08RMobXRufO8xpvJ2-BlfeQLtMOkn0"
//! }"#;
//!
//! let registry = Registry::with_defaults();
//! let verifiers = jwt::VerifierSet::new(true, vec![registry.parse_verifier(jwk)?]);
//!
//! let token = concat!(
//!     "eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiIsImtpZCI6ImxXTzh4eDVzREwifQ.",
//!     "eyJzdWIiOiIxMjM0NTY3ODkwIn0.",
//!     "AOTAkjpBS2IVTvEunX4XUjGuQk1rbDi-CF24o7ait2k-oB-s84AY7Q8jRFIkwWWpHtbHZRg_P61FqbnJx6W9DQ",
//! );
//!
//! let verified: jwt::Verified<serde_json::Value> = jwt::unmarshal(token, &verifiers)?;
//! assert_eq!(verified.payload()["sub"], "1234567890");
//! assert_eq!(verified.key_id().map(|kid| kid.as_str()), Some("lWO8xx5sDL"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod error;
pub mod jwa;
pub mod jwk;
pub mod jws;
pub mod jwt;
mod registry;


#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
pub use registry::Registry;
