//! Client authentication core for an SRP-6a dialect with versioned
//! password hashing.
//!
//! The protocol is SRP-6a over a served 2048-bit group with generator
//! 2, with two deviations from RFC 5054:
//!
//! * every group element travels as 256 little-endian bytes, zero
//!   padded at the high end;
//! * all protocol hashing uses an expanded SHA-512 construction that
//!   produces one full group element, see [`crate::hashing`].
//!
//! The modulus is not pinned. The server sends it per account as a PGP
//! cleartext signed message, and [`SrpAuth`] refuses to use it until
//! the signature checks out against the pinned server key
//! ([`SRP_MODULUS_KEY`]).
//!
//! A login attempt:
//!
//! ```no_run
//! use srp_auth::SrpAuth;
//! # fn auth_info() -> (String, String, String, String) { unimplemented!() }
//! # fn main() -> Result<(), srp_auth::SrpError> {
//! let (modulus, salt, server_ephemeral, password) = auth_info();
//! let client = SrpAuth::with_pgp(&password, None, 4, Some(&salt), &modulus, &server_ephemeral)?;
//! let proofs = client.generate_proofs()?;
//! // send proofs.client_ephemeral and proofs.client_proof, then check
//! // the reply with proofs.compare_server_proof(..)
//! # Ok(())
//! # }
//! ```
//!
//! Accounts created before hashing version 3 may need
//! [`auth_version_with_fallback`] to discover which historical scheme
//! their verifier was built with.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod client;
mod errors;
mod fallback;
mod group;
mod hashing;
mod modulus;
mod server;
mod types;

pub use client::SrpAuth;
pub use errors::{ModulusError, SrpError};
pub use fallback::{auth_version_with_fallback, FallbackDecision, AUTH_FALLBACK_VERSION};
pub use group::{SALT_LEN_BYTES, SRP_LEN_BYTES};
pub use hashing::{
    compute_key_password, generate_key_salt, srp_password_hash, HashedPassword,
    KEY_SALT_LEN_BYTES,
};
pub use modulus::{ModulusSignatureVerifier, SRP_MODULUS_KEY};
pub use server::ServerInteraction;
pub use types::{
    AuthVersion, SrpProof, SrpProofB64, SrpVerifier, SrpVerifierB64, DEFAULT_AUTH_VERSION,
};

#[cfg(feature = "pgpinternal")]
pub use modulus::RpgpVerifier;
