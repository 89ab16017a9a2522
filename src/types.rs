//! Wire-facing value types.

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use crypto_bigint::subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::errors::SrpError;
use crate::group::{SALT_LEN_BYTES, SRP_LEN_BYTES};

/// Identifier of the historical password-hashing scheme in force for
/// an account.
///
/// The version is negotiated per account and only ever moves forward
/// with server confirmation; see
/// [`auth_version_with_fallback`](crate::auth_version_with_fallback).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AuthVersion {
    /// SHA-512 pre-hash of username and password, then the V1 scheme.
    V0 = 0,
    /// bcrypt salted with the MD5 hex digest of the username.
    V1 = 1,
    /// V1 with separators stripped from the username first.
    V2 = 2,
    /// bcrypt over the account salt; same construction as V4.
    V3 = 3,
    /// Current scheme, used for all new accounts.
    #[default]
    V4 = 4,
}

impl TryFrom<u8> for AuthVersion {
    type Error = SrpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            _ => Err(SrpError::UnsupportedVersion),
        }
    }
}

impl From<AuthVersion> for u8 {
    fn from(version: AuthVersion) -> Self {
        version as u8
    }
}

/// The hashing version used for all newly created accounts.
pub const DEFAULT_AUTH_VERSION: AuthVersion = AuthVersion::V4;

/// Client proof material for one login attempt, in raw wire bytes.
#[derive(Debug, Clone)]
pub struct SrpProof {
    /// The client public ephemeral `A`.
    pub client_ephemeral: [u8; SRP_LEN_BYTES],

    /// Proof of the shared session value, sent to the server.
    pub client_proof: [u8; SRP_LEN_BYTES],

    /// The proof the server must answer with for mutual authentication.
    pub expected_server_proof: [u8; SRP_LEN_BYTES],

    /// The shared session value `K`. Never transmitted; dropped and
    /// wiped with the proof.
    pub shared_session: Zeroizing<[u8; SRP_LEN_BYTES]>,
}

impl SrpProof {
    /// Compare the server's reply against the expected proof in
    /// constant time.
    #[must_use]
    pub fn compare_server_proof(&self, server_proof: &[u8]) -> bool {
        self.expected_server_proof.as_slice().ct_eq(server_proof).into()
    }
}

/// [`SrpProof`] with every value base64 encoded, ready for an API
/// request body.
#[derive(Debug, Clone)]
pub struct SrpProofB64 {
    /// Base64 client public ephemeral `A`.
    pub client_ephemeral: String,
    /// Base64 client proof.
    pub client_proof: String,
    /// Base64 proof expected from the server.
    pub expected_server_proof: String,
}

impl From<SrpProof> for SrpProofB64 {
    fn from(proof: SrpProof) -> Self {
        Self {
            client_ephemeral: BASE64_STANDARD.encode(proof.client_ephemeral),
            client_proof: BASE64_STANDARD.encode(proof.client_proof),
            expected_server_proof: BASE64_STANDARD.encode(proof.expected_server_proof),
        }
    }
}

impl SrpProofB64 {
    /// Compare the server's base64 reply against the expected proof.
    ///
    /// Decoding is not constant time; the comparison of the decoded
    /// bytes is.
    #[must_use]
    pub fn compare_server_proof(&self, server_proof: &str) -> bool {
        let Ok(expected) = BASE64_STANDARD.decode(&self.expected_server_proof) else {
            return false;
        };
        let Ok(actual) = BASE64_STANDARD.decode(server_proof) else {
            return false;
        };
        expected.as_slice().ct_eq(actual.as_slice()).into()
    }
}

/// Registration material stored by the server in place of the
/// password, produced on signup or password change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrpVerifier {
    /// The hashing version the verifier was derived under.
    pub version: AuthVersion,

    /// The fresh random password salt.
    pub salt: [u8; SALT_LEN_BYTES],

    /// `g^x mod N` for the hashed password `x`.
    pub verifier: [u8; SRP_LEN_BYTES],
}

/// [`SrpVerifier`] with byte values base64 encoded for the API.
#[derive(Debug, Clone)]
pub struct SrpVerifierB64 {
    /// The hashing version as its wire number.
    pub version: u8,
    /// Base64 password salt.
    pub salt: String,
    /// Base64 verifier.
    pub verifier: String,
}

impl From<SrpVerifier> for SrpVerifierB64 {
    fn from(verifier: SrpVerifier) -> Self {
        Self {
            version: verifier.version.into(),
            salt: BASE64_STANDARD.encode(verifier.salt),
            verifier: BASE64_STANDARD.encode(verifier.verifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_round_trips_through_u8() {
        for raw in 0..=4u8 {
            assert_eq!(u8::from(AuthVersion::try_from(raw).unwrap()), raw);
        }
        assert!(matches!(
            AuthVersion::try_from(5),
            Err(SrpError::UnsupportedVersion)
        ));
    }

    #[test]
    fn b64_proof_comparison_rejects_garbage() {
        let proof = SrpProofB64 {
            client_ephemeral: String::new(),
            client_proof: String::new(),
            expected_server_proof: BASE64_STANDARD.encode([7u8; SRP_LEN_BYTES]),
        };
        assert!(!proof.compare_server_proof("not base64!"));
        assert!(proof.compare_server_proof(&BASE64_STANDARD.encode([7u8; SRP_LEN_BYTES])));
    }
}
