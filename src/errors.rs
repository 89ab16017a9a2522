//! Error types.

use thiserror::Error;

/// Errors produced by the SRP authentication core.
///
/// Trust and parameter-bounds failures abort the login attempt; there
/// is no way to recover them locally. Input-validation failures are
/// caller mistakes and are raised before any cryptographic work runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SrpError {
    /// The decoded modulus does not have the expected 2048-bit width.
    #[error("SRP modulus has incorrect size")]
    ModulusSize,

    /// The modulus failed a structural check and cannot define the group.
    #[error("SRP modulus is unusable: {0}")]
    InvalidModulus(&'static str),

    /// The generator is degenerate for this modulus.
    #[error("SRP generator is out of bounds")]
    GeneratorOutOfBounds,

    /// The server ephemeral `B` falls outside `(1, N-1)` modulo `N`.
    #[error("SRP server ephemeral is out of bounds")]
    ServerEphemeralOutOfBounds,

    /// The client ephemeral `A` vanishes modulo `N`.
    #[error("SRP client ephemeral is out of bounds")]
    ClientEphemeralOutOfBounds,

    /// The multiplier `k = H(g || N)` is degenerate.
    #[error("SRP multiplier is out of bounds")]
    MultiplierOutOfBounds,

    /// The scrambling parameter `u = H(A || B)` vanishes.
    #[error("SRP scrambling parameter is out of bounds")]
    ScramblingParameterOutOfBounds,

    /// The bounded random-sampling loop ran out of retries.
    #[error("Could not find safe parameters")]
    NoSafeParameters,

    /// The auth version number is not one of 0 through 4.
    #[error("Unsupported auth version")]
    UnsupportedVersion,

    /// Hashing versions 3 and 4 need the account salt.
    #[error("missing salt for auth version {0}")]
    MissingSalt(u8),

    /// Hashing versions 0, 1 and 2 need the username.
    #[error("missing username for auth version {0}")]
    MissingUsername(u8),

    #[error("invalid SRP salt: {0}")]
    InvalidSalt(&'static str),

    /// The stored verifier does not decode to one group element.
    #[error("invalid SRP verifier")]
    InvalidVerifier,

    /// The client proof presented to the server does not match.
    #[error("invalid client proof")]
    InvalidClientProof,

    /// The server was asked to verify a proof before issuing a challenge.
    #[error("no challenge outstanding")]
    ChallengeNotGenerated,

    /// Key-password derivation rejected its inputs.
    #[error("Password and salt required")]
    KeyPasswordInput,

    /// Every fallback hashing version has been tried.
    #[error("Can not provide any other auth version")]
    FallbackExhausted,

    /// The signed modulus message was rejected.
    #[error(transparent)]
    Modulus(#[from] ModulusError),

    /// A base64 wire value failed to decode.
    #[error("base64 decoding failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The bcrypt primitive rejected its input.
    #[error("bcrypt failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Errors raised while checking the signature on the server modulus.
///
/// A modulus whose signature does not verify must never enter the
/// exchange, so all of these abort the attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModulusError {
    /// The signature is missing, does not verify, or was made by
    /// another key.
    #[error("Unable to verify server identity")]
    InvalidSignature,

    /// The cleartext-signed message could not be parsed at all.
    #[error("malformed signed modulus message: {0}")]
    MalformedMessage(String),

    /// The pinned server public key could not be loaded.
    #[error("unusable server public key: {0}")]
    ServerKey(String),
}
