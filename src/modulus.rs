//! Verification of the server-provided SRP modulus.
//!
//! The server sends the modulus as a PGP cleartext signed message. The
//! signature is checked against a pinned server key before any of the
//! modulus bytes are used, so a compromised transport cannot substitute
//! a weak group.

use crate::errors::ModulusError;

/// The pinned armored public key used to sign SRP modulus messages.
pub const SRP_MODULUS_KEY: &str = include_str!("../resources/server_public_key.asc");

/// Checks the signature on a cleartext signed modulus message and
/// returns the embedded base64 modulus.
///
/// Implementations must reject any message whose signature does not
/// validate against `server_key`.
pub trait ModulusSignatureVerifier {
    /// Verify `message` against the armored `server_key` and return the
    /// signed cleartext body.
    fn verify_and_extract_modulus(
        &self,
        message: &str,
        server_key: &str,
    ) -> Result<String, ModulusError>;
}

#[cfg(feature = "pgpinternal")]
pub use self::rpgp::RpgpVerifier;

#[cfg(feature = "pgpinternal")]
mod rpgp {
    use std::sync::{Mutex, PoisonError};

    use pgp::composed::{ArmorOptions, CleartextSignedMessage, Deserializable, SignedPublicKey};

    use super::ModulusSignatureVerifier;
    use crate::errors::ModulusError;

    /// [`ModulusSignatureVerifier`] backed by rPGP.
    ///
    /// Parsing the armored server key dominates the cost of a
    /// verification, so the parsed key is cached after first use. The
    /// cache is keyed by re-armoring the cached key and comparing, which
    /// keeps the verifier correct if a caller switches keys between
    /// calls.
    #[derive(Debug, Default)]
    pub struct RpgpVerifier {
        cached_key: Mutex<Option<SignedPublicKey>>,
    }

    impl RpgpVerifier {
        fn server_key(&self, armored: &str) -> Result<SignedPublicKey, ModulusError> {
            let mut cached = self
                .cached_key
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = cached.as_ref() {
                let rearmored = key
                    .to_armored_string(ArmorOptions::default())
                    .map_err(|err| ModulusError::ServerKey(err.to_string()))?;
                if rearmored.trim() == armored.trim() {
                    return Ok(key.clone());
                }
            }
            let (key, _) = SignedPublicKey::from_string(armored)
                .map_err(|err| ModulusError::ServerKey(err.to_string()))?;
            key.verify()
                .map_err(|err| ModulusError::ServerKey(err.to_string()))?;
            *cached = Some(key.clone());
            Ok(key)
        }
    }

    impl ModulusSignatureVerifier for RpgpVerifier {
        fn verify_and_extract_modulus(
            &self,
            message: &str,
            server_key: &str,
        ) -> Result<String, ModulusError> {
            let key = self.server_key(server_key)?;
            let (signed, _) = CleartextSignedMessage::from_string(message)
                .map_err(|err| ModulusError::MalformedMessage(err.to_string()))?;
            signed
                .verify(&key)
                .map_err(|_| ModulusError::InvalidSignature)?;
            Ok(signed.signed_text())
        }
    }
}
