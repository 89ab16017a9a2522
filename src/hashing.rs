//! The expanded-hash primitive and the historical password hashing
//! schemes.
//!
//! The protocol never hashes with a single digest call. Wherever an
//! output as wide as the 2048-bit modulus is needed it uses
//! [`expand_hash`], four chained SHA-512 invocations with an
//! incrementing trailing byte.
//!
//! Password hashing went through several generations; all of them are
//! kept so that accounts created under an older scheme can still log
//! in. New accounts always use [`AuthVersion::V4`].

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use md5::Md5;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::errors::SrpError;
use crate::group::{SALT_LEN_BYTES, SRP_LEN_BYTES};
use crate::types::AuthVersion;

/// Fixed bcrypt cost; all released clients hash with `$2y$10$`.
const BCRYPT_COST: u32 = 10;

/// Suffix mixed into the account salt for version 3 and 4 hashing,
/// filling the 16-byte bcrypt salt exactly.
const SALT_SUFFIX: &[u8; 6] = b"proton";

/// Byte length of a decoded mailbox key salt.
pub const KEY_SALT_LEN_BYTES: usize = 16;

/// Length of a base64-encoded mailbox key salt.
const KEY_SALT_B64_LEN: usize = 24;

/// Offset of the hash characters in a bcrypt string, past the
/// `$2y$10$` prefix and the 22 salt characters.
const BCRYPT_HASH_OFFSET: usize = 29;

/// A password hash expanded to the width of the group modulus.
///
/// Zeroized on drop; the raw bytes feed straight into the exchange as
/// the exponent `x`.
pub struct HashedPassword(Zeroizing<[u8; SRP_LEN_BYTES]>);

impl HashedPassword {
    /// The raw little-endian bytes of the exponent `x`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SRP_LEN_BYTES] {
        &self.0
    }
}

/// `H(data) = SHA512(data || 0) || SHA512(data || 1) || SHA512(data || 2) || SHA512(data || 3)`.
///
/// Produces [`SRP_LEN_BYTES`] bytes, one full group element.
pub(crate) fn expand_hash(data: &[u8]) -> Zeroizing<[u8; SRP_LEN_BYTES]> {
    let mut out = Zeroizing::new([0u8; SRP_LEN_BYTES]);
    for (i, chunk) in out.chunks_exact_mut(64).enumerate() {
        let mut digest = Sha512::new();
        digest.update(data);
        digest.update([i as u8]);
        chunk.copy_from_slice(&digest.finalize());
    }
    out
}

/// Strip the separators the service ignores in usernames and lowercase
/// the rest.
pub(crate) fn clean_username(username: &str) -> String {
    username
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .to_lowercase()
}

/// Run bcrypt and keep the full `$2y$10$<salt><hash>` string; the
/// string itself, not the raw digest, is what the schemes feed forward.
fn bcrypt_string(password: &[u8], salt: [u8; 16]) -> Result<String, SrpError> {
    let parts = bcrypt::hash_with_salt(password, BCRYPT_COST, salt)?;
    Ok(parts.format_for_version(bcrypt::Version::TwoY))
}

fn expand_with_modulus(
    bcrypt_hash: &str,
    modulus: &[u8; SRP_LEN_BYTES],
) -> HashedPassword {
    let mut data = Zeroizing::new(Vec::with_capacity(bcrypt_hash.len() + SRP_LEN_BYTES));
    data.extend_from_slice(bcrypt_hash.as_bytes());
    data.extend_from_slice(modulus);
    HashedPassword(expand_hash(&data))
}

/// Versions 3 and 4: bcrypt salted with the 10-byte account salt plus
/// [`SALT_SUFFIX`].
fn hash_v3(
    password: &str,
    salt: &[u8; SALT_LEN_BYTES],
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    let mut bcrypt_salt = [0u8; 16];
    bcrypt_salt[..SALT_LEN_BYTES].copy_from_slice(salt);
    bcrypt_salt[SALT_LEN_BYTES..].copy_from_slice(SALT_SUFFIX);
    Ok(expand_with_modulus(
        &bcrypt_string(password.as_bytes(), bcrypt_salt)?,
        modulus,
    ))
}

/// Version 1: bcrypt salted with the leading 16 bytes of the hex MD5
/// digest of the lowercased username. MD5 carries no security here, it
/// only reproduces the historical salt derivation.
fn hash_v1(
    password: &[u8],
    username: &str,
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    let digest = hex::encode(Md5::digest(username.to_lowercase().as_bytes()));
    let mut bcrypt_salt = [0u8; 16];
    bcrypt_salt.copy_from_slice(&digest.as_bytes()[..16]);
    Ok(expand_with_modulus(&bcrypt_string(password, bcrypt_salt)?, modulus))
}

/// Version 0: SHA-512 pre-hash of username and password, base64
/// encoded, then the version 1 path.
fn hash_v0(
    password: &str,
    username: &str,
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    let mut digest = Sha512::new();
    digest.update(username.to_lowercase().as_bytes());
    digest.update(password.as_bytes());
    let encoded = BASE64_STANDARD.encode(digest.finalize());
    hash_v1(encoded.as_bytes(), username, modulus)
}

/// Derive the expanded password hash for the given scheme version.
///
/// Versions 3 and 4 require `salt`; versions 0 through 2 require
/// `username`. The modulus is the raw little-endian wire value.
///
/// # Errors
///
/// [`SrpError::MissingSalt`] or [`SrpError::MissingUsername`] when the
/// version's inputs are absent, before any hashing work starts.
pub fn srp_password_hash(
    version: AuthVersion,
    username: Option<&str>,
    password: &str,
    salt: Option<&[u8; SALT_LEN_BYTES]>,
    modulus: &[u8; SRP_LEN_BYTES],
) -> Result<HashedPassword, SrpError> {
    match version {
        AuthVersion::V3 | AuthVersion::V4 => {
            let salt = salt.ok_or(SrpError::MissingSalt(version.into()))?;
            hash_v3(password, salt, modulus)
        }
        AuthVersion::V2 => {
            let username = username.ok_or(SrpError::MissingUsername(version.into()))?;
            hash_v1(password.as_bytes(), &clean_username(username), modulus)
        }
        AuthVersion::V1 => {
            let username = username.ok_or(SrpError::MissingUsername(version.into()))?;
            hash_v1(password.as_bytes(), username, modulus)
        }
        AuthVersion::V0 => {
            let username = username.ok_or(SrpError::MissingUsername(version.into()))?;
            hash_v0(password, username, modulus)
        }
    }
}

/// Derive the mailbox key password from the login password and the
/// account key salt.
///
/// Returns the 31 bcrypt hash characters after the prefix and salt.
///
/// # Errors
///
/// [`SrpError::KeyPasswordInput`] when the password is empty or the
/// salt is not 24 base64 characters.
pub fn compute_key_password(password: &str, key_salt: &str) -> Result<String, SrpError> {
    if password.is_empty() || key_salt.len() != KEY_SALT_B64_LEN {
        return Err(SrpError::KeyPasswordInput);
    }
    let decoded = BASE64_STANDARD.decode(key_salt)?;
    let salt: [u8; KEY_SALT_LEN_BYTES] = decoded
        .as_slice()
        .try_into()
        .map_err(|_| SrpError::KeyPasswordInput)?;
    let hash = bcrypt_string(password.as_bytes(), salt)?;
    Ok(hash[BCRYPT_HASH_OFFSET..].to_owned())
}

/// Generate a fresh random mailbox key salt, always 24 base64
/// characters.
#[must_use]
pub fn generate_key_salt() -> String {
    let mut salt = [0u8; KEY_SALT_LEN_BYTES];
    OsRng.fill_bytes(&mut salt);
    BASE64_STANDARD.encode(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_hash_is_one_group_element_wide() {
        assert_eq!(expand_hash(b"input").len(), SRP_LEN_BYTES);
    }

    #[test]
    fn expand_hash_chunks_differ() {
        let out = expand_hash(b"input");
        assert_ne!(out[..64], out[64..128]);
    }

    #[test]
    fn cleaning_strips_separators_and_case() {
        assert_eq!(clean_username("St.Jude_the-Obscure"), "stjudetheobscure");
        assert_eq!(clean_username("plain"), "plain");
    }
}
