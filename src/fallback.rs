//! Auth version negotiation for accounts created before version 3.
//!
//! Older accounts do not record which hashing scheme their verifier was
//! built with. When the server reports version 0 the client has to
//! guess, starting from the newest scheme such an account could use and
//! stepping down after each rejected attempt.

use crate::errors::SrpError;
use crate::hashing::clean_username;
use crate::types::AuthVersion;

/// First version tried when the server does not know the account's
/// hashing version.
pub const AUTH_FALLBACK_VERSION: AuthVersion = AuthVersion::V2;

/// Outcome of one step of the version negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDecision {
    /// The version to hash the password with for this attempt.
    pub version: AuthVersion,

    /// True when a rejection of this attempt is a wrong password rather
    /// than a version mismatch.
    pub done: bool,
}

/// Pick the hashing version for the next login attempt.
///
/// `server_version` is the version the server reported for the account
/// and `last_attempt` is the version used by the previous failed
/// attempt, if any. Returns an error once every candidate version has
/// been tried.
pub fn auth_version_with_fallback(
    server_version: u8,
    username: &str,
    last_attempt: Option<AuthVersion>,
) -> Result<FallbackDecision, SrpError> {
    if server_version != 0 {
        return Ok(FallbackDecision {
            version: AuthVersion::try_from(server_version)?,
            done: true,
        });
    }
    match last_attempt {
        None => Ok(FallbackDecision {
            version: AUTH_FALLBACK_VERSION,
            done: false,
        }),
        // V1 only differs from V2 when cleaning changes the username.
        Some(AuthVersion::V2) if clean_username(username) != username.to_lowercase() => {
            Ok(FallbackDecision {
                version: AuthVersion::V1,
                done: false,
            })
        }
        Some(AuthVersion::V1) | Some(AuthVersion::V2) => Ok(FallbackDecision {
            version: AuthVersion::V0,
            done: true,
        }),
        Some(_) => Err(SrpError::FallbackExhausted),
    }
}
