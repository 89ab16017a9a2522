//! Client side of the SRP exchange.
//!
//! The flow with the server, with `H` the expanded hash and `H_pw` the
//! versioned password hashing from [`crate::hashing`]:
//!
//! ```ignore
//! |       Client            |   Data transfer   |      Server                     |
//! |-------------------------|-------------------|---------------------------------|
//! |`A = g^a`                | -- `A`, `I` -->   | (lookup `s`, `v` for given `I`) |
//! |`k = H(g || N)`          |                   | `k = H(g || N)`                 |
//! |`x = H_pw(p, s)`         | <-- `B`, `s` --   | `B = k*v + g^b`                 |
//! |`u = H(A || B)`          |                   | `u = H(A || B)`                 |
//! |`K = (B - k*g^x)^(a+u*x)`|                   | `K = (A*v^u)^b`                 |
//! |`cp = H(A || B || K)`    |-- client proof -->|  verify client proof            |
//! | verify server proof     |<-- server proof --| `sp = H(A || cp || K)`          |
//! ```
//!
//! The client aborts when `B` falls outside `(1, N-1)` modulo `N` or
//! when `u` vanishes. The client must present its proof first; the
//! server only answers with its own proof after the client's verified.

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::errors::SrpError;
use crate::group::{
    ephemeral_secret, from_wire, hash_join, to_wire, BigUint, Group, GENERATOR,
    MAX_GENERATION_RETRIES, SALT_LEN_BYTES, SRP_LEN_BYTES,
};
use crate::hashing::{expand_hash, srp_password_hash};
use crate::modulus::{ModulusSignatureVerifier, SRP_MODULUS_KEY};
use crate::types::{AuthVersion, SrpProof, SrpVerifier, DEFAULT_AUTH_VERSION};

#[cfg(feature = "pgpinternal")]
use crate::modulus::RpgpVerifier;

/// One login attempt against a server challenge.
///
/// Holds the verified group, the hashed password `x` and the server
/// ephemeral `B`. Proof generation draws the client ephemeral per call,
/// so one value never signs two exchanges.
#[derive(Debug)]
pub struct SrpAuth {
    group: Group,
    hashed_password: BigUint,
    server_ephemeral: BigUint,

    // Pin the client ephemeral secret for fixed-vector tests.
    #[cfg(test)]
    pub(crate) forced_client_secret: Option<[u8; SRP_LEN_BYTES]>,
}

impl SrpAuth {
    /// Prepare a login attempt from the server's auth info response.
    ///
    /// `modulus` is the PGP cleartext signed message carrying the
    /// base64 modulus; its signature is checked with `modulus_verifier`
    /// against [`SRP_MODULUS_KEY`] before anything else. `salt` and
    /// `server_ephemeral` are base64. `username` is only consulted by
    /// hashing versions 0 through 2.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        modulus_verifier: &impl ModulusSignatureVerifier,
        password: &str,
        username: Option<&str>,
        version: u8,
        salt: Option<&str>,
        modulus: &str,
        server_ephemeral: &str,
    ) -> Result<Self, SrpError> {
        let version = AuthVersion::try_from(version)?;
        let modulus_b64 = modulus_verifier.verify_and_extract_modulus(modulus, SRP_MODULUS_KEY)?;
        let modulus_bytes = decode_modulus(&modulus_b64)?;
        let server_ephemeral_bytes: [u8; SRP_LEN_BYTES] = decode_exact(server_ephemeral)
            .ok_or(SrpError::ServerEphemeralOutOfBounds)?;
        let salt_bytes = salt.map(decode_salt).transpose()?;
        Self::from_parts(
            password,
            username,
            version,
            salt_bytes.as_ref(),
            &modulus_bytes,
            &server_ephemeral_bytes,
        )
    }

    /// [`SrpAuth::new`] with the built-in rPGP signature check.
    #[cfg(feature = "pgpinternal")]
    pub fn with_pgp(
        password: &str,
        username: Option<&str>,
        version: u8,
        salt: Option<&str>,
        modulus: &str,
        server_ephemeral: &str,
    ) -> Result<Self, SrpError> {
        Self::new(
            &RpgpVerifier::default(),
            password,
            username,
            version,
            salt,
            modulus,
            server_ephemeral,
        )
    }

    /// Prepare a login attempt from already decoded wire values.
    pub fn from_parts(
        password: &str,
        username: Option<&str>,
        version: AuthVersion,
        salt: Option<&[u8; SALT_LEN_BYTES]>,
        modulus: &[u8; SRP_LEN_BYTES],
        server_ephemeral: &[u8; SRP_LEN_BYTES],
    ) -> Result<Self, SrpError> {
        let group = Group::from_le_modulus(modulus)?;
        group.check_order()?;
        if group.is_unsafe(&GENERATOR) {
            return Err(SrpError::GeneratorOutOfBounds);
        }

        let server_ephemeral = from_wire(server_ephemeral);
        if group.is_unsafe(&server_ephemeral.rem(&group.n)) {
            return Err(SrpError::ServerEphemeralOutOfBounds);
        }

        let hashed_password = BigUint::from_le_slice(
            srp_password_hash(version, username, password, salt, modulus)?.as_bytes(),
        );

        Ok(Self {
            group,
            hashed_password,
            server_ephemeral,
            #[cfg(test)]
            forced_client_secret: None,
        })
    }

    /// Run the exchange with the operating system CSPRNG.
    pub fn generate_proofs(&self) -> Result<SrpProof, SrpError> {
        self.generate_proofs_with_rng(&mut OsRng)
    }

    /// Run the exchange, drawing the client ephemeral from `rng`.
    pub fn generate_proofs_with_rng<R>(&self, rng: &mut R) -> Result<SrpProof, SrpError>
    where
        R: CryptoRng + RngCore,
    {
        let group = &self.group;
        let b_pub = &self.server_ephemeral;

        let k = group.multiplier()?;

        let params = DynResidueParams::new(&group.n);
        let g_res = DynResidue::new(&GENERATOR, params);

        let mut rounds = 0;
        let (client_secret, a_pub, u) = loop {
            if rounds >= MAX_GENERATION_RETRIES {
                return Err(SrpError::NoSafeParameters);
            }
            let client_secret = self.client_secret(rng)?;
            let a_pub = g_res.pow(&client_secret).retrieve();

            // u = H(A || B); a zero scrambling parameter would cancel
            // the password out of the session key, so redraw.
            let u = hash_join(&to_wire(&a_pub), &to_wire(b_pub));
            if u.rem(&group.n_minus_one).is_zero().into() {
                rounds += 1;
                continue;
            }
            break (client_secret, a_pub, u);
        };

        let k_res = DynResidue::new(&k, params);

        // base = B - k*g^x
        let b_pub_res = DynResidue::new(b_pub, params);
        let base = b_pub_res.sub(&g_res.pow(&self.hashed_password).mul(&k_res));

        // exponent = (a + u*x) mod (N-1)
        let (ux, _) =
            BigUint::const_rem_wide(self.hashed_password.mul_wide(&u), &group.n_minus_one);
        let exponent = client_secret.add_mod(&ux, &group.n_minus_one);

        // K = (B - k*g^x)^(a + u*x)
        let shared_session = base.pow(&exponent).retrieve();

        let client_proof = compute_client_proof(&a_pub, b_pub, &shared_session);
        let expected_server_proof = compute_server_proof(&a_pub, &client_proof, &shared_session);

        Ok(SrpProof {
            client_ephemeral: to_wire(&a_pub),
            client_proof,
            expected_server_proof,
            shared_session: Zeroizing::new(to_wire(&shared_session)),
        })
    }

    fn client_secret<R>(&self, rng: &mut R) -> Result<BigUint, SrpError>
    where
        R: CryptoRng + RngCore,
    {
        #[cfg(test)]
        if let Some(forced) = &self.forced_client_secret {
            return Ok(BigUint::from_le_slice(forced));
        }
        ephemeral_secret(rng, &self.group.n_minus_one)
    }

    /// Build the registration verifier `g^x` for a new password.
    ///
    /// When `salt` is absent a fresh random one is drawn; when
    /// `version` is absent the verifier is built for
    /// [`DEFAULT_AUTH_VERSION`]. `username` is only needed for the
    /// legacy versions, which no new verifier should use.
    pub fn generate_verifier(
        modulus_verifier: &impl ModulusSignatureVerifier,
        password: &str,
        username: Option<&str>,
        salt: Option<&str>,
        modulus: &str,
        version: Option<AuthVersion>,
    ) -> Result<SrpVerifier, SrpError> {
        let version = version.unwrap_or(DEFAULT_AUTH_VERSION);
        let modulus_b64 = modulus_verifier.verify_and_extract_modulus(modulus, SRP_MODULUS_KEY)?;
        let modulus_bytes = decode_modulus(&modulus_b64)?;
        let salt_bytes = match salt {
            Some(salt) => decode_salt(salt)?,
            None => random_salt(&mut OsRng),
        };

        let group = Group::from_le_modulus(&modulus_bytes)?;
        group.check_order()?;

        let hashed_password = BigUint::from_le_slice(
            srp_password_hash(version, username, password, Some(&salt_bytes), &modulus_bytes)?
                .as_bytes(),
        );
        let verifier = group.pow_g(&hashed_password);

        Ok(SrpVerifier {
            version,
            salt: salt_bytes,
            verifier: to_wire(&verifier),
        })
    }

    /// [`SrpAuth::generate_verifier`] with the built-in rPGP signature
    /// check.
    #[cfg(feature = "pgpinternal")]
    pub fn generate_verifier_with_pgp(
        password: &str,
        salt: Option<&str>,
        modulus: &str,
    ) -> Result<SrpVerifier, SrpError> {
        Self::generate_verifier(
            &RpgpVerifier::default(),
            password,
            None,
            salt,
            modulus,
            None,
        )
    }
}

fn compute_client_proof(
    a_pub: &BigUint,
    b_pub: &BigUint,
    shared_session: &BigUint,
) -> [u8; SRP_LEN_BYTES] {
    // client_proof = H(A || B || K)
    let mut data = Zeroizing::new([0u8; 3 * SRP_LEN_BYTES]);
    data[..SRP_LEN_BYTES].copy_from_slice(&a_pub.to_le_bytes());
    data[SRP_LEN_BYTES..2 * SRP_LEN_BYTES].copy_from_slice(&b_pub.to_le_bytes());
    data[2 * SRP_LEN_BYTES..].copy_from_slice(&shared_session.to_le_bytes());
    *expand_hash(data.as_slice())
}

fn compute_server_proof(
    a_pub: &BigUint,
    client_proof: &[u8; SRP_LEN_BYTES],
    shared_session: &BigUint,
) -> [u8; SRP_LEN_BYTES] {
    // server_proof = H(A || client_proof || K)
    let mut data = Zeroizing::new([0u8; 3 * SRP_LEN_BYTES]);
    data[..SRP_LEN_BYTES].copy_from_slice(&a_pub.to_le_bytes());
    data[SRP_LEN_BYTES..2 * SRP_LEN_BYTES].copy_from_slice(client_proof);
    data[2 * SRP_LEN_BYTES..].copy_from_slice(&shared_session.to_le_bytes());
    *expand_hash(data.as_slice())
}

/// Decode a base64 value into exactly `LEN` bytes.
fn decode_exact<const LEN: usize>(encoded: &str) -> Option<[u8; LEN]> {
    let decoded = BASE64_STANDARD.decode(encoded).ok()?;
    decoded.as_slice().try_into().ok()
}

fn decode_modulus(encoded: &str) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
    decode_exact(encoded.trim()).ok_or(SrpError::ModulusSize)
}

fn decode_salt(encoded: &str) -> Result<[u8; SALT_LEN_BYTES], SrpError> {
    decode_exact(encoded).ok_or(SrpError::InvalidSalt("expected 10 decoded bytes"))
}

/// Draw a fresh random password salt.
pub(crate) fn random_salt<R>(rng: &mut R) -> [u8; SALT_LEN_BYTES]
where
    R: CryptoRng + RngCore,
{
    let mut salt = [0u8; SALT_LEN_BYTES];
    rng.fill_bytes(&mut salt);
    salt
}
