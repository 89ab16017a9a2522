//! Server side of the SRP exchange.
//!
//! Mostly useful for tests and local mock servers; the production
//! counterpart lives server side. The interaction can be serialized
//! between the challenge and the proof verification so a stateless
//! frontend can park it elsewhere in between.

use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::subtle::ConstantTimeEq;
use crypto_bigint::NonZero;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::errors::SrpError;
use crate::group::{
    ephemeral_secret, from_wire, hash_join, to_wire, BigUint, Group, GENERATOR, SRP_LEN_BYTES,
};
use crate::hashing::expand_hash;
use crate::modulus::ModulusSignatureVerifier;
use crate::types::SrpProof;

/// One server-side login attempt for a stored verifier.
#[derive(Debug)]
pub struct ServerInteraction {
    group: Group,
    verifier: BigUint,
    multiplier: BigUint,
    server_secret: BigUint,
    challenge: Option<BigUint>,
}

impl ServerInteraction {
    /// Start an interaction from a signed modulus message and the
    /// account's base64 verifier.
    pub fn new(
        modulus_verifier: &impl ModulusSignatureVerifier,
        modulus: &str,
        verifier: &str,
    ) -> Result<Self, SrpError> {
        let modulus_b64 =
            modulus_verifier.verify_and_extract_modulus(modulus, crate::modulus::SRP_MODULUS_KEY)?;
        let modulus_bytes: [u8; SRP_LEN_BYTES] = BASE64_STANDARD
            .decode(modulus_b64.trim())?
            .as_slice()
            .try_into()
            .map_err(|_| SrpError::ModulusSize)?;
        let verifier_bytes: [u8; SRP_LEN_BYTES] = BASE64_STANDARD
            .decode(verifier)?
            .as_slice()
            .try_into()
            .map_err(|_| SrpError::InvalidVerifier)?;
        Self::from_parts(&modulus_bytes, &verifier_bytes, &mut OsRng)
    }

    /// Start an interaction from decoded wire values, drawing the
    /// server ephemeral secret from `rng`.
    pub fn from_parts<R>(
        modulus: &[u8; SRP_LEN_BYTES],
        verifier: &[u8; SRP_LEN_BYTES],
        rng: &mut R,
    ) -> Result<Self, SrpError>
    where
        R: CryptoRng + RngCore,
    {
        let group = Group::from_le_modulus(modulus)?;
        let multiplier = group.multiplier()?;
        let server_secret = ephemeral_secret(rng, &group.n_minus_one)?;
        Ok(Self {
            group,
            verifier: from_wire(verifier),
            multiplier,
            server_secret,
            challenge: None,
        })
    }

    /// Rebuild an interaction from a stored server ephemeral secret,
    /// and the challenge if one was already issued.
    pub fn restore(
        modulus: &[u8; SRP_LEN_BYTES],
        verifier: &[u8; SRP_LEN_BYTES],
        server_secret: &[u8; SRP_LEN_BYTES],
        challenge: Option<&[u8; SRP_LEN_BYTES]>,
    ) -> Result<Self, SrpError> {
        let group = Group::from_le_modulus(modulus)?;
        let multiplier = group.multiplier()?;
        Ok(Self {
            group,
            verifier: from_wire(verifier),
            multiplier,
            server_secret: from_wire(server_secret),
            challenge: challenge.map(from_wire),
        })
    }

    /// Issue the challenge `B = k*v + g^b`.
    pub fn generate_challenge(&mut self) -> [u8; SRP_LEN_BYTES] {
        let params = DynResidueParams::new(&self.group.n);
        let g_res = DynResidue::new(&GENERATOR, params);
        let k_res = DynResidue::new(&self.multiplier, params);
        let v_res = DynResidue::new(&self.verifier, params);

        let b_pub = g_res
            .pow(&self.server_secret)
            .add(&k_res.mul(&v_res))
            .retrieve();
        let encoded = to_wire(&b_pub);
        self.challenge = Some(b_pub);
        encoded
    }

    /// Check the client's proof and, only when it matches, produce the
    /// server proof for the mutual step.
    pub fn verify_proof(&mut self, proof: &SrpProof) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
        self.verify_raw_proof(&proof.client_ephemeral, &proof.client_proof)
    }

    /// [`ServerInteraction::verify_proof`] on raw wire bytes.
    pub fn verify_raw_proof(
        &mut self,
        client_ephemeral: &[u8; SRP_LEN_BYTES],
        client_proof: &[u8; SRP_LEN_BYTES],
    ) -> Result<[u8; SRP_LEN_BYTES], SrpError> {
        let challenge = self
            .challenge
            .as_ref()
            .ok_or(SrpError::ChallengeNotGenerated)?;

        // A must be nonzero modulo N.
        let a_pub: NonZero<BigUint> =
            Option::from(NonZero::new(from_wire(client_ephemeral).rem(&self.group.n)))
                .ok_or(SrpError::ClientEphemeralOutOfBounds)?;

        let u: NonZero<BigUint> = Option::from(NonZero::new(
            hash_join(&to_wire(&a_pub), &to_wire(challenge)).rem(&self.group.n_minus_one),
        ))
        .ok_or(SrpError::ScramblingParameterOutOfBounds)?;

        let params = DynResidueParams::new(&self.group.n);
        let v_res = DynResidue::new(&self.verifier, params);
        let a_res = DynResidue::new(&a_pub, params);

        // K = (A*v^u)^b
        let shared_session = v_res.pow(&u).mul(&a_res).pow(&self.server_secret).retrieve();

        let expected_client_proof = server_side_client_proof(&a_pub, challenge, &shared_session);
        if expected_client_proof.ct_ne(client_proof).into() {
            return Err(SrpError::InvalidClientProof);
        }

        // server_proof = H(A || client_proof || K)
        let mut data = Zeroizing::new([0u8; 3 * SRP_LEN_BYTES]);
        data[..SRP_LEN_BYTES].copy_from_slice(&to_wire(&a_pub));
        data[SRP_LEN_BYTES..2 * SRP_LEN_BYTES].copy_from_slice(client_proof);
        data[2 * SRP_LEN_BYTES..].copy_from_slice(&to_wire(&shared_session));
        Ok(*expand_hash(data.as_slice()))
    }

    /// The server ephemeral secret `b`, for [`ServerInteraction::restore`].
    #[must_use]
    pub fn server_secret(&self) -> Zeroizing<[u8; SRP_LEN_BYTES]> {
        Zeroizing::new(to_wire(&self.server_secret))
    }

    /// The issued challenge `B`, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<[u8; SRP_LEN_BYTES]> {
        self.challenge.as_ref().map(to_wire)
    }
}

fn server_side_client_proof(
    a_pub: &BigUint,
    b_pub: &BigUint,
    shared_session: &BigUint,
) -> [u8; SRP_LEN_BYTES] {
    // client_proof = H(A || B || K)
    let mut data = Zeroizing::new([0u8; 3 * SRP_LEN_BYTES]);
    data[..SRP_LEN_BYTES].copy_from_slice(&to_wire(a_pub));
    data[SRP_LEN_BYTES..2 * SRP_LEN_BYTES].copy_from_slice(&to_wire(b_pub));
    data[2 * SRP_LEN_BYTES..].copy_from_slice(&to_wire(shared_session));
    *expand_hash(data.as_slice())
}
