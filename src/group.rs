//! The 2048-bit SRP group and its little-endian wire conventions.
//!
//! Every group element travels as exactly [`SRP_LEN_BYTES`]
//! little-endian bytes, zero-padded at the high end. All conversions in
//! the crate go through [`to_wire`] and [`from_wire`] so that no other
//! module has to care about byte order.

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, Integer, NonZero, RandomMod, U2048};
use rand::{CryptoRng, RngCore};

use crate::errors::SrpError;
use crate::hashing::expand_hash;

pub(crate) type BigUint = U2048;

/// Byte length of an encoded SRP group element on the wire.
pub const SRP_LEN_BYTES: usize = 256;

/// Bit width every usable modulus must have.
pub(crate) const SRP_BITS: usize = SRP_LEN_BYTES * 8;

/// Byte length of a decoded SRP password salt.
pub const SALT_LEN_BYTES: usize = 10;

/// The generator is hardcoded to 2 for every served modulus.
pub(crate) const GENERATOR: BigUint = BigUint::from_u32(2);

/// Retry bound for the random-sampling loops. Each retry draws fresh
/// randomness; a rejected value is never reused.
pub(crate) const MAX_GENERATION_RETRIES: usize = 5;

/// Encode a group element to its wire form.
pub(crate) fn to_wire(value: &BigUint) -> [u8; SRP_LEN_BYTES] {
    value.to_le_bytes()
}

/// Decode a group element from its wire form.
pub(crate) fn from_wire(bytes: &[u8; SRP_LEN_BYTES]) -> BigUint {
    BigUint::from_le_slice(bytes)
}

/// Hash two padded group elements into a new one: `H(first || second)`.
pub(crate) fn hash_join(
    first: &[u8; SRP_LEN_BYTES],
    second: &[u8; SRP_LEN_BYTES],
) -> BigUint {
    let mut data = [0u8; 2 * SRP_LEN_BYTES];
    data[..SRP_LEN_BYTES].copy_from_slice(first);
    data[SRP_LEN_BYTES..].copy_from_slice(second);
    BigUint::from_le_slice(expand_hash(&data).as_slice())
}

/// A verified group modulus together with the derived values every
/// operation needs.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub(crate) n: NonZero<BigUint>,
    pub(crate) n_minus_one: NonZero<BigUint>,
}

impl Group {
    /// Build the group from raw little-endian modulus bytes, running
    /// the structural checks that do not need a modular exponentiation.
    pub(crate) fn from_le_modulus(modulus: &[u8; SRP_LEN_BYTES]) -> Result<Self, SrpError> {
        let raw = BigUint::from_le_slice(modulus);
        if raw.bits() != SRP_BITS {
            return Err(SrpError::ModulusSize);
        }
        let n: NonZero<BigUint> =
            Option::from(NonZero::new(raw)).ok_or(SrpError::InvalidModulus("modulus is zero"))?;
        if bool::from(n.is_even()) {
            return Err(SrpError::InvalidModulus("modulus is even"));
        }
        // 2 is a square mod N iff N is 1 or 7 mod 8. The generator must
        // cover the whole group rather than the prime-order subgroup,
        // and N must be odd with (N-1)/2 odd as well, which leaves
        // N = 3 mod 8 as the only acceptable residue.
        if !(n.bit_vartime(0) && n.bit_vartime(1) && !n.bit_vartime(2)) {
            return Err(SrpError::InvalidModulus("modulus is not 3 mod 8"));
        }
        let n_minus_one: NonZero<BigUint> =
            Option::from(NonZero::new(n.sub_mod(&BigUint::ONE, &n)))
                .ok_or(SrpError::InvalidModulus("modulus minus one is zero"))?;
        Ok(Self { n, n_minus_one })
    }

    /// Check that `g^(N-1) mod N == 1`, i.e. N-1 is the group order.
    pub(crate) fn check_order(&self) -> Result<(), SrpError> {
        if self.pow_g(&self.n_minus_one) != BigUint::ONE {
            return Err(SrpError::InvalidModulus("N minus one is not the group order"));
        }
        Ok(())
    }

    /// `g^exp mod N`.
    pub(crate) fn pow_g(&self, exp: &BigUint) -> BigUint {
        let params = DynResidueParams::new(&self.n);
        DynResidue::new(&GENERATOR, params).pow(exp).retrieve()
    }

    /// A group element outside `(1, N-1)` breaks the exchange and
    /// points at a malicious or corrupted peer.
    pub(crate) fn is_unsafe(&self, value: &BigUint) -> bool {
        *value <= BigUint::ONE || *value >= *self.n_minus_one
    }

    /// Multiplier `k = H(g || N) mod N`, rejected when degenerate.
    pub(crate) fn multiplier(&self) -> Result<BigUint, SrpError> {
        let k = hash_join(&GENERATOR.to_le_bytes(), &self.n.to_le_bytes()).rem(&self.n);
        if self.is_unsafe(&k) {
            return Err(SrpError::MultiplierOutOfBounds);
        }
        Ok(k)
    }
}

/// Sample an ephemeral secret in `(1, bound)` from a CSPRNG, bounded
/// by [`MAX_GENERATION_RETRIES`].
pub(crate) fn ephemeral_secret<R>(
    rng: &mut R,
    bound: &NonZero<BigUint>,
) -> Result<BigUint, SrpError>
where
    R: CryptoRng + RngCore,
{
    for _ in 0..MAX_GENERATION_RETRIES {
        let candidate = BigUint::random_mod(rng, bound);
        if candidate > BigUint::ONE {
            return Ok(candidate);
        }
    }
    Err(SrpError::NoSafeParameters)
}
