//! Group-based CPRF, secure under DDH.
//!
//! A key is an `n × length` matrix over the scalar field of a prime-order group.
//! Row `i` and the input `x` give the per-row key `k_i = ⟨z_i, x⟩`. The output is
//! a Naor-Reingold style product `g^(k_0 · k_1 · Π_{i≥2, b_i} k_i)`, where the
//! selector bits `b_i` come from a hash of `x` and the fingerprints `g^(k_i)`.
//!
//! Rows 0 and 1 are always in the product: they play the role of a fixed `11`
//! prefix on the selector string.

pub mod hash;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};
use rand::{CryptoRng, RngCore};

use crate::error::CprfError;
use crate::util::{check_length, field_inner_product, random_scalar};
pub use hash::{DamgardHash, HashToBits, Sha256Hash, BLOCK_LEN};

/// NIST P-256, the default group.
pub type P256 = ark_secp256r1::Projective;

/// The selector string is read from one SHA-256 digest.
pub const MAX_ROWS: usize = 256;

/// Basis for the Damgård hash: `2·(length + n)` random group elements.
#[derive(Clone, Debug)]
pub struct PublicParameters<C: CurveGroup> {
    n: usize,
    length: usize,
    hash_elements: Vec<C>,
}

impl<C: CurveGroup> PublicParameters<C> {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn hash_elements(&self) -> &[C] {
        &self.hash_elements
    }
}

/// Master key, `z0`.
#[derive(Clone, Debug)]
pub struct MasterKey<C: CurveGroup> {
    n: usize,
    length: usize,
    z0: Vec<Vec<C::ScalarField>>,
}

/// Constrained key, `z1 = z0 − Δ·z` with one `Δ_i` per row.
#[derive(Clone, Debug)]
pub struct ConstrainedKey<C: CurveGroup> {
    n: usize,
    length: usize,
    z1: Vec<Vec<C::ScalarField>>,
}

/// Samples public parameters and a master key.
///
/// # Arguments
/// * `n` - Number of Naor-Reingold sub-keys, `2..=256`
/// * `length` - Dimension of the input vectors
/// * `rng` - Cryptographically secure random source
pub fn keygen<C: CurveGroup, R: RngCore + CryptoRng + ?Sized>(
    n: usize,
    length: usize,
    rng: &mut R,
) -> Result<(PublicParameters<C>, MasterKey<C>), CprfError> {
    if !(2..=MAX_ROWS).contains(&n) {
        return Err(CprfError::InvalidParameters("n must be between 2 and 256"));
    }
    if length == 0 {
        return Err(CprfError::InvalidParameters("length must be positive"));
    }

    let bound = 2 * (length + n);
    if required_blocks::<C>(n, length) > bound {
        return Err(CprfError::InvalidParameters(
            "group encodings too large for the hash basis",
        ));
    }

    let z0 = (0..n)
        .map(|_| {
            (0..length)
                .map(|_| random_scalar::<C::ScalarField, R>(rng))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    // g^r for uniform r is a uniform group element
    let hash_elements = (0..bound)
        .map(|_| -> Result<C, CprfError> {
            Ok(C::generator() * random_scalar::<C::ScalarField, R>(rng)?)
        })
        .collect::<Result<Vec<C>, CprfError>>()?;

    let pp = PublicParameters {
        n,
        length,
        hash_elements,
    };
    let msk = MasterKey { n, length, z0 };

    Ok((pp, msk))
}

/// Number of 256-bit blocks the hash input occupies for these dimensions.
pub(crate) fn required_blocks<C: CurveGroup>(n: usize, length: usize) -> usize {
    let scalar_len = <<C::ScalarField as PrimeField>::BigInt as BigInteger>::NUM_LIMBS * 8;
    let point_len = ark_serialize::CanonicalSerialize::compressed_size(&C::Affine::generator());
    (length * scalar_len + n * point_len).div_ceil(BLOCK_LEN)
}

impl<C: CurveGroup> MasterKey<C> {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Derives a key that agrees with `self` exactly where `⟨z, x⟩ = 0`.
    pub fn constrain<R: RngCore + CryptoRng + ?Sized>(
        &self,
        z: &[C::ScalarField],
        rng: &mut R,
    ) -> Result<ConstrainedKey<C>, CprfError> {
        check_length(self.length, z.len())?;

        let z1 = self
            .z0
            .iter()
            .map(|row| -> Result<Vec<C::ScalarField>, CprfError> {
                let delta = random_scalar::<C::ScalarField, R>(rng)?;
                Ok(row.iter().zip(z).map(|(a, zj)| *a - delta * zj).collect())
            })
            .collect::<Result<Vec<Vec<_>>, CprfError>>()?;

        Ok(ConstrainedKey {
            n: self.n,
            length: self.length,
            z1,
        })
    }

    pub fn eval(&self, pp: &PublicParameters<C>, x: &[C::ScalarField]) -> C {
        self.eval_with(&DamgardHash, pp, x)
    }

    pub fn eval_with<H: HashToBits<C>>(
        &self,
        hasher: &H,
        pp: &PublicParameters<C>,
        x: &[C::ScalarField],
    ) -> C {
        common_eval(hasher, pp, self.n, self.length, &self.z0, x)
    }
}

impl<C: CurveGroup> ConstrainedKey<C> {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn eval(&self, pp: &PublicParameters<C>, x: &[C::ScalarField]) -> C {
        self.eval_with(&DamgardHash, pp, x)
    }

    pub fn eval_with<H: HashToBits<C>>(
        &self,
        hasher: &H,
        pp: &PublicParameters<C>,
        x: &[C::ScalarField],
    ) -> C {
        common_eval(hasher, pp, self.n, self.length, &self.z1, x)
    }
}

fn common_eval<C: CurveGroup, H: HashToBits<C>>(
    hasher: &H,
    pp: &PublicParameters<C>,
    n: usize,
    length: usize,
    rows: &[Vec<C::ScalarField>],
    x: &[C::ScalarField],
) -> C {
    assert_eq!(pp.n, n, "public parameters built for n={}, key has n={}", pp.n, n);
    assert_eq!(
        pp.length, length,
        "public parameters built for length={}, key has length={}",
        pp.length, length
    );
    assert_eq!(x.len(), length, "input x must have length {}", length);

    let keys: Vec<C::ScalarField> = rows.iter().map(|row| field_inner_product(row, x)).collect();

    // key fingerprints g^(k_i)
    let key_fps: Vec<C> = keys.iter().map(|k| C::generator() * k).collect();
    let key_fps = C::normalize_batch(&key_fps);

    let bits = hasher.hash_to_bits(pp, x, &key_fps);
    assert!(bits.len() >= n, "hash produced {} bits, need {}", bits.len(), n);

    let mut product = keys[0] * keys[1];
    for i in 2..n {
        if bits[i] {
            product *= keys[i];
        }
    }

    C::generator() * product
}
