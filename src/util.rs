use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use crate::error::CprfError;

pub fn ensure_same_length<T, U>(a: &[T], b: &[U]) {
    assert_eq!(
        a.len(),
        b.len(),
        "mismatched vector lengths: {} vs {}",
        a.len(),
        b.len()
    );
}

pub fn check_length(expected: usize, actual: usize) -> Result<(), CprfError> {
    if expected != actual {
        return Err(CprfError::LengthMismatch { expected, actual });
    }
    Ok(())
}

pub fn i64_to_field<F: PrimeField>(x: i64) -> F {
    if x >= 0 {
        F::from(x as u64)
    } else {
        let mut v = F::from(x.unsigned_abs());
        v = -v;
        v
    }
}

pub fn field_inner_product<F: PrimeField>(x: &[F], y: &[F]) -> F {
    ensure_same_length(x, y);
    x.iter()
        .zip(y.iter())
        .fold(F::ZERO, |acc, (a, b)| acc + (*a) * (*b))
}

/// Uniform sample from `[0, bound)` by rejection on the bit length of `bound`.
///
/// Every byte comes from `try_fill_bytes`, so a failing source surfaces as
/// `CprfError::RandomnessFailure` instead of being papered over.
pub fn random_below<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint, CprfError> {
    let bits = bound.bits();
    if bits == 0 {
        return Err(CprfError::InvalidParameters("sampling bound must be positive"));
    }

    let len = bits.div_ceil(8) as usize;
    let excess = (len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; len];

    loop {
        rng.try_fill_bytes(&mut buf)?;
        buf[0] &= 0xffu8 >> excess;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Uniform scalar of a prime field, drawn through [`random_below`].
pub fn random_scalar<F: PrimeField, R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
) -> Result<F, CprfError> {
    let modulus: BigUint = F::MODULUS.into();
    Ok(F::from(random_below(rng, &modulus)?))
}

/// Fixed-width big-endian encoding of a scalar.
pub fn scalar_to_bytes<F: PrimeField>(x: &F) -> Vec<u8> {
    x.into_bigint().to_bytes_be()
}

/// Big-endian encoding of `x` left-padded with zeros to `width` bytes.
pub fn biguint_to_fixed_bytes(x: &BigUint, width: usize) -> Vec<u8> {
    let raw = x.to_bytes_be();
    let raw = if raw == [0u8] { Vec::new() } else { raw };
    assert!(
        raw.len() <= width,
        "value needs {} bytes, only {} available",
        raw.len(),
        width
    );
    let mut out = vec![0u8; width - raw.len()];
    out.extend_from_slice(&raw);
    out
}

/// Expands bytes into bits; bit 0 is the most significant bit of byte 0.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
        .collect()
}
