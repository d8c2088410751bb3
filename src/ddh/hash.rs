//! Hashing `(x, key fingerprints)` down to the Naor-Reingold selector bits.

use ark_ec::CurveGroup;
use ark_ff::{PrimeField, Zero};
use ark_serialize::CanonicalSerialize;
use sha2::{Digest, Sha256};

use super::PublicParameters;
use crate::util::{bytes_to_bits, scalar_to_bytes};

/// Block size of the Damgård hash, in bytes.
pub const BLOCK_LEN: usize = 256 / 8;

/// Maps an input vector and its key fingerprints to a bit string of at least
/// `n` bits. Must be deterministic.
pub trait HashToBits<C: CurveGroup> {
    fn hash_to_bits(
        &self,
        pp: &PublicParameters<C>,
        x: &[C::ScalarField],
        key_fps: &[C::Affine],
    ) -> Vec<bool>;
}

/// Damgård-style hash `Σ_t h_t · block_t` over the public basis, followed by
/// SHA-256 as an extractor.
#[derive(Clone, Copy, Debug, Default)]
pub struct DamgardHash;

/// SHA-256 directly over the encoded input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hash;

impl<C: CurveGroup> HashToBits<C> for DamgardHash {
    fn hash_to_bits(
        &self,
        pp: &PublicParameters<C>,
        x: &[C::ScalarField],
        key_fps: &[C::Affine],
    ) -> Vec<bool> {
        let mut input = encode_input(x, key_fps);
        let rem = input.len() % BLOCK_LEN;
        if rem != 0 {
            input.resize(input.len() + BLOCK_LEN - rem, 0);
        }

        let num_blocks = input.len() / BLOCK_LEN;
        assert!(
            num_blocks <= pp.hash_elements().len(),
            "hash input has {} blocks, basis only covers {}",
            num_blocks,
            pp.hash_elements().len()
        );

        let mut acc = C::zero();
        for (h, block) in pp.hash_elements().iter().zip(input.chunks_exact(BLOCK_LEN)) {
            acc += h.mul_bigint(block_exponent(block));
        }

        let mut encoded = Vec::new();
        write_compressed(&acc.into_affine(), &mut encoded);

        // group encodings are not uniform bit strings
        bytes_to_bits(&Sha256::digest(&encoded))
    }
}

impl<C: CurveGroup> HashToBits<C> for Sha256Hash {
    fn hash_to_bits(
        &self,
        _pp: &PublicParameters<C>,
        x: &[C::ScalarField],
        key_fps: &[C::Affine],
    ) -> Vec<bool> {
        bytes_to_bits(&Sha256::digest(encode_input(x, key_fps)))
    }
}

/// Fixed-width big-endian coordinates of `x`, then every compressed fingerprint.
pub fn encode_input<F: PrimeField, A: CanonicalSerialize>(x: &[F], key_fps: &[A]) -> Vec<u8> {
    let mut out = Vec::new();
    for xj in x {
        out.extend_from_slice(&scalar_to_bytes(xj));
    }
    for fp in key_fps {
        write_compressed(fp, &mut out);
    }
    out
}

fn write_compressed<A: CanonicalSerialize>(a: &A, out: &mut Vec<u8>) {
    a.serialize_compressed(out)
        .expect("serializing a curve point into a Vec cannot fail");
}

/// Reads a 32-byte big-endian block as little-endian u64 limbs.
fn block_exponent(block: &[u8]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(block.rchunks(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *limb = u64::from_be_bytes(buf);
    }
    limbs
}
