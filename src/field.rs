//! Arithmetic modulo an arbitrary-precision modulus `p`.
//!
//! Every [`FieldElement`] handed out is canonical, i.e. in `[0, p)`. Additions
//! that should be reduced only once go through a [`StreamingSum`], which keeps
//! its running total private until [`StreamingSum::finish`].
//!
//! Nothing here is constant-time.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use crate::error::CprfError;
use crate::util::{biguint_to_fixed_bytes, random_below};

const MILLER_RABIN_ROUNDS: usize = 32;

const SMALL_PRIMES: [u32; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Ring `Z/pZ`. Called a field because that is how it is used, but `p` is
/// only required to be at least 2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    p: BigUint,
}

/// A residue in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(BigUint);

impl FieldElement {
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

/// Running sum whose reduction is deferred to [`StreamingSum::finish`].
///
/// The total is a `BigUint`, so after `k` calls to `accumulate` it is at most
/// `k·(p−1)` and cannot overflow.
#[derive(Debug)]
pub struct StreamingSum<'f> {
    field: &'f Field,
    raw: BigUint,
}

impl StreamingSum<'_> {
    pub fn accumulate(&mut self, e: &FieldElement) {
        self.raw += &e.0;
    }

    /// Adds an unreduced value, e.g. a product of two residues.
    pub(crate) fn accumulate_raw(&mut self, v: BigUint) {
        self.raw += v;
    }

    pub fn finish(self) -> FieldElement {
        FieldElement(self.raw % &self.field.p)
    }
}

impl Field {
    pub fn new(p: BigUint) -> Result<Self, CprfError> {
        if p < BigUint::from(2u32) {
            return Err(CprfError::InvalidParameters("modulus must be at least 2"));
        }
        Ok(Self { p })
    }

    /// Field whose order is the largest probable prime with exactly `bits` bits,
    /// searched downwards from `2^bits − 1`.
    pub fn with_bit_length<R: RngCore + CryptoRng + ?Sized>(
        bits: u64,
        rng: &mut R,
    ) -> Result<Self, CprfError> {
        if bits < 2 {
            return Err(CprfError::InvalidParameters("bit length must be at least 2"));
        }

        let two = BigUint::from(2u32);
        let mut p = (BigUint::from(1u32) << bits) - 1u32;
        while !is_probable_prime(&p, MILLER_RABIN_ROUNDS, rng)? {
            p -= &two;
        }

        if p.bits() < bits {
            return Err(CprfError::InvalidParameters(
                "could not find a prime of suitable bit length",
            ));
        }
        Ok(Self { p })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Bytes needed to write any canonical element big-endian.
    pub fn byte_len(&self) -> usize {
        self.p.bits().div_ceil(8) as usize
    }

    /// Reduces `a` into the field.
    pub fn element(&self, a: BigUint) -> FieldElement {
        FieldElement(a % &self.p)
    }

    pub fn zero(&self) -> FieldElement {
        FieldElement(BigUint::from(0u32))
    }

    pub fn one(&self) -> FieldElement {
        FieldElement(BigUint::from(1u32))
    }

    pub fn random_element<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<FieldElement, CprfError> {
        Ok(FieldElement(random_below(rng, &self.p)?))
    }

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement((&a.0 + &b.0) % &self.p)
    }

    pub fn add_assign(&self, a: &mut FieldElement, b: &FieldElement) {
        a.0 += &b.0;
        if a.0 >= self.p {
            a.0 -= &self.p;
        }
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement((&a.0 + &self.p - &b.0) % &self.p)
    }

    pub fn sub_assign(&self, a: &mut FieldElement, b: &FieldElement) {
        if a.0 < b.0 {
            a.0 += &self.p;
        }
        a.0 -= &b.0;
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        FieldElement((&self.p - &a.0) % &self.p)
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement((&a.0 * &b.0) % &self.p)
    }

    pub fn mul_assign(&self, a: &mut FieldElement, b: &FieldElement) {
        a.0 = (&a.0 * &b.0) % &self.p;
    }

    pub fn pow(&self, a: &FieldElement, e: &BigUint) -> FieldElement {
        FieldElement(a.0.modpow(e, &self.p))
    }

    pub fn pow_assign(&self, a: &mut FieldElement, e: &BigUint) {
        a.0 = a.0.modpow(e, &self.p);
    }

    /// Multiplicative inverse, `None` when `gcd(a, p) != 1`.
    pub fn inverse(&self, a: &FieldElement) -> Option<FieldElement> {
        a.0.modinv(&self.p).map(FieldElement)
    }

    pub fn is_zero(&self, e: &FieldElement) -> bool {
        e.0 == BigUint::from(0u32)
    }

    pub fn is_one(&self, e: &FieldElement) -> bool {
        e.0 == BigUint::from(1u32)
    }

    pub fn stream_start(&self) -> StreamingSum<'_> {
        StreamingSum {
            field: self,
            raw: BigUint::from(0u32),
        }
    }

    /// `⟨a, b⟩ mod p`, reduced once at the end.
    pub fn inner_product(&self, a: &[FieldElement], b: &[FieldElement]) -> FieldElement {
        crate::util::ensure_same_length(a, b);
        let mut acc = self.stream_start();
        for (ai, bi) in a.iter().zip(b) {
            acc.accumulate_raw(&ai.0 * &bi.0);
        }
        acc.finish()
    }

    /// Evaluates `poly[0]·x^(m−1) + … + poly[m−1]` by Horner's rule.
    pub fn horner(&self, poly: &[FieldElement], x: &FieldElement) -> FieldElement {
        let Some((first, rest)) = poly.split_first() else {
            return self.zero();
        };
        let mut h = first.clone();
        for c in rest {
            self.mul_assign(&mut h, x);
            self.add_assign(&mut h, c);
        }
        h
    }

    pub fn to_bytes(&self, e: &FieldElement) -> Vec<u8> {
        biguint_to_fixed_bytes(&e.0, self.byte_len())
    }
}

/// Miller-Rabin with `rounds` random bases, after trial division by small primes.
pub fn is_probable_prime<R: RngCore + CryptoRng + ?Sized>(
    n: &BigUint,
    rounds: usize,
    rng: &mut R,
) -> Result<bool, CprfError> {
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);

    if n < &two {
        return Ok(false);
    }
    if n == &two {
        return Ok(true);
    }
    if !n.bit(0) {
        return Ok(false);
    }
    for &sp in SMALL_PRIMES.iter() {
        let sp = BigUint::from(sp);
        if n == &sp {
            return Ok(true);
        }
        if (n % &sp) == BigUint::from(0u32) {
            return Ok(false);
        }
    }

    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;
    // bases drawn from [2, n - 2]
    let base_range = n - BigUint::from(3u32);

    'witness: for _ in 0..rounds {
        let a = random_below(rng, &base_range)? + &two;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return Ok(false);
    }
    Ok(true)
}
