//! CPRF from one-way functions.
//!
//! Per-row keys `k_i = ⟨z_i, x⟩ mod p` go through a public random polynomial
//! (a k-wise independent hash), the results are summed, and SHA-256 over
//! `x ‖ sum` is the output.
//!
//! The modulus is `2^modbits − 1` and is not checked for primality; the
//! polynomial only needs to be a k-wise independent family.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::CprfError;
use crate::field::{Field, FieldElement};
use crate::util::check_length;

/// Parameters for [`keygen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwfParams {
    /// Security parameter `sec`
    pub security: usize,
    /// Dimension of the input vectors
    pub length: usize,
    /// Bound on each input coordinate; `t = length · bound`
    pub bound: usize,
    /// Number of parallel keys `n`
    pub rows: usize,
}

impl OwfParams {
    pub fn new(security: usize, length: usize, bound: usize) -> Self {
        Self {
            security,
            length,
            bound,
            rows: 1,
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn max_inner_product(&self) -> usize {
        self.length * self.bound
    }

    /// Number of polynomial coefficients, `sec·(3t+5)·(t+1)`.
    pub fn degree(&self) -> usize {
        let t = self.max_inner_product();
        self.security * (3 * t + 5) * (t + 1)
    }

    /// Modulus bit length, `sec·(2t+6)`.
    pub fn modulus_bits(&self) -> usize {
        let t = self.max_inner_product();
        self.security * (2 * t + 6)
    }

    /// Size of the public polynomial in bytes, `m · modbits / 8`.
    pub fn public_parameter_bytes(&self) -> usize {
        self.degree() * (self.modulus_bits() / 8)
    }

    fn validate(&self) -> Result<(), CprfError> {
        if self.security == 0 {
            return Err(CprfError::InvalidParameters("security parameter must be positive"));
        }
        if self.length == 0 {
            return Err(CprfError::InvalidParameters("length must be positive"));
        }
        if self.bound == 0 {
            return Err(CprfError::InvalidParameters("bound must be positive"));
        }
        if self.rows == 0 {
            return Err(CprfError::InvalidParameters("at least one row is required"));
        }
        Ok(())
    }
}

/// The field and the random polynomial `poly[0..m]`.
#[derive(Clone, Debug)]
pub struct PublicParameters {
    field: Field,
    poly: Vec<FieldElement>,
}

impl PublicParameters {
    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn poly(&self) -> &[FieldElement] {
        &self.poly
    }
}

#[derive(Clone, Debug)]
pub struct MasterKey {
    field: Field,
    length: usize,
    z0: Vec<Vec<FieldElement>>,
}

#[derive(Clone, Debug)]
pub struct ConstrainedKey {
    field: Field,
    length: usize,
    z1: Vec<Vec<FieldElement>>,
}

pub fn keygen<R: RngCore + CryptoRng + ?Sized>(
    params: &OwfParams,
    rng: &mut R,
) -> Result<(PublicParameters, MasterKey), CprfError> {
    params.validate()?;

    let p = (BigUint::from(1u32) << params.modulus_bits()) - 1u32;
    let field = Field::new(p)?;

    let poly = (0..params.degree())
        .map(|_| field.random_element(rng))
        .collect::<Result<Vec<_>, _>>()?;

    let z0 = (0..params.rows)
        .map(|_| {
            (0..params.length)
                .map(|_| field.random_element(rng))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let msk = MasterKey {
        field: field.clone(),
        length: params.length,
        z0,
    };
    Ok((PublicParameters { field, poly }, msk))
}

impl MasterKey {
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn rows(&self) -> usize {
        self.z0.len()
    }

    pub fn constrain<R: RngCore + CryptoRng + ?Sized>(
        &self,
        z: &[BigUint],
        rng: &mut R,
    ) -> Result<ConstrainedKey, CprfError> {
        check_length(self.length, z.len())?;
        let field = &self.field;
        let z: Vec<FieldElement> = z.iter().map(|v| field.element(v.clone())).collect();

        let z1 = self
            .z0
            .iter()
            .map(|row| -> Result<Vec<FieldElement>, CprfError> {
                let delta = field.random_element(rng)?;
                Ok(row
                    .iter()
                    .zip(&z)
                    .map(|(a, zj)| field.sub(a, &field.mul(&delta, zj)))
                    .collect())
            })
            .collect::<Result<Vec<Vec<_>>, CprfError>>()?;

        Ok(ConstrainedKey {
            field: self.field.clone(),
            length: self.length,
            z1,
        })
    }

    pub fn eval(&self, pp: &PublicParameters, x: &[BigUint]) -> [u8; 32] {
        common_eval(pp, &self.field, self.length, &self.z0, x)
    }
}

impl ConstrainedKey {
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn rows(&self) -> usize {
        self.z1.len()
    }

    pub fn eval(&self, pp: &PublicParameters, x: &[BigUint]) -> [u8; 32] {
        common_eval(pp, &self.field, self.length, &self.z1, x)
    }
}

fn common_eval(
    pp: &PublicParameters,
    field: &Field,
    length: usize,
    rows: &[Vec<FieldElement>],
    x: &[BigUint],
) -> [u8; 32] {
    assert_eq!(&pp.field, field, "public parameters use a different modulus");
    assert_eq!(x.len(), length, "input x must have length {}", length);

    let x: Vec<FieldElement> = x.iter().map(|v| field.element(v.clone())).collect();

    let mut hash_sum = field.stream_start();
    for row in rows {
        let key = field.inner_product(row, &x);
        hash_sum.accumulate(&field.horner(&pp.poly, &key));
    }
    let hash_sum = hash_sum.finish();

    let mut hasher = Sha256::new();
    for xj in &x {
        hasher.update(field.to_bytes(xj));
    }
    hasher.update(field.to_bytes(&hash_sum));
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use ark_std::rand::SeedableRng;
    use rand::Rng;

    fn small_params() -> OwfParams {
        OwfParams::new(2, 3, 2)
    }

    fn random_vector(length: usize, bound: u64, rng: &mut StdRng) -> Vec<BigUint> {
        (0..length).map(|_| BigUint::from(rng.gen_range(0..bound))).collect()
    }

    #[test]
    fn test_parameter_formulas() {
        let params = OwfParams::new(40, 5, 2);
        // t = 10
        assert_eq!(params.degree(), 40 * 35 * 11);
        assert_eq!(params.modulus_bits(), 40 * 26);
        assert_eq!(params.public_parameter_bytes(), 40 * 35 * 11 * 130);
    }

    #[test]
    fn test_keygen_shapes() {
        let mut rng = StdRng::seed_from_u64(40);
        let params = small_params().with_rows(3);
        let (pp, msk) = keygen(&params, &mut rng).unwrap();
        assert_eq!(pp.poly().len(), params.degree());
        assert_eq!(pp.field().modulus().bits() as usize, params.modulus_bits());
        assert_eq!(msk.rows(), 3);
        assert_eq!(msk.length(), 3);
    }

    #[test]
    fn test_keygen_rejects_zero_parameters() {
        let mut rng = StdRng::seed_from_u64(41);
        for params in [
            OwfParams::new(0, 3, 2),
            OwfParams::new(2, 0, 2),
            OwfParams::new(2, 3, 0),
            OwfParams::new(2, 3, 2).with_rows(0),
        ] {
            assert!(matches!(
                keygen(&params, &mut rng),
                Err(CprfError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_authorized_single_row() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = small_params();
        let (pp, msk) = keygen(&params, &mut rng).unwrap();

        let z = vec![BigUint::from(1u32), BigUint::from(0u32), BigUint::from(1u32)];
        let x = vec![BigUint::from(0u32), BigUint::from(1u32), BigUint::from(0u32)];
        let csk = msk.constrain(&z, &mut rng).unwrap();

        assert_eq!(msk.eval(&pp, &x), csk.eval(&pp, &x));
    }

    #[test]
    fn test_authorized_many_rows() {
        let mut rng = StdRng::seed_from_u64(43);
        let params = small_params().with_rows(4);
        let (pp, msk) = keygen(&params, &mut rng).unwrap();

        let z = vec![BigUint::from(1u32), BigUint::from(1u32), BigUint::from(0u32)];
        let x = vec![BigUint::from(0u32), BigUint::from(0u32), BigUint::from(1u32)];
        let csk = msk.constrain(&z, &mut rng).unwrap();

        assert_eq!(csk.rows(), 4);
        assert_eq!(msk.eval(&pp, &x), csk.eval(&pp, &x));
    }

    #[test]
    fn test_unauthorized_differs() {
        let mut rng = StdRng::seed_from_u64(44);
        let params = small_params();
        let (pp, msk) = keygen(&params, &mut rng).unwrap();

        for _ in 0..10 {
            let z = random_vector(3, 2, &mut rng);
            let x = random_vector(3, 2, &mut rng);
            let ip: u64 = z.iter().zip(&x).map(|(a, b)| u64::try_from(a * b).unwrap()).sum();
            let csk = msk.constrain(&z, &mut rng).unwrap();
            if ip == 0 {
                assert_eq!(msk.eval(&pp, &x), csk.eval(&pp, &x));
            } else {
                assert_ne!(msk.eval(&pp, &x), csk.eval(&pp, &x));
            }
        }
    }

    #[test]
    fn test_eval_deterministic_and_poly_untouched() {
        let mut rng = StdRng::seed_from_u64(45);
        let (pp, msk) = keygen(&small_params(), &mut rng).unwrap();
        let poly_before = pp.poly().to_vec();
        let x = random_vector(3, 2, &mut rng);

        assert_eq!(msk.eval(&pp, &x), msk.eval(&pp, &x));
        assert_eq!(pp.poly(), poly_before.as_slice());
    }

    #[test]
    fn test_sum_matches_per_row_reduction() {
        let mut rng = StdRng::seed_from_u64(46);
        let (pp, msk) = keygen(&small_params().with_rows(5), &mut rng).unwrap();
        let x: Vec<FieldElement> = random_vector(3, 2, &mut rng)
            .into_iter()
            .map(|v| msk.field.element(v))
            .collect();

        let f = &msk.field;
        let mut eager = f.zero();
        let mut stream = f.stream_start();
        for row in &msk.z0 {
            let h = f.horner(pp.poly(), &f.inner_product(row, &x));
            f.add_assign(&mut eager, &h);
            stream.accumulate(&h);
        }
        assert_eq!(stream.finish(), eager);
    }

    #[test]
    fn test_constrain_rejects_wrong_length() {
        let mut rng = StdRng::seed_from_u64(47);
        let (_pp, msk) = keygen(&small_params(), &mut rng).unwrap();
        assert!(matches!(
            msk.constrain(&[BigUint::from(1u32)], &mut rng),
            Err(CprfError::LengthMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    #[should_panic(expected = "different modulus")]
    fn test_eval_with_foreign_parameters_panics() {
        let mut rng = StdRng::seed_from_u64(48);
        let (_pp, msk) = keygen(&small_params(), &mut rng).unwrap();
        let (other_pp, _) = keygen(&OwfParams::new(3, 3, 2), &mut rng).unwrap();
        let _ = msk.eval(&other_pp, &random_vector(3, 2, &mut rng));
    }
}
