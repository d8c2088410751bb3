//! CPRF in the random oracle model: `F(z, x) = SHA-256(⟨z, x⟩ ‖ x)`.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::CprfError;
use crate::field::{Field, FieldElement};
use crate::util::check_length;

#[derive(Clone, Debug)]
pub struct MasterKey {
    field: Field,
    z0: Vec<FieldElement>,
}

#[derive(Clone, Debug)]
pub struct ConstrainedKey {
    field: Field,
    z1: Vec<FieldElement>,
}

/// Samples a master key over `Z_modulus` for inputs of dimension `length`.
pub fn keygen<R: RngCore + CryptoRng + ?Sized>(
    modulus: BigUint,
    length: usize,
    rng: &mut R,
) -> Result<MasterKey, CprfError> {
    if length == 0 {
        return Err(CprfError::InvalidParameters("length must be positive"));
    }
    let field = Field::new(modulus)?;
    let z0 = (0..length)
        .map(|_| field.random_element(rng))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MasterKey { field, z0 })
}

impl MasterKey {
    pub fn modulus(&self) -> &BigUint {
        self.field.modulus()
    }

    pub fn length(&self) -> usize {
        self.z0.len()
    }

    pub fn constrain<R: RngCore + CryptoRng + ?Sized>(
        &self,
        z: &[BigUint],
        rng: &mut R,
    ) -> Result<ConstrainedKey, CprfError> {
        check_length(self.z0.len(), z.len())?;
        let field = &self.field;
        let delta = field.random_element(rng)?;

        let z1 = self
            .z0
            .iter()
            .zip(z)
            .map(|(a, zj)| field.sub(a, &field.mul(&delta, &field.element(zj.clone()))))
            .collect();

        Ok(ConstrainedKey {
            field: self.field.clone(),
            z1,
        })
    }

    pub fn eval(&self, x: &[BigUint]) -> [u8; 32] {
        common_eval(&self.field, &self.z0, x)
    }
}

impl ConstrainedKey {
    pub fn modulus(&self) -> &BigUint {
        self.field.modulus()
    }

    pub fn length(&self) -> usize {
        self.z1.len()
    }

    pub fn eval(&self, x: &[BigUint]) -> [u8; 32] {
        common_eval(&self.field, &self.z1, x)
    }
}

fn common_eval(field: &Field, key: &[FieldElement], x: &[BigUint]) -> [u8; 32] {
    assert_eq!(x.len(), key.len(), "input x must have length {}", key.len());
    let x: Vec<FieldElement> = x.iter().map(|v| field.element(v.clone())).collect();
    let k = field.inner_product(key, &x);

    let mut hasher = Sha256::new();
    hasher.update(field.to_bytes(&k));
    for xj in &x {
        hasher.update(field.to_bytes(xj));
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::random_below;
    use rand::rngs::StdRng;
    use ark_std::rand::SeedableRng;
    use rand::Rng;

    fn modulus() -> BigUint {
        // 2^128 - 159
        BigUint::parse_bytes(b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFF61", 16).unwrap()
    }

    fn random_vector(length: usize, rng: &mut StdRng) -> Vec<BigUint> {
        let p = modulus();
        (0..length).map(|_| random_below(rng, &p).unwrap()).collect()
    }

    #[test]
    fn test_authorized() {
        let mut rng = StdRng::seed_from_u64(50);
        let length = 10;
        let msk = keygen(modulus(), length, &mut rng).unwrap();

        let mut z = random_vector(length, &mut rng);
        let mut x = vec![BigUint::from(0u32); length];
        for i in 0..length {
            if rng.gen::<bool>() {
                x[i] = random_below(&mut rng, &modulus()).unwrap();
                z[i] = BigUint::from(0u32);
            }
        }

        let csk = msk.constrain(&z, &mut rng).unwrap();
        assert_eq!(msk.eval(&x), csk.eval(&x));
    }

    #[test]
    fn test_authorized_modular_cancellation() {
        let mut rng = StdRng::seed_from_u64(51);
        let msk = keygen(modulus(), 2, &mut rng).unwrap();
        // z = (1, 1), x = (1, p - 1): inner product is p = 0
        let z = vec![BigUint::from(1u32), BigUint::from(1u32)];
        let x = vec![BigUint::from(1u32), modulus() - 1u32];
        let csk = msk.constrain(&z, &mut rng).unwrap();
        assert_eq!(msk.eval(&x), csk.eval(&x));
    }

    #[test]
    fn test_unauthorized() {
        let mut rng = StdRng::seed_from_u64(52);
        let length = 10;
        let msk = keygen(modulus(), length, &mut rng).unwrap();

        for _ in 0..20 {
            let z = random_vector(length, &mut rng);
            let x = random_vector(length, &mut rng);
            let csk = msk.constrain(&z, &mut rng).unwrap();
            assert_ne!(msk.eval(&x), csk.eval(&x));
        }
    }

    #[test]
    fn test_inputs_are_reduced() {
        let mut rng = StdRng::seed_from_u64(53);
        let msk = keygen(modulus(), 3, &mut rng).unwrap();
        let x = random_vector(3, &mut rng);
        let shifted: Vec<BigUint> = x.iter().map(|v| v + modulus()).collect();
        assert_eq!(msk.eval(&x), msk.eval(&shifted));
    }

    #[test]
    fn test_constrain_is_randomized() {
        let mut rng = StdRng::seed_from_u64(54);
        let msk = keygen(modulus(), 4, &mut rng).unwrap();
        let z = random_vector(4, &mut rng);
        let csk1 = msk.constrain(&z, &mut rng).unwrap();
        let csk2 = msk.constrain(&z, &mut rng).unwrap();
        assert_ne!(csk1.z1, csk2.z1);
        assert_eq!(csk1.modulus(), msk.modulus());
    }

    #[test]
    fn test_keygen_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(55);
        assert!(keygen(BigUint::from(1u32), 4, &mut rng).is_err());
        assert!(keygen(modulus(), 0, &mut rng).is_err());
        let msk = keygen(modulus(), 4, &mut rng).unwrap();
        assert!(matches!(
            msk.constrain(&random_vector(5, &mut rng), &mut rng),
            Err(CprfError::LengthMismatch { expected: 4, actual: 5 })
        ));
    }
}
