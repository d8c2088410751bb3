//! Parallel batch evaluation using Rayon
//!
//! Evaluations of one key on disjoint inputs are independent: keys and public
//! parameters are only read, and every evaluation owns its scratch values. Each
//! `eval_batch` returns outputs in input order.

use ark_ec::CurveGroup;
use num_bigint::BigUint;
use rayon::prelude::*;

use crate::{ddh, owf, ro};

impl<C: CurveGroup> ddh::MasterKey<C> {
    pub fn eval_batch(&self, pp: &ddh::PublicParameters<C>, inputs: &[Vec<C::ScalarField>]) -> Vec<C> {
        inputs.par_iter().map(|x| self.eval(pp, x)).collect()
    }
}

impl<C: CurveGroup> ddh::ConstrainedKey<C> {
    pub fn eval_batch(&self, pp: &ddh::PublicParameters<C>, inputs: &[Vec<C::ScalarField>]) -> Vec<C> {
        inputs.par_iter().map(|x| self.eval(pp, x)).collect()
    }
}

impl owf::MasterKey {
    pub fn eval_batch(&self, pp: &owf::PublicParameters, inputs: &[Vec<BigUint>]) -> Vec<[u8; 32]> {
        inputs.par_iter().map(|x| self.eval(pp, x)).collect()
    }
}

impl owf::ConstrainedKey {
    pub fn eval_batch(&self, pp: &owf::PublicParameters, inputs: &[Vec<BigUint>]) -> Vec<[u8; 32]> {
        inputs.par_iter().map(|x| self.eval(pp, x)).collect()
    }
}

impl ro::MasterKey {
    pub fn eval_batch(&self, inputs: &[Vec<BigUint>]) -> Vec<[u8; 32]> {
        inputs.par_iter().map(|x| self.eval(x)).collect()
    }
}

impl ro::ConstrainedKey {
    pub fn eval_batch(&self, inputs: &[Vec<BigUint>]) -> Vec<[u8; 32]> {
        inputs.par_iter().map(|x| self.eval(x)).collect()
    }
}
