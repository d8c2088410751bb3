//! Constrained PRFs for inner-product predicates
//!
//! A master key evaluates a PRF on vectors `x`. Constraining it with a predicate
//! vector `z` gives a key that agrees with the master key exactly on the inputs
//! with `⟨z, x⟩ = 0 (mod p)` and looks unrelated everywhere else.
//!
//! Three constructions, each in its own module with its own concrete types:
//! - [`ddh`]: Naor-Reingold style product in a prime-order group (NIST P-256 by
//!   default, any Arkworks `CurveGroup` works), output is a group element
//! - [`owf`]: random polynomial over `Z/(2^k − 1)` used as a k-wise independent
//!   hash, finished with SHA-256
//! - [`ro`]: SHA-256 of the inner product, secure when SHA-256 is modeled as a
//!   random oracle
//!
//! All three share the same key shape: `z0` is a matrix of uniform residues and a
//! constrained key is `z1[i] = z0[i] − Δ_i · z` for fresh random `Δ_i`. Since
//! `⟨z1[i], x⟩ = ⟨z0[i], x⟩ − Δ_i·⟨z, x⟩`, both keys produce the same per-row
//! keys on authorized inputs.
//!
//! Minimal API:
//! - `keygen`: public parameters (if any) and a master key
//! - `MasterKey::constrain`: constrained key for a predicate vector
//! - `MasterKey::eval` / `ConstrainedKey::eval`: PRF evaluation
//!
//! Key material comes only from the `RngCore + CryptoRng` the caller passes in.
//! Not constant-time; do not use for production without a security review.

pub mod ddh;
pub mod error;
pub mod field;
pub mod owf;
pub mod parallel;
pub mod ro;
pub mod util;

pub use error::CprfError;
pub use field::{Field, FieldElement, StreamingSum};
