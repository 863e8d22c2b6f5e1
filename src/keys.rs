//! Key derivation: raw key strings -> per-layer key material.
//!
//! | slot   | layer | derived form                                    |
//! |--------|-------|-------------------------------------------------|
//! | `key1` | DKSS  | residue sequence, indexed cyclically            |
//! | `key2` | NRPE  | validated only; the pair map is fixed           |
//! | `key3` | VBMD  | `n x n` matrix, n from key length, invertible   |
//! | `key4` | KDPP  | weights, expanded to a permutation per length   |
//!
//! Derivation is a pure function of the key string, so a [`KeySchedule`]
//! can be built once and shared across any number of calls.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::alphabet::{gcd, residue_of, Residue, MODULUS};
use crate::error::CipherError;
use crate::layers::kdpp::Permutation;
use crate::layers::nrpe::NrpeParams;
use crate::matrix::Matrix;

/// Validate a raw key and map it to residues.
///
/// Keys must be non-empty and contain ASCII letters only; unlike message
/// text, nothing is silently stripped.
pub fn key_residues(slot: &str, key: &str) -> Result<Vec<Residue>, CipherError> {
    if key.is_empty() {
        return Err(CipherError::invalid("key must be a non-empty string").for_field(slot));
    }
    key.chars()
        .map(|c| {
            residue_of(c).ok_or_else(|| {
                CipherError::invalid("key can only contain alphabetic characters").for_field(slot)
            })
        })
        .collect()
}

pub fn derive_dkss_key(key1: &str) -> Result<Vec<Residue>, CipherError> {
    key_residues("key1", key1)
}

/// key2 is required and validated, but the pair map does not depend on it.
pub fn derive_nrpe_params(key2: &str) -> Result<NrpeParams, CipherError> {
    key_residues("key2", key2)?;
    Ok(NrpeParams::fixed())
}

/// Block dimension chosen from the key length.
pub fn block_dimension(key_len: usize) -> usize {
    if key_len % 4 == 0 {
        4
    } else if key_len % 3 == 0 {
        3
    } else {
        2
    }
}

/// Build the VBMD matrix from key3.
///
/// The `n^2` cells are key3's residues cycled row-major. A singular matrix
/// gets at most two single-cell nudges, `(0,0)` then `(0,1)`, each `+1 mod
/// 26`; if it is still singular the key is rejected.
pub fn derive_vbmd_matrix(key3: &str) -> Result<Matrix, CipherError> {
    let residues = key_residues("key3", key3)?;
    let n = block_dimension(residues.len());
    let cells: Vec<i64> = residues.iter().cycle().take(n * n).map(|&r| r as i64).collect();
    let mut matrix = Matrix::from_cells(n, &cells)
        .ok_or_else(|| CipherError::invalid("key3: cannot fill key matrix"))?;

    for (row, col) in [(0, 0), (0, 1)] {
        if matrix.is_invertible() {
            break;
        }
        tracing::trace!(row, col, "conditioning singular key3 matrix");
        matrix.bump(row, col);
    }

    let determinant = matrix.determinant();
    if gcd(determinant as i64, MODULUS) != 1 {
        return Err(CipherError::KeyNotInvertible {
            dimension: n,
            determinant,
        });
    }
    Ok(matrix)
}

pub fn derive_kdpp_weights(key4: &str) -> Result<Vec<Residue>, CipherError> {
    key_residues("key4", key4)
}

/// Permutation of `[0, len)` from key4.
pub fn derive_kdpp_permutation(key4: &str, len: usize) -> Result<Permutation, CipherError> {
    let weights = derive_kdpp_weights(key4)?;
    Ok(Permutation::from_weights(&weights, len))
}

/// All four derivations, done once.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeySchedule {
    dkss: Vec<Residue>,
    #[zeroize(skip)]
    nrpe: NrpeParams,
    vbmd: Matrix,
    vbmd_inverse: Matrix,
    kdpp: Vec<Residue>,
}

impl KeySchedule {
    /// Validate and derive all key material; the first bad key wins.
    pub fn derive(key1: &str, key2: &str, key3: &str, key4: &str) -> Result<Self, CipherError> {
        let dkss = derive_dkss_key(key1)?;
        let nrpe = derive_nrpe_params(key2)?;
        let vbmd = derive_vbmd_matrix(key3)?;
        let vbmd_inverse = vbmd.inverse().ok_or(CipherError::KeyNotInvertible {
            dimension: vbmd.dimension(),
            determinant: vbmd.determinant(),
        })?;
        let kdpp = derive_kdpp_weights(key4)?;
        tracing::debug!(block = vbmd.dimension(), "derived key schedule");
        Ok(Self {
            dkss,
            nrpe,
            vbmd,
            vbmd_inverse,
            kdpp,
        })
    }

    pub fn dkss(&self) -> &[Residue] {
        &self.dkss
    }

    pub fn nrpe(&self) -> &NrpeParams {
        &self.nrpe
    }

    pub fn vbmd(&self) -> &Matrix {
        &self.vbmd
    }

    pub fn vbmd_inverse(&self) -> &Matrix {
        &self.vbmd_inverse
    }

    /// VBMD block size.
    pub fn block_size(&self) -> usize {
        self.vbmd.dimension()
    }

    /// KDPP permutation for a sequence of `len` residues.
    pub fn kdpp_permutation(&self, len: usize) -> Permutation {
        Permutation::from_weights(&self.kdpp, len)
    }
}

impl fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySchedule")
            .field("block_size", &self.vbmd.dimension())
            .finish_non_exhaustive()
    }
}
