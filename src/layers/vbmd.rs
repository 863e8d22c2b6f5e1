//! Layer 3: Variable Block Matrix Diffusion.
//!
//! The sequence is padded with `X` to a multiple of the key matrix
//! dimension `n`, cut into column vectors of `n` residues, and each block is
//! multiplied by the key matrix mod 26. Decryption uses the inverse matrix,
//! derived once per key schedule.

use crate::alphabet::{Residue, FILLER};
use crate::error::CipherError;
use crate::matrix::Matrix;

/// Output of [`forward`]: the diffused stream and the filler count added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diffused {
    pub residues: Vec<Residue>,
    pub pad: usize,
}

/// Number of fillers needed to align `len` to blocks of `n`.
pub fn pad_for(len: usize, n: usize) -> usize {
    (n - len % n) % n
}

fn multiply_blocks(input: &[Residue], matrix: &Matrix) -> Vec<Residue> {
    input
        .chunks_exact(matrix.dimension())
        .flat_map(|block| matrix.apply(block))
        .collect()
}

pub fn forward(input: &[Residue], matrix: &Matrix) -> Diffused {
    let pad = pad_for(input.len(), matrix.dimension());
    let mut aligned = Vec::with_capacity(input.len() + pad);
    aligned.extend_from_slice(input);
    aligned.resize(input.len() + pad, FILLER);
    Diffused {
        residues: multiply_blocks(&aligned, matrix),
        pad,
    }
}

/// Undo [`forward`] with the *inverse* key matrix, then strip `pad` fillers.
pub fn inverse(
    input: &[Residue],
    inverse_matrix: &Matrix,
    pad: usize,
) -> Result<Vec<Residue>, CipherError> {
    let n = inverse_matrix.dimension();
    if input.is_empty() || input.len() % n != 0 {
        return Err(CipherError::length(format!(
            "{} residues do not split into {}-residue blocks",
            input.len(),
            n
        )));
    }
    if pad >= n || pad >= input.len() {
        return Err(CipherError::length(format!(
            "recorded pad {} is impossible for block size {}",
            pad, n
        )));
    }
    let mut out = multiply_blocks(input, inverse_matrix);
    out.truncate(out.len() - pad);
    Ok(out)
}
