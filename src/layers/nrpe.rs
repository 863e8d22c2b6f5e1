//! Layer 2: Relational Pair Encoding.
//!
//! Adjacent residues `(a, b)` become
//!
//! ```text
//! C1 = (a + 2b) mod 26
//! C2 = (a - b)  mod 26
//! ```
//!
//! i.e. the map `[[1, 2], [1, -1]]`, determinant 23 (a unit mod 26). The
//! difference is signed: `|a - b|` drops the sign and the pair map stops
//! being injective.

use crate::alphabet::{reduce, Residue, FILLER};
use crate::error::CipherError;

const FORWARD: [[i64; 2]; 2] = [[1, 2], [1, 25]];
// adj([[1,2],[1,25]]) * 23^-1, with 23^-1 = 17
const INVERSE: [[i64; 2]; 2] = [[9, 18], [9, 17]];

/// Coefficients of the pair map and its inverse.
///
/// Fixed today; key2 is validated but does not select a different map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NrpeParams {
    forward: [[i64; 2]; 2],
    inverse: [[i64; 2]; 2],
}

impl NrpeParams {
    pub const fn fixed() -> Self {
        Self {
            forward: FORWARD,
            inverse: INVERSE,
        }
    }

    /// Row-major forward coefficients.
    pub fn forward_matrix(&self) -> [[i64; 2]; 2] {
        self.forward
    }

    pub fn inverse_matrix(&self) -> [[i64; 2]; 2] {
        self.inverse
    }
}

fn mix(m: &[[i64; 2]; 2], a: Residue, b: Residue) -> (Residue, Residue) {
    let (a, b) = (a as i64, b as i64);
    (reduce(m[0][0] * a + m[0][1] * b), reduce(m[1][0] * a + m[1][1] * b))
}

/// Encode one pair.
pub fn encode_pair(params: &NrpeParams, a: Residue, b: Residue) -> (Residue, Residue) {
    mix(&params.forward, a, b)
}

/// Decode one pair.
pub fn decode_pair(params: &NrpeParams, c1: Residue, c2: Residue) -> (Residue, Residue) {
    mix(&params.inverse, c1, c2)
}

/// Output of [`forward`]: the encoded stream and whether a filler was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEncoded {
    pub residues: Vec<Residue>,
    pub padded: bool,
}

/// Encode the sequence pairwise, padding an odd tail with `X`.
pub fn forward(input: &[Residue], params: &NrpeParams) -> PairEncoded {
    let padded = input.len() % 2 == 1;
    let mut residues = Vec::with_capacity(input.len() + 1);
    for pair in input.chunks(2) {
        let b = pair.get(1).copied().unwrap_or(FILLER);
        let (c1, c2) = encode_pair(params, pair[0], b);
        residues.push(c1);
        residues.push(c2);
    }
    PairEncoded { residues, padded }
}

/// Decode pairwise and drop the trailing filler if `padded`.
pub fn inverse(
    input: &[Residue],
    params: &NrpeParams,
    padded: bool,
) -> Result<Vec<Residue>, CipherError> {
    if input.len() % 2 != 0 {
        return Err(CipherError::length(format!(
            "pair stream has odd length {}",
            input.len()
        )));
    }
    if padded && input.is_empty() {
        return Err(CipherError::length("pad recorded on an empty pair stream"));
    }
    let mut out = Vec::with_capacity(input.len());
    for pair in input.chunks_exact(2) {
        let (a, b) = decode_pair(params, pair[0], pair[1]);
        out.push(a);
        out.push(b);
    }
    if padded {
        out.pop();
    }
    Ok(out)
}
