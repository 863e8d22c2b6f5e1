//! Layer 1: Dynamic Key-Shift Substitution.
//!
//! `C_i = (P_i + K[i mod |K|] + i) mod 26`. Length is preserved.

use crate::alphabet::{reduce, Residue, MODULUS};

fn shift(i: usize, key: &[Residue]) -> i64 {
    key[i % key.len()] as i64 + (i as i64 % MODULUS)
}

/// Shift every residue by its key letter plus its position.
///
/// `key` must be non-empty (guaranteed by key derivation).
pub fn forward(input: &[Residue], key: &[Residue]) -> Vec<Residue> {
    input
        .iter()
        .enumerate()
        .map(|(i, &p)| reduce(p as i64 + shift(i, key)))
        .collect()
}

pub fn inverse(input: &[Residue], key: &[Residue]) -> Vec<Residue> {
    input
        .iter()
        .enumerate()
        .map(|(i, &c)| reduce(c as i64 - shift(i, key)))
        .collect()
}
