//! Layer 4: Key-Driven Positional Permutation.
//!
//! `output[j] = input[pi[j]]`; the inverse applies the same rule with
//! `pi^-1`. The permutation is a function of key4 and the exact sequence
//! length, so encrypt and decrypt rebuild the same one.

use crate::alphabet::Residue;
use crate::error::CipherError;

/// A bijection of `[0, len)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Order indices by `(weights[i % weights.len()], i)` ascending.
    ///
    /// Ties fall back to the original index, so the result is deterministic
    /// and always a bijection. `weights` must be non-empty when `len > 0`.
    pub fn from_weights(weights: &[Residue], len: usize) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        if !weights.is_empty() {
            order.sort_by_key(|&i| (weights[i % weights.len()], i));
        }
        Self(order)
    }

    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(j, &i)| i == j)
    }

    /// `pi^-1[pi[j]] = j`.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (j, &i) in self.0.iter().enumerate() {
            inv[i] = j;
        }
        Self(inv)
    }

    /// `output[j] = input[self[j]]`.
    pub fn apply<T: Copy>(&self, input: &[T]) -> Result<Vec<T>, CipherError> {
        if input.len() != self.0.len() {
            return Err(CipherError::length(format!(
                "permutation covers {} positions, sequence has {}",
                self.0.len(),
                input.len()
            )));
        }
        Ok(self.0.iter().map(|&i| input[i]).collect())
    }
}

pub fn forward(input: &[Residue], permutation: &Permutation) -> Result<Vec<Residue>, CipherError> {
    permutation.apply(input)
}

pub fn inverse(input: &[Residue], permutation: &Permutation) -> Result<Vec<Residue>, CipherError> {
    permutation.inverse().apply(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{normalize, render};

    #[test]
    fn weights_sort_stably() {
        let w = normalize("PERMUTE").unwrap();
        let p = Permutation::from_weights(&w, 6);
        assert_eq!(p.as_slice(), &[1, 3, 0, 2, 5, 4]);
    }

    #[test]
    fn equal_weights_give_identity() {
        let p = Permutation::from_weights(&[7], 9);
        assert!(p.is_identity());
    }

    #[test]
    fn weights_cycle_past_key_length() {
        // weights B A B A B -> A's (1, 3) first, then B's (0, 2, 4)
        let p = Permutation::from_weights(&[1, 0], 5);
        assert_eq!(p.as_slice(), &[1, 3, 0, 2, 4]);
    }

    #[test]
    fn inverse_composes_to_identity() {
        let p = Permutation::from_weights(&normalize("PERMUTE").unwrap(), 6);
        let inv = p.inverse();
        assert_eq!(inv.as_slice(), &[2, 0, 3, 1, 5, 4]);
        let idx: Vec<usize> = (0..6).collect();
        let there = p.apply(&idx).unwrap();
        assert_eq!(inv.apply(&there).unwrap(), idx);
    }

    #[test]
    fn forward_then_inverse() {
        let p = Permutation::from_weights(&normalize("PERMUTE").unwrap(), 6);
        let input = normalize("IWRAGH").unwrap();
        let out = forward(&input, &p).unwrap();
        assert_eq!(render(&out), "WAIRHG");
        assert_eq!(inverse(&out, &p).unwrap(), input);
    }

    #[test]
    fn length_must_match() {
        let p = Permutation::identity(3);
        assert!(matches!(forward(&[1, 2], &p), Err(CipherError::LengthMismatch(_))));
    }
}
