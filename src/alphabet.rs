//! Alphabet codec: letters <-> residues mod 26.
//!
//! Normalization is lossy: case is folded, and anything outside A-Z
//! (spaces, digits, punctuation, non-ASCII letters) is discarded.

use crate::error::CipherError;

/// A letter A-Z as an integer in `[0, 25]`.
pub type Residue = u8;

/// Size of the alphabet; every residue operation reduces by this.
pub const MODULUS: i64 = 26;

/// Filler appended by the padding layers (NRPE, VBMD). 23 = `X`.
pub const FILLER: Residue = 23;

/// Reduce any integer into `[0, 25]`.
#[inline]
pub fn reduce(value: i64) -> Residue {
    value.rem_euclid(MODULUS) as Residue
}

/// Residue of an ASCII letter of either case, `None` for anything else.
#[inline]
pub fn residue_of(c: char) -> Option<Residue> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some(upper as u8 - b'A')
    } else {
        None
    }
}

/// Uppercase letter for a residue.
#[inline]
pub fn letter_of(r: Residue) -> char {
    (b'A' + r % MODULUS as u8) as char
}

/// Map text to residues, keeping only letters.
///
/// Fails when no letter survives.
pub fn normalize(text: &str) -> Result<Vec<Residue>, CipherError> {
    let residues: Vec<Residue> = text.chars().filter_map(residue_of).collect();
    if residues.is_empty() {
        return Err(CipherError::invalid(
            "text must contain at least one letter A-Z",
        ));
    }
    Ok(residues)
}

/// Render residues as compact uppercase text.
pub fn render(residues: &[Residue]) -> String {
    residues.iter().map(|&r| letter_of(r)).collect()
}

/// Greatest common divisor (non-negative).
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Multiplicative inverse mod 26, if `value` is coprime with 26.
pub fn mod_inverse(value: i64) -> Option<Residue> {
    // extended Euclid on (value mod 26, 26)
    let (mut old_r, mut r) = (value.rem_euclid(MODULUS), MODULUS);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(reduce(old_s))
}
