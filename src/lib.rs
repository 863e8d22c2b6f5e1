//! # AQIMC
//!
//! A deterministic four-layer text cipher over the 26-letter alphabet,
//! driven by four independent keys.
//!
//! ## Quick Start
//!
//! ```rust
//! use aqimc::{decrypt, encrypt};
//!
//! let sealed = encrypt("Hello", "KEYA", "KEYB", "MATRIX", "PERMUTE").unwrap();
//! assert_eq!(sealed.text, "WAIRHGE");
//!
//! let opened = decrypt(&sealed.text, "KEYA", "KEYB", "MATRIX", "PERMUTE").unwrap();
//! assert_eq!(opened.text, "HELLO");
//! ```
//!
//! Reusing keys across many messages:
//!
//! ```rust
//! use aqimc::{Aqimc, KeySchedule};
//!
//! let keys = KeySchedule::derive("KEYA", "KEYB", "MATRIX", "PERMUTE").unwrap();
//! let engine = Aqimc::new();
//! for msg in ["attack at dawn", "retreat"] {
//!     let ct = engine.encrypt(msg, &keys).unwrap();
//!     let pt = engine.decrypt(&ct.text, &keys).unwrap();
//!     assert_eq!(pt.text, msg.replace(' ', "").to_uppercase());
//! }
//! ```
//!
//! ## Layers
//!
//! | order | layer | key    | transform                                  |
//! |-------|-------|--------|--------------------------------------------|
//! | 1     | DKSS  | `key1` | shift by key letter plus position          |
//! | 2     | NRPE  | `key2` | fixed invertible 2x2 map over pairs        |
//! | 3     | VBMD  | `key3` | key-derived n x n matrix over blocks       |
//! | 4     | KDPP  | `key4` | key-weighted positional permutation        |
//!
//! Ciphertext is the rendered KDPP output followed by one pad marker letter.
//!
//! ## What's NOT Provided
//!
//! - Confidentiality. This is a teaching cipher with a tiny key space.
//! - Key management
//! - Preservation of case, spaces or punctuation

#![deny(unsafe_code)]

pub mod alphabet;
pub mod engine;
pub mod error;
pub mod keys;
pub mod layers;
pub mod matrix;
pub mod trace;
pub mod wire;

pub use alphabet::Residue;
pub use engine::{Aqimc, CipherOutput, PadRecord};
pub use error::CipherError;
pub use keys::KeySchedule;
pub use layers::{Direction, Layer};
pub use trace::{LayerStep, Trace};

/// Derive keys and encrypt in one call.
pub fn encrypt(
    plaintext: &str,
    key1: &str,
    key2: &str,
    key3: &str,
    key4: &str,
) -> Result<CipherOutput, CipherError> {
    let keys = KeySchedule::derive(key1, key2, key3, key4)?;
    Aqimc::new().encrypt(plaintext, &keys)
}

/// Derive keys and decrypt in one call.
pub fn decrypt(
    ciphertext: &str,
    key1: &str,
    key2: &str,
    key3: &str,
    key4: &str,
) -> Result<CipherOutput, CipherError> {
    let keys = KeySchedule::derive(key1, key2, key3, key4)?;
    Aqimc::new().decrypt(ciphertext, &keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_thread_safe() {
        assert_send_sync::<Aqimc>();
        assert_send_sync::<KeySchedule>();
        assert_send_sync::<CipherOutput>();
        assert_send_sync::<CipherError>();
    }

    #[test]
    fn free_functions_validate_keys_first() {
        let err = encrypt("HELLO", "KEYA", "KEYB", "AAAA", "PERMUTE").unwrap_err();
        assert!(matches!(err, CipherError::KeyNotInvertible { .. }));
    }
}
