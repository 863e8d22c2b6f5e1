//! Unified error type for the AQIMC pipeline.

use core::fmt;

use crate::alphabet::Residue;

/// Every failure the pipeline can report.
///
/// All variants are deterministic functions of the input: retrying the same
/// call never succeeds. Decrypting with wrong-but-valid keys is *not* an
/// error; it produces well-formed garbage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Empty or non-alphabetic text or key.
    InvalidInput(String),
    /// The key3-derived VBMD matrix has no inverse mod 26.
    KeyNotInvertible { dimension: usize, determinant: Residue },
    /// Ciphertext length disagrees with the pad/permutation bookkeeping.
    LengthMismatch(String),
}

impl CipherError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn length(msg: impl Into<String>) -> Self {
        Self::LengthMismatch(msg.into())
    }

    /// Prefix an `InvalidInput` message with the offending field name.
    pub(crate) fn for_field(self, field: &str) -> Self {
        match self {
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{}: {}", field, msg)),
            other => other,
        }
    }

    /// Short machine-readable tag, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::KeyNotInvertible { .. } => "key_not_invertible",
            Self::LengthMismatch(_) => "length_mismatch",
        }
    }
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "{}", msg),
            Self::KeyNotInvertible {
                dimension,
                determinant,
            } => write!(
                f,
                "key3: derived {0}x{0} matrix is not invertible mod 26 (determinant {1}); choose a different key",
                dimension, determinant
            ),
            Self::LengthMismatch(msg) => write!(f, "length mismatch: {}", msg),
        }
    }
}

impl std::error::Error for CipherError {}
