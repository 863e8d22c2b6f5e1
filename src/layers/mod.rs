//! The four pipeline layers, in encryption order.
//!
//! Each layer is a pair of pure functions `forward` / `inverse` over residue
//! sequences. Layers never see raw key strings, only the material derived in
//! [`crate::keys`].

pub mod dkss;
pub mod kdpp;
pub mod nrpe;
pub mod vbmd;

use core::fmt;

/// Layer identity, as reported in traces and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Dynamic Key-Shift Substitution.
    Dkss,
    /// Relational Pair Encoding.
    Nrpe,
    /// Variable Block Matrix Diffusion.
    Vbmd,
    /// Key-Driven Positional Permutation.
    Kdpp,
}

/// Which way a layer ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

impl Layer {
    /// Encryption order. Decryption walks it backwards.
    pub const PIPELINE: [Layer; 4] = [Layer::Dkss, Layer::Nrpe, Layer::Vbmd, Layer::Kdpp];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Dkss => "DKSS",
            Layer::Nrpe => "NRPE",
            Layer::Vbmd => "VBMD",
            Layer::Kdpp => "KDPP",
        }
    }

    pub fn description(self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Layer::Dkss, Direction::Forward) => "Dynamic Key-Shift Substitution applied",
            (Layer::Nrpe, Direction::Forward) => "Relational Pair Encoding applied",
            (Layer::Vbmd, Direction::Forward) => "Variable Block Matrix Diffusion applied",
            (Layer::Kdpp, Direction::Forward) => "Key-Driven Positional Permutation applied",
            (Layer::Dkss, Direction::Inverse) => {
                "Inverse Dynamic Key-Shift Substitution applied"
            }
            (Layer::Nrpe, Direction::Inverse) => "Inverse Relational Pair Encoding applied",
            (Layer::Vbmd, Direction::Inverse) => {
                "Inverse Variable Block Matrix Diffusion applied"
            }
            (Layer::Kdpp, Direction::Inverse) => {
                "Inverse Key-Driven Positional Permutation applied"
            }
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
